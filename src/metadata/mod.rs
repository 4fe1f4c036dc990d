//! EXIF, XMP, and IPTC metadata reading.
//!
//! Every tag is addressed by a dotted key in one of three namespaces:
//!
//! - `Exif.<Group>.<Name>` — e.g. `Exif.Photo.DateTimeOriginal`
//! - `Xmp.<prefix>.<path>` — e.g. `Xmp.mwg-rs.Regions/mwg-rs:RegionList[1]/mwg-rs:Name`
//! - `Iptc.Application2.<Name>` — e.g. `Iptc.Application2.Keywords`
//!
//! [`TagStore`] parses all three from an in-memory buffer. Consumers only
//! depend on the [`MetadataStore`] trait.

mod exif;
mod interpret;
mod iptc;
mod xmp;

use std::collections::BTreeMap;

use crate::error::{MetadataError, Result};

pub use interpret::{interpret, label};

/// Which metadata standard a tag key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    Exif,
    Xmp,
    Iptc,
}

impl Namespace {
    pub const ALL: [Namespace; 3] = [Namespace::Exif, Namespace::Xmp, Namespace::Iptc];

    /// Namespace of a dotted key, judged by its first component.
    pub fn of_key(key: &str) -> Option<Self> {
        match key.split('.').next()? {
            "Exif" => Some(Self::Exif),
            "Xmp" => Some(Self::Xmp),
            "Iptc" => Some(Self::Iptc),
            _ => None,
        }
    }
}

/// Read-only key/value view of an image's embedded metadata.
pub trait MetadataStore {
    /// Whether `key` is present in the given namespace.
    fn has_tag(&self, namespace: Namespace, key: &str) -> bool;

    /// All keys present in the given namespace, in key order.
    fn tag_keys(&self, namespace: Namespace) -> Vec<&str>;

    /// Raw (uninterpreted) value of `key`.
    fn raw(&self, key: &str) -> Option<&str>;

    /// Human-readable rendering of `key`.
    fn interpreted(&self, key: &str) -> Option<String> {
        self.raw(key).map(|raw| interpret(key, raw))
    }

    /// Display label for `key`.
    fn label(&self, key: &str) -> String {
        label(key)
    }

    /// Whether `key` is present in any namespace.
    fn contains(&self, key: &str) -> bool {
        Namespace::ALL.iter().any(|ns| self.has_tag(*ns, key))
    }
}

/// Metadata parsed from an image buffer.
#[derive(Debug, Clone, Default)]
pub struct TagStore {
    tags: BTreeMap<String, Tag>,
}

#[derive(Debug, Clone)]
struct Tag {
    namespace: Namespace,
    raw: String,
}

impl TagStore {
    /// Parse EXIF, XMP and IPTC from a complete image file held in memory.
    ///
    /// Each namespace is read independently; a namespace that fails to parse
    /// is left empty. Only a buffer that is not a recognized image at all is
    /// an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let format = image::guess_format(bytes).map_err(|_| MetadataError::UnrecognizedFormat)?;
        log::debug!("Parsing metadata from {format:?} buffer ({} bytes)", bytes.len());

        let mut store = Self::default();
        for (key, raw) in exif::read_exif(bytes) {
            store.insert(Namespace::Exif, key, raw);
        }
        for (key, raw) in xmp::read_xmp(bytes) {
            store.insert(Namespace::Xmp, key, raw);
        }
        for (key, raw) in iptc::read_iptc(bytes) {
            store.insert(Namespace::Iptc, key, raw);
        }
        Ok(store)
    }

    /// Insert or replace a tag. The key's own prefix wins over `namespace`
    /// when the two disagree.
    pub fn insert(&mut self, namespace: Namespace, key: impl Into<String>, raw: impl Into<String>) {
        let key = key.into();
        let namespace = Namespace::of_key(&key).unwrap_or(namespace);
        self.tags.insert(
            key,
            Tag {
                namespace,
                raw: raw.into(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<(String, String)> for TagStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut store = Self::default();
        for (key, raw) in iter {
            if let Some(namespace) = Namespace::of_key(&key) {
                store.insert(namespace, key, raw);
            }
        }
        store
    }
}

impl MetadataStore for TagStore {
    fn has_tag(&self, namespace: Namespace, key: &str) -> bool {
        self.tags
            .get(key)
            .is_some_and(|tag| tag.namespace == namespace)
    }

    fn tag_keys(&self, namespace: Namespace) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|(_, tag)| tag.namespace == namespace)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    fn raw(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|tag| tag.raw.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> TagStore {
        [
            ("Exif.Image.Make", "Canon"),
            ("Xmp.dc.title", "Holiday"),
            ("Iptc.Application2.Caption", "On the beach"),
            ("Bogus.Key", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn namespace_of_key() {
        assert_eq!(Namespace::of_key("Exif.Image.Make"), Some(Namespace::Exif));
        assert_eq!(Namespace::of_key("Xmp.dc.title"), Some(Namespace::Xmp));
        assert_eq!(Namespace::of_key("Iptc.Application2.Caption"), Some(Namespace::Iptc));
        assert_eq!(Namespace::of_key("Other.Key"), None);
    }

    #[test]
    fn membership_is_per_namespace() {
        let store = store();
        assert!(store.has_tag(Namespace::Exif, "Exif.Image.Make"));
        assert!(!store.has_tag(Namespace::Xmp, "Exif.Image.Make"));
        assert!(store.contains("Xmp.dc.title"));
        assert!(store.contains("Iptc.Application2.Caption"));
        assert!(!store.contains("Bogus.Key"));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn tag_keys_lists_one_namespace() {
        let store = store();
        assert_eq!(store.tag_keys(Namespace::Exif), vec!["Exif.Image.Make"]);
        assert_eq!(store.tag_keys(Namespace::Xmp), vec!["Xmp.dc.title"]);
    }

    #[test]
    fn raw_and_interpreted() {
        let store = store();
        assert_eq!(store.raw("Exif.Image.Make"), Some("Canon"));
        assert_eq!(store.interpreted("Exif.Image.Make").as_deref(), Some("Canon"));
        assert_eq!(store.raw("Exif.Image.Model"), None);
        assert_eq!(store.label("Exif.Image.Make"), "Make");
    }

    #[test]
    fn insert_uses_key_prefix() {
        let mut store = TagStore::default();
        store.insert(Namespace::Iptc, "Xmp.dc.title", "x");
        assert!(store.has_tag(Namespace::Xmp, "Xmp.dc.title"));
    }

    #[test]
    fn non_image_buffer_is_unrecognized() {
        let err = TagStore::from_bytes(b"definitely not an image").unwrap_err();
        assert!(matches!(err, MetadataError::UnrecognizedFormat));
    }

    #[test]
    fn plain_png_has_no_tags() {
        let img = image::RgbImage::new(4, 4);
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let store = TagStore::from_bytes(&bytes).unwrap();
        assert!(store.is_empty());
    }
}
