//! The metadata view: one pass over the tag table against a loaded image.

use image::{DynamicImage, RgbaImage};
use std::path::Path;

use crate::config::Config;
use crate::error::{MetadataError, Result};
use crate::locale::{DefaultLocale, Locale};
use crate::metadata::{MetadataStore, TagStore};
use crate::tags::{Handler, Section, TAGS, TagDescriptor};

/// One displayed line: section, tag key, optional region thumbnail, value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub section: Section,
    pub key: String,
    pub thumbnail: Option<RgbaImage>,
    pub value: String,
}

/// Ordered row sink standing in for a list widget.
pub trait DisplaySink {
    fn clear(&mut self);
    fn add(&mut self, row: Row);
    fn count(&self) -> usize;
    /// Called once after a successful population.
    fn expand_all(&mut self) {}
}

/// `Vec`-backed sink.
#[derive(Debug, Clone, Default)]
pub struct RowList {
    rows: Vec<Row>,
    expanded: bool,
}

impl RowList {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }
}

impl DisplaySink for RowList {
    fn clear(&mut self) {
        self.rows.clear();
        self.expanded = false;
    }

    fn add(&mut self, row: Row) {
        self.rows.push(row);
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn expand_all(&mut self) {
        self.expanded = true;
    }
}

/// Everything a region handler needs: tags, decoded pixels and the
/// thumbnail bound.
pub struct RegionContext<'a> {
    pub store: &'a dyn MetadataStore,
    pub image: &'a DynamicImage,
    pub thumbnail_bound: (u32, u32),
}

/// Renders an image's metadata into a [`DisplaySink`].
///
/// # Example
///
/// ```rust,no_run
/// use metaview::config::Config;
/// use metaview::view::{MetadataView, RowList};
///
/// let mut view = MetadataView::new(RowList::default(), &Config::default());
/// if view.display_exif_tags("photo.jpg".as_ref()) {
///     for row in view.sink().rows() {
///         println!("{:?} {} = {}", row.section, row.key, row.value);
///     }
/// }
/// ```
pub struct MetadataView<S: DisplaySink> {
    sink: S,
    locale: Box<dyn Locale>,
    thumbnail_bound: (u32, u32),
    tags: &'static [TagDescriptor],
}

impl<S: DisplaySink> MetadataView<S> {
    pub fn new(sink: S, config: &Config) -> Self {
        Self {
            sink,
            locale: Box::new(DefaultLocale::from_config(config)),
            thumbnail_bound: config.thumbnail_bound(),
            tags: TAGS,
        }
    }

    pub fn with_locale(mut self, locale: Box<dyn Locale>) -> Self {
        self.locale = locale;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn locale(&self) -> &dyn Locale {
        self.locale.as_ref()
    }

    /// Populate the sink with the image's recognized tags.
    ///
    /// Returns `true` if at least one row was produced. Missing, unreadable
    /// or corrupt files leave the sink empty and return `false`.
    pub fn display_exif_tags(&mut self, image_path: &Path) -> bool {
        match self.try_display_exif_tags(image_path) {
            Ok(count) => count > 0,
            Err(e) => {
                log::debug!("No metadata displayed for {}: {e}", image_path.display());
                false
            }
        }
    }

    /// Like [`display_exif_tags`](Self::display_exif_tags), but reports why
    /// nothing could be shown. Returns the number of rows added.
    pub fn try_display_exif_tags(&mut self, image_path: &Path) -> Result<usize> {
        self.sink.clear();

        let bytes = read_image(image_path)?;
        let store = TagStore::from_bytes(&bytes)?;
        let image = image::load_from_memory(&bytes)?;
        log::debug!(
            "{}: {}x{} pixels, {} tags",
            image_path.display(),
            image.width(),
            image.height(),
            store.len()
        );

        let rows = self.build_rows(&store, &image);
        let count = rows.len();
        for row in rows {
            self.sink.add(row);
        }
        self.sink.expand_all();
        Ok(count)
    }

    /// Build the rows for an already-loaded store and image.
    pub fn build_rows(&self, store: &dyn MetadataStore, image: &DynamicImage) -> Vec<Row> {
        let mut rows = Vec::new();
        for descriptor in self.tags {
            if !store.contains(descriptor.key) {
                continue;
            }

            match descriptor.handler {
                Handler::Regions(handler) => {
                    let ctx = RegionContext {
                        store,
                        image,
                        thumbnail_bound: self.thumbnail_bound,
                    };
                    rows.extend(handler(&ctx));
                }
                Handler::Scalar(formatter) => {
                    let primary = store.raw(descriptor.key).unwrap_or_default();
                    let secondary = descriptor
                        .secondary
                        .filter(|key| store.contains(key))
                        .and_then(|key| store.raw(key));
                    rows.push(Row {
                        section: descriptor.section,
                        key: descriptor.key.to_string(),
                        thumbnail: None,
                        value: formatter.apply(primary, secondary, self.locale.as_ref()),
                    });
                }
                Handler::Interpreted => {
                    let mut value = store.interpreted(descriptor.key).unwrap_or_default();
                    if let Some(secondary) = descriptor.secondary.filter(|key| store.contains(key)) {
                        value.push(' ');
                        value.push_str(&store.interpreted(secondary).unwrap_or_default());
                    }
                    rows.push(Row {
                        section: descriptor.section,
                        key: descriptor.key.to_string(),
                        thumbnail: None,
                        value,
                    });
                }
            }
        }
        rows
    }

    /// Whether the image carries any recognized tag. Does not decode pixels.
    pub fn has_data(&self, image_path: &Path) -> bool {
        match self.try_has_data(image_path) {
            Ok(found) => found,
            Err(e) => {
                log::debug!("No metadata for {}: {e}", image_path.display());
                false
            }
        }
    }

    pub fn try_has_data(&self, image_path: &Path) -> Result<bool> {
        let bytes = read_image(image_path)?;
        let store = TagStore::from_bytes(&bytes)?;
        Ok(self.has_recognized_tag(&store))
    }

    pub fn has_recognized_tag(&self, store: &dyn MetadataStore) -> bool {
        self.tags.iter().any(|descriptor| store.contains(descriptor.key))
    }
}

/// Read the whole file; the handle is closed before parsing starts.
fn read_image(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(MetadataError::NotFound(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
