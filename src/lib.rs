//! # metaview
//!
//! Tabular display of image metadata: EXIF, XMP and IPTC tags grouped into
//! sections, with dates and GPS coordinates formatted for display and a
//! cropped thumbnail for every named face region (`mwg-rs`) in the XMP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use metaview::config::Config;
//! use metaview::view::{MetadataView, RowList};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("metaview.json".as_ref()))?;
//!     let mut view = MetadataView::new(RowList::default(), &config);
//!
//!     let path = Path::new("photo.jpg");
//!     if !view.has_data(path) {
//!         println!("No recognized metadata");
//!         return Ok(());
//!     }
//!
//!     view.display_exif_tags(path);
//!     for row in view.sink().rows() {
//!         let section = row.section.label(view.locale());
//!         println!("{section:<12} {} = {}", row.key, row.value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The tag store, formatters and region geometry can be used on their own.
//! Use [`view::MetadataView::try_display_exif_tags`] to find out *why* nothing
//! was shown:
//!
//! ```rust,no_run
//! use metaview::error::MetadataError;
//! use metaview::metadata::{MetadataStore, TagStore};
//! use metaview::regions::read_regions;
//!
//! fn main() -> Result<(), MetadataError> {
//!     let bytes = std::fs::read("photo.jpg").map_err(|source| MetadataError::Io {
//!         path: "photo.jpg".into(),
//!         source,
//!     })?;
//!     let store = TagStore::from_bytes(&bytes)?;
//!
//!     if let Some(make) = store.interpreted("Exif.Image.Make") {
//!         println!("Camera: {make}");
//!     }
//!     for region in read_regions(&store) {
//!         println!("Region {}: {} {:?}", region.index, region.name, region.area);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — Typed failures behind the boolean entry points
//! - [`format`] — Date and GPS value formatters
//! - [`locale`] — Translation and date/coordinate display
//! - [`metadata`] — EXIF/XMP/IPTC tag store
//! - [`regions`] — Named region geometry and thumbnails
//! - [`tags`] — The ordered tag table and its sections
//! - [`view`] — The display pass and its row sink

pub mod config;
pub mod error;
pub mod format;
pub mod locale;
pub mod metadata;
pub mod regions;
pub mod tags;
pub mod view;
