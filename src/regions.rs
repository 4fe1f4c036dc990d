//! Named XMP regions (`mwg-rs`) and their thumbnails.
//!
//! Region areas are stored as fractions of the image size. They are scaled
//! to percent, clamped to the image, converted to pixels and cropped out of
//! the decoded image.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::metadata::MetadataStore;
use crate::tags::Section;
use crate::view::{RegionContext, Row};

const REGION_LIST: &str = "Xmp.mwg-rs.Regions/mwg-rs:RegionList";

/// Name tag of the first region; its presence enables region extraction.
pub const FIRST_REGION_NAME: &str = "Xmp.mwg-rs.Regions/mwg-rs:RegionList[1]/mwg-rs:Name";

fn region_key(index: usize, field: &str) -> String {
    format!("{REGION_LIST}[{index}]/{field}")
}

/// Center and size of a region, in percent of the image dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Clamped edges of a [`PercentBox`], each in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PercentBox {
    /// The whole image.
    pub const FULL_IMAGE: PercentBox = PercentBox {
        x: 50.0,
        y: 50.0,
        w: 100.0,
        h: 100.0,
    };

    pub fn bounds(&self) -> PercentBounds {
        PercentBounds {
            left: (self.x - self.w / 2.0).max(0.0),
            top: (self.y - self.h / 2.0).max(0.0),
            right: (self.x + self.w / 2.0).min(100.0),
            bottom: (self.y + self.h / 2.0).min(100.0),
        }
    }
}

/// A region read from the `mwg-rs` region list.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDescriptor {
    /// 1-based position in the list.
    pub index: usize,
    pub name: String,
    pub kind: Option<String>,
    pub unit: Option<String>,
    pub area: PercentBox,
}

impl RegionDescriptor {
    /// Key of this region's name tag.
    pub fn name_key(&self) -> String {
        region_key(self.index, "mwg-rs:Name")
    }
}

/// Pixel rectangle, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl PixelRect {
    pub fn width(&self) -> i64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i64 {
        self.y2 - self.y1
    }
}

/// Read regions 1, 2, … until the first missing name.
pub fn read_regions(store: &dyn MetadataStore) -> Vec<RegionDescriptor> {
    let mut regions = Vec::new();
    for index in 1.. {
        let Some(name) = store.raw(&region_key(index, "mwg-rs:Name")) else {
            break;
        };
        let area = read_area(store, index).unwrap_or_else(|| {
            log::debug!("Region {index} has no usable area, using the whole image");
            PercentBox::FULL_IMAGE
        });
        regions.push(RegionDescriptor {
            index,
            name: name.to_string(),
            kind: store.raw(&region_key(index, "mwg-rs:Type")).map(str::to_string),
            unit: store
                .raw(&region_key(index, "mwg-rs:Area/stArea:unit"))
                .map(str::to_string),
            area,
        });
    }
    regions
}

fn read_area(store: &dyn MetadataStore, index: usize) -> Option<PercentBox> {
    let field = |name: &str| -> Option<f64> {
        let raw = store.raw(&region_key(index, &format!("mwg-rs:Area/stArea:{name}")))?;
        let value = raw.trim().parse::<f64>().ok()? * 100.0;
        value.is_finite().then_some(value)
    };
    Some(PercentBox {
        x: field("x")?,
        y: field("y")?,
        w: field("w")?,
        h: field("h")?,
    })
}

/// Scale clamped percent bounds to an image of `width` x `height` pixels.
///
/// Halves round to even, so a 25% edge on a 10 pixel image lands on 2.
pub fn to_pixels(bounds: PercentBounds, width: u32, height: u32) -> PixelRect {
    let scale =
        |percent: f64, size: u32| (percent * size as f64 / 100.0).round_ties_even() as i64;
    PixelRect {
        x1: scale(bounds.left, width),
        y1: scale(bounds.top, height),
        x2: scale(bounds.right, width),
        y2: scale(bounds.bottom, height),
    }
}

/// Size of `width` x `height` scaled to fit `bound` with its aspect ratio kept.
///
/// The longer side (relative to the bound) maps onto the bound; the other is
/// floored but kept at one pixel or more.
pub fn fit_within(width: u32, height: u32, bound: (u32, u32)) -> (u32, u32) {
    let (bw, bh) = bound;
    let (w, h, bw, bh) = (width as u64, height as u64, bw as u64, bh as u64);
    // w/h > bw/bh without floating point
    if w * bh > bw * h {
        (bw as u32, ((bw * h / w) as u32).max(1))
    } else {
        (((bh * w / h) as u32).max(1), bh as u32)
    }
}

/// Crop `rect` out of `image` and scale it into `bound`.
///
/// Returns `None` when the rectangle is less than a pixel wide or high.
pub fn thumbnail(image: &DynamicImage, rect: PixelRect, bound: (u32, u32)) -> Option<RgbaImage> {
    let (img_w, img_h) = image.dimensions();
    let rect = PixelRect {
        x1: rect.x1.clamp(0, img_w as i64),
        y1: rect.y1.clamp(0, img_h as i64),
        x2: rect.x2.clamp(0, img_w as i64),
        y2: rect.y2.clamp(0, img_h as i64),
    };
    if rect.width() < 1 || rect.height() < 1 {
        return None;
    }

    let (w, h) = (rect.width() as u32, rect.height() as u32);
    let crop = image.crop_imm(rect.x1 as u32, rect.y1 as u32, w, h);
    let (tw, th) = fit_within(w, h, bound);
    Some(imageops::resize(&crop, tw, th, FilterType::Triangle))
}

/// One `People` row per named region, with a thumbnail when the region has
/// a visible area.
pub fn named_region_rows(ctx: &RegionContext<'_>) -> Vec<Row> {
    let (width, height) = ctx.image.dimensions();
    read_regions(ctx.store)
        .into_iter()
        .map(|region| {
            let rect = to_pixels(region.area.bounds(), width, height);
            let thumb = thumbnail(ctx.image, rect, ctx.thumbnail_bound);
            if thumb.is_none() {
                log::debug!("Region {} ({}) has no visible area", region.index, region.name);
            }
            Row {
                section: Section::People,
                key: region.name_key(),
                thumbnail: thumb,
                value: region.name,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TagStore;

    fn store(entries: &[(String, &str)]) -> TagStore {
        entries
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect()
    }

    fn area<'a>(index: usize, x: &'a str, y: &'a str, w: &'a str, h: &'a str) -> Vec<(String, &'a str)> {
        [("x", x), ("y", y), ("w", w), ("h", h)]
            .into_iter()
            .map(|(field, value)| (region_key(index, &format!("mwg-rs:Area/stArea:{field}")), value))
            .collect()
    }

    // ── geometry ──

    #[test]
    fn clamps_top_left_corner() {
        let b = PercentBox { x: 5.0, y: 5.0, w: 20.0, h: 20.0 }.bounds();
        assert_eq!(b.left, 0.0);
        assert_eq!(b.top, 0.0);
        assert_eq!(b.right, 15.0);
        assert_eq!(b.bottom, 15.0);
    }

    #[test]
    fn clamps_bottom_right_corner() {
        let b = PercentBox { x: 95.0, y: 95.0, w: 20.0, h: 20.0 }.bounds();
        assert_eq!(b.left, 85.0);
        assert_eq!(b.top, 85.0);
        assert_eq!(b.right, 100.0);
        assert_eq!(b.bottom, 100.0);
    }

    #[test]
    fn full_image_maps_to_every_pixel() {
        let rect = to_pixels(PercentBox::FULL_IMAGE.bounds(), 640, 480);
        assert_eq!(rect, PixelRect { x1: 0, y1: 0, x2: 640, y2: 480 });
    }

    #[test]
    fn pixels_round_to_nearest() {
        let bounds = PercentBounds { left: 10.0, top: 0.0, right: 20.0, bottom: 50.0 };
        let rect = to_pixels(bounds, 15, 3);
        assert_eq!(rect, PixelRect { x1: 2, y1: 0, x2: 3, y2: 2 });
    }

    #[test]
    fn pixel_halves_round_to_even() {
        let bounds = PercentBounds { left: 25.0, top: 15.0, right: 75.0, bottom: 85.0 };
        let rect = to_pixels(bounds, 10, 10);
        assert_eq!(rect, PixelRect { x1: 2, y1: 2, x2: 8, y2: 8 });
    }

    #[test]
    fn fit_wide_and_tall() {
        assert_eq!(fit_within(200, 100, (40, 40)), (40, 20));
        assert_eq!(fit_within(100, 200, (40, 40)), (20, 40));
        assert_eq!(fit_within(50, 50, (40, 40)), (40, 40));
        assert_eq!(fit_within(10, 5, (40, 40)), (40, 20));
    }

    #[test]
    fn fit_keeps_one_pixel() {
        assert_eq!(fit_within(1000, 1, (40, 40)), (40, 1));
        assert_eq!(fit_within(1, 1000, (40, 40)), (1, 40));
    }

    // ── thumbnails ──

    #[test]
    fn zero_size_region_has_no_thumbnail() {
        let image = DynamicImage::new_rgb8(100, 100);
        let rect = PixelRect { x1: 10, y1: 10, x2: 10, y2: 50 };
        assert!(thumbnail(&image, rect, (40, 40)).is_none());
    }

    #[test]
    fn thumbnail_fits_bound() {
        let image = DynamicImage::new_rgb8(100, 50);
        let rect = PixelRect { x1: 0, y1: 0, x2: 80, y2: 40 };
        let thumb = thumbnail(&image, rect, (40, 40)).unwrap();
        assert_eq!(thumb.dimensions(), (40, 20));
    }

    // ── region list ──

    #[test]
    fn reads_until_first_missing_name() {
        let mut entries = vec![
            (region_key(1, "mwg-rs:Name"), "Alice"),
            (region_key(1, "mwg-rs:Type"), "Face"),
            (region_key(1, "mwg-rs:Area/stArea:unit"), "normalized"),
            (region_key(2, "mwg-rs:Name"), "Bob"),
            (region_key(4, "mwg-rs:Name"), "Unreachable"),
        ];
        entries.extend(area(1, "0.5", "0.25", "0.1", "0.2"));
        let regions = read_regions(&store(&entries));

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "Alice");
        assert_eq!(regions[0].kind.as_deref(), Some("Face"));
        assert_eq!(regions[0].unit.as_deref(), Some("normalized"));
        assert_eq!(regions[0].area, PercentBox { x: 50.0, y: 25.0, w: 10.0, h: 20.0 });
        assert_eq!(regions[1].name_key(), region_key(2, "mwg-rs:Name"));
        assert_eq!(regions[1].area, PercentBox::FULL_IMAGE);
    }

    #[test]
    fn bad_coordinate_uses_whole_image() {
        let mut entries = vec![(region_key(1, "mwg-rs:Name"), "Alice")];
        entries.extend(area(1, "0.5", "abc", "0.1", "0.1"));
        assert_eq!(read_regions(&store(&entries))[0].area, PercentBox::FULL_IMAGE);

        let mut entries = vec![(region_key(1, "mwg-rs:Name"), "Alice")];
        entries.extend(area(1, "0.5", "NaN", "0.1", "0.1"));
        assert_eq!(read_regions(&store(&entries))[0].area, PercentBox::FULL_IMAGE);
    }

    #[test]
    fn no_regions_without_first_name() {
        let entries = area(1, "0.5", "0.5", "0.1", "0.1");
        assert!(read_regions(&store(&entries)).is_empty());
    }

    #[test]
    fn rows_carry_name_and_thumbnail() {
        let mut entries = vec![
            (region_key(1, "mwg-rs:Name"), "Alice"),
            (region_key(2, "mwg-rs:Name"), "Empty"),
        ];
        entries.extend(area(1, "0.5", "0.5", "0.5", "0.5"));
        entries.extend(area(2, "0.5", "0.5", "0", "0.5"));
        let store = store(&entries);
        let image = DynamicImage::new_rgb8(200, 100);
        let ctx = RegionContext {
            store: &store,
            image: &image,
            thumbnail_bound: (40, 40),
        };

        let rows = named_region_rows(&ctx);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].section, Section::People);
        assert_eq!(rows[0].key, FIRST_REGION_NAME);
        assert_eq!(rows[0].value, "Alice");
        assert_eq!(rows[0].thumbnail.as_ref().map(|t| t.dimensions()), Some((40, 20)));
        assert_eq!(rows[1].value, "Empty");
        assert!(rows[1].thumbnail.is_none());
    }
}
