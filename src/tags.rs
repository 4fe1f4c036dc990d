//! The ordered tag dictionary driving the metadata view.

use crate::locale::Locale;
use crate::regions;
use crate::view::{RegionContext, Row};

use Section::*;

/// Display category of a row. Labels are translated at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Description,
    Date,
    Image,
    Camera,
    Gps,
    Advanced,
    People,
    Rights,
    Tagging,
}

impl Section {
    /// Untranslated label.
    pub fn msgid(self) -> &'static str {
        match self {
            Section::Description => "Description",
            Section::Date => "Date",
            Section::Image => "Image",
            Section::Camera => "Camera",
            Section::Gps => "GPS",
            Section::Advanced => "Advanced",
            Section::People => "People",
            Section::Rights => "Rights",
            Section::Tagging => "Tagging",
        }
    }

    pub fn label(self, locale: &dyn Locale) -> String {
        locale.translate(self.msgid()).into_owned()
    }
}

/// Formatter for a single displayed value, with its own call convention.
#[derive(Clone, Copy)]
pub enum ScalarFormatter {
    /// Receives the primary raw value only.
    Single(fn(&str, &dyn Locale) -> String),
    /// Receives the primary raw value and the secondary raw value, if present.
    WithReference(fn(&str, Option<&str>, &dyn Locale) -> String),
}

impl ScalarFormatter {
    pub fn apply(&self, primary: &str, secondary: Option<&str>, locale: &dyn Locale) -> String {
        match self {
            ScalarFormatter::Single(f) => f(primary, locale),
            ScalarFormatter::WithReference(f) => f(primary, secondary, locale),
        }
    }
}

/// Produces zero or more rows from a multi-valued tag such as a region list.
pub type RegionHandler = fn(&RegionContext<'_>) -> Vec<Row>;

/// How a present tag becomes display rows.
#[derive(Clone, Copy)]
pub enum Handler {
    /// The store's human-readable rendering.
    Interpreted,
    Scalar(ScalarFormatter),
    Regions(RegionHandler),
}

#[derive(Clone, Copy)]
pub struct TagDescriptor {
    pub section: Section,
    pub key: &'static str,
    pub secondary: Option<&'static str>,
    pub handler: Handler,
}

impl std::fmt::Debug for TagDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handler = match self.handler {
            Handler::Interpreted => "Interpreted",
            Handler::Scalar(_) => "Scalar",
            Handler::Regions(_) => "Regions",
        };
        f.debug_struct("TagDescriptor")
            .field("section", &self.section)
            .field("key", &self.key)
            .field("secondary", &self.secondary)
            .field("handler", &handler)
            .finish()
    }
}

const fn tag(section: Section, key: &'static str) -> TagDescriptor {
    TagDescriptor {
        section,
        key,
        secondary: None,
        handler: Handler::Interpreted,
    }
}

const fn tag_with(section: Section, key: &'static str, secondary: &'static str) -> TagDescriptor {
    TagDescriptor {
        section,
        key,
        secondary: Some(secondary),
        handler: Handler::Interpreted,
    }
}

const fn datetime(key: &'static str) -> TagDescriptor {
    TagDescriptor {
        section: Section::Date,
        key,
        secondary: None,
        handler: Handler::Scalar(ScalarFormatter::Single(crate::format::format_datetime)),
    }
}

const fn gps(key: &'static str, reference: &'static str) -> TagDescriptor {
    TagDescriptor {
        section: Section::Gps,
        key,
        secondary: Some(reference),
        handler: Handler::Scalar(ScalarFormatter::WithReference(crate::format::format_gps)),
    }
}

/// Recognized tags in display order.
pub static TAGS: &[TagDescriptor] = &[
    tag(Description, "Exif.Image.ImageDescription"),
    tag(Description, "Exif.Image.XPSubject"),
    tag(Description, "Exif.Image.XPComment"),
    tag(Description, "Exif.Image.Rating"),
    tag(Description, "Xmp.dc.title"),
    tag(Description, "Xmp.dc.description"),
    tag(Description, "Xmp.dc.subject"),
    tag(Description, "Xmp.acdsee.caption"),
    tag(Description, "Xmp.acdsee.notes"),
    tag(Description, "Iptc.Application2.Caption"),
    tag(Description, "Exif.Photo.UserComment"),
    datetime("Exif.Photo.DateTimeOriginal"),
    datetime("Exif.Photo.DateTimeDigitized"),
    datetime("Exif.Image.DateTime"),
    tag(Date, "Exif.Image.TimeZoneOffset"),
    TagDescriptor {
        section: People,
        key: regions::FIRST_REGION_NAME,
        secondary: None,
        handler: Handler::Regions(regions::named_region_rows),
    },
    tag(People, "Xmp.iptcExt.PersonInImage"),
    gps("Exif.GPSInfo.GPSLatitude", "Exif.GPSInfo.GPSLatitudeRef"),
    gps("Exif.GPSInfo.GPSLongitude", "Exif.GPSInfo.GPSLongitudeRef"),
    tag_with(Gps, "Exif.GPSInfo.GPSAltitude", "Exif.GPSInfo.GPSAltitudeRef"),
    tag(Gps, "Exif.GPSInfo.GPSTimeStamp"),
    tag(Gps, "Exif.GPSInfo.GPSSatellites"),
    tag(Tagging, "Exif.Image.XPKeywords"),
    tag(Tagging, "Iptc.Application2.Keywords"),
    tag(Tagging, "Xmp.mwg-kw.Hierarchy"),
    tag(Tagging, "Xmp.mwg-kw.Keywords"),
    tag(Tagging, "Xmp.digiKam.TagsList"),
    tag(Tagging, "Xmp.MicrosoftPhoto.LastKeywordXMP"),
    tag(Tagging, "Xmp.MicrosoftPhoto.LastKeywordIPTC"),
    tag(Tagging, "Xmp.lr.hierarchicalSubject"),
    tag(Tagging, "Xmp.acdsee.categories"),
    tag(Image, "Exif.Image.DocumentName"),
    tag(Image, "Exif.Photo.PixelXDimension"),
    tag(Image, "Exif.Photo.PixelYDimension"),
    tag_with(Image, "Exif.Image.XResolution", "Exif.Image.ResolutionUnit"),
    tag_with(Image, "Exif.Image.YResolution", "Exif.Image.ResolutionUnit"),
    tag(Image, "Exif.Image.Orientation"),
    tag(Image, "Exif.Photo.ColorSpace"),
    tag(Image, "Exif.Image.YCbCrPositioning"),
    tag(Image, "Exif.Photo.ComponentsConfiguration"),
    tag(Image, "Exif.Image.Compression"),
    tag(Image, "Exif.Photo.CompressedBitsPerPixel"),
    tag(Image, "Exif.Image.PhotometricInterpretation"),
    tag(Rights, "Exif.Image.Copyright"),
    tag(Rights, "Exif.Image.Artist"),
    tag(Camera, "Exif.Image.Make"),
    tag(Camera, "Exif.Image.Model"),
    tag(Camera, "Exif.Photo.FNumber"),
    tag(Camera, "Exif.Photo.ExposureTime"),
    tag(Camera, "Exif.Photo.ISOSpeedRatings"),
    tag(Camera, "Exif.Photo.FocalLength"),
    tag(Camera, "Exif.Photo.FocalLengthIn35mmFilm"),
    tag(Camera, "Exif.Photo.MaxApertureValue"),
    tag(Camera, "Exif.Photo.MeteringMode"),
    tag(Camera, "Exif.Photo.ExposureProgram"),
    tag(Camera, "Exif.Photo.ExposureBiasValue"),
    tag(Camera, "Exif.Photo.Flash"),
    tag(Camera, "Exif.Image.FlashEnergy"),
    tag(Camera, "Exif.Image.SelfTimerMode"),
    tag(Camera, "Exif.Image.SubjectDistance"),
    tag(Camera, "Exif.Photo.Contrast"),
    tag(Camera, "Exif.Photo.LightSource"),
    tag(Camera, "Exif.Photo.Saturation"),
    tag(Camera, "Exif.Photo.Sharpness"),
    tag(Camera, "Exif.Photo.WhiteBalance"),
    tag(Camera, "Exif.Photo.DigitalZoomRatio"),
    tag(Advanced, "Exif.Image.Software"),
    tag(Advanced, "Exif.Photo.ImageUniqueID"),
    tag(Advanced, "Exif.Image.CameraSerialNumber"),
    tag(Advanced, "Exif.Photo.ExifVersion"),
    tag(Advanced, "Exif.Photo.FlashpixVersion"),
    tag(Advanced, "Exif.Image.ExifTag"),
    tag(Advanced, "Exif.Image.GPSTag"),
    tag(Advanced, "Exif.Image.BatteryLevel"),
];
