use nom_exif::*;
use std::io::Cursor;

/// Tag codes read from the IFD chain, keyed the way exiv2 names them.
///
/// GPS latitude/longitude (codes 0x0001-0x0004) are not listed here: those
/// codes are shared with the interoperability IFD, so they come from
/// nom-exif's GPS parser instead.
const EXIF_KEYS: &[(u16, &str)] = &[
    // IFD0
    (0x0100, "Exif.Image.ImageWidth"),
    (0x0101, "Exif.Image.ImageLength"),
    (0x0103, "Exif.Image.Compression"),
    (0x0106, "Exif.Image.PhotometricInterpretation"),
    (0x010d, "Exif.Image.DocumentName"),
    (0x010e, "Exif.Image.ImageDescription"),
    (0x010f, "Exif.Image.Make"),
    (0x0110, "Exif.Image.Model"),
    (0x0112, "Exif.Image.Orientation"),
    (0x011a, "Exif.Image.XResolution"),
    (0x011b, "Exif.Image.YResolution"),
    (0x0128, "Exif.Image.ResolutionUnit"),
    (0x0131, "Exif.Image.Software"),
    (0x0132, "Exif.Image.DateTime"),
    (0x013b, "Exif.Image.Artist"),
    (0x0213, "Exif.Image.YCbCrPositioning"),
    (0x4746, "Exif.Image.Rating"),
    (0x828f, "Exif.Image.BatteryLevel"),
    (0x8298, "Exif.Image.Copyright"),
    (0x8769, "Exif.Image.ExifTag"),
    (0x8825, "Exif.Image.GPSTag"),
    (0x882a, "Exif.Image.TimeZoneOffset"),
    (0x882b, "Exif.Image.SelfTimerMode"),
    (0x920b, "Exif.Image.FlashEnergy"),
    // TIFF/EP and the Exif IFD share this code
    (0x9206, "Exif.Image.SubjectDistance"),
    (0x9c9b, "Exif.Image.XPTitle"),
    (0x9c9c, "Exif.Image.XPComment"),
    (0x9c9d, "Exif.Image.XPAuthor"),
    (0x9c9e, "Exif.Image.XPKeywords"),
    (0x9c9f, "Exif.Image.XPSubject"),
    (0xc62f, "Exif.Image.CameraSerialNumber"),
    // Exif IFD
    (0x829a, "Exif.Photo.ExposureTime"),
    (0x829d, "Exif.Photo.FNumber"),
    (0x8822, "Exif.Photo.ExposureProgram"),
    (0x8827, "Exif.Photo.ISOSpeedRatings"),
    (0x8830, "Exif.Photo.SensitivityType"),
    (0x9000, "Exif.Photo.ExifVersion"),
    (0x9003, "Exif.Photo.DateTimeOriginal"),
    (0x9004, "Exif.Photo.DateTimeDigitized"),
    (0x9010, "Exif.Photo.OffsetTime"),
    (0x9011, "Exif.Photo.OffsetTimeOriginal"),
    (0x9101, "Exif.Photo.ComponentsConfiguration"),
    (0x9102, "Exif.Photo.CompressedBitsPerPixel"),
    (0x9201, "Exif.Photo.ShutterSpeedValue"),
    (0x9202, "Exif.Photo.ApertureValue"),
    (0x9204, "Exif.Photo.ExposureBiasValue"),
    (0x9205, "Exif.Photo.MaxApertureValue"),
    (0x9207, "Exif.Photo.MeteringMode"),
    (0x9208, "Exif.Photo.LightSource"),
    (0x9209, "Exif.Photo.Flash"),
    (0x920a, "Exif.Photo.FocalLength"),
    (0x9286, "Exif.Photo.UserComment"),
    (0xa000, "Exif.Photo.FlashpixVersion"),
    (0xa001, "Exif.Photo.ColorSpace"),
    (0xa002, "Exif.Photo.PixelXDimension"),
    (0xa003, "Exif.Photo.PixelYDimension"),
    (0xa402, "Exif.Photo.ExposureMode"),
    (0xa403, "Exif.Photo.WhiteBalance"),
    (0xa404, "Exif.Photo.DigitalZoomRatio"),
    (0xa405, "Exif.Photo.FocalLengthIn35mmFilm"),
    (0xa406, "Exif.Photo.SceneCaptureType"),
    (0xa408, "Exif.Photo.Contrast"),
    (0xa409, "Exif.Photo.Saturation"),
    (0xa40a, "Exif.Photo.Sharpness"),
    (0xa420, "Exif.Photo.ImageUniqueID"),
    (0xa431, "Exif.Photo.BodySerialNumber"),
    (0xa433, "Exif.Photo.LensMake"),
    (0xa434, "Exif.Photo.LensModel"),
    // GPS IFD
    (0x0000, "Exif.GPSInfo.GPSVersionID"),
    (0x0005, "Exif.GPSInfo.GPSAltitudeRef"),
    (0x0006, "Exif.GPSInfo.GPSAltitude"),
    (0x0007, "Exif.GPSInfo.GPSTimeStamp"),
    (0x0008, "Exif.GPSInfo.GPSSatellites"),
    (0x0009, "Exif.GPSInfo.GPSStatus"),
    (0x000c, "Exif.GPSInfo.GPSSpeedRef"),
    (0x000d, "Exif.GPSInfo.GPSSpeed"),
    (0x0012, "Exif.GPSInfo.GPSMapDatum"),
    (0x001d, "Exif.GPSInfo.GPSDateStamp"),
];

/// Look up the dotted key for a raw tag code.
pub(crate) fn key_for_code(code: u16) -> Option<&'static str> {
    EXIF_KEYS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, key)| *key)
}

/// Read EXIF entries from an in-memory image as `(key, raw)` pairs.
///
/// Images without EXIF (or in a container nom-exif does not handle) yield
/// an empty list.
pub(crate) fn read_exif(bytes: &[u8]) -> Vec<(String, String)> {
    let mut parser = MediaParser::new();
    let ms = match MediaSource::seekable(Cursor::new(bytes)) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("No EXIF container: {e}");
            return Vec::new();
        }
    };

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found");
            return Vec::new();
        }
    };

    // Parse GPS info before walking the entries (consumes the iterator)
    let gps_info = iter.parse_gps_info().ok().flatten();

    let mut entries: Vec<(String, String)> = Vec::new();
    for entry in iter {
        // IFD1 and its sub-IFDs describe the embedded thumbnail
        if entry.ifd_index() != 0 {
            continue;
        }
        let Some(key) = key_for_code(entry.tag_code()) else {
            continue;
        };
        if entries.iter().any(|(k, _)| k == key) {
            continue;
        }
        if let Some(value) = entry.get_value() {
            entries.push((key.to_string(), entry_to_raw(value)));
        }
    }

    if let Some(gps) = gps_info {
        entries.push((
            "Exif.GPSInfo.GPSLatitudeRef".into(),
            gps.latitude_ref.to_string(),
        ));
        entries.push(("Exif.GPSInfo.GPSLatitude".into(), latlng_to_raw(&gps.latitude)));
        entries.push((
            "Exif.GPSInfo.GPSLongitudeRef".into(),
            gps.longitude_ref.to_string(),
        ));
        entries.push((
            "Exif.GPSInfo.GPSLongitude".into(),
            latlng_to_raw(&gps.longitude),
        ));
    }

    log::debug!("Read {} EXIF entries", entries.len());
    entries
}

/// Render an entry the way exiv2 prints raw values: rationals as `n/d`,
/// arrays space-separated, datetimes in EXIF `YYYY:MM:DD HH:MM:SS` form.
fn entry_to_raw(val: &EntryValue) -> String {
    match val {
        EntryValue::Text(s) => s.trim_end_matches('\0').trim().to_string(),
        EntryValue::URational(r) => format!("{}/{}", r.0, r.1),
        EntryValue::IRational(r) => format!("{}/{}", r.0, r.1),
        EntryValue::URationalArray(rs) => join(rs.iter().map(|r| format!("{}/{}", r.0, r.1))),
        EntryValue::IRationalArray(rs) => join(rs.iter().map(|r| format!("{}/{}", r.0, r.1))),
        EntryValue::Time(t) => t.format("%Y:%m:%d %H:%M:%S").to_string(),
        EntryValue::NaiveDateTime(t) => t.format("%Y:%m:%d %H:%M:%S").to_string(),
        EntryValue::Undefined(bytes) | EntryValue::U8Array(bytes) => {
            join(bytes.iter().map(u8::to_string))
        }
        EntryValue::U16Array(vals) => join(vals.iter().map(u16::to_string)),
        EntryValue::U32Array(vals) => join(vals.iter().map(u32::to_string)),
        other => other.to_string(),
    }
}

fn latlng_to_raw(latlng: &LatLng) -> String {
    [&latlng.0, &latlng.1, &latlng.2]
        .iter()
        .map(|r| format!("{}/{}", r.0, r.1))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join(parts: impl Iterator<Item = String>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}
