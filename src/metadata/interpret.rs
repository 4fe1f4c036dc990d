//! Human-readable rendering of raw tag values and display labels.

/// Render a raw value for display, the way exiv2's interpreted strings read.
///
/// Tags without a known interpretation are returned unchanged.
pub fn interpret(key: &str, raw: &str) -> String {
    let name = key.rsplit('.').next().unwrap_or(key);
    let rendered = match key.split('.').next() {
        Some("Exif") => interpret_exif(name, raw),
        _ => None,
    };
    rendered.unwrap_or_else(|| raw.to_string())
}

fn interpret_exif(name: &str, raw: &str) -> Option<String> {
    match name {
        "Orientation" => lookup(raw, ORIENTATION),
        "ResolutionUnit" => lookup(raw, &[(1, "none"), (2, "inch"), (3, "cm")]),
        "YCbCrPositioning" => lookup(raw, &[(1, "Centered"), (2, "Co-sited")]),
        "Compression" => lookup(raw, COMPRESSION),
        "PhotometricInterpretation" => lookup(raw, PHOTOMETRIC),
        "ExposureProgram" => lookup(raw, EXPOSURE_PROGRAM),
        "MeteringMode" => lookup(raw, METERING_MODE),
        "LightSource" => lookup(raw, LIGHT_SOURCE),
        "ColorSpace" => lookup(raw, &[(1, "sRGB"), (2, "Adobe RGB"), (65535, "Uncalibrated")]),
        "Contrast" | "Sharpness" => lookup(raw, &[(0, "Normal"), (1, "Soft"), (2, "Hard")]),
        "Saturation" => lookup(raw, &[(0, "Normal"), (1, "Low"), (2, "High")]),
        "WhiteBalance" => lookup(raw, &[(0, "Auto"), (1, "Manual")]),
        "ExposureMode" => lookup(raw, &[(0, "Auto"), (1, "Manual"), (2, "Auto bracket")]),
        "SceneCaptureType" => lookup(
            raw,
            &[(0, "Standard"), (1, "Landscape"), (2, "Portrait"), (3, "Night scene")],
        ),
        "GPSAltitudeRef" => lookup(raw, &[(0, "Above sea level"), (1, "Below sea level")]),
        "Flash" => raw.trim().parse::<u16>().ok().map(flash),
        "FNumber" | "ApertureValue" | "MaxApertureValue" => {
            let value = rational(raw)?;
            let f = if name == "FNumber" {
                value
            } else {
                2f64.powf(value / 2.0)
            };
            Some(format!("F{}", trim_float(f, 1)))
        }
        "ExposureTime" => exposure_time(raw),
        "FocalLength" => Some(format!("{} mm", trim_float(rational(raw)?, 1))),
        "FocalLengthIn35mmFilm" => Some(format!("{} mm", raw.trim())),
        "ExposureBiasValue" => {
            let value = rational(raw)?;
            let sign = if value > 0.0 { "+" } else { "" };
            Some(format!("{sign}{} EV", trim_float(value, 2)))
        }
        "XResolution" | "YResolution" | "CompressedBitsPerPixel" | "DigitalZoomRatio" => {
            Some(trim_float(rational(raw)?, 2))
        }
        "GPSAltitude" => Some(format!("{} m", trim_float(rational(raw)?, 1))),
        "GPSTimeStamp" => {
            let parts: Vec<f64> = raw.split(' ').map(rational).collect::<Option<_>>()?;
            match parts.as_slice() {
                [h, m, s] => Some(format!("{:02}:{:02}:{:02}", *h as u32, *m as u32, *s as u32)),
                _ => None,
            }
        }
        "ExifVersion" | "FlashpixVersion" => version(raw),
        "ComponentsConfiguration" => components(raw),
        "XPTitle" | "XPComment" | "XPAuthor" | "XPKeywords" | "XPSubject" => utf16le(raw),
        "UserComment" => Some(user_comment(raw)),
        _ => None,
    }
}

const ORIENTATION: &[(u32, &str)] = &[
    (1, "top, left"),
    (2, "top, right"),
    (3, "bottom, right"),
    (4, "bottom, left"),
    (5, "left, top"),
    (6, "right, top"),
    (7, "right, bottom"),
    (8, "left, bottom"),
];

const COMPRESSION: &[(u32, &str)] = &[
    (1, "Uncompressed"),
    (5, "LZW"),
    (6, "JPEG (old-style)"),
    (7, "JPEG"),
    (8, "Adobe Deflate"),
    (32773, "PackBits"),
];

const PHOTOMETRIC: &[(u32, &str)] = &[
    (0, "White Is Zero"),
    (1, "Black Is Zero"),
    (2, "RGB"),
    (3, "RGB Palette"),
    (5, "CMYK"),
    (6, "YCbCr"),
];

const EXPOSURE_PROGRAM: &[(u32, &str)] = &[
    (0, "Not defined"),
    (1, "Manual"),
    (2, "Auto"),
    (3, "Aperture priority"),
    (4, "Shutter priority"),
    (5, "Creative program"),
    (6, "Action program"),
    (7, "Portrait mode"),
    (8, "Landscape mode"),
];

const METERING_MODE: &[(u32, &str)] = &[
    (0, "Unknown"),
    (1, "Average"),
    (2, "Center weighted average"),
    (3, "Spot"),
    (4, "Multi-spot"),
    (5, "Multi-segment"),
    (6, "Partial"),
    (255, "Other"),
];

const LIGHT_SOURCE: &[(u32, &str)] = &[
    (0, "Unknown"),
    (1, "Daylight"),
    (2, "Fluorescent"),
    (3, "Tungsten (incandescent light)"),
    (4, "Flash"),
    (9, "Fine weather"),
    (10, "Cloudy weather"),
    (11, "Shade"),
    (17, "Standard light A"),
    (18, "Standard light B"),
    (19, "Standard light C"),
    (21, "D65"),
    (255, "Other light source"),
];

fn lookup(raw: &str, table: &[(u32, &str)]) -> Option<String> {
    let code: u32 = raw.trim().parse().ok()?;
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, text)| text.to_string())
        .or_else(|| Some(format!("({code})")))
}

fn flash(value: u16) -> String {
    if value & 0x1 == 0 {
        return if value & 0x20 != 0 {
            "No flash function".to_string()
        } else {
            "No flash".to_string()
        };
    }
    let mut parts = vec!["Fired"];
    match (value >> 3) & 0x3 {
        1 => parts.push("compulsory"),
        3 => parts.push("auto mode"),
        _ => {}
    }
    match (value >> 1) & 0x3 {
        2 => parts.push("no return light"),
        3 => parts.push("return light detected"),
        _ => {}
    }
    if value & 0x40 != 0 {
        parts.push("red-eye reduction");
    }
    parts.join(", ")
}

/// `num/den` as a float; a plain number is accepted too.
fn rational(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => raw.parse().ok(),
    }
}

fn exposure_time(raw: &str) -> Option<String> {
    let value = rational(raw)?;
    if value <= 0.0 {
        return None;
    }
    if value < 1.0 {
        Some(format!("1/{} s", (1.0 / value).round() as u64))
    } else {
        Some(format!("{} s", trim_float(value, 1)))
    }
}

/// Format with at most `decimals` places, dropping trailing zeros.
fn trim_float(value: f64, decimals: usize) -> String {
    let s = format!("{value:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

fn bytes(raw: &str) -> Option<Vec<u8>> {
    raw.split_whitespace().map(|b| b.parse().ok()).collect()
}

/// `48 50 51 49` → `2.31`
fn version(raw: &str) -> Option<String> {
    let digits: String = bytes(raw)?.into_iter().map(char::from).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let major = digits[..2].trim_start_matches('0');
    let major = if major.is_empty() { "0" } else { major };
    let minor = digits[2..].trim_end_matches('0');
    let minor = if minor.is_empty() { "0" } else { minor };
    Some(format!("{major}.{minor}"))
}

/// `1 2 3 0` → `YCbCr`
fn components(raw: &str) -> Option<String> {
    let names: String = bytes(raw)?
        .into_iter()
        .filter_map(|c| match c {
            1 => Some("Y"),
            2 => Some("Cb"),
            3 => Some("Cr"),
            4 => Some("R"),
            5 => Some("G"),
            6 => Some("B"),
            _ => None,
        })
        .collect();
    Some(names)
}

/// XP* tags hold NUL-terminated UTF-16LE text in a byte array.
fn utf16le(raw: &str) -> Option<String> {
    let bytes = bytes(raw)?;
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|unit| *unit != 0)
        .collect();
    Some(String::from_utf16_lossy(&units))
}

/// Strip the 8-byte character-code header from a UserComment.
fn user_comment(raw: &str) -> String {
    let Some(data) = bytes(raw) else {
        return raw.to_string();
    };
    let (header, body) = data.split_at(data.len().min(8));
    let text = match header {
        b"UNICODE\0" => {
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => String::from_utf8_lossy(body).into_owned(),
    };
    text.trim_end_matches(['\0', ' ']).to_string()
}

/// Display label: the last key component split on case boundaries.
///
/// `Exif.Photo.DateTimeOriginal` → `Date Time Original`,
/// `Xmp.mwg-rs.Regions/mwg-rs:RegionList[1]/mwg-rs:Name` → `Name`.
pub fn label(key: &str) -> String {
    let last = key.rsplit(['.', '/']).next().unwrap_or(key);
    let last = last.rsplit(':').next().unwrap_or(last);

    let chars: Vec<char> = last.chars().collect();
    let mut out = String::with_capacity(last.len() + 4);
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && c.is_uppercase() {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower) {
                out.push(' ');
            }
        }
        out.push(*c);
    }
    if let Some(first) = out.get(..1) {
        out = first.to_uppercase() + &out[1..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── interpret ────────────────────────────────────────────────────

    #[test]
    fn enumerations() {
        assert_eq!(interpret("Exif.Image.Orientation", "6"), "right, top");
        assert_eq!(interpret("Exif.Photo.MeteringMode", "5"), "Multi-segment");
        assert_eq!(interpret("Exif.Image.ResolutionUnit", "2"), "inch");
        assert_eq!(interpret("Exif.GPSInfo.GPSAltitudeRef", "1"), "Below sea level");
        assert_eq!(interpret("Exif.Photo.ColorSpace", "65535"), "Uncalibrated");
    }

    #[test]
    fn unknown_enumeration_code() {
        assert_eq!(interpret("Exif.Image.Orientation", "42"), "(42)");
    }

    #[test]
    fn unparseable_values_pass_through() {
        assert_eq!(interpret("Exif.Image.Orientation", "sideways"), "sideways");
        assert_eq!(interpret("Exif.Photo.FNumber", "f/2.8"), "f/2.8");
    }

    #[test]
    fn rationals() {
        assert_eq!(interpret("Exif.Photo.FNumber", "28/10"), "F2.8");
        assert_eq!(interpret("Exif.Photo.ExposureTime", "1/60"), "1/60 s");
        assert_eq!(interpret("Exif.Photo.ExposureTime", "10/1000"), "1/100 s");
        assert_eq!(interpret("Exif.Photo.ExposureTime", "2/1"), "2 s");
        assert_eq!(interpret("Exif.Photo.FocalLength", "867/100"), "8.7 mm");
        assert_eq!(interpret("Exif.Photo.ExposureBiasValue", "-2/3"), "-0.67 EV");
        assert_eq!(interpret("Exif.Photo.ExposureBiasValue", "0/1"), "0 EV");
        assert_eq!(interpret("Exif.Image.XResolution", "72/1"), "72");
        assert_eq!(interpret("Exif.GPSInfo.GPSAltitude", "15959/10"), "1595.9 m");
        assert_eq!(interpret("Exif.Photo.MaxApertureValue", "2/1"), "F2");
    }

    #[test]
    fn flash_bits() {
        assert_eq!(interpret("Exif.Photo.Flash", "16"), "No flash");
        assert_eq!(interpret("Exif.Photo.Flash", "32"), "No flash function");
        assert_eq!(interpret("Exif.Photo.Flash", "9"), "Fired, compulsory");
        assert_eq!(
            interpret("Exif.Photo.Flash", "95"),
            "Fired, auto mode, return light detected, red-eye reduction"
        );
    }

    #[test]
    fn gps_time_stamp() {
        assert_eq!(interpret("Exif.GPSInfo.GPSTimeStamp", "8/1 5/1 3/1"), "08:05:03");
    }

    #[test]
    fn byte_encoded_tags() {
        assert_eq!(interpret("Exif.Photo.ExifVersion", "48 50 51 49"), "2.31");
        assert_eq!(interpret("Exif.Photo.FlashpixVersion", "48 49 48 48"), "1.0");
        assert_eq!(interpret("Exif.Photo.ComponentsConfiguration", "1 2 3 0"), "YCbCr");
        assert_eq!(interpret("Exif.Image.XPKeywords", "104 0 105 0 0 0"), "hi");
        assert_eq!(
            interpret("Exif.Photo.UserComment", "65 83 67 73 73 0 0 0 72 105 32"),
            "Hi"
        );
    }

    #[test]
    fn text_user_comment_is_unchanged() {
        assert_eq!(interpret("Exif.Photo.UserComment", "plain words"), "plain words");
    }

    #[test]
    fn non_exif_keys_pass_through() {
        assert_eq!(interpret("Xmp.dc.title", "6"), "6");
        assert_eq!(interpret("Iptc.Application2.Caption", "x"), "x");
    }

    // ── label ────────────────────────────────────────────────────────

    #[test]
    fn labels() {
        assert_eq!(label("Exif.Photo.DateTimeOriginal"), "Date Time Original");
        assert_eq!(label("Exif.Image.Make"), "Make");
        assert_eq!(label("Exif.Photo.ISOSpeedRatings"), "ISO Speed Ratings");
        assert_eq!(label("Exif.Photo.FocalLengthIn35mmFilm"), "Focal Length In35mm Film");
        assert_eq!(label("Xmp.dc.title"), "Title");
        assert_eq!(
            label("Xmp.mwg-rs.Regions/mwg-rs:RegionList[1]/mwg-rs:Name"),
            "Name"
        );
        assert_eq!(label("Exif.GPSInfo.GPSLatitude"), "GPS Latitude");
    }
}
