//! Scalar formatters turning raw tag strings into display strings.

use chrono::{NaiveDateTime, Timelike};

use crate::locale::Locale;

const EXIF_DATETIME: &str = "%Y:%m:%d %H:%M:%S";

/// Render an EXIF `YYYY:MM:DD HH:MM:SS` timestamp as `"<date> <time>"`.
pub fn format_datetime(raw: &str, locale: &dyn Locale) -> String {
    let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, EXIF_DATETIME) else {
        return locale.invalid_format().into_owned();
    };
    let date = locale.display_date(timestamp.date());
    let time = locale.display_time(timestamp.hour(), timestamp.minute(), timestamp.second());
    format!("{date} {time}")
}

/// Render raw `deg/1 min/1 sec/100` rationals with an `N`/`S`/`E`/`W`
/// reference as a signed coordinate.
pub fn format_gps(raw_dms: &str, reference: Option<&str>, locale: &dyn Locale) -> String {
    let rendered = dms_to_degrees(raw_dms).and_then(|magnitude| match reference {
        Some("N") => locale.latitude(magnitude),
        Some("S") => locale.latitude(-magnitude),
        Some("E") => locale.longitude(magnitude),
        Some("W") => locale.longitude(-magnitude),
        _ => None,
    });
    rendered.unwrap_or_else(|| locale.invalid_format().into_owned())
}

/// Sum space-separated `num/den` terms, each divided by successive powers of 60.
pub fn dms_to_degrees(raw: &str) -> Option<f64> {
    let mut value = 0.0;
    let mut divisor = 1.0;
    for term in raw.split(' ') {
        value += parse_rational(term)? / divisor;
        divisor *= 60.0;
    }
    Some(value)
}

fn parse_rational(term: &str) -> Option<f64> {
    let mut parts = term.split('/');
    let num: f64 = parts.next()?.trim().parse().ok()?;
    let den: f64 = parts.next()?.trim().parse().ok()?;
    if den == 0.0 {
        return None;
    }
    Some(num / den)
}
