//! Locale-dependent rendering: translated labels, calendar dates and
//! degree/minute/second coordinates.

use chrono::{Datelike, NaiveDate};
use std::borrow::Cow;

use crate::config::{Config, DateStyle};

pub const INVALID_FORMAT: &str = "Invalid format";

/// Rendering hooks used by the formatters and the view.
///
/// Section labels and placeholders are passed through [`Locale::translate`]
/// when a row is rendered, so a locale can be swapped without rebuilding
/// the tag table.
pub trait Locale {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(msgid)
    }

    fn display_date(&self, date: NaiveDate) -> String;

    fn display_time(&self, hour: u32, minute: u32, second: u32) -> String {
        format!("{hour:02}:{minute:02}:{second:02}")
    }

    /// Render a latitude in decimal degrees, `None` if out of range.
    fn latitude(&self, degrees: f64) -> Option<String>;

    /// Render a longitude in decimal degrees, `None` if out of range.
    fn longitude(&self, degrees: f64) -> Option<String>;

    fn invalid_format(&self) -> Cow<'_, str> {
        self.translate(INVALID_FORMAT)
    }
}

/// English locale driven by [`DisplayConfig`](crate::config::DisplayConfig).
#[derive(Debug, Clone, Default)]
pub struct DefaultLocale {
    pub date_style: DateStyle,
    pub invalid_format: Option<String>,
}

impl DefaultLocale {
    pub fn from_config(config: &Config) -> Self {
        Self {
            date_style: config.display.date_style,
            invalid_format: config.display.invalid_format.clone(),
        }
    }
}

impl Locale for DefaultLocale {
    fn translate<'a>(&'a self, msgid: &'a str) -> Cow<'a, str> {
        match (&self.invalid_format, msgid) {
            (Some(text), INVALID_FORMAT) => Cow::Borrowed(text.as_str()),
            _ => Cow::Borrowed(msgid),
        }
    }

    fn display_date(&self, date: NaiveDate) -> String {
        match self.date_style {
            DateStyle::Iso => date.format("%Y-%m-%d").to_string(),
            DateStyle::DayMonthYear => date.format("%d/%m/%Y").to_string(),
            DateStyle::MonthDayYear => date.format("%m/%d/%Y").to_string(),
            DateStyle::Long => format!("{} {}", date.day(), date.format("%B %Y")),
        }
    }

    fn latitude(&self, degrees: f64) -> Option<String> {
        if !degrees.is_finite() || degrees.abs() > 90.0 {
            return None;
        }
        Some(dms(degrees, if degrees < 0.0 { 'S' } else { 'N' }))
    }

    fn longitude(&self, degrees: f64) -> Option<String> {
        if !degrees.is_finite() || degrees.abs() > 180.0 {
            return None;
        }
        Some(dms(degrees, if degrees < 0.0 { 'W' } else { 'E' }))
    }
}

/// `51°30'26.00"N` style rendering, rounded to hundredths of a second.
fn dms(degrees: f64, hemisphere: char) -> String {
    let hundredths = (degrees.abs() * 360_000.0).round() as u64;
    let deg = hundredths / 360_000;
    let min = (hundredths / 6_000) % 60;
    let sec = (hundredths / 100) % 60;
    let frac = hundredths % 100;
    format!("{deg}°{min:02}'{sec:02}.{frac:02}\"{hemisphere}")
}
