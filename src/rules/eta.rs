use crate::domain::model::CellValue;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y", "%d %B %Y", "%B %d, %Y",
    "%d-%b-%y", "%Y%m%d", "%d.%m.%Y",
];

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})$").expect("valid numeric date pattern")
});
static TRAILING_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)[ T]+\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?\s*(AM|PM|am|pm)?$").expect("valid time pattern")
});

pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

/// Date part of an ETA cell; `None` for blanks and anything unparseable.
pub fn parse_eta(cell: &CellValue, day_first: bool) -> Option<NaiveDate> {
    match cell {
        CellValue::Empty | CellValue::Bool(_) => None,
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Number(n) if *n >= 1.0 => excel_serial_to_datetime(*n).map(|dt| dt.date()),
        CellValue::Number(_) => None,
        CellValue::Text(s) => parse_eta_text(s, day_first),
    }
}

pub fn parse_eta_text(text: &str, day_first: bool) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    if let Some(date) = parse_date_only(text, day_first) {
        return Some(date);
    }

    TRAILING_TIME
        .captures(text)
        .and_then(|caps| parse_date_only(caps[1].trim(), day_first))
}

fn parse_date_only(text: &str, day_first: bool) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    let caps = NUMERIC_DATE.captures(text)?;
    let a: u32 = caps[1].parse().ok()?;
    let b: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;

    let (first, second) = if day_first { ((b, a), (a, b)) } else { ((a, b), (b, a)) };
    NaiveDate::from_ymd_opt(year, first.0, first.1)
        .or_else(|| NaiveDate::from_ymd_opt(year, second.0, second.1))
}

/// `YYYY-MM-DD` when the cell parses, the raw text otherwise.
pub fn format_eta(cell: &CellValue, day_first: bool) -> String {
    if cell.is_empty() {
        return String::new();
    }
    match parse_eta(cell, day_first) {
        Some(date) => format_date(date),
        None => cell.display().trim().to_string(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}
