use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::{Captures, Regex};

/// Front-matter date layout.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Layouts carrying a numeric UTC offset.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M %z",
    "%a %b %e %H:%M:%S %z %Y",
    "%a, %d %b %Y %H:%M %z",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
    "%b %d, %Y %H:%M",
    "%A, %B %d, %Y %I:%M %p",
    "%d %b %Y, %H:%M",
    "%d %B %Y, %H:%M",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M",
    "%a %b %e %H:%M:%S %Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
    "%a, %b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
];

static AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+at\s+").expect("static regex"));
static MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d)\s*([ap])\.?m\.?(\s|$)").expect("static regex"));
static NUMERIC_OFFSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s[+-]\d{2}:?\d{2}\b").expect("static regex"));
static OFFSET_THEN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s[+-]\d{2}:?\d{2})\s+[A-Z]{2,5}\b").expect("static regex")
});
static ZONE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(UTC|GMT|EST|EDT|CST|CDT|MST|MDT|PST|PDT)\b").expect("static regex")
});

/// Parses a publish date the way it is printed on archive pages.
///
/// Offsets and North American zone names are normalized to UTC; dates
/// without a time are taken at midnight.
pub fn parse_publish_date(raw: &str) -> Option<NaiveDateTime> {
    let text = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(&text) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    let text = normalize(&text);
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&text, format) {
            return Some(dt.with_timezone(&Utc).naive_utc());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&text, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&text, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Drops "at", spells am/pm as " AM"/" PM" and turns zone names into numeric
/// offsets. A zone name next to a numeric offset ("+0100 CET") is removed.
fn normalize(text: &str) -> String {
    let text = AT.replace_all(text, " ");
    let text = OFFSET_THEN_NAME.replace_all(&text, "$1");
    let text = MERIDIEM.replace_all(&text, |caps: &Captures| {
        format!("{} {}M{}", &caps[1], caps[2].to_uppercase(), &caps[3])
    });
    let has_offset = NUMERIC_OFFSET.is_match(&text);
    let text = ZONE_NAME.replace_all(&text, |caps: &Captures| {
        if has_offset {
            String::new()
        } else {
            zone_offset(&caps[1]).to_string()
        }
    });
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn zone_offset(name: &str) -> &'static str {
    match name {
        "EDT" => "-0400",
        "EST" | "CDT" => "-0500",
        "CST" | "MDT" => "-0600",
        "MST" | "PDT" => "-0700",
        "PST" => "-0800",
        _ => "+0000",
    }
}

/// Formats a publish date for front matter, falling back to the Unix epoch
/// when the text cannot be parsed.
pub fn format_publish_date(raw: &str) -> String {
    parse_publish_date(raw)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
        .format(DATE_FORMAT)
        .to_string()
}
