//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::i18n::Locale;

/// Parse a CMS timestamp
///
/// Accepts RFC 3339, the `+0000` offset form Prismic emits, and timestamps
/// without an offset, which are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })
                .map(|naive| naive.and_utc().fixed_offset())
        })
}

/// Format a date with a Moment.js-style pattern and a fixed locale
///
/// Supported tokens: `YYYY YY MMMM MMM MM M DD D HH mm ss`. Text inside
/// `[...]` is copied literally.
///
/// # Examples
/// ```ignore
/// format_date(&date, "D MMM YYYY", Locale::PtBr) // -> "15 mar 2022"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str, locale: Locale) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '[' {
            let literal_end = chars[i + 1..].iter().position(|&ch| ch == ']');
            if let Some(len) = literal_end {
                out.extend(&chars[i + 1..i + 1 + len]);
                i += len + 2;
                continue;
            }
        }

        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        match (c, run) {
            ('Y', 4) => out.push_str(&format!("{:04}", date.year())),
            ('Y', 2) => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
            ('M', 4) => out.push_str(locale.month_name(date.month())),
            ('M', 3) => out.push_str(locale.month_abbr(date.month())),
            ('M', 2) => out.push_str(&format!("{:02}", date.month())),
            ('M', 1) => out.push_str(&date.month().to_string()),
            ('D', 2) => out.push_str(&format!("{:02}", date.day())),
            ('D', 1) => out.push_str(&date.day().to_string()),
            ('H', 2) => out.push_str(&format!("{:02}", date.hour())),
            ('m', 2) => out.push_str(&format!("{:02}", date.minute())),
            ('s', 2) => out.push_str(&format!("{:02}", date.second())),
            _ => out.extend(std::iter::repeat(c).take(run)),
        }
        i += run;
    }

    out
}

/// Day, abbreviated month and year, e.g. `15 mar 2022` in pt-BR
///
/// Uses the offset the timestamp carries; no conversion to local time.
pub fn format_publication_date<Tz: TimeZone>(date: &DateTime<Tz>, locale: Locale) -> String {
    format_date(date, locale.medium_date_pattern(), locale)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}
