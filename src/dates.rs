//! Permissive calendar-date recognition for free-form cells.
//!
//! Values such as `05/01/2024`, `2024-01-05 00:00:00`, `5th Jan 2024`,
//! `Trip on 05-01-24 (night)` or `January 5, 2024` all resolve to a date.
//! Eight-digit `YYYYMMDD` runs are accepted for years 1900 through 2099.
//! Numeric day/month pairs are read day-first; when that is not a valid date
//! the pair is read month-first instead. Text around the date is ignored.
//! Any other bare number is never a date.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn iso_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\D)(\d{4})[-/.](\d{1,2})[-/.](\d{1,2})(?:\D|$)").expect("valid regex")
    })
}

fn compact_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\D)((?:19|20)\d{2})(\d{2})(\d{2})(?:\D|$)").expect("valid regex")
    })
}

fn numeric_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\D)(\d{1,2})[-/.](\d{1,2})[-/.](\d{4}|\d{2})(?:\D|$)")
            .expect("valid regex")
    })
}

fn day_month_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[^a-z0-9])(\d{1,2})(?:st|nd|rd|th)?[\s\-/.,]*([a-z]{3,9})\.?[\s\-/.,]*(\d{4}|\d{2})(?:\D|$)",
        )
        .expect("valid regex")
    })
}

fn month_name_day_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[^a-z])([a-z]{3,9})\.?[\s\-/.]*(\d{1,2})(?:st|nd|rd|th)?,?[\s\-/.]*(\d{4})(?:\D|$)",
        )
        .expect("valid regex")
    })
}

/// Finds the first recognizable calendar date inside `value`.
pub fn parse_fuzzy_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    first_match(iso_pattern(), value, |caps| {
        ymd(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)
    })
    .or_else(|| {
        first_match(numeric_pattern(), value, |caps| {
            day_first(number(caps, 1)?, number(caps, 2)?, &caps[3])
        })
    })
    .or_else(|| {
        first_match(compact_pattern(), value, |caps| {
            ymd(number(caps, 1)?, number(caps, 2)?, number(caps, 3)?)
        })
    })
    .or_else(|| {
        first_match(day_month_name_pattern(), value, |caps| {
            let month = month_from_name(&caps[2])?;
            ymd(expand_year(&caps[3])?, month, number(caps, 1)?)
        })
    })
    .or_else(|| {
        first_match(month_name_day_pattern(), value, |caps| {
            let month = month_from_name(&caps[1])?;
            ymd(number(caps, 3)?, month, number(caps, 2)?)
        })
    })
}

fn first_match<F>(pattern: &Regex, value: &str, build: F) -> Option<NaiveDate>
where
    F: Fn(&Captures<'_>) -> Option<NaiveDate>,
{
    pattern.captures_iter(value).find_map(|caps| build(&caps))
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn day_first(first: u32, second: u32, year: &str) -> Option<NaiveDate> {
    let year = expand_year(year)?;
    ymd(year, second, first).or_else(|| ymd(year, first, second))
}

/// Two-digit years pivot the same way chrono's `%y` does: 00-68 map to the
/// 2000s and 69-99 to the 1900s.
fn expand_year(raw: &str) -> Option<u32> {
    let parsed: u32 = raw.parse().ok()?;
    match raw.len() {
        2 if parsed <= 68 => Some(2000 + parsed),
        2 => Some(1900 + parsed),
        4 => Some(parsed),
        _ => None,
    }
}

fn month_from_name(word: &str) -> Option<u32> {
    let lowered = word.to_ascii_lowercase();
    if lowered.len() < 3 {
        return None;
    }
    if lowered == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(&lowered))
        .map(|idx| idx as u32 + 1)
}
