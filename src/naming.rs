//! Folder-name convention parser.
//!
//! Album folders may carry a date prefix followed by an underscore-separated
//! title. Three forms are recognized, most specific first:
//!
//! ```text
//! 2020-03-15_Summer_Trip   → 2020-03-15, "Summer Trip"
//! 2020-03_Spring           → 2020-03,    "Spring"
//! 2020_Year                → 2020,       "Year"
//! NoDatePrefix             → no date,    "NoDatePrefix"
//! ```
//!
//! ## Partial dates
//!
//! A missing day or month is taken as `0` and normalized with calendar
//! arithmetic: day 0 is the last day of the previous month and month 0 is
//! December of the previous year. `2020-03_Spring` therefore resolves to
//! 2020-02-29 and `2020_Year` to 2019-11-30 (both at UTC midnight), which
//! keeps a month- or year-only folder ordered before every fully dated
//! folder of the same period.

use chrono::{Duration, Months, NaiveDate};

/// Result of parsing a folder name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFolderName {
    /// Date from the prefix, if the name had one.
    pub date: Option<NaiveDate>,
    /// Display title: the part after the date with `_` turned into spaces,
    /// or the untouched name when there is no date prefix.
    pub title: String,
}

impl ParsedFolderName {
    /// The parsed date as epoch milliseconds at UTC midnight.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc().timestamp_millis())
    }
}

/// Parse a bare folder name following the `YYYY[-MM[-DD]]_title` convention.
pub fn parse_folder_name(name: &str) -> ParsedFolderName {
    let matched = match_year_month_day(name)
        .or_else(|| match_year_month(name))
        .or_else(|| match_year(name));

    if let Some((year, month, day, title)) = matched
        && let Some(date) = calendar_date(year, month, day)
    {
        return ParsedFolderName {
            date: Some(date),
            title: title.replace('_', " "),
        };
    }

    ParsedFolderName {
        date: None,
        title: name.to_string(),
    }
}

type DateMatch<'a> = (i32, u32, u32, &'a str);

fn match_year_month_day(name: &str) -> Option<DateMatch<'_>> {
    let (year, rest) = take_digits(name, 4)?;
    let (month, rest) = take_digits(rest.strip_prefix('-')?, 2)?;
    let (day, rest) = take_digits(rest.strip_prefix('-')?, 2)?;
    let title = rest.strip_prefix('_')?;
    Some((year as i32, month, day, title))
}

fn match_year_month(name: &str) -> Option<DateMatch<'_>> {
    let (year, rest) = take_digits(name, 4)?;
    let (month, rest) = take_digits(rest.strip_prefix('-')?, 2)?;
    let title = rest.strip_prefix('_')?;
    Some((year as i32, month, 0, title))
}

fn match_year(name: &str) -> Option<DateMatch<'_>> {
    let (year, rest) = take_digits(name, 4)?;
    let title = rest.strip_prefix('_')?;
    Some((year as i32, 0, 0, title))
}

/// Split exactly `n` leading ASCII digits off `s`.
fn take_digits(s: &str, n: usize) -> Option<(u32, &str)> {
    let head = s.get(..n)?;
    if !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((head.parse().ok()?, &s[n..]))
}

/// Build a date the way calendar normalization does, so out-of-range
/// months and days roll over instead of failing.
fn calendar_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let january = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let first_of_month = if month == 0 {
        january.checked_sub_months(Months::new(1))?
    } else {
        january.checked_add_months(Months::new(month - 1))?
    };
    first_of_month.checked_add_signed(Duration::days(i64::from(day) - 1))
}
