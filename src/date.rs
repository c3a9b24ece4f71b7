//! Publication date normalization.
//!
//! The two corpora write dates in different layouts. [`parse_date`] tries, in
//! order:
//!
//! 1. `01/01/2020` (day/month/year)
//! 2. `2020-01-01` (year-month-day)
//! 3. `1 January 2020` (day, full month name, year)
//!
//! Day always comes before month in the numeric layout. Abbreviated month
//! names and short years are not accepted.
//!
//! # Example
//!
//! ```
//! use drug_mentions::{PublicationDate, parse_date};
//!
//! assert_eq!(parse_date("25 May 2020").to_string(), "2020-05-25");
//! assert_eq!(parse_date("1 Jan 2020"), PublicationDate::Unparsed("1 Jan 2020".to_string()));
//! assert_eq!(parse_date("01/01/20"), PublicationDate::Unparsed("01/01/20".to_string()));
//! ```

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

const DAY_FIRST_FORMAT: &str = "%d/%m/%Y";
const YEAR_FIRST_FORMAT: &str = "%Y-%m-%d";
const LONG_FORMAT: &str = "%d %B %Y";

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

/// Rendering used for dates that matched no known layout.
pub const UNKNOWN_DATE: &str = "unknown";

/// A publication date, or the raw text when it could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PublicationDate {
    Parsed(NaiveDate),
    Unparsed(String),
}

impl PublicationDate {
    /// The calendar date, if one was recognized.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            PublicationDate::Parsed(date) => Some(*date),
            PublicationDate::Unparsed(_) => None,
        }
    }

    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, PublicationDate::Parsed(_))
    }
}

/// `YYYY-MM-DD`, or `unknown` for unparsed dates.
impl fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicationDate::Parsed(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            PublicationDate::Unparsed(_) => f.write_str(UNKNOWN_DATE),
        }
    }
}

impl Serialize for PublicationDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parses a date written in one of the supported layouts.
///
/// Surrounding whitespace is ignored. The whole string must match a layout;
/// anything else comes back as [`PublicationDate::Unparsed`] holding the
/// original text.
#[must_use]
pub fn parse_date(text: &str) -> PublicationDate {
    let trimmed = text.trim();

    parse_numeric_date(trimmed)
        .or_else(|| parse_long_date(trimmed))
        .map_or_else(
            || PublicationDate::Unparsed(text.to_string()),
            PublicationDate::Parsed,
        )
}

/// `%Y` takes one to four digits; only a four-digit year is a full date.
fn is_full_year(year: &str) -> bool {
    year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
}

/// Day-first layout, then year-first.
fn parse_numeric_date(text: &str) -> Option<NaiveDate> {
    let day_first = text
        .rsplit_once('/')
        .map(|(_, year)| (year, DAY_FIRST_FORMAT));
    let year_first = text
        .split_once('-')
        .map(|(year, _)| (year, YEAR_FIRST_FORMAT));

    [day_first, year_first]
        .into_iter()
        .flatten()
        .filter(|(year, _)| is_full_year(year))
        .find_map(|(_, format)| NaiveDate::parse_from_str(text, format).ok())
}

/// `%B` also accepts abbreviations, so the month token is checked first.
fn parse_long_date(text: &str) -> Option<NaiveDate> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [_, month, year] = tokens.as_slice() else {
        return None;
    };
    if !MONTH_NAMES.contains(&month.to_lowercase().as_str()) || !is_full_year(year) {
        return None;
    }
    NaiveDate::parse_from_str(&tokens.join(" "), LONG_FORMAT).ok()
}
