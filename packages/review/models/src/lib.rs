#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row types for the cleaned review-platform exports.
//!
//! The pipeline starts from the cleaned CSV tables the archive
//! extraction produced (ratings, users, breweries). These are the serde
//! shapes those files deserialize into, the joined records derived from
//! them, and the [`MonthKey`] calendar bucket the monthly aggregations
//! run over. Ids are opaque strings; the two platforms disagree on
//! their shape and the pipeline only ever compares them for equality.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike as _, NaiveDate};
use serde::Deserialize;

/// A cleaned ratings row. `date` is the platform's native epoch-seconds
/// timestamp; extra columns in the export are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RatingRow {
    pub user_id: String,
    pub beer_id: String,
    pub brewery_id: String,
    pub date: i64,
}

/// A cleaned brewery row. One platform exports the id column as `id`,
/// the other as `brewery_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BreweryRow {
    #[serde(alias = "id")]
    pub brewery_id: String,
    #[serde(default)]
    pub name: String,
    pub location: String,
}

/// A cleaned user row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRow {
    pub user_id: String,
    pub location: String,
}

/// A brewery with the state segment split out of its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brewery {
    pub brewery_id: String,
    pub name: String,
    /// Raw location string, e.g. `"United States, Colorado"` or
    /// `"Canada, Ontario"`. Feeds the geocoding vocabulary as-is.
    pub location: String,
    /// Final location segment, e.g. `"Colorado"` or `"Ontario"`.
    pub state: String,
}

/// A US user with the state suffix split out of the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsUser {
    pub user_id: String,
    /// Raw location string, always a `"United States, <state>"` form.
    pub location: String,
    pub state: String,
}

/// One review joined to its reviewer's and brewery's states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateReview {
    pub reviewer_state: String,
    pub brewery_state: String,
    pub date: NaiveDate,
}

/// New breweries first reviewed in a month, with a running total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningCount {
    pub month: MonthKey,
    pub count: u64,
    pub cumulative: u64,
}

/// A calendar month. Orders chronologically and displays as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Creates a month key. `month` is 1-based.
    #[must_use]
    pub const fn new(year: i32, month: u32) -> Self {
        debug_assert!(month >= 1 && month <= 12);
        Self { year, month }
    }

    /// The calendar month a date falls in.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The following calendar month.
    #[must_use]
    pub const fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_once('-')
            .and_then(|(year, month)| {
                let year = year.parse::<i32>().ok()?;
                let month = month.parse::<u32>().ok()?;
                (1..=12).contains(&month).then_some(Self { year, month })
            })
            .ok_or_else(|| ParseMonthError {
                input: s.to_string(),
            })
    }
}

/// Error returned when a month string is not a valid `YYYY-MM` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError {
    pub input: String,
}

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid month {:?}: expected YYYY-MM", self.input)
    }
}

impl std::error::Error for ParseMonthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_key_displays_zero_padded() {
        assert_eq!(MonthKey::new(2004, 3).to_string(), "2004-03");
        assert_eq!(MonthKey::new(998, 11).to_string(), "0998-11");
    }

    #[test]
    fn month_key_parses_display_form() {
        let month: MonthKey = "2011-07".parse().unwrap();
        assert_eq!(month, MonthKey::new(2011, 7));
        assert_eq!(month.to_string().parse::<MonthKey>().unwrap(), month);
    }

    #[test]
    fn month_key_rejects_malformed_input() {
        assert!("2011".parse::<MonthKey>().is_err());
        assert!("2011-00".parse::<MonthKey>().is_err());
        assert!("2011-13".parse::<MonthKey>().is_err());
        assert!("july 2011".parse::<MonthKey>().is_err());
        assert!("".parse::<MonthKey>().is_err());
    }

    #[test]
    fn month_key_orders_chronologically() {
        assert!(MonthKey::new(2004, 12) < MonthKey::new(2005, 1));
        assert!(MonthKey::new(2005, 1) < MonthKey::new(2005, 2));
    }

    #[test]
    fn month_key_next_rolls_over_december() {
        assert_eq!(MonthKey::new(2004, 12).next(), MonthKey::new(2005, 1));
        assert_eq!(MonthKey::new(2004, 6).next(), MonthKey::new(2004, 7));
    }

    #[test]
    fn month_key_from_date() {
        let date = NaiveDate::from_ymd_opt(2009, 2, 28).unwrap();
        assert_eq!(MonthKey::from_date(date), MonthKey::new(2009, 2));
    }

    #[test]
    fn parse_month_error_mentions_the_input() {
        let error = "nope".parse::<MonthKey>().unwrap_err();
        assert!(error.to_string().contains("nope"));
    }
}
