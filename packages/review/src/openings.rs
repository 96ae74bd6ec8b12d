//! Brewery opening dates approximated by first review.
//!
//! The platforms do not record founding dates; the earliest review a
//! brewery received is a workable proxy for when it came onto the
//! radar. Counting first reviews per calendar month gives the
//! new-breweries series and its running total.

use std::collections::BTreeMap;

use brew_map_review_models::{MonthKey, OpeningCount, RatingRow};
use chrono::DateTime;

/// Earliest review month per brewery, across every rating (not just
/// the merged US stream). Ratings with unrepresentable timestamps are
/// ignored.
#[must_use]
pub fn first_review_month(ratings: &[RatingRow]) -> BTreeMap<String, MonthKey> {
    let mut first: BTreeMap<String, MonthKey> = BTreeMap::new();
    for rating in ratings {
        let Some(timestamp) = DateTime::from_timestamp(rating.date, 0) else {
            continue;
        };
        let month = MonthKey::from_date(timestamp.date_naive());
        first
            .entry(rating.brewery_id.clone())
            .and_modify(|existing| {
                if month < *existing {
                    *existing = month;
                }
            })
            .or_insert(month);
    }
    first
}

/// New breweries per month over the observed range, with a running
/// total. Months with no first reviews appear with a zero count, so
/// the series is contiguous; no first reviews at all yields an empty
/// series.
#[must_use]
pub fn monthly_new_breweries(first_months: &BTreeMap<String, MonthKey>) -> Vec<OpeningCount> {
    let mut counts: BTreeMap<MonthKey, u64> = BTreeMap::new();
    for month in first_months.values() {
        *counts.entry(*month).or_insert(0) += 1;
    }

    let (Some(&first), Some(&last)) = (counts.keys().next(), counts.keys().last()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut cumulative = 0;
    let mut month = first;
    loop {
        let count = counts.get(&month).copied().unwrap_or(0);
        cumulative += count;
        series.push(OpeningCount {
            month,
            count,
            cumulative,
        });
        if month == last {
            break;
        }
        month = month.next();
    }
    series
}
