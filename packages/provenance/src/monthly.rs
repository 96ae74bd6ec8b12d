//! Monthly partitions of the adjacency matrix.

use std::collections::{BTreeMap, BTreeSet};

use brew_map_review_models::{MonthKey, StateReview};

use crate::matrix::{StateMatrix, adjacency};

/// One calendar month's adjacency matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMatrix {
    /// The month this matrix covers (or runs up to, when cumulative).
    pub month: MonthKey,
    /// Counts matrix, `World` column always present.
    pub matrix: StateMatrix,
}

/// Partitions a review stream into calendar months and builds one
/// counts matrix per month (`World` always included, never ratios).
///
/// With an explicit `start`/`end` the series covers exactly that
/// window, inclusive, reviews outside it clipped; otherwise it covers
/// the observed month range. Either way the series is contiguous:
/// months with no reviews appear as all-zero matrices. With
/// `cumulative`, each month's matrix is the cell-wise running total up
/// to and including that month.
///
/// No reviews inside the window (and no explicit bound to anchor it)
/// yields an empty series.
#[must_use]
pub fn monthly(
    reviews: &[StateReview],
    states: &BTreeSet<String>,
    start: Option<MonthKey>,
    end: Option<MonthKey>,
    cumulative: bool,
) -> Vec<MonthlyMatrix> {
    let mut buckets: BTreeMap<MonthKey, Vec<&StateReview>> = BTreeMap::new();
    for review in reviews {
        let month = MonthKey::from_date(review.date);
        if start.is_some_and(|s| month < s) || end.is_some_and(|e| month > e) {
            continue;
        }
        buckets.entry(month).or_default().push(review);
    }

    let first = start.or_else(|| buckets.keys().next().copied());
    let last = end.or_else(|| buckets.keys().last().copied());
    let (Some(first), Some(last)) = (first, last) else {
        return Vec::new();
    };
    if first > last {
        return Vec::new();
    }

    let mut series = Vec::new();
    let mut running: Option<StateMatrix> = None;
    let mut month = first;
    loop {
        let mut matrix = match buckets.get(&month) {
            Some(bucket) => adjacency(bucket.iter().copied(), states, false, true),
            None => adjacency([], states, false, true),
        };
        if cumulative {
            if let Some(previous) = running.take() {
                matrix.accumulate(&previous);
            }
            running = Some(matrix.clone());
        }
        series.push(MonthlyMatrix { month, matrix });

        if month == last {
            break;
        }
        month = month.next();
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;

    fn review(reviewer_state: &str, brewery_state: &str, year: i32, month: u32) -> StateReview {
        StateReview {
            reviewer_state: reviewer_state.to_string(),
            brewery_state: brewery_state.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, 15).unwrap(),
        }
    }

    fn two_states() -> BTreeSet<String> {
        ["California", "New York"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn observed_range_is_contiguous() {
        let reviews = vec![
            review("California", "California", 2010, 1),
            review("California", "New York", 2010, 3),
        ];

        let series = monthly(&reviews, &two_states(), None, None, false);

        let months: Vec<String> = series.iter().map(|entry| entry.month.to_string()).collect();
        assert_eq!(months, vec!["2010-01", "2010-02", "2010-03"]);
        // The empty middle month is an all-zero matrix, not a hole.
        assert_eq!(series[1].matrix.row_sum("California"), Some(0.0));
        assert_eq!(series[0].matrix.diagonal("California"), Some(1.0));
        assert_eq!(series[2].matrix.get("California", "New York"), Some(1.0));
    }

    #[test]
    fn explicit_window_is_honored_and_clips() {
        let reviews = vec![
            review("California", "California", 2009, 12),
            review("California", "California", 2010, 2),
            review("California", "California", 2010, 5),
        ];

        let series = monthly(
            &reviews,
            &two_states(),
            Some(MonthKey::new(2010, 1)),
            Some(MonthKey::new(2010, 3)),
            false,
        );

        let months: Vec<String> = series.iter().map(|entry| entry.month.to_string()).collect();
        assert_eq!(months, vec!["2010-01", "2010-02", "2010-03"]);
        // Reviews outside the window never land in any bucket.
        let total: f64 = series
            .iter()
            .filter_map(|entry| entry.matrix.row_sum("California"))
            .sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_window_with_no_reviews_is_all_zero() {
        let series = monthly(
            &[],
            &two_states(),
            Some(MonthKey::new(2010, 1)),
            Some(MonthKey::new(2010, 2)),
            false,
        );
        assert_eq!(series.len(), 2);
        assert!(
            series
                .iter()
                .all(|entry| entry.matrix.row_sum("California") == Some(0.0))
        );
    }

    #[test]
    fn no_reviews_and_no_window_is_empty() {
        assert!(monthly(&[], &two_states(), None, None, false).is_empty());
    }

    #[test]
    fn inverted_window_is_empty() {
        let reviews = vec![review("California", "California", 2010, 2)];
        let series = monthly(
            &reviews,
            &two_states(),
            Some(MonthKey::new(2011, 1)),
            Some(MonthKey::new(2010, 1)),
            false,
        );
        assert!(series.is_empty());
    }

    #[test]
    fn matrices_always_carry_world() {
        let reviews = vec![review("California", "France", 2010, 1)];
        let series = monthly(&reviews, &two_states(), None, None, false);
        assert!(series[0].matrix.has_world());
        assert_eq!(series[0].matrix.world_value("California"), Some(1.0));
    }

    #[test]
    fn cumulative_is_a_running_cell_wise_total() {
        let reviews = vec![
            review("California", "California", 2010, 1),
            review("California", "New York", 2010, 2),
            review("California", "California", 2010, 3),
        ];

        let series = monthly(&reviews, &two_states(), None, None, true);

        assert_eq!(series[0].matrix.diagonal("California"), Some(1.0));
        assert_eq!(series[1].matrix.diagonal("California"), Some(1.0));
        assert_eq!(series[1].matrix.get("California", "New York"), Some(1.0));
        assert_eq!(series[2].matrix.diagonal("California"), Some(2.0));
        assert_eq!(series[2].matrix.get("California", "New York"), Some(1.0));
    }

    #[test]
    fn final_cumulative_month_matches_the_snapshot() {
        let reviews = vec![
            review("California", "California", 2010, 1),
            review("California", "France", 2010, 2),
            review("New York", "California", 2010, 4),
        ];

        let series = monthly(&reviews, &two_states(), None, None, true);
        let snapshot = adjacency(&reviews, &two_states(), false, true);

        assert_eq!(series.last().unwrap().matrix, snapshot);
    }
}
