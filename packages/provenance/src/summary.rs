//! Local / national / foreign decomposition of provenance matrices.

use strum_macros::{Display, EnumString};

use crate::ProvenanceError;
use crate::matrix::StateMatrix;
use crate::monthly::MonthlyMatrix;

/// One state's (or month's) review provenance decomposition.
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceRow {
    /// State name, or `YYYY-MM` for series summaries.
    pub label: String,
    /// Reviews of breweries in the reviewer's own state.
    pub local_count: f64,
    /// Reviews of breweries in another recognized state.
    pub national_count: f64,
    /// Reviews of breweries outside the recognized set.
    pub foreign_count: f64,
}

/// Sortable metrics over a [`ProvenanceRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Same-state reviews.
    LocalCount,
    /// Different-state, in-set reviews.
    NationalCount,
    /// Out-of-set reviews.
    ForeignCount,
}

impl Metric {
    /// The metric's value in a row.
    #[must_use]
    pub const fn value(self, row: &ProvenanceRow) -> f64 {
        match self {
            Self::LocalCount => row.local_count,
            Self::NationalCount => row.national_count,
            Self::ForeignCount => row.foreign_count,
        }
    }
}

/// Decomposes a snapshot matrix into one row per state: `local` is the
/// diagonal, `foreign` the `World` column, `national` the rest of the
/// row. With `as_ratio`, each row divides by its total; zero-total
/// rows stay zero.
///
/// # Errors
///
/// Returns [`ProvenanceError::MissingWorldColumn`] if the matrix was
/// built without the `World` column.
pub fn summarize(
    matrix: &StateMatrix,
    as_ratio: bool,
) -> Result<Vec<ProvenanceRow>, ProvenanceError> {
    if !matrix.has_world() {
        return Err(ProvenanceError::MissingWorldColumn);
    }
    let mut rows = Vec::with_capacity(matrix.states().len());
    for state in matrix.states() {
        let (local, national, foreign) = decompose(matrix, state);
        rows.push(normalized(state.clone(), local, national, foreign, as_ratio));
    }
    Ok(rows)
}

/// Collapses a monthly series into one row per month, the three
/// buckets summed across every reviewer state.
///
/// # Errors
///
/// Returns [`ProvenanceError::MissingWorldColumn`] if any matrix in
/// the series lacks the `World` column.
pub fn summarize_series(
    months: &[MonthlyMatrix],
    as_ratio: bool,
) -> Result<Vec<ProvenanceRow>, ProvenanceError> {
    let mut rows = Vec::with_capacity(months.len());
    for entry in months {
        if !entry.matrix.has_world() {
            return Err(ProvenanceError::MissingWorldColumn);
        }
        let mut local = 0.0;
        let mut national = 0.0;
        let mut foreign = 0.0;
        for state in entry.matrix.states() {
            let (state_local, state_national, state_foreign) = decompose(&entry.matrix, state);
            local += state_local;
            national += state_national;
            foreign += state_foreign;
        }
        rows.push(normalized(
            entry.month.to_string(),
            local,
            national,
            foreign,
            as_ratio,
        ));
    }
    Ok(rows)
}

fn decompose(matrix: &StateMatrix, state: &str) -> (f64, f64, f64) {
    let local = matrix.diagonal(state).unwrap_or(0.0);
    let foreign = matrix.world_value(state).unwrap_or(0.0);
    let total = matrix.row_sum(state).unwrap_or(0.0);
    (local, total - foreign - local, foreign)
}

fn normalized(
    label: String,
    local: f64,
    national: f64,
    foreign: f64,
    as_ratio: bool,
) -> ProvenanceRow {
    let total = local + national + foreign;
    if as_ratio && total > 0.0 {
        ProvenanceRow {
            label,
            local_count: local / total,
            national_count: national / total,
            foreign_count: foreign / total,
        }
    } else {
        ProvenanceRow {
            label,
            local_count: local,
            national_count: national,
            foreign_count: foreign,
        }
    }
}

/// Top-k rows by a metric. The sort is stable, so ties keep their
/// incoming order; `top_k` larger than the input returns everything.
#[must_use]
pub fn rank(
    rows: &[ProvenanceRow],
    metric: Metric,
    top_k: usize,
    ascending: bool,
) -> Vec<ProvenanceRow> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| {
        let ordering = metric.value(a).total_cmp(&metric.value(b));
        if ascending { ordering } else { ordering.reverse() }
    });
    ranked.truncate(top_k);
    ranked
}

/// Reorders both axes of a matrix by each state's diagonal value,
/// descending unless `ascending`. The sort is stable; a `World`
/// column, when present, stays attached to each row.
#[must_use]
pub fn sort_by_diagonal(matrix: &StateMatrix, ascending: bool) -> StateMatrix {
    let diagonal: Vec<f64> = matrix
        .states()
        .iter()
        .map(|state| matrix.diagonal(state).unwrap_or(0.0))
        .collect();

    let mut order: Vec<usize> = (0..matrix.states().len()).collect();
    order.sort_by(|&a, &b| {
        let ordering = diagonal[a].total_cmp(&diagonal[b]);
        if ascending { ordering } else { ordering.reverse() }
    });

    let states: Vec<String> = order
        .iter()
        .map(|&i| matrix.states()[i].clone())
        .collect();
    let rows: Vec<Vec<f64>> = order
        .iter()
        .map(|&row| {
            let reviewer = &matrix.states()[row];
            let mut values: Vec<f64> = order
                .iter()
                .map(|&col| {
                    matrix
                        .get(reviewer, &matrix.states()[col])
                        .unwrap_or(0.0)
                })
                .collect();
            if matrix.has_world() {
                values.push(matrix.world_value(reviewer).unwrap_or(0.0));
            }
            values
        })
        .collect();

    StateMatrix::from_parts(states, matrix.has_world(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeSet;
    use std::str::FromStr as _;

    use brew_map_review_models::{MonthKey, StateReview};
    use chrono::NaiveDate;

    use crate::matrix::adjacency;
    use crate::monthly::monthly;

    fn review(reviewer_state: &str, brewery_state: &str, year: i32, month: u32) -> StateReview {
        StateReview {
            reviewer_state: reviewer_state.to_string(),
            brewery_state: brewery_state.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, 10).unwrap(),
        }
    }

    fn two_states() -> BTreeSet<String> {
        ["California", "New York"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn sample_reviews() -> Vec<StateReview> {
        vec![
            review("California", "California", 2010, 1),
            review("California", "California", 2010, 1),
            review("California", "New York", 2010, 2),
            review("California", "France", 2010, 2),
            review("New York", "New York", 2010, 3),
        ]
    }

    #[test]
    fn decomposition_splits_the_three_buckets() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, true);
        let rows = summarize(&matrix, false).unwrap();

        let california = &rows[0];
        assert_eq!(california.label, "California");
        assert_eq!(california.local_count, 2.0);
        assert_eq!(california.national_count, 1.0);
        assert_eq!(california.foreign_count, 1.0);

        let new_york = &rows[1];
        assert_eq!(new_york.local_count, 1.0);
        assert_eq!(new_york.national_count, 0.0);
        assert_eq!(new_york.foreign_count, 0.0);
    }

    #[test]
    fn buckets_always_total_the_row_sum() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, true);
        let rows = summarize(&matrix, false).unwrap();

        for row in &rows {
            let total = row.local_count + row.national_count + row.foreign_count;
            assert_eq!(Some(total), matrix.row_sum(&row.label));
        }
    }

    #[test]
    fn missing_world_column_is_an_error() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, false);
        assert!(matches!(
            summarize(&matrix, false),
            Err(ProvenanceError::MissingWorldColumn)
        ));
    }

    #[test]
    fn ratio_rows_divide_by_their_total() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, true);
        let rows = summarize(&matrix, true).unwrap();

        let california = &rows[0];
        assert!((california.local_count - 0.5).abs() < 1e-12);
        assert!((california.national_count - 0.25).abs() < 1e-12);
        assert!((california.foreign_count - 0.25).abs() < 1e-12);
    }

    #[test]
    fn ratio_keeps_zero_rows_at_zero() {
        let matrix = adjacency(&[], &two_states(), false, true);
        let rows = summarize(&matrix, true).unwrap();
        for row in &rows {
            assert_eq!(row.local_count, 0.0);
            assert!(!row.local_count.is_nan());
        }
    }

    #[test]
    fn series_summary_collapses_each_month() {
        let series = monthly(&sample_reviews(), &two_states(), None, None, false);
        let rows = summarize_series(&series, false).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].label, "2010-01");
        assert_eq!(rows[0].local_count, 2.0);
        assert_eq!(rows[1].national_count, 1.0);
        assert_eq!(rows[1].foreign_count, 1.0);
        assert_eq!(rows[2].local_count, 1.0);
    }

    #[test]
    fn rank_orders_by_the_requested_metric() {
        let rows = vec![
            ProvenanceRow {
                label: "California".to_string(),
                local_count: 5.0,
                national_count: 1.0,
                foreign_count: 0.0,
            },
            ProvenanceRow {
                label: "New York".to_string(),
                local_count: 9.0,
                national_count: 0.0,
                foreign_count: 2.0,
            },
        ];

        let top = rank(&rows, Metric::LocalCount, 1, false);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].label, "New York");

        let bottom = rank(&rows, Metric::LocalCount, 1, true);
        assert_eq!(bottom[0].label, "California");

        let by_foreign = rank(&rows, Metric::ForeignCount, 2, false);
        assert_eq!(by_foreign[0].label, "New York");
    }

    #[test]
    fn rank_is_stable_on_ties() {
        let rows = vec![
            ProvenanceRow {
                label: "first".to_string(),
                local_count: 3.0,
                national_count: 0.0,
                foreign_count: 0.0,
            },
            ProvenanceRow {
                label: "second".to_string(),
                local_count: 3.0,
                national_count: 0.0,
                foreign_count: 0.0,
            },
        ];
        let ranked = rank(&rows, Metric::LocalCount, 2, false);
        assert_eq!(ranked[0].label, "first");
        assert_eq!(ranked[1].label, "second");
    }

    #[test]
    fn rank_with_oversized_top_k_returns_everything() {
        let rows = vec![ProvenanceRow {
            label: "only".to_string(),
            local_count: 1.0,
            national_count: 0.0,
            foreign_count: 0.0,
        }];
        assert_eq!(rank(&rows, Metric::LocalCount, 10, false).len(), 1);
    }

    #[test]
    fn metric_parses_its_display_form() {
        assert_eq!(Metric::from_str("local_count").unwrap(), Metric::LocalCount);
        assert_eq!(
            Metric::from_str("foreign_count").unwrap(),
            Metric::ForeignCount
        );
        assert_eq!(Metric::LocalCount.to_string(), "local_count");
        assert!(Metric::from_str("bogus").is_err());
    }

    #[test]
    fn sort_by_diagonal_reorders_both_axes() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, true);
        let sorted = sort_by_diagonal(&matrix, false);

        // California has diagonal 2, New York 1.
        assert_eq!(sorted.states(), &["California", "New York"]);

        let ascending = sort_by_diagonal(&matrix, true);
        assert_eq!(ascending.states(), &["New York", "California"]);
        // Cell values travel with their labels.
        assert_eq!(
            ascending.get("California", "New York"),
            matrix.get("California", "New York")
        );
        assert_eq!(
            ascending.world_value("California"),
            matrix.world_value("California")
        );
    }

    #[test]
    fn sort_by_diagonal_without_world_keeps_the_shape() {
        let matrix = adjacency(&sample_reviews(), &two_states(), false, false);
        let sorted = sort_by_diagonal(&matrix, false);
        assert!(!sorted.has_world());
        assert_eq!(sorted.width(), 2);
    }

    #[test]
    fn month_labels_round_trip_through_the_row_label() {
        let series = monthly(&sample_reviews(), &two_states(), None, None, false);
        let rows = summarize_series(&series, false).unwrap();
        for (entry, row) in series.iter().zip(&rows) {
            assert_eq!(MonthKey::from_str(&row.label).unwrap(), entry.month);
        }
    }
}
