//! The state adjacency matrix.

use std::collections::BTreeSet;

use brew_map_review_models::StateReview;

/// Column label for brewery locations outside the recognized set.
pub const WORLD: &str = "World";

/// A square count (or ratio) table over a fixed state set.
///
/// Rows are reviewer states and columns are brewery states, sharing
/// one label order (sorted when built by [`adjacency`], reordered by
/// `sort_by_diagonal`); an optional trailing `World` column holds
/// everything outside the set.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMatrix {
    states: Vec<String>,
    world: bool,
    rows: Vec<Vec<f64>>,
}

impl StateMatrix {
    pub(crate) fn from_parts(states: Vec<String>, world: bool, rows: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(rows.len(), states.len());
        debug_assert!(
            rows.iter()
                .all(|row| row.len() == states.len() + usize::from(world))
        );
        Self {
            states,
            world,
            rows,
        }
    }

    /// Adds every cell of `other` into this matrix. Both matrices must
    /// share labels and shape.
    pub(crate) fn accumulate(&mut self, other: &Self) {
        debug_assert_eq!(self.states, other.states);
        debug_assert_eq!(self.world, other.world);
        for (row, other_row) in self.rows.iter_mut().zip(&other.rows) {
            for (cell, other_cell) in row.iter_mut().zip(other_row) {
                *cell += *other_cell;
            }
        }
    }

    /// Row/column state labels, `World` excluded.
    #[must_use]
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Whether the trailing `World` column is present.
    #[must_use]
    pub const fn has_world(&self) -> bool {
        self.world
    }

    /// Number of columns (states plus `World` when present).
    #[must_use]
    pub fn width(&self) -> usize {
        self.states.len() + usize::from(self.world)
    }

    /// Value at (reviewer state, brewery state); `None` if either
    /// label is unknown.
    #[must_use]
    pub fn get(&self, reviewer: &str, brewery: &str) -> Option<f64> {
        let row = self.index_of(reviewer)?;
        let col = self.index_of(brewery)?;
        Some(self.rows[row][col])
    }

    /// The diagonal (same-state) value for a state.
    #[must_use]
    pub fn diagonal(&self, state: &str) -> Option<f64> {
        self.get(state, state)
    }

    /// The `World` value for a reviewer state; `None` without the
    /// column or for an unknown state.
    #[must_use]
    pub fn world_value(&self, reviewer: &str) -> Option<f64> {
        if !self.world {
            return None;
        }
        let row = self.index_of(reviewer)?;
        self.rows[row].last().copied()
    }

    /// Sum across a reviewer state's row, `World` included.
    #[must_use]
    pub fn row_sum(&self, reviewer: &str) -> Option<f64> {
        let row = self.index_of(reviewer)?;
        Some(self.rows[row].iter().sum())
    }

    /// Raw row values for a reviewer state, columns in [`Self::states`]
    /// order with `World` last when present.
    #[must_use]
    pub fn row(&self, reviewer: &str) -> Option<&[f64]> {
        let row = self.index_of(reviewer)?;
        Some(&self.rows[row])
    }

    // Labels are a handful of state names; a linear scan beats keeping
    // a second index structure in sync with reorderings.
    fn index_of(&self, state: &str) -> Option<usize> {
        self.states.iter().position(|s| s == state)
    }
}

/// Builds the adjacency matrix for a review stream.
///
/// Reviews are tallied by (reviewer state, brewery state) over the
/// sorted `states` set, absent combinations zero-filled. Reviews whose
/// reviewer state is outside the set are dropped. With
/// `include_world`, reviews of breweries outside the set accumulate
/// into a trailing `World` column; without it they are dropped too.
/// With `as_ratio`, each row is divided by its row sum; all-zero rows
/// stay zero rather than turning into NaN.
#[must_use]
pub fn adjacency<'a, I>(
    reviews: I,
    states: &BTreeSet<String>,
    as_ratio: bool,
    include_world: bool,
) -> StateMatrix
where
    I: IntoIterator<Item = &'a StateReview>,
{
    let labels: Vec<String> = states.iter().cloned().collect();
    let width = labels.len() + usize::from(include_world);
    let mut rows = vec![vec![0.0; width]; labels.len()];

    for review in reviews {
        let Ok(row) = labels.binary_search_by(|s| s.as_str().cmp(&review.reviewer_state)) else {
            continue;
        };
        let col = match labels.binary_search_by(|s| s.as_str().cmp(&review.brewery_state)) {
            Ok(col) => col,
            Err(_) if include_world => width - 1,
            Err(_) => continue,
        };
        rows[row][col] += 1.0;
    }

    if as_ratio {
        for row in &mut rows {
            let total: f64 = row.iter().sum();
            if total > 0.0 {
                for value in row {
                    *value /= total;
                }
            }
        }
    }

    StateMatrix::from_parts(labels, include_world, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    use brew_map_review_models::StateReview;
    use chrono::NaiveDate;

    fn review(reviewer_state: &str, brewery_state: &str) -> StateReview {
        StateReview {
            reviewer_state: reviewer_state.to_string(),
            brewery_state: brewery_state.to_string(),
            date: NaiveDate::from_ymd_opt(2010, 6, 15).unwrap(),
        }
    }

    fn two_states() -> BTreeSet<String> {
        ["California", "New York"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn tallies_reviews_into_cells() {
        let reviews = vec![
            review("California", "California"),
            review("California", "New York"),
            review("California", "France"),
            review("New York", "New York"),
        ];

        let matrix = adjacency(&reviews, &two_states(), false, true);

        assert_eq!(matrix.get("California", "California"), Some(1.0));
        assert_eq!(matrix.get("California", "New York"), Some(1.0));
        assert_eq!(matrix.world_value("California"), Some(1.0));
        assert_eq!(matrix.get("New York", "California"), Some(0.0));
        assert_eq!(matrix.get("New York", "New York"), Some(1.0));
        assert_eq!(matrix.world_value("New York"), Some(0.0));
    }

    #[test]
    fn every_state_appears_on_both_axes() {
        let matrix = adjacency(&[], &two_states(), false, true);
        assert_eq!(matrix.states(), &["California", "New York"]);
        assert_eq!(matrix.width(), 3);
        assert_eq!(matrix.row_sum("California"), Some(0.0));
    }

    #[test]
    fn out_of_set_reviewers_are_dropped() {
        let reviews = vec![review("Ontario", "California")];
        let matrix = adjacency(&reviews, &two_states(), false, true);
        assert_eq!(matrix.row_sum("California"), Some(0.0));
        assert_eq!(matrix.row_sum("New York"), Some(0.0));
        assert_eq!(matrix.get("Ontario", "California"), None);
    }

    #[test]
    fn without_world_foreign_breweries_are_dropped() {
        let reviews = vec![
            review("California", "France"),
            review("California", "California"),
        ];
        let matrix = adjacency(&reviews, &two_states(), false, false);
        assert!(!matrix.has_world());
        assert_eq!(matrix.width(), 2);
        assert_eq!(matrix.world_value("California"), None);
        assert_eq!(matrix.row_sum("California"), Some(1.0));
    }

    #[test]
    fn ratio_rows_sum_to_one() {
        let reviews = vec![
            review("California", "California"),
            review("California", "California"),
            review("California", "New York"),
            review("California", "France"),
        ];
        let matrix = adjacency(&reviews, &two_states(), true, true);

        assert_eq!(matrix.get("California", "California"), Some(0.5));
        assert_eq!(matrix.get("California", "New York"), Some(0.25));
        assert_eq!(matrix.world_value("California"), Some(0.25));
        let total: f64 = matrix.row("California").unwrap().iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ratio_keeps_all_zero_rows_at_zero() {
        let reviews = vec![review("California", "California")];
        let matrix = adjacency(&reviews, &two_states(), true, true);

        let row = matrix.row("New York").unwrap();
        assert!(row.iter().all(|value| *value == 0.0));
        assert!(row.iter().all(|value| !value.is_nan()));
    }

    #[test]
    fn empty_stream_yields_a_zero_matrix() {
        let matrix = adjacency(&[], &two_states(), false, true);
        for state in matrix.states() {
            assert_eq!(matrix.row_sum(state), Some(0.0));
        }
    }

    #[test]
    fn empty_state_set_yields_an_empty_matrix() {
        let reviews = vec![review("California", "California")];
        let matrix = adjacency(&reviews, &BTreeSet::new(), false, true);
        assert!(matrix.states().is_empty());
        assert_eq!(matrix.get("California", "California"), None);
    }

    #[test]
    fn accumulate_adds_cell_wise() {
        let first = adjacency(
            &[review("California", "California")],
            &two_states(),
            false,
            true,
        );
        let mut total = adjacency(
            &[review("California", "New York")],
            &two_states(),
            false,
            true,
        );
        total.accumulate(&first);

        assert_eq!(total.get("California", "California"), Some(1.0));
        assert_eq!(total.get("California", "New York"), Some(1.0));
        assert_eq!(total.row_sum("California"), Some(2.0));
    }
}
