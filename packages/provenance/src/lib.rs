#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! State-by-state review provenance.
//!
//! Where do the beers a state's reviewers rate come from? The answer
//! is a square count matrix over a recognized state set (rows are
//! reviewer states, columns are brewery states) with an extra `World`
//! column for breweries outside the set, and the local / national /
//! foreign decomposition derived from it:
//!
//! - **local** — reviews of breweries in the reviewer's own state
//!   (the diagonal);
//! - **national** — reviews of breweries in another recognized state;
//! - **foreign** — reviews of breweries outside the set (the `World`
//!   column).
//!
//! Matrices come in snapshot ([`adjacency`]) and per-calendar-month
//! ([`monthly`]) variants, as raw counts or row-normalized ratios.
//! Matrices are always rebuilt from the review stream, never mutated
//! incrementally.

pub mod matrix;
pub mod monthly;
pub mod summary;

pub use matrix::{StateMatrix, WORLD, adjacency};
pub use monthly::{MonthlyMatrix, monthly};
pub use summary::{Metric, ProvenanceRow, rank, sort_by_diagonal, summarize, summarize_series};

use thiserror::Error;

/// Errors from provenance summaries.
#[derive(Debug, Error)]
pub enum ProvenanceError {
    /// The summary needs the `World` column to attribute foreign
    /// reviews, but the matrix was built without it.
    #[error("matrix has no World column; foreign counts are undefined")]
    MissingWorldColumn,
}
