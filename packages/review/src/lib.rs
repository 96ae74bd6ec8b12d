#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Input boundary: cleaned review-platform exports to a state-review
//! stream.
//!
//! Reads the cleaned ratings / users / breweries CSVs, derives the
//! state columns from the raw location strings, joins the three tables
//! into [`brew_map_review_models::StateReview`] rows, and exposes the
//! derived vocabularies the geocoding and distance layers consume
//! (distinct location strings, distinct state pairs). Also derives the
//! brewery-openings series from first review dates.

pub mod load;
pub mod merge;
pub mod openings;

use thiserror::Error;

/// Errors from reading the cleaned exports.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// CSV open/read failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
