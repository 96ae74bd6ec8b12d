#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pairwise great-circle distances between resolved locations.
//!
//! The review analysis wants the distance between a reviewer's state
//! and the reviewed brewery's state. The state vocabulary is small, so
//! every observed pair is computed once from the geocoded coordinates,
//! keyed by the unordered pair of location names, and persisted as a
//! flat CSV (`index,distance`) so later runs skip the geocoding
//! round-trips entirely.

pub mod pair;

use std::collections::BTreeMap;
use std::path::Path;

use brew_map_geocoder::LocationRecord;
use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from distance cache persistence.
#[derive(Debug, Error)]
pub enum DistanceError {
    /// CSV read/write failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error flushing the output file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A persisted cache row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    /// String-encoded location pair, e.g. `"('Ohio', 'Texas')"`.
    pub index: String,
    /// Great-circle distance in kilometers.
    pub distance: f64,
}

/// Symmetric distance lookup keyed by unordered location pairs.
///
/// Each pair is stored at most once, under its canonical (sorted) key;
/// lookups accept the endpoints in either order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceCache {
    entries: BTreeMap<(String, String), f64>,
}

/// Outcome of building (or extending) a cache.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// The populated cache.
    pub cache: DistanceCache,
    /// Pairs skipped because an endpoint had no resolved coordinates.
    pub skipped: Vec<(String, String)>,
}

/// Outcome of loading a cache from its flat-table form.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    /// The reconstructed cache.
    pub cache: DistanceCache,
    /// Rows skipped because they could not be decoded.
    pub malformed: u64,
}

/// A dense symmetric view of the cache over a fixed location list.
///
/// Pairs absent from the cache fill with 0, meaning "unknown" rather
/// than "zero distance"; callers that need the distinction use
/// [`DistanceCache::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    locations: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl DistanceCache {
    /// Computes distances for every pair, starting from an empty cache.
    ///
    /// Endpoint coordinates come from `resolved`; pairs with an
    /// unresolved endpoint are collected in
    /// [`BuildOutcome::skipped`], not fatal.
    #[must_use]
    pub fn build(
        resolved: &BTreeMap<String, LocationRecord>,
        pairs: &[(String, String)],
    ) -> BuildOutcome {
        Self::default().extend(resolved, pairs)
    }

    /// Computes distances for the pairs missing from this cache,
    /// consuming it. Already-cached pairs are never recomputed.
    #[must_use]
    pub fn extend(
        mut self,
        resolved: &BTreeMap<String, LocationRecord>,
        pairs: &[(String, String)],
    ) -> BuildOutcome {
        let mut skipped = Vec::new();
        for (a, b) in pairs {
            let key = pair::canonical(a, b);
            if self.entries.contains_key(&key) {
                continue;
            }
            let (Some(from), Some(to)) = (resolved.get(a), resolved.get(b)) else {
                log::warn!("no coordinates for pair ({a:?}, {b:?}); skipping");
                skipped.push((a.clone(), b.clone()));
                continue;
            };
            self.entries.insert(key, great_circle_km(from, to));
        }
        BuildOutcome {
            cache: self,
            skipped,
        }
    }

    /// Looks up the distance between two locations, in either order.
    ///
    /// A location is always at distance zero from itself, cached or
    /// not.
    #[must_use]
    pub fn lookup(&self, a: &str, b: &str) -> Option<f64> {
        if a == b {
            return Some(0.0);
        }
        self.entries.get(&pair::canonical(a, b)).copied()
    }

    /// Number of cached pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flattens the cache into persistable rows, sorted by key.
    #[must_use]
    pub fn to_table(&self) -> Vec<DistanceRow> {
        self.entries
            .iter()
            .map(|((a, b), distance)| DistanceRow {
                index: pair::encode(a, b),
                distance: *distance,
            })
            .collect()
    }

    /// Rebuilds a cache from persisted rows.
    ///
    /// Rows whose pair key cannot be decoded are skipped, logged, and
    /// counted in [`LoadOutcome::malformed`]; loading continues.
    #[must_use]
    pub fn from_table(rows: &[DistanceRow]) -> LoadOutcome {
        let mut cache = Self::default();
        let mut malformed = 0;
        for row in rows {
            match pair::decode(&row.index) {
                Some((a, b)) => {
                    cache.entries.insert(pair::canonical(&a, &b), row.distance);
                }
                None => {
                    log::warn!("skipping unparseable cache key {:?}", row.index);
                    malformed += 1;
                }
            }
        }
        LoadOutcome { cache, malformed }
    }

    /// Writes the cache as a flat CSV (`index,distance`).
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] if the file cannot be written.
    pub fn write_csv(&self, path: &Path) -> Result<(), DistanceError> {
        let mut writer = csv::Writer::from_path(path)?;
        for row in self.to_table() {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Reads a cache from a flat CSV written by [`Self::write_csv`].
    ///
    /// Structurally malformed rows (bad field count, non-numeric
    /// distance) and undecodable pair keys are skipped and counted,
    /// like [`Self::from_table`].
    ///
    /// # Errors
    ///
    /// Returns [`DistanceError`] if the file cannot be opened or read.
    pub fn read_csv(path: &Path) -> Result<LoadOutcome, DistanceError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut rows = Vec::new();
        let mut malformed = 0;
        for result in reader.deserialize::<DistanceRow>() {
            match result {
                Ok(row) => rows.push(row),
                Err(e) => {
                    log::warn!("skipping malformed cache row: {e}");
                    malformed += 1;
                }
            }
        }
        let mut outcome = Self::from_table(&rows);
        outcome.malformed += malformed;
        Ok(outcome)
    }

    /// Expands the cache into a dense symmetric matrix over
    /// `locations`, diagonal zero, missing pairs filled with 0.
    #[must_use]
    pub fn as_matrix(&self, locations: &[String]) -> DistanceMatrix {
        let values = locations
            .iter()
            .map(|a| {
                locations
                    .iter()
                    .map(|b| self.lookup(a, b).unwrap_or(0.0))
                    .collect()
            })
            .collect();
        DistanceMatrix {
            locations: locations.to_vec(),
            values,
        }
    }
}

impl DistanceMatrix {
    /// Row/column labels, in the order the matrix was built with.
    #[must_use]
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    /// Value at (a, b) by label; `None` if either label is unknown.
    #[must_use]
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let row = self.locations.iter().position(|l| l == a)?;
        let col = self.locations.iter().position(|l| l == b)?;
        Some(self.values[row][col])
    }

    /// Raw row values, one row per location.
    #[must_use]
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }
}

/// Great-circle distance between two resolved locations in kilometers.
fn great_circle_km(from: &LocationRecord, to: &LocationRecord) -> f64 {
    let from = Point::new(from.longitude, from.latitude);
    let to = Point::new(to.longitude, to.latitude);
    Haversine.distance(from, to) / 1000.0
}
