#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for the review platforms' location vocabulary.
//!
//! Converts the free-text location strings found in the user and
//! brewery tables (`"United States, Washington"`, `"Canada, Ontario"`,
//! `"Germany"`, ...) to latitude/longitude coordinates:
//!
//! 1. **Nominatim / OpenStreetMap** free-form search, configured via
//!    the TOML file in `service/` — free, 1 req/sec rate limit.
//! 2. A **correction pass** ([`corrections`]) that fixes the handful of
//!    strings the free-form search is known to resolve wrong and
//!    registers bare sub-region aliases (`"Ontario"` for
//!    `"Canada, Ontario"`) without extra requests.
//!
//! The vocabulary is small (tens of distinct strings), so lookups run
//! sequentially, honoring the provider's rate limit between requests.
//! A string that fails to resolve is skipped and reported, never fatal
//! to the batch.

pub mod corrections;
pub mod nominatim;
pub mod service;

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use thiserror::Error;

/// A resolved location: canonical address plus WGS84 coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    /// The display address returned by the geocoder.
    pub address: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Server returned an unexpected HTTP status.
    #[error("HTTP status {status}")]
    Status {
        /// The offending status code.
        status: u16,
    },

    /// Rate limit exceeded after all retries.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// A geocoding backend: one free-form query in, at most one record out.
///
/// `Ok(None)` means the provider answered but had no result for the
/// query; transport and parse failures are `Err`. Implementations are
/// shared across lookups and must not require `&mut self`.
#[async_trait::async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Resolves a single free-form location query.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the lookup fails in transport or the
    /// response cannot be parsed.
    async fn geocode(&self, query: &str) -> Result<Option<LocationRecord>, GeocodeError>;

    /// Minimum delay between consecutive lookups, in milliseconds.
    fn rate_limit_ms(&self) -> u64 {
        0
    }
}

/// Outcome of resolving a batch of location strings.
#[derive(Debug, Clone, Default)]
pub struct Resolved {
    /// Raw location string → resolved record, corrections applied.
    /// Contains correction-derived alias keys in addition to the input
    /// strings that resolved.
    pub records: BTreeMap<String, LocationRecord>,
    /// Input strings that could not be resolved (no result, or an error
    /// after the provider's retries).
    pub skipped: Vec<String>,
}

/// Resolves every distinct location string through `provider`, then
/// runs the correction pass over the result.
///
/// Issues one lookup per input string, sleeping the provider's rate
/// limit between consecutive requests. Failures land in
/// [`Resolved::skipped`] rather than aborting the batch; an empty input
/// yields an empty mapping.
pub async fn resolve<P>(provider: &P, raw: &BTreeSet<String>) -> Resolved
where
    P: GeocodeProvider + ?Sized,
{
    let delay = Duration::from_millis(provider.rate_limit_ms());
    let mut resolved = Resolved::default();

    for (i, key) in raw.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match provider.geocode(key).await {
            Ok(Some(record)) => {
                log::debug!(
                    "resolved {key:?} -> ({}, {})",
                    record.latitude,
                    record.longitude
                );
                resolved.records.insert(key.clone(), record);
            }
            Ok(None) => {
                log::warn!("no geocoding result for {key:?}");
                resolved.skipped.push(key.clone());
            }
            Err(e) => {
                log::warn!("geocoding failed for {key:?}: {e}");
                resolved.skipped.push(key.clone());
            }
        }
    }

    corrections::apply(&mut resolved.records);

    log::info!(
        "resolved {} of {} locations ({} after corrections, {} skipped)",
        raw.len() - resolved.skipped.len(),
        raw.len(),
        resolved.records.len(),
        resolved.skipped.len(),
    );

    resolved
}
