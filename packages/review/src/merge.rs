//! Joining ratings to reviewer and brewery states.

use std::collections::{BTreeMap, BTreeSet};

use brew_map_review_models::{Brewery, RatingRow, StateReview, UsUser};
use chrono::DateTime;

use crate::load::canonical_country;

/// Result of merging ratings with user and brewery states.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Joined rows, in input order.
    pub reviews: Vec<StateReview>,
    /// Ratings dropped for an unknown user id.
    pub missing_users: u64,
    /// Ratings dropped for an unknown brewery id.
    pub missing_breweries: u64,
    /// Ratings dropped for an unrepresentable timestamp.
    pub invalid_dates: u64,
}

/// Inner-joins ratings to reviewer state (via users) and brewery state
/// (via breweries), converting epoch-second timestamps to UTC dates.
///
/// Ratings referencing an unknown user or brewery are counted and
/// skipped; empty inputs yield empty outputs.
#[must_use]
pub fn merge_reviews(
    ratings: &[RatingRow],
    users: &[UsUser],
    breweries: &[Brewery],
) -> MergeOutcome {
    let user_states: BTreeMap<&str, &str> = users
        .iter()
        .map(|user| (user.user_id.as_str(), user.state.as_str()))
        .collect();
    let brewery_states: BTreeMap<&str, &str> = breweries
        .iter()
        .map(|brewery| (brewery.brewery_id.as_str(), brewery.state.as_str()))
        .collect();

    let mut outcome = MergeOutcome::default();
    for rating in ratings {
        let Some(reviewer_state) = user_states.get(rating.user_id.as_str()) else {
            outcome.missing_users += 1;
            continue;
        };
        let Some(brewery_state) = brewery_states.get(rating.brewery_id.as_str()) else {
            outcome.missing_breweries += 1;
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(rating.date, 0) else {
            outcome.invalid_dates += 1;
            continue;
        };
        outcome.reviews.push(StateReview {
            reviewer_state: (*reviewer_state).to_string(),
            brewery_state: (*brewery_state).to_string(),
            date: timestamp.date_naive(),
        });
    }

    if outcome.missing_users > 0 || outcome.missing_breweries > 0 || outcome.invalid_dates > 0 {
        log::warn!(
            "merge dropped {} unknown-user, {} unknown-brewery, {} invalid-date ratings",
            outcome.missing_users,
            outcome.missing_breweries,
            outcome.invalid_dates,
        );
    }

    outcome
}

/// All distinct raw location strings across users and breweries. Feeds
/// the geocoding resolver.
#[must_use]
pub fn location_vocabulary(users: &[UsUser], breweries: &[Brewery]) -> BTreeSet<String> {
    users
        .iter()
        .map(|user| user.location.clone())
        .chain(breweries.iter().map(|brewery| brewery.location.clone()))
        .collect()
}

/// All distinct (reviewer state, brewery state) pairs in a review
/// stream. Feeds the distance cache.
#[must_use]
pub fn state_pairs(reviews: &[StateReview]) -> BTreeSet<(String, String)> {
    reviews
        .iter()
        .map(|review| (review.reviewer_state.clone(), review.brewery_state.clone()))
        .collect()
}

/// Counts reviews of breweries outside the recognized state set,
/// grouped by the brewery's country-level location. The breakdown
/// behind the aggregate `World` column.
#[must_use]
pub fn world_review_countries(
    ratings: &[RatingRow],
    users: &[UsUser],
    breweries: &[Brewery],
    states: &BTreeSet<String>,
) -> BTreeMap<String, u64> {
    let user_ids: BTreeSet<&str> = users.iter().map(|user| user.user_id.as_str()).collect();
    let breweries_by_id: BTreeMap<&str, &Brewery> = breweries
        .iter()
        .map(|brewery| (brewery.brewery_id.as_str(), brewery))
        .collect();

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for rating in ratings {
        if !user_ids.contains(rating.user_id.as_str()) {
            continue;
        }
        let Some(brewery) = breweries_by_id.get(rating.brewery_id.as_str()) else {
            continue;
        };
        if states.contains(&brewery.state) {
            continue;
        }
        let country = canonical_country(&brewery.location);
        *counts.entry(country.to_string()).or_insert(0) += 1;
    }
    counts
}
