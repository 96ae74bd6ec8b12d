//! Cleaned-CSV loading and state derivation.
//!
//! The location column in the exports is free text in one of three
//! shapes: `"<country>"`, `"United States, <state>"`, or
//! `"<country>, <sub-region>"`. The final comma-separated segment is
//! the state; the raw string is kept on every record because the
//! geocoding vocabulary needs the prefixed forms intact.

use std::io;
use std::path::Path;

use brew_map_review_models::{Brewery, BreweryRow, RatingRow, UsUser, UserRow};

use crate::ReviewError;

/// Location prefix marking a US user or brewery.
pub const US_PREFIX: &str = "United States, ";

/// Marker for brewery rows whose location field holds embedded HTML
/// instead of a place name.
const HTML_GARBAGE: &str = "<a href";

/// Canadian provinces that appear bare (or prefixed) in brewery
/// locations. The exports never listed the remaining provinces.
const CANADIAN_PROVINCES: &[&str] = &[
    "Ontario",
    "Quebec",
    "Nova Scotia",
    "Manitoba",
    "British Columbia",
    "Alberta",
    "Newfoundland and Labrador",
];

/// Derives the state segment from a raw location string: strip the
/// `"United States, "` prefix, then take the final comma-separated
/// segment (`"Canada, Ontario"` → `"Ontario"`, `"Germany"` →
/// `"Germany"`).
#[must_use]
pub fn state_of(location: &str) -> String {
    let trimmed = location.strip_prefix(US_PREFIX).unwrap_or(location);
    match trimmed.rsplit_once(", ") {
        Some((_, last)) => last.to_string(),
        None => trimmed.to_string(),
    }
}

/// Collapses a raw location to its country-level form for map
/// rendering: `"United States, *"` → `"United States"`, `"Canada, *"`
/// and the bare province names seen in the exports → `"Canada"`,
/// `"United Kingdom, *"` → `"United Kingdom"`. Anything else is
/// already a country name.
#[must_use]
pub fn canonical_country(location: &str) -> &str {
    if location == "United States" || location.starts_with(US_PREFIX) {
        return "United States";
    }
    if location.starts_with("Canada") || CANADIAN_PROVINCES.iter().any(|p| location.contains(p)) {
        return "Canada";
    }
    if location.starts_with("United Kingdom") {
        return "United Kingdom";
    }
    location
}

/// Reads the cleaned ratings export.
///
/// Structurally malformed rows are skipped and counted, not fatal.
///
/// # Errors
///
/// Returns [`ReviewError`] if the file cannot be opened.
pub fn load_ratings(path: &Path) -> Result<Vec<RatingRow>, ReviewError> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(read_ratings(&mut reader))
}

fn read_ratings<R: io::Read>(reader: &mut csv::Reader<R>) -> Vec<RatingRow> {
    let mut rows = Vec::new();
    let mut malformed = 0_u64;
    for result in reader.deserialize::<RatingRow>() {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                log::debug!("  skipping malformed rating row: {e}");
                malformed += 1;
            }
        }
    }
    if malformed > 0 {
        log::warn!("skipped {malformed} malformed rating rows");
    }
    rows
}

/// Reads the cleaned breweries export and derives each row's state.
///
/// Rows whose location embeds HTML anchor garbage are dropped; the raw
/// location string is kept on the record.
///
/// # Errors
///
/// Returns [`ReviewError`] if the file cannot be opened.
pub fn load_breweries(path: &Path) -> Result<Vec<Brewery>, ReviewError> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(read_breweries(&mut reader))
}

fn read_breweries<R: io::Read>(reader: &mut csv::Reader<R>) -> Vec<Brewery> {
    let mut rows = Vec::new();
    let mut malformed = 0_u64;
    let mut garbage = 0_u64;
    for result in reader.deserialize::<BreweryRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::debug!("  skipping malformed brewery row: {e}");
                malformed += 1;
                continue;
            }
        };
        if row.location.contains(HTML_GARBAGE) {
            garbage += 1;
            continue;
        }
        let state = state_of(&row.location);
        rows.push(Brewery {
            brewery_id: row.brewery_id,
            name: row.name,
            location: row.location,
            state,
        });
    }
    if malformed > 0 || garbage > 0 {
        log::warn!("skipped {malformed} malformed and {garbage} garbage-location brewery rows");
    }
    rows
}

/// Reads the cleaned users export, keeping only US users.
///
/// A US user is one whose location is a `"United States, <state>"`
/// form; the suffix becomes the user's state.
///
/// # Errors
///
/// Returns [`ReviewError`] if the file cannot be opened.
pub fn load_us_users(path: &Path) -> Result<Vec<UsUser>, ReviewError> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(read_us_users(&mut reader))
}

fn read_us_users<R: io::Read>(reader: &mut csv::Reader<R>) -> Vec<UsUser> {
    let mut rows = Vec::new();
    let mut malformed = 0_u64;
    for result in reader.deserialize::<UserRow>() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::debug!("  skipping malformed user row: {e}");
                malformed += 1;
                continue;
            }
        };
        let Some(suffix) = row.location.strip_prefix(US_PREFIX) else {
            continue;
        };
        if suffix.is_empty() {
            continue;
        }
        let state = state_of(&row.location);
        rows.push(UsUser {
            user_id: row.user_id,
            location: row.location,
            state,
        });
    }
    if malformed > 0 {
        log::warn!("skipped {malformed} malformed user rows");
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn state_of_strips_the_us_prefix() {
        assert_eq!(state_of("United States, Colorado"), "Colorado");
        assert_eq!(state_of("United States, New York"), "New York");
    }

    #[test]
    fn state_of_takes_the_final_segment_elsewhere() {
        assert_eq!(state_of("Canada, Ontario"), "Ontario");
        assert_eq!(state_of("United Kingdom, England"), "England");
        assert_eq!(state_of("Germany"), "Germany");
    }

    #[test]
    fn canonical_country_collapses_sub_regions() {
        assert_eq!(canonical_country("United States, Colorado"), "United States");
        assert_eq!(canonical_country("Canada, Ontario"), "Canada");
        assert_eq!(canonical_country("Quebec"), "Canada");
        assert_eq!(canonical_country("United Kingdom, Wales"), "United Kingdom");
        assert_eq!(canonical_country("Germany"), "Germany");
        assert_eq!(canonical_country("United States"), "United States");
    }

    #[test]
    fn reads_rating_rows_and_skips_malformed_ones() {
        let data = "\
user_id,beer_id,brewery_id,date,score
alice.1,10,100,1118102400,4.5
bob.2,11,101,not-a-timestamp,3.0
carol.3,12,100,1121731200,4.0
";
        let rows = read_ratings(&mut reader(data));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "alice.1");
        assert_eq!(rows[0].date, 1_118_102_400);
        assert_eq!(rows[1].user_id, "carol.3");
    }

    #[test]
    fn reads_breweries_under_either_id_header() {
        let data = "\
id,name,location
100,Rock Bottom,\"United States, Colorado\"
101,Bellwoods,\"Canada, Ontario\"
";
        let rows = read_breweries(&mut reader(data));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].brewery_id, "100");
        assert_eq!(rows[0].state, "Colorado");
        assert_eq!(rows[0].location, "United States, Colorado");
        assert_eq!(rows[1].state, "Ontario");

        let data = "\
brewery_id,name,location
7,Westvleteren,Belgium
";
        let rows = read_breweries(&mut reader(data));
        assert_eq!(rows[0].brewery_id, "7");
        assert_eq!(rows[0].state, "Belgium");
    }

    #[test]
    fn brewery_rows_with_html_garbage_are_dropped() {
        let data = "\
id,name,location
100,Ghost,\"<a href=\"\"/brewery/x\"\">link</a>\"
101,Real,\"United States, Maine\"
";
        let rows = read_breweries(&mut reader(data));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].state, "Maine");
    }

    #[test]
    fn keeps_only_us_users() {
        let data = "\
user_id,user_name,location
alice.1,alice,\"United States, Colorado\"
bob.2,bob,\"Canada, Ontario\"
carol.3,carol,Germany
dave.4,dave,\"United States, New York\"
";
        let rows = read_us_users(&mut reader(data));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "alice.1");
        assert_eq!(rows[0].state, "Colorado");
        assert_eq!(rows[0].location, "United States, Colorado");
        assert_eq!(rows[1].state, "New York");
    }
}
