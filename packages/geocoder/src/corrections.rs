//! Post-resolution corrections for known-bad geocodes.
//!
//! Two declarative tables, applied as a single pass over the resolved
//! mapping:
//!
//! 1. [`COORDINATE_OVERRIDES`] — literal replacements for strings the
//!    free-form search resolves to the wrong place.
//! 2. [`ALIAS_PREFIXES`] — locations written as
//!    `"<country>, <sub-region>"` also register their bare sub-region
//!    name (`"Ontario"` for `"Canada, Ontario"`) under the
//!    already-resolved record, with no second geocoding request. The
//!    state tables refer to locations by either form.
//!
//! Overrides run before alias derivation so an alias inherits the
//! corrected coordinates. The pass is deterministic and idempotent:
//! applying it twice yields the same mapping.

use std::collections::BTreeMap;

use crate::LocationRecord;

/// Literal overrides: raw key → forced (address, latitude, longitude).
pub const COORDINATE_OVERRIDES: &[(&str, (&str, f64, f64))] = &[
    // The free-form search sends "United States, Washington" to the
    // District of Columbia; pin the state via its largest city.
    (
        "United States, Washington",
        (
            "Seattle, King County, Washington, United States",
            47.603_832_1,
            -122.330_062,
        ),
    ),
];

/// Country prefixes whose sub-regions also circulate as bare names in
/// the review exports.
pub const ALIAS_PREFIXES: &[&str] = &["United States, ", "Canada, ", "United Kingdom, "];

/// Applies both correction tables to a resolved mapping, in place.
///
/// Aliases overwrite any direct resolution of the bare name: when both
/// `"United States, Washington"` and `"Washington"` were looked up, the
/// prefixed form (override included) wins for the bare key too.
pub fn apply(records: &mut BTreeMap<String, LocationRecord>) {
    for (key, (address, latitude, longitude)) in COORDINATE_OVERRIDES {
        if records.contains_key(*key) {
            log::debug!("overriding coordinates for {key:?}");
            records.insert(
                (*key).to_string(),
                LocationRecord {
                    address: (*address).to_string(),
                    latitude: *latitude,
                    longitude: *longitude,
                },
            );
        }
    }

    let mut aliases: Vec<(String, LocationRecord)> = Vec::new();
    for (key, record) in &*records {
        for prefix in ALIAS_PREFIXES {
            if let Some(suffix) = key.strip_prefix(prefix)
                && !suffix.is_empty()
            {
                aliases.push((suffix.to_string(), record.clone()));
            }
        }
    }
    for (key, record) in aliases {
        records.insert(key, record);
    }
}
