#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Recognized-state and country code tables.
//!
//! The provenance analysis runs over an injected set of recognized
//! states (the 50 US states plus the District of Columbia), and the
//! rendered outputs want each state's two-letter USPS code and an ISO
//! alpha-3 code for countries outside that set. Everything here is
//! plain data consumed by the rest of the workspace.

use std::collections::{BTreeMap, BTreeSet};

/// Full state name to USPS postal code, the 50 states plus DC.
pub const US_STATES: &[(&str, &str)] = &[
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("District of Columbia", "DC"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
];

/// Country name to ISO 3166-1 alpha-3 code, covering the countries
/// that show up in the review platforms' location vocabulary.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("Argentina", "ARG"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Belgium", "BEL"),
    ("Brazil", "BRA"),
    ("Canada", "CAN"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Czech Republic", "CZE"),
    ("Denmark", "DNK"),
    ("Estonia", "EST"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Germany", "DEU"),
    ("Greece", "GRC"),
    ("Hungary", "HUN"),
    ("Iceland", "ISL"),
    ("India", "IND"),
    ("Ireland", "IRL"),
    ("Italy", "ITA"),
    ("Japan", "JPN"),
    ("Mexico", "MEX"),
    ("Netherlands", "NLD"),
    ("New Zealand", "NZL"),
    ("Norway", "NOR"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Russia", "RUS"),
    ("Slovakia", "SVK"),
    ("Slovenia", "SVN"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Thailand", "THA"),
    ("United Kingdom", "GBR"),
    ("United States", "USA"),
    ("Vietnam", "VNM"),
];

/// The recognized-state table, injectable wherever the analysis needs
/// the state set or postal codes. Nothing downstream hardcodes the US
/// list; tests inject smaller tables.
#[derive(Debug, Clone)]
pub struct StateCodes {
    codes: BTreeMap<String, String>,
}

impl StateCodes {
    /// The standard table: 50 US states plus the District of Columbia.
    #[must_use]
    pub fn us_states() -> Self {
        Self::from_pairs(US_STATES)
    }

    /// Builds a table from (full name, code) pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            codes: pairs
                .iter()
                .map(|(name, code)| ((*name).to_string(), (*code).to_string()))
                .collect(),
        }
    }

    /// Postal code for a full state name.
    #[must_use]
    pub fn code(&self, state: &str) -> Option<&str> {
        self.codes.get(state).map(String::as_str)
    }

    /// Whether the table recognizes a state name.
    #[must_use]
    pub fn contains(&self, state: &str) -> bool {
        self.codes.contains_key(state)
    }

    /// The recognized state names, sorted.
    #[must_use]
    pub fn names(&self) -> BTreeSet<String> {
        self.codes.keys().cloned().collect()
    }

    /// Number of recognized states.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Default for StateCodes {
    fn default() -> Self {
        Self::us_states()
    }
}

/// Country name to ISO alpha-3 lookup for locations outside the
/// recognized state set.
#[derive(Debug, Clone)]
pub struct CountryCodes {
    codes: BTreeMap<String, String>,
}

impl CountryCodes {
    /// The standard table built from [`COUNTRIES`].
    #[must_use]
    pub fn world() -> Self {
        Self::from_pairs(COUNTRIES)
    }

    /// Builds a table from (country name, alpha-3 code) pairs.
    #[must_use]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            codes: pairs
                .iter()
                .map(|(name, code)| ((*name).to_string(), (*code).to_string()))
                .collect(),
        }
    }

    /// ISO alpha-3 code for a country name.
    #[must_use]
    pub fn alpha3(&self, country: &str) -> Option<&str> {
        self.codes.get(country).map(String::as_str)
    }

    /// Whether the table recognizes a country name.
    #[must_use]
    pub fn contains(&self, country: &str) -> bool {
        self.codes.contains_key(country)
    }
}

impl Default for CountryCodes {
    fn default() -> Self {
        Self::world()
    }
}
