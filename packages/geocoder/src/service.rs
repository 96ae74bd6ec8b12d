//! Compile-time geocoding service configuration.
//!
//! The Nominatim endpoint, user agent, rate limit, timeout, and retry
//! budget are defined in `service/nominatim.toml` and embedded at
//! compile time, so a build is never missing its geocoder config.

use serde::Deserialize;

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"nominatim"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Search endpoint URL.
    pub base_url: String,
    /// User agent sent with every request (Nominatim requires a
    /// descriptive one).
    pub user_agent: String,
    /// Minimum delay between requests in milliseconds.
    pub rate_limit_ms: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry budget for transient transport errors, HTTP 429, and 5xx.
    pub max_retries: u32,
}

const NOMINATIM_TOML: &str = include_str!("../service/nominatim.toml");

/// Returns the embedded Nominatim service configuration.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed (this is a compile-time
/// guarantee since the config is embedded).
#[must_use]
pub fn nominatim_service() -> GeocodingService {
    toml::de::from_str(NOMINATIM_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_the_nominatim_service() {
        let service = nominatim_service();
        assert_eq!(service.id, "nominatim");
        assert!(!service.name.is_empty());
        assert!(service.base_url.starts_with("https://"));
        assert!(!service.user_agent.is_empty());
    }

    #[test]
    fn respects_the_public_instance_rate_limit() {
        // The public Nominatim usage policy caps clients at 1 req/sec.
        let service = nominatim_service();
        assert!(service.rate_limit_ms >= 1000);
    }

    #[test]
    fn retry_budget_is_bounded() {
        let service = nominatim_service();
        assert!(service.max_retries >= 1);
        assert!(service.max_retries <= 10);
    }
}
