//! Nominatim / OpenStreetMap geocoding client.
//!
//! Issues free-form searches (`q=<query>&format=jsonv2&limit=1`)
//! against the endpoint configured in `service/nominatim.toml`. The
//! public instance allows one request per second and requires a
//! descriptive user agent; the batch resolver honors
//! [`GeocodeProvider::rate_limit_ms`] between lookups.
//!
//! API docs: <https://nominatim.org/release-docs/latest/api/Search/>

use std::time::Duration;

use crate::service::GeocodingService;
use crate::{GeocodeError, GeocodeProvider, LocationRecord};

/// Nominatim client over a configured service endpoint.
pub struct NominatimClient {
    client: reqwest::Client,
    service: GeocodingService,
}

impl NominatimClient {
    /// Creates a client for the given service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(service: GeocodingService) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.clone())
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;
        Ok(Self { client, service })
    }

    async fn search(&self, query: &str) -> Result<Option<LocationRecord>, GeocodeError> {
        let response = send_with_retry(
            || {
                self.client.get(&self.service.base_url).query(&[
                    ("q", query),
                    ("format", "jsonv2"),
                    ("limit", "1"),
                ])
            },
            self.service.max_retries,
        )
        .await?;

        let body: serde_json::Value = response.json().await?;
        parse_response(&body)
    }
}

#[async_trait::async_trait]
impl GeocodeProvider for NominatimClient {
    async fn geocode(&self, query: &str) -> Result<Option<LocationRecord>, GeocodeError> {
        self.search(query).await
    }

    fn rate_limit_ms(&self) -> u64 {
        self.service.rate_limit_ms
    }
}

/// Sends the request built by `build_request`, retrying transient
/// failures (connection errors, timeouts, HTTP 429, HTTP 5xx) with
/// exponential backoff up to `max_retries` times. Other 4xx statuses
/// are permanent.
#[allow(clippy::future_not_send)]
async fn send_with_retry<F>(
    build_request: F,
    max_retries: u32,
) -> Result<reqwest::Response, GeocodeError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<GeocodeError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt); // 2s, 4s, 8s
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(GeocodeError::Http(e));
                    continue;
                }
                return Err(GeocodeError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                // 429 Too Many Requests — always retry
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    if attempt < max_retries {
                        log::warn!("  HTTP 429 (rate limited)");
                        last_error = Some(GeocodeError::RateLimited);
                        continue;
                    }
                    return Err(GeocodeError::RateLimited);
                }

                // 5xx Server Error — retry
                if status.is_server_error() {
                    if attempt < max_retries {
                        log::warn!("  HTTP {status} (server error)");
                        last_error = Some(GeocodeError::Status {
                            status: status.as_u16(),
                        });
                        continue;
                    }
                    return Err(GeocodeError::Status {
                        status: status.as_u16(),
                    });
                }

                // 4xx Client Error (not 429) — permanent, don't retry
                if status.is_client_error() {
                    return Err(GeocodeError::Status {
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }

    // Should be unreachable, but in case the loop exits without returning:
    Err(last_error.unwrap_or(GeocodeError::RateLimited))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

/// Parses a Nominatim jsonv2 response into at most one record.
///
/// An empty result array is `Ok(None)`; a present result with missing
/// or out-of-range coordinates is a parse error.
fn parse_response(body: &serde_json::Value) -> Result<Option<LocationRecord>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let longitude = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    // NaN fails both range checks, so non-finite values are rejected too.
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(GeocodeError::Parse {
            message: format!("Coordinates out of range: ({latitude}, {longitude})"),
        });
    }

    let address = first["display_name"].as_str().unwrap_or_default().to_string();

    Ok(Some(LocationRecord {
        address,
        latitude,
        longitude,
    }))
}
