//! Distance oracle backed by the Google Distance Matrix API.
//!
//! One request per ordered pair: `origins=lat,lng&destinations=lat,lng`.
//! The road distance in meters is read from
//! `rows[0].elements[0].distance.value`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::trace;

use super::DistanceOracle;
use crate::error::OracleError;
use crate::models::Coordinate;

/// Default endpoint of the Distance Matrix API.
pub const GOOGLE_DISTANCE_MATRIX_URL: &str =
    "https://maps.googleapis.com/maps/api/distancematrix/json";

/// Environment variable read by [`GoogleMapsConfig::from_env`].
pub const API_KEY_ENV_VAR: &str = "GOOGLE_MAPS_API_KEY";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Errors loading a [`GoogleMapsConfig`] or building the client.
#[derive(Debug, Error)]
pub enum GoogleMapsConfigError {
    #[error("failed to read key file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse key file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct KeyFile {
    key: String,
}

/// Configuration for [`GoogleMapsOracle`].
#[derive(Clone)]
pub struct GoogleMapsConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Endpoint URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for GoogleMapsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleMapsConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GoogleMapsConfig {
    /// Creates a configuration with the default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: GOOGLE_DISTANCE_MATRIX_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads the API key from a JSON file of the form `{"key": "..."}`.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, GoogleMapsConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let file: KeyFile = serde_json::from_str(&contents)?;
        Ok(Self::new(file.key))
    }

    /// Loads the API key from `GOOGLE_MAPS_API_KEY`.
    pub fn from_env() -> Result<Self, GoogleMapsConfigError> {
        std::env::var(API_KEY_ENV_VAR)
            .map(Self::new)
            .map_err(|_| GoogleMapsConfigError::MissingEnv(API_KEY_ENV_VAR))
    }

    /// Overrides the endpoint URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Deserialize)]
struct MatrixRow {
    elements: Vec<MatrixElement>,
}

#[derive(Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<TextValue>,
}

#[derive(Deserialize)]
struct TextValue {
    value: f64,
}

/// Extracts the first element's distance from a Distance Matrix response.
fn parse_distance(body: &str) -> Result<f64, OracleError> {
    let response: MatrixResponse =
        serde_json::from_str(body).map_err(|e| OracleError::Malformed(e.to_string()))?;

    if response.status != "OK" {
        let status = match response.error_message {
            Some(message) => format!("{}: {}", response.status, message),
            None => response.status,
        };
        return Err(OracleError::Status(status));
    }

    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| OracleError::Malformed("response has no elements".to_string()))?;

    if element.status != "OK" {
        return Err(OracleError::Status(element.status));
    }

    element
        .distance
        .map(|d| d.value)
        .ok_or_else(|| OracleError::Malformed("element has no distance".to_string()))
}

fn format_point(c: Coordinate) -> String {
    format!("{},{}", c.x, c.y)
}

/// Road distance in meters from the Google Distance Matrix API.
///
/// Uses a blocking HTTP client, so it must not be called from inside an
/// async runtime. Failures are reported, never retried.
pub struct GoogleMapsOracle {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsOracle {
    /// Creates an oracle with the given configuration.
    pub fn new(config: GoogleMapsConfig) -> Result<Self, GoogleMapsConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }
}

impl DistanceOracle for GoogleMapsOracle {
    fn fetch_distance(&self, from: Coordinate, to: Coordinate) -> Result<f64, OracleError> {
        trace!(?from, ?to, "requesting distance");
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("origins", format_point(from)),
                ("destinations", format_point(to)),
                ("key", self.config.api_key.clone()),
            ])
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.to_string()));
        }

        let body = response
            .text()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        parse_distance(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distance_ok() {
        let body = r#"{
            "destination_addresses": ["Town Hall Station, Park St, Sydney NSW 2000, Australia"],
            "origin_addresses": ["95 Pitt Street, Sydney NSW 2000, Australia"],
            "rows": [{"elements": [{
                "distance": {"text": "1.4 km", "value": 1425},
                "duration": {"text": "7 mins", "value": 392},
                "status": "OK"
            }]}],
            "status": "OK"
        }"#;
        assert_eq!(parse_distance(body).expect("valid"), 1425.0);
    }

    #[test]
    fn test_parse_distance_request_denied() {
        let body = r#"{"status": "REQUEST_DENIED", "error_message": "invalid key", "rows": []}"#;
        assert_eq!(
            parse_distance(body).expect_err("denied"),
            OracleError::Status("REQUEST_DENIED: invalid key".into())
        );
    }

    #[test]
    fn test_parse_distance_element_not_found() {
        let body = r#"{"status": "OK", "rows": [{"elements": [{"status": "ZERO_RESULTS"}]}]}"#;
        assert_eq!(
            parse_distance(body).expect_err("no route"),
            OracleError::Status("ZERO_RESULTS".into())
        );
    }

    #[test]
    fn test_parse_distance_malformed() {
        assert!(matches!(
            parse_distance("not json"),
            Err(OracleError::Malformed(_))
        ));
        assert!(matches!(
            parse_distance(r#"{"status": "OK", "rows": []}"#),
            Err(OracleError::Malformed(_))
        ));
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = GoogleMapsConfig::new("secret-key");
        let printed = format!("{config:?}");
        assert!(!printed.contains("secret-key"));
        assert!(printed.contains(GOOGLE_DISTANCE_MATRIX_URL));
    }

    #[test]
    fn test_config_from_key_file() {
        let path = std::env::temp_dir().join(format!("u-cvrp-key-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"key": "abc123"}"#).expect("write key file");
        let config = GoogleMapsConfig::from_key_file(&path).expect("valid key file");
        std::fs::remove_file(&path).ok();
        assert_eq!(config.api_key, "abc123");
        assert_eq!(config.base_url, GOOGLE_DISTANCE_MATRIX_URL);
    }

    #[test]
    fn test_format_point() {
        assert_eq!(
            format_point(Coordinate::new(-33.881656, 151.205913)),
            "-33.881656,151.205913"
        );
    }
}
