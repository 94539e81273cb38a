//! Weather API client for fetching hourly weather series
//!
//! Integrates with the Open-Meteo historical archive API. The dashboard only
//! depends on the [`WeatherFetcher`] contract, so tests and alternative
//! providers can stand in for the HTTP client.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{available_field_names, HourlySeries, LonLat, TimelineWindow};
use thiserror::Error;

/// Reasons a weather fetch can fail. Captured on the polygon, never propagated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Weather API request failed: {0}")]
    Transport(String),

    #[error("Weather API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse weather response: {0}")]
    Decode(String),

    #[error("Unexpected weather response: {0}")]
    Shape(String),

    #[error("Weather API request timed out after {0} seconds")]
    Timeout(u64),
}

/// Source of hourly weather for a point over the timeline window
pub trait WeatherFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        point: LonLat,
        window: &TimelineWindow,
    ) -> impl Future<Output = Result<HourlySeries, FetchError>> + Send;
}

/// Open-Meteo archive API client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

/// Open-Meteo archive response
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    hourly: Option<ArchiveHourly>,
}

#[derive(Debug, Deserialize)]
struct ArchiveHourly {
    time: Vec<String>,
    #[serde(flatten)]
    series: BTreeMap<String, Vec<Option<f64>>>,
}

/// Open-Meteo error body, e.g. `{"error": true, "reason": "..."}`
#[derive(Debug, Deserialize)]
struct ArchiveError {
    reason: String,
}

impl OpenMeteoClient {
    /// Create a new OpenMeteoClient
    pub fn new() -> Self {
        Self::with_base_url(crate::config::DEFAULT_WEATHER_ENDPOINT.to_string())
    }

    /// Create a new OpenMeteoClient with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Query parameters for one archive request.
    ///
    /// The archive holds no future data, so `end_date` is capped at `today`.
    fn query(
        point: LonLat,
        window: &TimelineWindow,
        today: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let hourly: Vec<&str> = available_field_names().collect();
        let end = window.end().min(today).max(window.start());
        vec![
            ("latitude", point.latitude.to_string()),
            ("longitude", point.longitude.to_string()),
            ("start_date", window.start().format("%Y-%m-%d").to_string()),
            ("end_date", end.format("%Y-%m-%d").to_string()),
            ("hourly", hourly.join(",")),
            // Keys must line up with the UTC cursor's hour keys
            ("timezone", "GMT".to_string()),
        ]
    }

    async fn fetch_archive(
        &self,
        point: LonLat,
        window: &TimelineWindow,
    ) -> Result<HourlySeries, FetchError> {
        let url = format!("{}/archive", self.base_url);

        tracing::debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            "Fetching hourly weather"
        );

        let response = self
            .client
            .get(&url)
            .query(&Self::query(point, window, Utc::now()))
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_str::<ArchiveError>(&body)
                .map(|e| e.reason)
                .unwrap_or(body);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_archive_response(&body)
    }
}

impl Default for OpenMeteoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherFetcher for OpenMeteoClient {
    async fn fetch(
        &self,
        point: LonLat,
        window: &TimelineWindow,
    ) -> Result<HourlySeries, FetchError> {
        self.fetch_archive(point, window).await
    }
}

/// Convert an archive response body into an aligned hourly series
pub fn parse_archive_response(body: &str) -> Result<HourlySeries, FetchError> {
    let data: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let hourly = data
        .hourly
        .ok_or_else(|| FetchError::Shape("response has no hourly data".to_string()))?;

    let series = HourlySeries {
        time: hourly.time,
        values: hourly.series,
    };
    series.validate().map_err(FetchError::Shape)?;

    Ok(series)
}
