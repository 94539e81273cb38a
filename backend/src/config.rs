//! Configuration management for the Weather Polygon Dashboard
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with WXD__ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::MAX_WINDOW_DAYS;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Weather API configuration
    pub weather: WeatherConfig,

    /// Timeline window configuration
    pub timeline: TimelineConfig,

    /// Polygon refresh behaviour
    pub refresh: RefreshConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Open-Meteo archive API base URL
    pub api_endpoint: String,

    /// Per-request timeout in seconds; expiry counts as a fetch failure
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimelineConfig {
    /// Days before startup covered by the window
    pub window_before_days: i64,

    /// Days after startup covered by the window
    pub window_after_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Quiet period coalescing rapid timeline changes, in milliseconds
    pub debounce_ms: u64,

    /// Re-derive readings from each polygon's cached series instead of refetching
    pub reuse_cached_series: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WXD_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("weather.api_endpoint", DEFAULT_WEATHER_ENDPOINT)?
            .set_default("weather.timeout_secs", 10)?
            .set_default("timeline.window_before_days", 15)?
            .set_default("timeline.window_after_days", 15)?
            .set_default("refresh.debounce_ms", 150)?
            .set_default("refresh.reuse_cached_series", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WXD__ prefix)
            .add_source(
                Environment::with_prefix("WXD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.timeline.validate()?;
        Ok(config)
    }
}

/// Open-Meteo historical archive endpoint
pub const DEFAULT_WEATHER_ENDPOINT: &str = "https://archive-api.open-meteo.com/v1";

impl WeatherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TimelineConfig {
    /// Reject window sizes the timeline cannot represent
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, days) in [
            ("timeline.window_before_days", self.window_before_days),
            ("timeline.window_after_days", self.window_after_days),
        ] {
            if !(0..=MAX_WINDOW_DAYS).contains(&days) {
                return Err(ConfigError::Message(format!(
                    "{} must be between 0 and {}, got {}",
                    key, MAX_WINDOW_DAYS, days
                )));
            }
        }
        Ok(())
    }
}

impl RefreshConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_WEATHER_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            window_before_days: 15,
            window_after_days: 15,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            reuse_cached_series: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            weather: WeatherConfig::default(),
            timeline: TimelineConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}
