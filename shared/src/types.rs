//! Common types used across the dashboard

use serde::{Deserialize, Serialize};

/// A map vertex as drawn on the map: `[longitude, latitude]`
pub type Vertex = [f64; 2];

/// Geographic point in longitude/latitude order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }
}

impl From<Vertex> for LonLat {
    fn from(vertex: Vertex) -> Self {
        Self::new(vertex[0], vertex[1])
    }
}

/// Neutral color used when a rule does not match or data is missing
pub const DEFAULT_COLOR: &str = "#94a3b8";

/// Color shown on a polygon whose last fetch failed
pub const ERROR_COLOR: &str = "#ef4444";

/// Curated palette offered by the settings panel
pub const COLOR_OPTIONS: &[(&str, &str)] = &[
    ("#ef4444", "Red"),
    ("#f97316", "Orange"),
    ("#eab308", "Yellow"),
    ("#22c55e", "Green"),
    ("#3b82f6", "Blue"),
    ("#8b5cf6", "Purple"),
    ("#ec4899", "Pink"),
    ("#6b7280", "Gray"),
];

/// Weather fields the dashboard can bind a data source to
pub const AVAILABLE_FIELDS: &[(&str, &str)] = &[
    ("temperature_2m", "Temperature (2m)"),
    ("relative_humidity_2m", "Humidity (2m)"),
    ("precipitation", "Precipitation"),
    ("wind_speed_10m", "Wind Speed (10m)"),
    ("wind_direction_10m", "Wind Direction (10m)"),
    ("weather_code", "Weather Code"),
];

/// Names of all entries in [`AVAILABLE_FIELDS`]
pub fn available_field_names() -> impl Iterator<Item = &'static str> {
    AVAILABLE_FIELDS.iter().map(|(name, _)| *name)
}
