//! Weather data models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Weather values for one moment (or one averaged range), keyed by field name.
///
/// Any subset of fields may be present. A missing field means "no data for
/// that field", never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct WeatherReading(BTreeMap<String, f64>);

impl WeatherReading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut reading = Self::new();
        for (field, value) in pairs {
            reading.insert(field, value);
        }
        reading
    }

    /// Record a value; non-finite values are dropped as "no data"
    pub fn insert(&mut self, field: &str, value: f64) {
        if value.is_finite() {
            self.0.insert(field.to_string(), value);
        }
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Hourly weather series covering the timeline window
///
/// `time` holds hour keys formatted `yyyy-MM-ddTHH:00`; every entry of
/// `values` is aligned with it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HourlySeries {
    pub time: Vec<String>,
    pub values: BTreeMap<String, Vec<Option<f64>>>,
}

/// Per-field mean over a range of hours
#[derive(Debug, Clone, PartialEq)]
pub struct RangeAverage {
    pub reading: WeatherReading,
    /// Number of hourly slots that fell inside the range
    pub hours: u32,
}

impl HourlySeries {
    /// Check that every field series is aligned with `time`
    pub fn validate(&self) -> Result<(), String> {
        for (field, series) in &self.values {
            if series.len() != self.time.len() {
                return Err(format!(
                    "series '{}' has {} values for {} timestamps",
                    field,
                    series.len(),
                    self.time.len()
                ));
            }
        }
        Ok(())
    }

    pub fn index_of(&self, hour_key: &str) -> Option<usize> {
        self.time.iter().position(|t| t == hour_key)
    }

    /// Values at an exact hour; empty when the hour is not in the series
    pub fn reading_at(&self, hour_key: &str) -> WeatherReading {
        let mut reading = WeatherReading::new();
        let Some(idx) = self.index_of(hour_key) else {
            return reading;
        };

        for (field, series) in &self.values {
            if let Some(Some(value)) = series.get(idx) {
                reading.insert(field, *value);
            }
        }
        reading
    }

    /// Mean of the non-null samples of each field within `[start_key, end_key]`
    pub fn average_over(&self, start_key: &str, end_key: &str) -> RangeAverage {
        let in_range: Vec<usize> = self
            .time
            .iter()
            .enumerate()
            .filter(|(_, t)| t.as_str() >= start_key && t.as_str() <= end_key)
            .map(|(i, _)| i)
            .collect();

        let mut reading = WeatherReading::new();
        for (field, series) in &self.values {
            let samples: Vec<f64> = in_range
                .iter()
                .filter_map(|&i| series.get(i).copied().flatten())
                .collect();
            if !samples.is_empty() {
                reading.insert(field, samples.iter().sum::<f64>() / samples.len() as f64);
            }
        }

        RangeAverage {
            reading,
            hours: in_range.len() as u32,
        }
    }
}
