//! Map polygon models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainResult;
use crate::geometry::{centroid, validate_ring};
use crate::models::{DataSource, WeatherReading};
use crate::threshold::color_for;
use crate::types::{LonLat, Vertex, DEFAULT_COLOR, ERROR_COLOR};

/// What the polygon currently knows about the weather at its centroid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ReadingState {
    /// Nothing fetched yet
    Absent,
    Ready { reading: WeatherReading },
    Failed { error: String },
}

/// Lifecycle of the polygon's most recent fetch
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FetchState {
    Pending,
    Succeeded,
    Failed,
}

/// A user-drawn region bound to one data source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Polygon {
    pub id: Uuid,
    /// Closed ring of `[longitude, latitude]` vertices
    pub coordinates: Vec<Vertex>,
    /// Fixed at creation
    pub data_source_id: String,
    pub reading: ReadingState,
    /// Derived from `reading` and the bound data source
    pub color: String,
    pub fetch_state: FetchState,
    pub last_updated: Option<DateTime<Utc>>,
    /// Set when the reading is an average over a timeline range
    pub range_hours: Option<u32>,
}

impl Polygon {
    /// Validate the ring and create a polygon awaiting its first fetch
    pub fn new(coordinates: Vec<Vertex>, data_source_id: impl Into<String>) -> DomainResult<Self> {
        validate_ring(&coordinates)?;

        Ok(Self {
            id: Uuid::new_v4(),
            coordinates,
            data_source_id: data_source_id.into(),
            reading: ReadingState::Absent,
            color: DEFAULT_COLOR.to_string(),
            fetch_state: FetchState::Pending,
            last_updated: None,
            range_hours: None,
        })
    }

    pub fn centroid(&self) -> DomainResult<LonLat> {
        centroid(&self.coordinates)
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match &self.reading {
            ReadingState::Ready { reading } => Some(reading),
            _ => None,
        }
    }

    /// Enter `Pending`; the previous reading stays visible until a result lands
    pub fn begin_fetch(&mut self) {
        self.fetch_state = FetchState::Pending;
    }

    pub fn apply_reading(
        &mut self,
        reading: WeatherReading,
        range_hours: Option<u32>,
        data_source: Option<&DataSource>,
        fetched_at: DateTime<Utc>,
    ) {
        self.reading = ReadingState::Ready { reading };
        self.range_hours = range_hours;
        self.fetch_state = FetchState::Succeeded;
        self.last_updated = Some(fetched_at);
        self.recolor(data_source);
    }

    /// Swap in a reading re-derived from already fetched data.
    ///
    /// Fetch state and `last_updated` are left alone: no new data arrived.
    pub fn reproject(
        &mut self,
        reading: WeatherReading,
        range_hours: Option<u32>,
        data_source: Option<&DataSource>,
    ) {
        self.reading = ReadingState::Ready { reading };
        self.range_hours = range_hours;
        self.recolor(data_source);
    }

    pub fn apply_failure(&mut self, error: impl Into<String>) {
        self.reading = ReadingState::Failed {
            error: error.into(),
        };
        self.fetch_state = FetchState::Failed;
        self.color = ERROR_COLOR.to_string();
    }

    /// Recompute `color` from the current reading. Failed polygons keep the error color.
    pub fn recolor(&mut self, data_source: Option<&DataSource>) {
        self.color = match &self.reading {
            ReadingState::Failed { .. } => ERROR_COLOR.to_string(),
            _ => color_for(self.reading(), data_source),
        };
    }
}
