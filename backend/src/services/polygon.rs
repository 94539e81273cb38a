//! Polygon store: owns drawn polygons and drives their weather fetches
//!
//! Fetches run in spawned tasks and never hold a lock while awaiting the
//! weather service. Each completion re-acquires the lock once and applies its
//! result to a single polygon, only if that polygon still exists. Overlapping
//! fetches for the same polygon are not sequenced: whichever completes last
//! wins.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use shared::{
    hour_key, DataSourceRegistry, DomainResult, FetchState, HourlySeries, Polygon, TimelineWindow,
    Vertex, WeatherReading,
};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::external::weather::{FetchError, WeatherFetcher};

/// Registry shared between the dashboard controller and the store
pub type SharedRegistry = Arc<RwLock<DataSourceRegistry>>;

/// Capacity of the polygon event channel
const EVENT_CAPACITY: usize = 256;

/// Change notifications for subscribers (the browser event stream, tests)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PolygonEvent {
    Created { polygon: Polygon },
    FetchStarted { id: Uuid },
    Updated { polygon: Polygon },
    Deleted { id: Uuid },
}

struct Entry {
    polygon: Polygon,
    /// Last successfully fetched series, used to re-derive readings
    series: Option<HourlySeries>,
}

struct StoreInner<F> {
    fetcher: F,
    registry: SharedRegistry,
    entries: RwLock<Vec<Entry>>,
    events: broadcast::Sender<PolygonEvent>,
    fetch_timeout: Duration,
}

/// Polygon store service
pub struct PolygonStore<F> {
    inner: Arc<StoreInner<F>>,
}

impl<F> Clone for PolygonStore<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Reading for the cursor hour, or the per-field average over the active range
pub fn project_series(series: &HourlySeries, window: &TimelineWindow) -> (WeatherReading, Option<u32>) {
    match window.active_range() {
        Some(range) => {
            let avg = series.average_over(&hour_key(range.start), &hour_key(range.end));
            (avg.reading, Some(avg.hours))
        }
        None => (series.reading_at(&window.hour_key()), None),
    }
}

impl<F: WeatherFetcher> PolygonStore<F> {
    pub fn new(fetcher: F, registry: SharedRegistry, fetch_timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                fetcher,
                registry,
                entries: RwLock::new(Vec::new()),
                events,
                fetch_timeout,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PolygonEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: PolygonEvent) {
        // No subscribers is fine
        let _ = self.inner.events.send(event);
    }

    /// Create a polygon bound to `data_source_id` and schedule its first fetch.
    ///
    /// Returns as soon as the polygon is stored; the fetch result arrives as a
    /// [`PolygonEvent::Updated`].
    pub async fn create(
        &self,
        ring: Vec<Vertex>,
        data_source_id: &str,
        window: &TimelineWindow,
    ) -> DomainResult<Polygon> {
        let polygon = Polygon::new(ring, data_source_id)?;

        {
            let mut entries = self.inner.entries.write().await;
            entries.push(Entry {
                polygon: polygon.clone(),
                series: None,
            });
        }

        tracing::info!(
            polygon_id = %polygon.id,
            data_source_id = %polygon.data_source_id,
            "Polygon created"
        );
        self.emit(PolygonEvent::Created {
            polygon: polygon.clone(),
        });

        self.spawn_refresh(polygon.id, window);
        Ok(polygon)
    }

    /// Remove a polygon. Unknown ids are ignored; returns whether anything was removed.
    pub async fn delete(&self, id: Uuid) -> bool {
        let removed = {
            let mut entries = self.inner.entries.write().await;
            let before = entries.len();
            entries.retain(|e| e.polygon.id != id);
            entries.len() != before
        };

        if removed {
            tracing::info!(polygon_id = %id, "Polygon deleted");
            self.emit(PolygonEvent::Deleted { id });
        }
        removed
    }

    pub async fn get(&self, id: Uuid) -> Option<Polygon> {
        let entries = self.inner.entries.read().await;
        entries
            .iter()
            .find(|e| e.polygon.id == id)
            .map(|e| e.polygon.clone())
    }

    pub async fn list(&self) -> Vec<Polygon> {
        let entries = self.inner.entries.read().await;
        entries.iter().map(|e| e.polygon.clone()).collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn cached_series(&self, id: Uuid) -> Option<HourlySeries> {
        let entries = self.inner.entries.read().await;
        entries
            .iter()
            .find(|e| e.polygon.id == id)
            .and_then(|e| e.series.clone())
    }

    /// Fetch weather for one polygon and apply the outcome.
    ///
    /// Failures (transport, bad payload, timeout) are stored on the polygon as
    /// an error reading; nothing is returned to the caller but the updated
    /// polygon, or `None` if the polygon no longer exists.
    pub async fn refresh_one(&self, id: Uuid, window: &TimelineWindow) -> Option<Polygon> {
        let (point, data_source_id) = {
            let mut entries = self.inner.entries.write().await;
            let entry = entries.iter_mut().find(|e| e.polygon.id == id)?;
            entry.polygon.begin_fetch();
            (entry.polygon.centroid(), entry.polygon.data_source_id.clone())
        };
        self.emit(PolygonEvent::FetchStarted { id });

        let outcome = match point {
            Ok(point) => {
                match tokio::time::timeout(
                    self.inner.fetch_timeout,
                    self.inner.fetcher.fetch(point, window),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(FetchError::Timeout(self.inner.fetch_timeout.as_secs())),
                }
            }
            Err(e) => Err(FetchError::Shape(e.to_string())),
        };

        let registry = self.inner.registry.read().await;
        let data_source = registry.find(&data_source_id);
        let mut entries = self.inner.entries.write().await;

        let Some(entry) = entries.iter_mut().find(|e| e.polygon.id == id) else {
            tracing::debug!(polygon_id = %id, "Discarding weather result for deleted polygon");
            return None;
        };

        match outcome {
            Ok(series) => {
                let (reading, range_hours) = project_series(&series, window);
                entry
                    .polygon
                    .apply_reading(reading, range_hours, data_source, Utc::now());
                entry.series = Some(series);
                tracing::debug!(
                    polygon_id = %id,
                    color = %entry.polygon.color,
                    "Weather reading applied"
                );
            }
            Err(e) => {
                tracing::warn!(polygon_id = %id, "Error fetching weather data: {}", e);
                entry.polygon.apply_failure(e.to_string());
            }
        }

        let polygon = entry.polygon.clone();
        drop(entries);
        drop(registry);

        self.emit(PolygonEvent::Updated {
            polygon: polygon.clone(),
        });
        Some(polygon)
    }

    /// Run [`Self::refresh_one`] in the background
    pub fn spawn_refresh(&self, id: Uuid, window: &TimelineWindow) -> JoinHandle<Option<Polygon>> {
        let store = self.clone();
        let window = window.clone();
        tokio::spawn(async move { store.refresh_one(id, &window).await })
    }

    /// Refetch every polygon; fetches are independent and complete in any order
    pub async fn refresh_all(&self, window: &TimelineWindow) -> Vec<JoinHandle<Option<Polygon>>> {
        let ids: Vec<Uuid> = {
            let entries = self.inner.entries.read().await;
            entries.iter().map(|e| e.polygon.id).collect()
        };

        tracing::debug!(count = ids.len(), "Refreshing all polygons");
        ids.into_iter()
            .map(|id| self.spawn_refresh(id, window))
            .collect()
    }

    /// Re-derive readings from cached series for a new cursor or range.
    ///
    /// Polygons without a cached series, or whose last fetch failed, are
    /// refetched instead; the handles of those fetches are returned.
    pub async fn reproject_all(&self, window: &TimelineWindow) -> Vec<JoinHandle<Option<Polygon>>> {
        let registry = self.inner.registry.read().await;
        let mut entries = self.inner.entries.write().await;

        let mut updated = Vec::new();
        let mut refetch = Vec::new();
        for entry in entries.iter_mut() {
            match &entry.series {
                Some(series) if entry.polygon.fetch_state != FetchState::Failed => {
                    let (reading, range_hours) = project_series(series, window);
                    let data_source = registry.find(&entry.polygon.data_source_id);
                    entry.polygon.reproject(reading, range_hours, data_source);
                    updated.push(entry.polygon.clone());
                }
                _ => refetch.push(entry.polygon.id),
            }
        }
        drop(entries);
        drop(registry);

        tracing::debug!(
            reprojected = updated.len(),
            refetched = refetch.len(),
            "Reprojected polygons onto timeline"
        );
        for polygon in updated {
            self.emit(PolygonEvent::Updated { polygon });
        }
        refetch
            .into_iter()
            .map(|id| self.spawn_refresh(id, window))
            .collect()
    }

    /// Recompute every polygon's color from its stored reading. No network access.
    pub async fn recolor_all(&self, registry: &DataSourceRegistry) {
        let mut changed = Vec::new();
        {
            let mut entries = self.inner.entries.write().await;
            for entry in entries.iter_mut() {
                let before = entry.polygon.color.clone();
                entry
                    .polygon
                    .recolor(registry.find(&entry.polygon.data_source_id));
                if entry.polygon.color != before {
                    changed.push(entry.polygon.clone());
                }
            }
        }

        for polygon in changed {
            self.emit(PolygonEvent::Updated { polygon });
        }
    }
}
