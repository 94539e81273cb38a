//! Dashboard controller composing the registry, timeline and polygon store
//!
//! Every mutation that can change what a polygon shows is followed by an
//! explicit downstream call: registry edits recolor all polygons, timeline
//! moves schedule a debounced refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    DataSource, DataSourcePatch, DataSourceRegistry, NewDataSource, Polygon, StepDirection,
    TimelineMode, TimelineWindow, Vertex,
};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::{Config, RefreshConfig};
use crate::error::{AppError, AppResult};
use crate::external::weather::WeatherFetcher;
use crate::services::polygon::{PolygonEvent, PolygonStore, SharedRegistry};

/// Top-level dashboard state
pub struct Dashboard<F> {
    registry: SharedRegistry,
    selected: Arc<RwLock<String>>,
    timeline: Arc<RwLock<TimelineWindow>>,
    store: PolygonStore<F>,
    refresh: RefreshConfig,
    generation: Arc<AtomicU64>,
}

impl<F> Clone for Dashboard<F> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            selected: Arc::clone(&self.selected),
            timeline: Arc::clone(&self.timeline),
            store: self.store.clone(),
            refresh: self.refresh.clone(),
            generation: Arc::clone(&self.generation),
        }
    }
}

impl<F: WeatherFetcher> Dashboard<F> {
    /// Seeded registry, the default source selected and a window around `now`
    pub fn new(fetcher: F, config: &Config, now: DateTime<Utc>) -> Self {
        let timeline = TimelineWindow::initialize(
            now,
            config.timeline.window_before_days,
            config.timeline.window_after_days,
        );
        Self::with_parts(
            fetcher,
            DataSourceRegistry::seeded(),
            timeline,
            config,
        )
    }

    pub fn with_parts(
        fetcher: F,
        registry: DataSourceRegistry,
        timeline: TimelineWindow,
        config: &Config,
    ) -> Self {
        let selected = registry.first().id.clone();
        let registry = Arc::new(RwLock::new(registry));
        let store = PolygonStore::new(fetcher, Arc::clone(&registry), config.weather.timeout());

        Self {
            registry,
            selected: Arc::new(RwLock::new(selected)),
            timeline: Arc::new(RwLock::new(timeline)),
            store,
            refresh: config.refresh.clone(),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn store(&self) -> &PolygonStore<F> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PolygonEvent> {
        self.store.subscribe()
    }

    // ========================================================================
    // Data Sources
    // ========================================================================

    pub async fn data_sources(&self) -> Vec<DataSource> {
        self.registry.read().await.list().to_vec()
    }

    pub async fn selected_data_source(&self) -> DataSource {
        let registry = self.registry.read().await;
        let selected = self.selected.read().await;
        registry
            .find(&selected)
            .unwrap_or_else(|| registry.first())
            .clone()
    }

    /// Choose the source new polygons are bound to
    pub async fn select_data_source(&self, id: &str) -> AppResult<DataSource> {
        let registry = self.registry.read().await;
        let source = registry
            .find(id)
            .ok_or_else(|| AppError::NotFound(format!("Data source '{}'", id)))?
            .clone();
        *self.selected.write().await = source.id.clone();
        Ok(source)
    }

    pub async fn add_data_source(&self, input: NewDataSource) -> AppResult<DataSource> {
        let mut registry = self.registry.write().await;
        let source = registry.add(input)?;
        tracing::info!(data_source_id = %source.id, name = %source.name, "Data source added");
        self.store.recolor_all(&registry).await;
        Ok(source)
    }

    /// Apply a partial edit; unknown ids are a no-op returning `None`
    pub async fn update_data_source(
        &self,
        id: &str,
        patch: DataSourcePatch,
    ) -> AppResult<Option<DataSource>> {
        let mut registry = self.registry.write().await;
        let recolor = patch.affects_colors();
        let updated = registry.update(id, patch)?;

        if updated.is_some() && recolor {
            self.store.recolor_all(&registry).await;
        }
        Ok(updated)
    }

    /// Remove a source; if it was selected, the first remaining source is selected
    pub async fn remove_data_source(&self, id: &str) -> AppResult<Option<DataSource>> {
        let mut registry = self.registry.write().await;
        let removed = registry.remove(id)?;

        if let Some(source) = &removed {
            let mut selected = self.selected.write().await;
            if *selected == source.id {
                *selected = registry.fallback_for(&source.id).id.clone();
                tracing::debug!(selected = %selected, "Reselected fallback data source");
            }
            drop(selected);

            tracing::info!(data_source_id = %source.id, "Data source removed");
            self.store.recolor_all(&registry).await;
        }
        Ok(removed)
    }

    // ========================================================================
    // Polygons
    // ========================================================================

    /// Store a finished drawing bound to the selected source and start its fetch
    pub async fn draw_polygon(&self, ring: Vec<Vertex>) -> AppResult<Polygon> {
        let data_source_id = self.selected_data_source().await.id;
        let window = self.timeline().await;
        Ok(self.store.create(ring, &data_source_id, &window).await?)
    }

    pub async fn delete_polygon(&self, id: Uuid) -> bool {
        self.store.delete(id).await
    }

    pub async fn polygons(&self) -> Vec<Polygon> {
        self.store.list().await
    }

    pub async fn polygon(&self, id: Uuid) -> AppResult<Polygon> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Polygon {}", id)))
    }

    /// Start a refetch for one polygon
    pub async fn refresh_polygon(&self, id: Uuid) -> AppResult<JoinHandle<Option<Polygon>>> {
        self.polygon(id).await?;
        let window = self.timeline().await;
        Ok(self.store.spawn_refresh(id, &window))
    }

    // ========================================================================
    // Timeline
    // ========================================================================

    pub async fn timeline(&self) -> TimelineWindow {
        self.timeline.read().await.clone()
    }

    /// Move the cursor to an explicit time; rejects times outside the window
    pub async fn set_current(&self, current: DateTime<Utc>) -> AppResult<TimelineWindow> {
        let mut timeline = self.timeline.write().await;
        let changed = timeline.set_current(current)?;
        self.after_timeline_change(changed);
        Ok(timeline.clone())
    }

    /// Slider input in hours since the window start (clamped)
    pub async fn set_slider(&self, hours: i64) -> TimelineWindow {
        let mut timeline = self.timeline.write().await;
        let changed = timeline.set_from_slider(hours);
        self.after_timeline_change(changed);
        timeline.clone()
    }

    /// Previous/next hour; a no-op at the window bounds
    pub async fn step_hour(&self, direction: StepDirection) -> TimelineWindow {
        let mut timeline = self.timeline.write().await;
        let changed = timeline.step_hour(direction);
        self.after_timeline_change(changed);
        timeline.clone()
    }

    pub async fn set_range(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> AppResult<TimelineWindow> {
        let mut timeline = self.timeline.write().await;
        let changed = timeline.set_range(range_start, range_end)?;
        self.after_timeline_change(changed);
        Ok(timeline.clone())
    }

    pub async fn set_mode(&self, mode: TimelineMode) -> TimelineWindow {
        let mut timeline = self.timeline.write().await;
        let changed = timeline.set_mode(mode);
        self.after_timeline_change(changed);
        timeline.clone()
    }

    fn after_timeline_change(&self, changed: bool) {
        if changed {
            self.schedule_refresh();
        }
    }

    /// Refresh all polygons once the timeline has been quiet for the debounce period.
    ///
    /// Each call supersedes earlier pending ones; the returned handle resolves
    /// to `false` when this call was superseded.
    pub fn schedule_refresh(&self) -> JoinHandle<bool> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dashboard = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(dashboard.refresh.debounce()).await;
            if dashboard.generation.load(Ordering::SeqCst) != generation {
                return false;
            }

            let window = dashboard.timeline().await;
            tracing::debug!(current = %window.current(), "Timeline settled, refreshing polygons");
            if dashboard.refresh.reuse_cached_series {
                dashboard.store.reproject_all(&window).await;
            } else {
                dashboard.store.refresh_all(&window).await;
            }
            true
        })
    }
}
