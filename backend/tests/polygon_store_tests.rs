//! Polygon store integration tests
//!
//! Fetch lifecycle, coloring, deletion during a pending fetch and
//! re-projection of cached series.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{next_update, now, square, temperatures, window, ScriptedFetcher, Step};
use shared::{
    DataSourcePatch, DataSourceRegistry, FetchState, Operator, ReadingState, TimelineWindow,
    DEFAULT_COLOR, ERROR_COLOR,
};
use tokio::sync::{Notify, RwLock};
use weather_dashboard_backend::{FetchError, PolygonEvent, PolygonStore};

const RED: &str = "#ef4444";

fn store(fetcher: ScriptedFetcher) -> (PolygonStore<ScriptedFetcher>, Arc<RwLock<DataSourceRegistry>>) {
    store_with_timeout(fetcher, Duration::from_secs(5))
}

fn store_with_timeout(
    fetcher: ScriptedFetcher,
    timeout: Duration,
) -> (PolygonStore<ScriptedFetcher>, Arc<RwLock<DataSourceRegistry>>) {
    let registry = Arc::new(RwLock::new(DataSourceRegistry::seeded()));
    (PolygonStore::new(fetcher, Arc::clone(&registry), timeout), registry)
}

#[tokio::test]
async fn test_cold_reading_colors_polygon_red() {
    let fetcher = ScriptedFetcher::always(temperatures(&[5.0]));
    let (store, _) = store(fetcher.clone());
    let mut rx = store.subscribe();

    let created = store.create(square(), "temperature", &window()).await.unwrap();
    assert_eq!(created.color, DEFAULT_COLOR);
    assert_eq!(created.fetch_state, FetchState::Pending);

    let updated = next_update(&mut rx).await;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.color, RED);
    assert_eq!(updated.fetch_state, FetchState::Succeeded);
    assert_eq!(updated.reading().and_then(|r| r.get("temperature_2m")), Some(5.0));
    assert!(updated.last_updated.is_some());

    // Fetched at the centroid of the square
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert!((calls[0].longitude - 0.8).abs() < 1e-9);
    assert!((calls[0].latitude - 0.8).abs() < 1e-9);
}

#[tokio::test]
async fn test_warm_reading_stays_gray() {
    let (store, _) = store(ScriptedFetcher::always(temperatures(&[15.0])));
    let mut rx = store.subscribe();

    store.create(square(), "temperature", &window()).await.unwrap();
    let updated = next_update(&mut rx).await;

    assert_eq!(updated.color, DEFAULT_COLOR);
    assert_eq!(updated.fetch_state, FetchState::Succeeded);
}

#[tokio::test]
async fn test_missing_hour_leaves_reading_empty_and_gray() {
    // Series starts an hour after the cursor
    let mut series = temperatures(&[5.0, 5.0]);
    series.time.remove(0);
    series.values.get_mut("temperature_2m").unwrap().remove(0);

    let (store, _) = store(ScriptedFetcher::always(series));
    let mut rx = store.subscribe();

    store.create(square(), "temperature", &window()).await.unwrap();
    let updated = next_update(&mut rx).await;

    assert_eq!(updated.color, DEFAULT_COLOR);
    assert!(updated.reading().map(|r| r.is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn test_fetch_failure_is_captured_on_polygon() {
    let fetcher = ScriptedFetcher::default();
    fetcher.push(Step::err(FetchError::Status {
        status: 400,
        body: "Parameter 'start_date' is out of allowed range".into(),
    }));
    let (store, _) = store(fetcher);
    let mut rx = store.subscribe();

    store.create(square(), "temperature", &window()).await.unwrap();
    let updated = next_update(&mut rx).await;

    assert_eq!(updated.color, ERROR_COLOR);
    assert_eq!(updated.fetch_state, FetchState::Failed);
    match &updated.reading {
        ReadingState::Failed { error } => assert!(error.contains("400")),
        other => panic!("expected failed reading, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_fetch_times_out() {
    let fetcher = ScriptedFetcher::default();
    fetcher.push(Step::ok(temperatures(&[5.0])).after(Duration::from_secs(30)));
    let (store, _) = store_with_timeout(fetcher, Duration::from_millis(50));
    let mut rx = store.subscribe();

    store.create(square(), "temperature", &window()).await.unwrap();
    let updated = next_update(&mut rx).await;

    assert_eq!(updated.fetch_state, FetchState::Failed);
    assert_eq!(updated.color, ERROR_COLOR);
    match &updated.reading {
        ReadingState::Failed { error } => assert!(error.contains("timed out")),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_result_for_deleted_polygon_is_discarded() {
    let gate = Arc::new(Notify::new());
    let fetcher = ScriptedFetcher::default();
    fetcher.push(Step::ok(temperatures(&[5.0])).gated(Arc::clone(&gate)));
    let (store, _) = store(fetcher);
    let mut rx = store.subscribe();

    let polygon = store.create(square(), "temperature", &window()).await.unwrap();

    // Wait until the fetch is in flight
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if let Ok(PolygonEvent::FetchStarted { id }) = rx.recv().await {
                assert_eq!(id, polygon.id);
                break;
            }
        }
    })
    .await
    .unwrap();

    assert!(store.delete(polygon.id).await);
    gate.notify_one();

    let late = tokio::time::timeout(Duration::from_millis(200), next_update_raw(&mut rx)).await;
    assert!(late.is_err(), "no update may follow a delete");
    assert!(store.is_empty().await);
    assert!(store.get(polygon.id).await.is_none());
}

async fn next_update_raw(rx: &mut tokio::sync::broadcast::Receiver<PolygonEvent>) {
    loop {
        if let Ok(PolygonEvent::Updated { .. }) = rx.recv().await {
            return;
        }
    }
}

#[tokio::test]
async fn test_delete_unknown_polygon_is_noop() {
    let (store, _) = store(ScriptedFetcher::always(temperatures(&[5.0])));
    assert!(!store.delete(uuid::Uuid::new_v4()).await);
    assert!(store.refresh_one(uuid::Uuid::new_v4(), &window()).await.is_none());
}

#[tokio::test]
async fn test_invalid_ring_is_rejected_without_fetch() {
    let fetcher = ScriptedFetcher::always(temperatures(&[5.0]));
    let (store, _) = store(fetcher.clone());

    let open_ring = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    assert!(store.create(open_ring, "temperature", &window()).await.is_err());

    let collapsed = vec![[1.0, 1.0]; 4];
    assert!(store.create(collapsed, "temperature", &window()).await.is_err());
    assert!(store.is_empty().await);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_recolor_uses_stored_reading_without_fetch() {
    let fetcher = ScriptedFetcher::always(temperatures(&[5.0]));
    let (store, registry) = store(fetcher.clone());
    let mut rx = store.subscribe();

    let polygon = store.create(square(), "temperature", &window()).await.unwrap();
    assert_eq!(next_update(&mut rx).await.color, RED);

    {
        let mut registry = registry.write().await;
        registry
            .update(
                "temperature",
                DataSourcePatch {
                    operator: Some(Operator::GreaterThan),
                    ..Default::default()
                },
            )
            .unwrap();
        store.recolor_all(&registry).await;
    }

    let recolored = next_update(&mut rx).await;
    assert_eq!(recolored.id, polygon.id);
    assert_eq!(recolored.color, DEFAULT_COLOR);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_failed_polygon_keeps_error_color_on_recolor() {
    let fetcher = ScriptedFetcher::default();
    fetcher.push(Step::err(FetchError::Transport("connection refused".into())));
    let (store, registry) = store(fetcher);
    let mut rx = store.subscribe();

    let polygon = store.create(square(), "temperature", &window()).await.unwrap();
    next_update(&mut rx).await;

    store.recolor_all(&*registry.read().await).await;
    let stored = store.get(polygon.id).await.unwrap();
    assert_eq!(stored.color, ERROR_COLOR);
}

#[tokio::test]
async fn test_reproject_moves_cursor_over_cached_series() {
    let fetcher = ScriptedFetcher::always(temperatures(&[5.0, 15.0]));
    let (store, _) = store(fetcher.clone());
    let mut rx = store.subscribe();

    let polygon = store.create(square(), "temperature", &window()).await.unwrap();
    let first = next_update(&mut rx).await;
    assert_eq!(first.color, RED);
    assert!(store.cached_series(polygon.id).await.is_some());

    let mut later = window();
    later.step_hour(shared::StepDirection::Next);
    let refetches = store.reproject_all(&later).await;
    assert!(refetches.is_empty());

    let moved = next_update(&mut rx).await;
    assert_eq!(moved.color, DEFAULT_COLOR);
    assert_eq!(moved.reading().and_then(|r| r.get("temperature_2m")), Some(15.0));
    assert_eq!(moved.last_updated, first.last_updated);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_reproject_refetches_failed_polygons() {
    let fetcher = ScriptedFetcher::always(temperatures(&[5.0]));
    fetcher.push(Step::err(FetchError::Transport("connection reset".into())));
    let (store, _) = store(fetcher.clone());
    let mut rx = store.subscribe();

    let polygon = store.create(square(), "temperature", &window()).await.unwrap();
    assert_eq!(next_update(&mut rx).await.fetch_state, FetchState::Failed);

    let handles = store.reproject_all(&window()).await;
    assert_eq!(handles.len(), 1);
    for handle in handles {
        let refreshed = handle.await.unwrap().unwrap();
        assert_eq!(refreshed.id, polygon.id);
        assert_eq!(refreshed.color, RED);
    }
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn test_range_mode_averages_readings() {
    let fetcher = ScriptedFetcher::always(temperatures(&[4.0, 8.0, 12.0, 16.0]));
    let (store, _) = store(fetcher);
    let mut rx = store.subscribe();

    let mut range_window: TimelineWindow = window();
    range_window
        .set_range(now(), now() + chrono::Duration::hours(3))
        .unwrap();

    store.create(square(), "temperature", &range_window).await.unwrap();
    let updated = next_update(&mut rx).await;

    assert_eq!(updated.range_hours, Some(4));
    assert_eq!(updated.reading().and_then(|r| r.get("temperature_2m")), Some(10.0));
    assert_eq!(updated.color, DEFAULT_COLOR);
}

#[tokio::test]
async fn test_overlapping_fetches_last_completion_wins() {
    let fetcher = ScriptedFetcher::default();
    let (store, _) = store(fetcher.clone());
    let mut rx = store.subscribe();

    // Initial fetch
    fetcher.push(Step::ok(temperatures(&[15.0])));
    let polygon = store.create(square(), "temperature", &window()).await.unwrap();
    next_update(&mut rx).await;

    // Slow cold answer issued first, fast warm answer issued second
    fetcher.push(Step::ok(temperatures(&[5.0])).after(Duration::from_millis(150)));
    fetcher.push(Step::ok(temperatures(&[15.0])));
    let slow = store.spawn_refresh(polygon.id, &window());
    tokio::time::sleep(Duration::from_millis(20)).await;
    let fast = store.spawn_refresh(polygon.id, &window());

    fast.await.unwrap();
    slow.await.unwrap();

    let stored = store.get(polygon.id).await.unwrap();
    assert_eq!(stored.color, RED);
}
