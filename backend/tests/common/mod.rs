//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use shared::{hour_key, HourlySeries, LonLat, TimelineWindow};
use tokio::sync::{broadcast, Notify};
use weather_dashboard_backend::{FetchError, PolygonEvent, WeatherFetcher};

/// Fixed, hour-aligned "now" for deterministic hour keys
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

pub fn window() -> TimelineWindow {
    TimelineWindow::around(now())
}

pub fn square() -> Vec<[f64; 2]> {
    vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0], [0.0, 0.0]]
}

/// Series with one temperature per hour starting at `now()`
pub fn temperatures(values: &[f64]) -> HourlySeries {
    let time = (0..values.len())
        .map(|i| hour_key(now() + chrono::Duration::hours(i as i64)))
        .collect();
    let mut series = BTreeMap::new();
    series.insert(
        "temperature_2m".to_string(),
        values.iter().copied().map(Some).collect(),
    );
    HourlySeries {
        time,
        values: series,
    }
}

/// One scripted answer
pub struct Step {
    pub result: Result<HourlySeries, FetchError>,
    pub delay: Duration,
    pub gate: Option<Arc<Notify>>,
}

impl Step {
    pub fn ok(series: HourlySeries) -> Self {
        Self {
            result: Ok(series),
            delay: Duration::ZERO,
            gate: None,
        }
    }

    pub fn err(error: FetchError) -> Self {
        Self {
            result: Err(error),
            delay: Duration::ZERO,
            gate: None,
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[derive(Default)]
struct Script {
    steps: VecDeque<Step>,
    fallback: Option<HourlySeries>,
    calls: Vec<LonLat>,
}

/// Fetcher answering from a queue of scripted steps, then from a fallback series
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    script: Arc<Mutex<Script>>,
}

impl ScriptedFetcher {
    pub fn always(series: HourlySeries) -> Self {
        let fetcher = Self::default();
        fetcher.script.lock().unwrap().fallback = Some(series);
        fetcher
    }

    pub fn push(&self, step: Step) -> &Self {
        self.script.lock().unwrap().steps.push_back(step);
        self
    }

    pub fn calls(&self) -> Vec<LonLat> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.script.lock().unwrap().calls.len()
    }
}

impl WeatherFetcher for ScriptedFetcher {
    async fn fetch(
        &self,
        point: LonLat,
        _window: &TimelineWindow,
    ) -> Result<HourlySeries, FetchError> {
        let step = {
            let mut script = self.script.lock().unwrap();
            script.calls.push(point);
            match script.steps.pop_front() {
                Some(step) => step,
                None => match &script.fallback {
                    Some(series) => Step::ok(series.clone()),
                    None => Step::err(FetchError::Transport("no scripted response".into())),
                },
            }
        };

        if let Some(gate) = step.gate {
            gate.notified().await;
        }
        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.result
    }
}

/// Wait for the next `Updated` event, skipping other events
pub async fn next_update(rx: &mut broadcast::Receiver<PolygonEvent>) -> shared::Polygon {
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            match rx.recv().await {
                Ok(PolygonEvent::Updated { polygon }) => return polygon,
                Ok(_) => continue,
                Err(e) => panic!("event channel closed: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a polygon update")
}
