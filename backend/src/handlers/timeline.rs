//! HTTP handlers for the timeline control

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{StepDirection, Tick, TimeRange, TimelineMode, TimelineWindow};

use crate::error::AppResult;
use crate::external::weather::WeatherFetcher;
use crate::AppState;

/// Number of slider labels the browser renders
const TICK_COUNT: i64 = 10;

/// Timeline state as rendered by the slider
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineView {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub current: DateTime<Utc>,
    pub mode: TimelineMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<TimeRange>,
    pub total_hours: i64,
    pub current_offset_hours: i64,
    pub hour_key: String,
    pub ticks: Vec<Tick>,
}

impl From<TimelineWindow> for TimelineView {
    fn from(window: TimelineWindow) -> Self {
        Self {
            start: window.start(),
            end: window.end(),
            current: window.current(),
            mode: window.mode(),
            range: window.range(),
            total_hours: window.total_hours(),
            current_offset_hours: window.current_offset_hours(),
            hour_key: window.hour_key(),
            ticks: window.ticks(TICK_COUNT),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetCurrentInput {
    pub current: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SliderInput {
    pub hours: i64,
}

#[derive(Debug, Deserialize)]
pub struct StepInput {
    pub direction: StepDirection,
}

#[derive(Debug, Deserialize)]
pub struct RangeInput {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ModeInput {
    pub mode: TimelineMode,
}

pub async fn get_timeline<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
) -> Json<TimelineView> {
    Json(state.dashboard.timeline().await.into())
}

/// Move the cursor to an explicit time; out-of-window times are rejected
pub async fn set_current<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<SetCurrentInput>,
) -> AppResult<Json<TimelineView>> {
    let window = state.dashboard.set_current(input.current).await?;
    Ok(Json(window.into()))
}

/// Slider drag, in hours since the window start (clamped)
pub async fn set_slider<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<SliderInput>,
) -> Json<TimelineView> {
    Json(state.dashboard.set_slider(input.hours).await.into())
}

/// Previous/next hour buttons
pub async fn step_hour<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<StepInput>,
) -> Json<TimelineView> {
    Json(state.dashboard.step_hour(input.direction).await.into())
}

pub async fn set_range<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<RangeInput>,
) -> AppResult<Json<TimelineView>> {
    let window = state.dashboard.set_range(input.start, input.end).await?;
    Ok(Json(window.into()))
}

pub async fn set_mode<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<ModeInput>,
) -> Json<TimelineView> {
    Json(state.dashboard.set_mode(input.mode).await.into())
}
