//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::external::weather::WeatherFetcher;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub polygons: usize,
}

/// Health check endpoint handler
pub async fn health_check<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        polygons: state.dashboard.store().len().await,
    })
}
