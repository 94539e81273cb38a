//! HTTP handlers for map polygons

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{close_ring, Polygon, Vertex};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::external::weather::WeatherFetcher;
use crate::AppState;

/// A finished drawing; the ring is closed if the client sent it open
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolygonInput {
    #[validate(length(min = 3))]
    pub coordinates: Vec<Vertex>,
}

/// List all polygons with their latest reading and color
pub async fn list_polygons<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
) -> Json<Vec<Polygon>> {
    Json(state.dashboard.polygons().await)
}

pub async fn get_polygon<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Polygon>> {
    Ok(Json(state.dashboard.polygon(id).await?))
}

/// Create a polygon bound to the selected data source.
///
/// Responds immediately with the pending polygon; the weather fetch
/// continues in the background.
pub async fn create_polygon<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<CreatePolygonInput>,
) -> AppResult<(StatusCode, Json<Polygon>)> {
    input.validate()?;
    let ring = close_ring(&input.coordinates)?;
    let polygon = state.dashboard.draw_polygon(ring).await?;
    Ok((StatusCode::CREATED, Json(polygon)))
}

/// Delete a polygon. Idempotent: unknown ids also answer 204.
pub async fn delete_polygon<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.dashboard.delete_polygon(id).await;
    StatusCode::NO_CONTENT
}

/// Trigger a refetch for one polygon
pub async fn refresh_polygon<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.dashboard.refresh_polygon(id).await?;
    Ok(StatusCode::ACCEPTED)
}
