//! HTTP handlers for data source settings

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{DataSource, DataSourcePatch, NewDataSource, Operator};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::weather::WeatherFetcher;
use crate::AppState;

/// Input for adding a data source; omitted fields take the settings panel defaults
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDataSourceInput {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    pub field: Option<String>,
    #[validate(length(equal = 7))]
    pub color: Option<String>,
    pub operator: Option<Operator>,
    pub value: Option<f64>,
}

impl From<CreateDataSourceInput> for NewDataSource {
    fn from(input: CreateDataSourceInput) -> Self {
        let mut source = NewDataSource::named(input.name);
        if let Some(field) = input.field {
            source.field = field;
        }
        if let Some(color) = input.color {
            source.color = color;
        }
        if let Some(operator) = input.operator {
            source.operator = operator;
        }
        if let Some(value) = input.value {
            source.value = value;
        }
        source
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectDataSourceInput {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceListResponse {
    pub data_sources: Vec<DataSource>,
    pub selected_id: String,
}

/// List data sources in insertion order with the current selection
pub async fn list_data_sources<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
) -> Json<DataSourceListResponse> {
    let data_sources = state.dashboard.data_sources().await;
    let selected_id = state.dashboard.selected_data_source().await.id;
    Json(DataSourceListResponse {
        data_sources,
        selected_id,
    })
}

/// Add a data source
pub async fn create_data_source<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<CreateDataSourceInput>,
) -> AppResult<(StatusCode, Json<DataSource>)> {
    input.validate()?;
    let source = state.dashboard.add_data_source(input.into()).await?;
    Ok((StatusCode::CREATED, Json(source)))
}

/// Edit a data source; polygons are recolored without refetching
pub async fn update_data_source<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Path(id): Path<String>,
    Json(patch): Json<DataSourcePatch>,
) -> AppResult<Json<DataSource>> {
    state
        .dashboard
        .update_data_source(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Data source '{}'", id)))
}

/// Delete a data source; the last remaining one cannot be deleted
pub async fn delete_data_source<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    match state.dashboard.remove_data_source(&id).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("Data source '{}'", id))),
    }
}

/// Get the data source new polygons will be bound to
pub async fn get_selected_data_source<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
) -> Json<DataSource> {
    Json(state.dashboard.selected_data_source().await)
}

/// Change the data source new polygons will be bound to
pub async fn select_data_source<F: WeatherFetcher>(
    State(state): State<AppState<F>>,
    Json(input): Json<SelectDataSourceInput>,
) -> AppResult<Json<DataSource>> {
    let source = state.dashboard.select_data_source(&input.id).await?;
    Ok(Json(source))
}
