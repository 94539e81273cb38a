//! Route definitions for the Weather Polygon Dashboard

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::{external::weather::WeatherFetcher, handlers, AppState};

/// Create API routes
pub fn api_routes<F: WeatherFetcher>() -> Router<AppState<F>> {
    Router::new()
        .route("/health", get(handlers::health_check::<F>))
        .nest("/data-sources", data_source_routes::<F>())
        .nest("/polygons", polygon_routes::<F>())
        .nest("/timeline", timeline_routes::<F>())
}

/// Data source settings routes
fn data_source_routes<F: WeatherFetcher>() -> Router<AppState<F>> {
    Router::new()
        .route(
            "/",
            get(handlers::list_data_sources::<F>).post(handlers::create_data_source::<F>),
        )
        .route(
            "/selected",
            get(handlers::get_selected_data_source::<F>).put(handlers::select_data_source::<F>),
        )
        .route(
            "/:id",
            patch(handlers::update_data_source::<F>).delete(handlers::delete_data_source::<F>),
        )
}

/// Polygon routes
fn polygon_routes<F: WeatherFetcher>() -> Router<AppState<F>> {
    Router::new()
        .route(
            "/",
            get(handlers::list_polygons::<F>).post(handlers::create_polygon::<F>),
        )
        .route(
            "/:id",
            get(handlers::get_polygon::<F>).delete(handlers::delete_polygon::<F>),
        )
        .route("/:id/refresh", post(handlers::refresh_polygon::<F>))
}

/// Timeline control routes
fn timeline_routes<F: WeatherFetcher>() -> Router<AppState<F>> {
    Router::new()
        .route("/", get(handlers::get_timeline::<F>))
        .route("/current", put(handlers::set_current::<F>))
        .route("/slider", put(handlers::set_slider::<F>))
        .route("/step", post(handlers::step_hour::<F>))
        .route("/range", put(handlers::set_range::<F>))
        .route("/mode", put(handlers::set_mode::<F>))
}
