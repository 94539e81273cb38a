//! Weather Polygon Dashboard - backend library
//!
//! Users draw polygons on a map; each polygon is colored by the weather at
//! its centroid for the hour (or range) selected on the timeline, according
//! to the threshold rule of its data source.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;
pub use external::weather::{FetchError, OpenMeteoClient, WeatherFetcher};
pub use services::{Dashboard, PolygonEvent, PolygonStore};

/// Application state shared across handlers
pub struct AppState<F> {
    pub dashboard: Dashboard<F>,
    pub config: Arc<Config>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            dashboard: self.dashboard.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<F: WeatherFetcher> AppState<F> {
    pub fn new(dashboard: Dashboard<F>, config: Config) -> Self {
        Self {
            dashboard,
            config: Arc::new(config),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app<F: WeatherFetcher>(state: AppState<F>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(liveness))
        .nest("/api/v1", routes::api_routes::<F>())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Weather Polygon Dashboard API v1.0"
}

/// Liveness check
async fn liveness() -> &'static str {
    "OK"
}
