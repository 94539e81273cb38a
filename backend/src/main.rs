//! Weather Polygon Dashboard - Backend Server

use std::net::SocketAddr;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weather_dashboard_backend::{create_app, AppState, Config, Dashboard, OpenMeteoClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wxdash_server=debug,weather_dashboard_backend=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Weather Polygon Dashboard Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Weather archive: {}", config.weather.api_endpoint);

    let client = OpenMeteoClient::with_base_url(config.weather.api_endpoint.clone());
    let dashboard = Dashboard::new(client, &config, Utc::now());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = AppState::new(dashboard, config);

    // Build application
    let app = create_app(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
