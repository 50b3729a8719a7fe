//! Signalbox API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use signalbox_api::routes;
use signalbox_api::state::AppState;
use signalbox_api::sweeper::{self, SweeperConfig};
use signalbox_core::clock::SystemClock;
use signalbox_ingest::AppRegistry;
use signalbox_store::PgMessageEventStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Signalbox API server");

    // Read configuration from environment.
    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "DATABASE_URL environment variable must be set")?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| format!("PORT must be a valid u16: {e}"))?;
    let retention_days: i64 = std::env::var("RETENTION_DAYS")
        .unwrap_or_else(|_| sweeper::DEFAULT_RETENTION_DAYS.to_string())
        .parse()
        .map_err(|e| format!("RETENTION_DAYS must be a valid integer: {e}"))?;
    let sweep_interval_secs: u64 = std::env::var("SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| sweeper::DEFAULT_SWEEP_INTERVAL.as_secs().to_string())
        .parse()
        .map_err(|e| format!("SWEEP_INTERVAL_SECS must be a valid integer: {e}"))?;
    let store_timeout_ms: u64 = std::env::var("STORE_TIMEOUT_MS")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .map_err(|e| format!("STORE_TIMEOUT_MS must be a valid integer: {e}"))?;

    let registry = AppRegistry::from_csv(
        &std::env::var("ONESIGNAL_APP_IDS").unwrap_or_default(),
    );
    if registry.is_empty() {
        tracing::warn!("ONESIGNAL_APP_IDS is empty; every webhook will be rejected as unknown");
    }

    // Create database connection pool and apply migrations.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Build application state.
    let store = Arc::new(PgMessageEventStore::with_timeout(
        pool,
        Duration::from_millis(store_timeout_ms),
    ));
    let clock = Arc::new(SystemClock);
    let app_state = AppState::new(store.clone(), clock.clone(), Arc::new(registry));

    // Spawn the retention sweeper, isolated from request handling.
    let sweeper_config = SweeperConfig {
        retention: chrono::Duration::days(retention_days),
        interval: Duration::from_secs(sweep_interval_secs),
    };
    tracing::info!(retention_days, sweep_interval_secs, "starting retention sweeper");
    sweeper::spawn(store, clock, sweeper_config);

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::webhooks::router())
        .merge(routes::messages::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
