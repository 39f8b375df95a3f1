//! Postured Cloud - Endpoint Compliance Dashboard Backend
//!
//! Serves the compliance dashboard: agents report device posture rows,
//! operators read derived views (table, summary, alert/activity feeds)
//! computed fresh from the latest snapshot on every request.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    POSTURED CLOUD                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  API      │  │  Auth     │  │  Compliance Core        │ │
//! │  │  Gateway  │  │  Service  │  │  (pure evaluation)      │ │
//! │  │  (Axum)   │  │  (JWT)    │  │                         │ │
//! │  └─────┬─────┘  └─────┬─────┘  └────────────┬────────────┘ │
//! │        └──────────────┼──────────────────────┘              │
//! │                       ▼                                     │
//! │                ┌─────────────┐                             │
//! │                │ PostgreSQL  │                             │
//! │                └─────────────┘                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod models;
mod compliance;
mod handlers;
mod middleware;
mod error;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post, delete},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use std::net::SocketAddr;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "postured_cloud=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Postured Cloud server starting...");
    tracing::info!("Database: {}", config.database_url.split('@').last().unwrap_or("***"));

    // Initialize database pool
    let pool = db::create_pool(&config.database_url).await
        .context("failed to create database pool")?;

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool).await
        .context("failed to run migrations")?;

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/auth/login", post(handlers::auth::login))
        .route("/api/v1/auth/register", post(handlers::auth::register))
        // Telemetry ingest (shared agent key)
        .route("/api/v1/agent/report", post(handlers::agent::report));

    // Operator routes (user JWT auth)
    let operator_routes = Router::new()
        // Devices
        .route("/api/v1/devices", get(handlers::devices::list))
        .route("/api/v1/devices/:id", get(handlers::devices::get))
        .route("/api/v1/devices/:id", delete(handlers::devices::delete))

        // Reports
        .route("/api/v1/reports/summary", get(handlers::reports::summary))

        // Feeds
        .route("/api/v1/alerts", get(handlers::alerts::list))
        .route("/api/v1/activity", get(handlers::alerts::activity))

        // Agent config download
        .route("/api/v1/agent-config", get(handlers::export::agent_config))

        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(operator_routes)
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any)
                )
        )
        .with_state(state)
}
