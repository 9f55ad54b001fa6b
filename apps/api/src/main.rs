mod config;
mod db;
mod errors;
mod layout;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::session::locks::LayoutLocks;
use crate::session::store::PgMetadataStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting layout API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL-backed metadata store
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgMetadataStore::new(db));

    let pagination = config.pagination_options();
    info!(
        "Page budget: {:?} {:.0}px per column, max {} pagination passes",
        config.page.format, pagination.max_height_px, pagination.max_passes
    );

    let state = AppState {
        store,
        locks: LayoutLocks::new(),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
