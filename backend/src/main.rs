//! Fruit Harvest Estimation - Backend Server
//!
//! Projects scanned fruit volumes to a planned harvest date and serves
//! listings, statistics and histograms over HTTP.

use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::FruitStore;

mod config;
mod error;
mod handlers;
mod routes;
mod services;
mod store;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FruitStore>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    // Initialize tracing
    init_tracing(&config);

    tracing::info!("Starting Fruit Harvest Estimation Server");
    tracing::info!("Environment: {}", config.environment);

    // Connections are opened on first use so the server starts, and reports
    // unhealthy, while the database is unreachable
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(config.database.connect_timeout())
        .connect_lazy(&config.database.url)?;

    // Create application state
    let state = AppState {
        store: Arc::new(store::PgFruitStore::new(db_pool)),
        config: Arc::new(config.clone()),
    };

    // Build application
    let app = routes::create_app(state);

    // Start server
    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "harvest_server=debug,tower_http=debug,sqlx=warn".into());

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
