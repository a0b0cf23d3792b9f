//! WeekPlan API Server
//!
//! Serves the meal-plan store as a JSON API.
//!
//! # Configuration
//!
//! Uses the same configuration as the CLI (`~/.config/weekplan/config.yaml`
//! by default), overridable through environment variables:
//! - `WEEKPLAN_CONFIG`: Path to config file
//! - `WEEKPLAN_DATABASE_PATH`: SQLite database file
//! - `WEEKPLAN_PORT`: Port to listen on (default: 3000)
//! - `WEEKPLAN_BIND`: Address to bind (default: 0.0.0.0)
//!
//! Logging is controlled with `RUST_LOG`.

use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weekplan::config::Config;
use weekplan::db::init_db;
use weekplan::server::{router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weekplan_server=info,weekplan=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::var("WEEKPLAN_CONFIG").ok().map(PathBuf::from);
    let config = Config::load(config_path)?;

    if let Some(path) = &config.config_file {
        tracing::info!("Config file: {}", path.display());
    }
    tracing::info!("Database: {}", config.database_path.value.display());

    let pool = init_db(&config.database_path.value).await?;
    let app = router(AppState::new(pool));

    let addr = config.server.address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
