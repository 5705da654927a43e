mod common;
mod config;
mod routes;

mod locations;
mod samples;
mod settings;
mod trays;

use crate::config::Config;
use crate::settings::models::SettingsStore;
use anyhow::Context;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Set up tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!("Starting server...");

    // Load configuration and environment variables to pass to the application
    let config: Config = Config::from_env();

    let db: DatabaseConnection = Database::connect(config.connect_options())
        .await
        .context("Could not connect to the database")?;
    tracing::info!("Connected to the database");

    Migrator::up(&db, None)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("DB migrations complete");

    let settings = Arc::new(SettingsStore::load(config.settings_path.clone()));
    let current = settings.current().await;
    tracing::info!(
        "Configured HTTP_PORT: {}, AUTO_START_HTTP: {}",
        current.http_port,
        current.auto_start_http
    );

    tracing::info!(
        "Starting server {} ({} deployment) ...",
        config.app_name,
        config.deployment.to_uppercase()
    );

    let addr = format!("{}:{}", config.bind_host, current.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Could not bind {addr}"))?;
    tracing::info!("Listening on {addr}");

    let router = routes::build_router(&db, &config, settings);

    axum::serve(listener, router.into_make_service()).await?;

    Ok(())
}
