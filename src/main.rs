//! Food World server
//!
//! Entry point for the voice recipe assistant backend.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use food_world::AppState;
use food_world::config::AppConfig;
use food_world::persistence::providers;
use food_world::recipes::RecipeCatalog;
use food_world::{server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = Arc::new(AppConfig::load().context("Failed to load configuration")?);

    telemetry::init(config.telemetry.json);

    info!(
        name: "config.loaded",
        host = %config.server.host,
        port = config.server.port,
        provider = %config.persistence.provider,
        catalog = %config.catalog.path,
        "Configuration loaded"
    );

    let catalog = Arc::new(
        RecipeCatalog::load_from_path(&config.catalog.path)
            .with_context(|| format!("Failed to load recipe catalog {}", config.catalog.path))?,
    );
    if catalog.is_empty() {
        tracing::warn!(
            name: "catalog.empty",
            path = %config.catalog.path,
            "Recipe catalog is empty; every search will come up short"
        );
    }

    let repository = providers::connect(&config.persistence)
        .await
        .context("Failed to initialize session storage")?;

    let state = AppState::new(Arc::clone(&config), catalog, repository);
    server::start_server(state).await
}
