pub mod memory;
pub mod postgres;
pub mod surreal;

use std::sync::Arc;

use anyhow::{Result, bail};

use super::UserRepository;
use crate::config::PersistenceConfig;

/// Build the repository named by `persistence.provider`.
pub async fn connect(config: &PersistenceConfig) -> Result<Arc<dyn UserRepository>> {
    let repository: Arc<dyn UserRepository> = match config.provider.as_str() {
        "memory" => Arc::new(memory::MemoryProvider::new()),
        "surrealdb" => Arc::new(surreal::SurrealDbProvider::new(&config.database_url).await?),
        "postgres" => Arc::new(postgres::PostgresProvider::new(&config.database_url).await?),
        other => bail!("unknown persistence provider '{other}'"),
    };

    tracing::info!(
        name: "persistence.connected",
        provider = %config.provider,
        "User repository ready"
    );

    Ok(repository)
}
