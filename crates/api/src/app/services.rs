use std::sync::Arc;

use anyhow::Context;

use stockroom_infra::{
    AppConfig, InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StockService,
};

/// The service shared by every handler.
pub type AppServices = StockService<Arc<dyn InventoryStore>>;

/// Postgres when `DATABASE_URL` is configured, the in-memory store otherwise.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn InventoryStore> = match &config.database_url {
        Some(url) => {
            let store = PostgresInventoryStore::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to postgres")?;
            tracing::info!(
                max_connections = config.database_max_connections,
                "using postgres inventory store"
            );
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory inventory store");
            Arc::new(InMemoryInventoryStore::new())
        }
    };

    Ok(StockService::new(store))
}
