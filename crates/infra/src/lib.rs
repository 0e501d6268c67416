//! Infrastructure layer: persistence, service orchestration, configuration.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use service::{ServiceError, StockService};
pub use store::{InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StockFilter, StockRecord, StoreError};
