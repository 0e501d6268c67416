//! Persistence boundary for warehouses, products and stock rows.
//!
//! The core only needs point lookups, inserts, and one atomic
//! read-modify-write on a stock row. Everything else (HTTP, auth) lives
//! elsewhere.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroom_core::{ProductId, StockId, UserId, WarehouseId};
use stockroom_stock::{Product, Stock, StockError, StockMutation, Warehouse};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryInventoryStore;
pub use postgres::PostgresInventoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The stock rule rejected a mutation inside the atomic section.
    #[error(transparent)]
    Rejected(#[from] StockError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Which stock rows a listing returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockFilter {
    All,
    /// Only rows in warehouses owned by this user.
    OwnedBy(UserId),
}

impl StockFilter {
    fn owner(self) -> Option<UserId> {
        match self {
            StockFilter::All => None,
            StockFilter::OwnedBy(owner) => Some(owner),
        }
    }
}

/// A stock row together with the warehouse and product it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRecord {
    pub stock: Stock,
    pub warehouse: Warehouse,
    pub product: Product,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError>;

    async fn get_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError>;

    /// Fails with [`StoreError::Conflict`] when the product name is taken.
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn get_stock(&self, id: StockId) -> Result<Option<StockRecord>, StoreError>;

    /// Rows ordered by stock id.
    async fn list_stocks(&self, filter: StockFilter) -> Result<Vec<StockRecord>, StoreError>;

    /// Atomically look up the (warehouse, product) row, create it at zero if
    /// the mutation allows, apply the mutation and persist the result.
    ///
    /// No other mutation of the same pair may interleave between the read and
    /// the write.
    async fn apply_mutation(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        mutation: StockMutation,
    ) -> Result<Stock, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError> {
        (**self).insert_warehouse(warehouse).await
    }

    async fn get_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        (**self).get_warehouse(id).await
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        (**self).insert_product(product).await
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get_product(id).await
    }

    async fn get_stock(&self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        (**self).get_stock(id).await
    }

    async fn list_stocks(&self, filter: StockFilter) -> Result<Vec<StockRecord>, StoreError> {
        (**self).list_stocks(filter).await
    }

    async fn apply_mutation(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        mutation: StockMutation,
    ) -> Result<Stock, StoreError> {
        (**self).apply_mutation(warehouse_id, product_id, mutation).await
    }
}
