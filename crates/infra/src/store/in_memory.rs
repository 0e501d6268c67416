use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use stockroom_core::{ProductId, StockId, WarehouseId};
use stockroom_stock::{Product, Stock, StockError, StockMutation, Warehouse};

use super::{InventoryStore, StockFilter, StockRecord, StoreError};

#[derive(Debug, Default)]
struct Tables {
    warehouses: HashMap<WarehouseId, Warehouse>,
    products: HashMap<ProductId, Product>,
    stocks: HashMap<StockId, Stock>,
    /// Uniqueness index: one stock row per (warehouse, product).
    stock_keys: HashMap<(WarehouseId, ProductId), StockId>,
}

impl Tables {
    fn record(&self, stock: &Stock) -> Option<StockRecord> {
        Some(StockRecord {
            stock: stock.clone(),
            warehouse: self.warehouses.get(&stock.warehouse_id)?.clone(),
            product: self.products.get(&stock.product_id)?.clone(),
        })
    }
}

/// In-memory inventory store.
///
/// Intended for tests/dev. A single write lock covers each mutation, so the
/// sufficiency check and the write of a stock row are atomic.
#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if tables.warehouses.contains_key(&warehouse.id) {
            return Err(StoreError::Conflict(format!(
                "warehouse {} already exists",
                warehouse.id
            )));
        }
        tables.warehouses.insert(warehouse.id, warehouse.clone());
        Ok(warehouse)
    }

    async fn get_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.warehouses.get(&id).cloned())
    }

    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        if tables.products.values().any(|p| p.name == product.name) {
            return Err(StoreError::Conflict(format!(
                "product named '{}' already exists",
                product.name
            )));
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.products.get(&id).cloned())
    }

    async fn get_stock(&self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.stocks.get(&id).and_then(|s| tables.record(s)))
    }

    async fn list_stocks(&self, filter: StockFilter) -> Result<Vec<StockRecord>, StoreError> {
        let tables = self.tables.read().map_err(poisoned)?;
        let mut records: Vec<StockRecord> = tables
            .stocks
            .values()
            .filter_map(|s| tables.record(s))
            .filter(|r| match filter.owner() {
                Some(owner) => r.warehouse.is_owned_by(owner),
                None => true,
            })
            .collect();
        records.sort_by_key(|r| r.stock.id);
        Ok(records)
    }

    async fn apply_mutation(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        mutation: StockMutation,
    ) -> Result<Stock, StoreError> {
        let mut tables = self.tables.write().map_err(poisoned)?;

        // Mirrors the foreign keys of the SQL schema.
        if !tables.warehouses.contains_key(&warehouse_id) {
            return Err(StockError::WarehouseNotFound.into());
        }
        if !tables.products.contains_key(&product_id) {
            return Err(StockError::ProductNotFound.into());
        }

        let key = (warehouse_id, product_id);
        let mut stock = match tables.stock_keys.get(&key) {
            Some(id) => tables
                .stocks
                .get(id)
                .cloned()
                .ok_or_else(|| StoreError::Backend(format!("dangling stock index entry {id}")))?,
            None if mutation.creates_missing_row() => Stock::empty(warehouse_id, product_id),
            None => return Err(StockError::StockNotAvailable.into()),
        };

        stock.apply(mutation)?;

        tables.stock_keys.insert(key, stock.id);
        tables.stocks.insert(stock.id, stock.clone());
        Ok(stock)
    }
}
