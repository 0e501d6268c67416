//! Application service: authorizes the caller, resolves references, and hands
//! stock mutations to the store.
//!
//! Checks run in a fixed order: role, warehouse, product, quantity, then the
//! stock row itself (inside the store's atomic section). Nothing is written
//! until every earlier check has passed.

use thiserror::Error;
use tracing::instrument;

use stockroom_auth::{AuthzError, Permission, Principal, authorize, authorize_command};
use stockroom_core::{DomainError, ProductId, StockId};
use stockroom_stock::{
    ConsumeStock, CreateProduct, CreateWarehouse, Product, Quantity, StockError, StockMutation,
    SupplyStock, Warehouse,
};

use crate::store::{InventoryStore, StockFilter, StockRecord, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Stock(#[from] StockError),

    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Rejected(e) => ServiceError::Stock(e),
            StoreError::Conflict(msg) => {
                ServiceError::Stock(StockError::Domain(DomainError::conflict(msg)))
            }
            StoreError::Backend(msg) => ServiceError::Store(msg),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(value: AuthzError) -> Self {
        ServiceError::Stock(StockError::Forbidden(value))
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        ServiceError::Stock(StockError::Domain(value))
    }
}

#[derive(Debug, Clone)]
pub struct StockService<S> {
    store: S,
}

impl<S> StockService<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[instrument(skip(self, cmd), fields(user_id = %principal.user_id), err)]
    pub async fn create_warehouse(
        &self,
        principal: &Principal,
        cmd: CreateWarehouse,
    ) -> Result<Warehouse, ServiceError> {
        authorize_command(principal, &cmd)?;
        let warehouse = Warehouse::register(&cmd, principal.user_id)?;
        let warehouse = self.store.insert_warehouse(warehouse).await?;
        tracing::info!(warehouse_id = %warehouse.id, "warehouse created");
        Ok(warehouse)
    }

    #[instrument(skip(self, cmd), fields(user_id = %principal.user_id), err)]
    pub async fn create_product(
        &self,
        principal: &Principal,
        cmd: CreateProduct,
    ) -> Result<Product, ServiceError> {
        authorize_command(principal, &cmd)?;
        let product = Product::register(&cmd)?;
        let product = self.store.insert_product(product).await?;
        tracing::info!(product_id = %product.id, name = %product.name, "product created");
        Ok(product)
    }

    /// Add stock to a warehouse the caller owns.
    #[instrument(
        skip(self, cmd),
        fields(
            user_id = %principal.user_id,
            warehouse_id = %cmd.warehouse_id,
            product_id = %cmd.product_id,
            quantity = cmd.quantity
        ),
        err
    )]
    pub async fn supply(
        &self,
        principal: &Principal,
        cmd: SupplyStock,
    ) -> Result<StockRecord, ServiceError> {
        authorize_command(principal, &cmd)?;

        let warehouse = self
            .store
            .get_warehouse(cmd.warehouse_id)
            .await?
            .filter(|w| w.is_owned_by(principal.user_id))
            .ok_or(StockError::NotWarehouseOwner)?;
        let product = self.require_product(cmd.product_id).await?;
        let quantity = Quantity::new(cmd.quantity)?;

        let stock = self
            .store
            .apply_mutation(warehouse.id, product.id, StockMutation::Supply(quantity))
            .await?;
        tracing::info!(stock_id = %stock.id, level = stock.quantity, "stock supplied");

        Ok(StockRecord {
            stock,
            warehouse,
            product,
        })
    }

    /// Remove stock from any warehouse holding enough of the product.
    #[instrument(
        skip(self, cmd),
        fields(
            user_id = %principal.user_id,
            warehouse_id = %cmd.warehouse_id,
            product_id = %cmd.product_id,
            quantity = cmd.quantity
        ),
        err
    )]
    pub async fn consume(
        &self,
        principal: &Principal,
        cmd: ConsumeStock,
    ) -> Result<StockRecord, ServiceError> {
        authorize_command(principal, &cmd)?;

        let warehouse = self
            .store
            .get_warehouse(cmd.warehouse_id)
            .await?
            .ok_or(StockError::WarehouseNotFound)?;
        let product = self.require_product(cmd.product_id).await?;
        let quantity = Quantity::new(cmd.quantity)?;

        let stock = self
            .store
            .apply_mutation(warehouse.id, product.id, StockMutation::Consume(quantity))
            .await?;
        tracing::info!(stock_id = %stock.id, level = stock.quantity, "stock consumed");

        Ok(StockRecord {
            stock,
            warehouse,
            product,
        })
    }

    /// Suppliers see their own warehouses only; consumers see everything.
    #[instrument(skip(self), fields(user_id = %principal.user_id), err)]
    pub async fn list_stocks(&self, principal: &Principal) -> Result<Vec<StockRecord>, ServiceError> {
        authorize(principal, Permission::ReadStock)?;
        let filter = if principal.is_supplier() {
            StockFilter::OwnedBy(principal.user_id)
        } else {
            StockFilter::All
        };
        Ok(self.store.list_stocks(filter).await?)
    }

    #[instrument(skip(self), fields(user_id = %principal.user_id), err)]
    pub async fn get_stock(
        &self,
        principal: &Principal,
        id: StockId,
    ) -> Result<StockRecord, ServiceError> {
        authorize(principal, Permission::ReadStock)?;
        self.store
            .get_stock(id)
            .await?
            .ok_or_else(|| StockError::StockNotFound.into())
    }

    async fn require_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        Ok(self
            .store
            .get_product(id)
            .await?
            .ok_or(StockError::ProductNotFound)?)
    }
}
