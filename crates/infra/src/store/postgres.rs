//! Postgres-backed inventory store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate product name |
//! | Database (foreign key violation) | `23503` | `Rejected` (warehouse/product not found) | Stock row for a missing reference |
//! | Database (serialization failure / deadlock) | `40001` / `40P01` | retried, then `Backend` | Concurrent stock mutation |
//! | Database (other) | Any other | `Backend` | Other database errors |
//! | Other | N/A | `Backend` | Network errors, pool closed, etc. |
//!
//! ## Stock mutations
//!
//! Each mutation runs in its own transaction:
//! 1. `INSERT … ON CONFLICT DO NOTHING` creates the zero row on first supply
//!    (the `(warehouse_id, product_id)` unique constraint makes this atomic)
//! 2. `SELECT … FOR UPDATE` locks the row
//! 3. the quantity is computed by [`StockMutation::apply`] and written back
//!
//! Concurrent mutations of the same pair queue on the row lock, so the
//! sufficiency check always sees the latest committed quantity.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use stockroom_core::{ProductId, StockId, UserId, WarehouseId};
use stockroom_stock::{Price, Product, Stock, StockError, StockMutation, Warehouse};

use super::{InventoryStore, StockFilter, StockRecord, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_inventory.sql");

/// Attempts per stock mutation before a serialization failure is surfaced.
const MAX_TX_ATTEMPTS: u32 = 3;

const STOCK_RECORD_SELECT: &str = r#"
    SELECT
        s.id,
        s.warehouse_id,
        s.product_id,
        s.quantity,
        w.name        AS warehouse_name,
        w.address     AS warehouse_address,
        w.owner_id    AS warehouse_owner_id,
        p.name        AS product_name,
        p.description AS product_description,
        p.price       AS product_price
    FROM stocks s
    JOIN warehouses w ON w.id = s.warehouse_id
    JOIN products p ON p.id = s.product_id
"#;

/// Postgres-backed store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and handles
/// connection management.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    /// Apply the bundled schema (idempotent).
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    /// One attempt at a stock mutation.
    ///
    /// The outer `Result` carries database failures (possibly retryable), the
    /// inner one a rejection by the stock rules.
    async fn try_apply_mutation(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        mutation: StockMutation,
    ) -> Result<Result<Stock, StockError>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if mutation.creates_missing_row() {
            sqlx::query(
                r#"
                INSERT INTO stocks (id, warehouse_id, product_id, quantity)
                VALUES ($1, $2, $3, 0)
                ON CONFLICT (warehouse_id, product_id) DO NOTHING
                "#,
            )
            .bind(*StockId::new().as_uuid())
            .bind(*warehouse_id.as_uuid())
            .bind(*product_id.as_uuid())
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(
            r#"
            SELECT id, warehouse_id, product_id, quantity
            FROM stocks
            WHERE warehouse_id = $1 AND product_id = $2
            FOR UPDATE
            "#,
        )
        .bind(*warehouse_id.as_uuid())
        .bind(*product_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(Err(StockError::StockNotAvailable));
        };

        let mut stock = stock_from_row(&row)?;
        if let Err(rejected) = stock.apply(mutation) {
            tx.rollback().await?;
            return Ok(Err(rejected));
        }

        sqlx::query("UPDATE stocks SET quantity = $1, updated_at = now() WHERE id = $2")
            .bind(stock.quantity)
            .bind(*stock.id.as_uuid())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Ok(stock))
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    #[instrument(skip(self, warehouse), fields(warehouse_id = %warehouse.id), err)]
    async fn insert_warehouse(&self, warehouse: Warehouse) -> Result<Warehouse, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO warehouses (id, name, address, owner_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*warehouse.id.as_uuid())
        .bind(&warehouse.name)
        .bind(&warehouse.address)
        .bind(*warehouse.owner.as_uuid())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_warehouse", e))?;
        Ok(warehouse)
    }

    #[instrument(skip(self), err)]
    async fn get_warehouse(&self, id: WarehouseId) -> Result<Option<Warehouse>, StoreError> {
        let row = sqlx::query("SELECT id, name, address, owner_id FROM warehouses WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_warehouse", e))?;

        row.map(|r| -> Result<Warehouse, sqlx::Error> {
            Ok(Warehouse {
                id: WarehouseId::from_uuid(r.try_get("id")?),
                name: r.try_get("name")?,
                address: r.try_get("address")?,
                owner: UserId::from_uuid(r.try_get("owner_id")?),
            })
        })
        .transpose()
        .map_err(|e| map_sqlx_error("get_warehouse", e))
    }

    #[instrument(skip(self, product), fields(product_id = %product.id), err)]
    async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(*product.id.as_uuid())
        .bind(&product.name)
        .bind(product.description.as_deref())
        .bind(product.price.amount())
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(format!("product named '{}' already exists", product.name))
            } else {
                map_sqlx_error("insert_product", e)
            }
        })?;
        Ok(product)
    }

    #[instrument(skip(self), err)]
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, name, description, price FROM products WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        let Some(r) = row else {
            return Ok(None);
        };
        let decode = |e| map_sqlx_error("get_product", e);
        Ok(Some(Product {
            id: ProductId::from_uuid(r.try_get("id").map_err(decode)?),
            name: r.try_get("name").map_err(decode)?,
            description: r.try_get("description").map_err(decode)?,
            price: stored_price(r.try_get("price").map_err(decode)?)?,
        }))
    }

    #[instrument(skip(self), err)]
    async fn get_stock(&self, id: StockId) -> Result<Option<StockRecord>, StoreError> {
        let sql = format!("{STOCK_RECORD_SELECT} WHERE s.id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_stock", e))?;

        row.as_ref().map(record_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list_stocks(&self, filter: StockFilter) -> Result<Vec<StockRecord>, StoreError> {
        let sql = format!(
            "{STOCK_RECORD_SELECT} WHERE ($1::uuid IS NULL OR w.owner_id = $1) ORDER BY s.id"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.owner().map(Uuid::from))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_stocks", e))?;

        rows.iter().map(record_from_row).collect()
    }

    #[instrument(
        skip(self),
        fields(
            warehouse_id = %warehouse_id,
            product_id = %product_id,
            kind = mutation.kind(),
            quantity = mutation.quantity().get()
        ),
        err
    )]
    async fn apply_mutation(
        &self,
        warehouse_id: WarehouseId,
        product_id: ProductId,
        mutation: StockMutation,
    ) -> Result<Stock, StoreError> {
        let mut attempt = 1;
        loop {
            match self.try_apply_mutation(warehouse_id, product_id, mutation).await {
                Ok(Ok(stock)) => return Ok(stock),
                Ok(Err(rejected)) => return Err(StoreError::Rejected(rejected)),
                Err(e) if attempt < MAX_TX_ATTEMPTS && is_retryable(&e) => {
                    tracing::warn!(attempt, error = %e, "stock mutation aborted; retrying");
                    attempt += 1;
                }
                Err(e) if is_foreign_key_violation(&e) => {
                    return Err(StoreError::Rejected(missing_reference(&e)));
                }
                Err(e) => return Err(map_sqlx_error("apply_mutation", e)),
            }
        }
    }
}

fn stock_from_row(row: &PgRow) -> Result<Stock, sqlx::Error> {
    Ok(Stock {
        id: StockId::from_uuid(row.try_get("id")?),
        warehouse_id: WarehouseId::from_uuid(row.try_get("warehouse_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: row.try_get("quantity")?,
    })
}

fn record_from_row(row: &PgRow) -> Result<StockRecord, StoreError> {
    let decode = |e| map_sqlx_error("decode_stock_record", e);

    let stock = stock_from_row(row).map_err(decode)?;
    let warehouse = Warehouse {
        id: stock.warehouse_id,
        name: row.try_get("warehouse_name").map_err(decode)?,
        address: row.try_get("warehouse_address").map_err(decode)?,
        owner: UserId::from_uuid(row.try_get("warehouse_owner_id").map_err(decode)?),
    };
    let product = Product {
        id: stock.product_id,
        name: row.try_get("product_name").map_err(decode)?,
        description: row.try_get("product_description").map_err(decode)?,
        price: stored_price(row.try_get("product_price").map_err(decode)?)?,
    };

    Ok(StockRecord {
        stock,
        warehouse,
        product,
    })
}

fn stored_price(amount: Decimal) -> Result<Price, StoreError> {
    Price::new(amount).map_err(|e| StoreError::Backend(format!("stored price is invalid: {e}")))
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
        _ => None,
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(UNIQUE_VIOLATION)
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

fn is_retryable(err: &sqlx::Error) -> bool {
    is_retryable_code(sqlstate(err).as_deref())
}

/// Serialization failures and deadlocks abort the transaction but are safe to
/// run again from scratch.
fn is_retryable_code(code: Option<&str>) -> bool {
    matches!(code, Some("40001") | Some("40P01"))
}

/// A stock insert hit a foreign key: work out which reference is missing.
fn missing_reference(err: &sqlx::Error) -> StockError {
    match err {
        sqlx::Error::Database(db_err) => missing_reference_for(db_err.constraint()),
        _ => missing_reference_for(None),
    }
}

fn missing_reference_for(constraint: Option<&str>) -> StockError {
    match constraint {
        Some(name) if name.contains("product") => StockError::ProductNotFound,
        _ => StockError::WarehouseNotFound,
    }
}
