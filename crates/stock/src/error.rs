use thiserror::Error;

use stockroom_auth::AuthzError;
use stockroom_core::DomainError;

/// Failure of a stock-core operation.
///
/// Every variant is raised before any state is written, so a failed call
/// leaves the ledger untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Caller's role does not allow the operation.
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("warehouse not found")]
    WarehouseNotFound,

    /// Hides whether the warehouse exists at all.
    #[error("warehouse not found or not owned by caller")]
    NotWarehouseOwner,

    #[error("product not found")]
    ProductNotFound,

    #[error("product not available at this warehouse")]
    StockNotAvailable,

    #[error("stock not found")]
    StockNotFound,

    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    #[error("quantity overflow: {current} + {requested} exceeds the maximum stock level")]
    QuantityOverflow { current: i64, requested: i64 },

    /// Field validation or uniqueness failure on warehouse/product records.
    #[error(transparent)]
    Domain(#[from] DomainError),
}
