//! Stock domain module.
//!
//! Business rules for warehouses, products and the stock ledger, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Stores
//! apply a [`StockMutation`] inside their own lock or transaction so the
//! checks here and the write are atomic.

pub mod command;
pub mod error;
pub mod model;
pub mod mutation;
pub mod quantity;

pub use command::{ConsumeStock, CreateProduct, CreateWarehouse, SupplyStock};
pub use error::StockError;
pub use model::{Price, Product, Stock, Warehouse};
pub use mutation::StockMutation;
pub use quantity::Quantity;
