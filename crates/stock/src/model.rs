use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, ProductId, StockId, UserId, ValueObject, WarehouseId};

use crate::{CreateProduct, CreateWarehouse, StockError, StockMutation};

const MAX_NAME_LEN: usize = 100;
const MAX_ADDRESS_LEN: usize = 255;
const PRICE_SCALE: u32 = 2;

/// Prices have at most 10 digits, two of them after the decimal point.
fn max_price() -> Decimal {
    Decimal::new(100_000_000, 0)
}

/// A warehouse, owned by exactly one supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    pub address: String,
    pub owner: UserId,
}

impl Warehouse {
    /// Validate a registration request and build the warehouse it describes.
    pub fn register(cmd: &CreateWarehouse, owner: UserId) -> DomainResult<Self> {
        let name = required_text("name", &cmd.name, MAX_NAME_LEN)?;
        let address = required_text("address", &cmd.address, MAX_ADDRESS_LEN)?;
        Ok(Self {
            id: WarehouseId::new(),
            name,
            address,
            owner,
        })
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner == user_id
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Product price: non-negative, two decimal places.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Price {
    pub fn new(value: Decimal) -> DomainResult<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        if value.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(
                "price cannot have more than 2 decimal places",
            ));
        }
        if value >= max_price() {
            return Err(DomainError::validation("price cannot have more than 10 digits"));
        }

        let mut value = value.abs();
        value.rescale(PRICE_SCALE);
        Ok(Self(value))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl ValueObject for Price {}

/// A product; names are unique across the whole catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Price,
}

impl Product {
    /// Validate a registration request. Name uniqueness is the store's job.
    pub fn register(cmd: &CreateProduct) -> DomainResult<Self> {
        let name = required_text("name", &cmd.name, MAX_NAME_LEN)?;
        let description = cmd
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok(Self {
            id: ProductId::new(),
            name,
            description,
            price: Price::new(cmd.price)?,
        })
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// The ledger entry for one (warehouse, product) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
}

impl Stock {
    /// A fresh, zero-quantity row, as created on first supply.
    pub fn empty(warehouse_id: WarehouseId, product_id: ProductId) -> Self {
        Self {
            id: StockId::new(),
            warehouse_id,
            product_id,
            quantity: 0,
        }
    }

    /// Apply a mutation in place. On error the quantity is left unchanged.
    pub fn apply(&mut self, mutation: StockMutation) -> Result<(), StockError> {
        self.quantity = mutation.apply(self.quantity)?;
        Ok(())
    }
}

impl Entity for Stock {
    type Id = StockId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

fn required_text(field: &str, value: &str, max_len: usize) -> Result<String, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_len {
        return Err(DomainError::validation(format!(
            "{field} cannot be longer than {max_len} characters"
        )));
    }
    Ok(value.to_string())
}
