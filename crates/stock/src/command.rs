use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_auth::{CommandAuthorization, Permission};
use stockroom_core::{ProductId, WarehouseId};

/// Command: SupplyStock.
///
/// `quantity` is carried raw; it is validated after the references resolve,
/// so a bad warehouse is reported ahead of a bad quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyStock {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Command: ConsumeStock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumeStock {
    pub warehouse_id: WarehouseId,
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Command: CreateWarehouse. The owner is always the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateWarehouse {
    pub name: String,
    pub address: String,
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

impl CommandAuthorization for SupplyStock {
    fn required_permission(&self) -> Permission {
        Permission::SupplyStock
    }
}

impl CommandAuthorization for ConsumeStock {
    fn required_permission(&self) -> Permission {
        Permission::ConsumeStock
    }
}

impl CommandAuthorization for CreateWarehouse {
    fn required_permission(&self) -> Permission {
        Permission::CreateWarehouse
    }
}

impl CommandAuthorization for CreateProduct {
    fn required_permission(&self) -> Permission {
        Permission::CreateProduct
    }
}
