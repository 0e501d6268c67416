use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use stockroom_core::{ProductId, WarehouseId};
use stockroom_infra::StockRecord;
use stockroom_stock::{ConsumeStock, CreateProduct, CreateWarehouse, Product, SupplyStock, Warehouse};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateWarehouseRequest {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
}

/// Body of `POST /supply` and `PUT /consume`.
///
/// Fields are loosely typed so that bad values surface as domain errors in
/// the usual check order instead of as body rejections.
#[derive(Debug, Default, Deserialize)]
pub struct StockMutationRequest {
    #[serde(default)]
    pub warehouse: Option<serde_json::Value>,
    #[serde(default)]
    pub product: Option<serde_json::Value>,
    #[serde(default)]
    pub quantity: Option<serde_json::Value>,
}

impl From<CreateWarehouseRequest> for CreateWarehouse {
    fn from(body: CreateWarehouseRequest) -> Self {
        CreateWarehouse {
            name: body.name,
            address: body.address,
        }
    }
}

impl From<CreateProductRequest> for CreateProduct {
    fn from(body: CreateProductRequest) -> Self {
        CreateProduct {
            name: body.name,
            description: body.description,
            price: body.price,
        }
    }
}

impl StockMutationRequest {
    pub fn into_supply(self) -> SupplyStock {
        SupplyStock {
            warehouse_id: WarehouseId::from_uuid(reference(self.warehouse.as_ref())),
            product_id: ProductId::from_uuid(reference(self.product.as_ref())),
            quantity: quantity(self.quantity.as_ref()),
        }
    }

    pub fn into_consume(self) -> ConsumeStock {
        ConsumeStock {
            warehouse_id: WarehouseId::from_uuid(reference(self.warehouse.as_ref())),
            product_id: ProductId::from_uuid(reference(self.product.as_ref())),
            quantity: quantity(self.quantity.as_ref()),
        }
    }
}

/// A reference that is absent or not a UUID maps to the nil UUID, which no
/// record ever has, so it fails lookup like any other unknown id.
fn reference(value: Option<&serde_json::Value>) -> Uuid {
    value
        .and_then(serde_json::Value::as_str)
        .and_then(|s| Uuid::parse_str(s.trim()).ok())
        .unwrap_or(Uuid::nil())
}

/// Missing quantity counts as 0; anything that is not a JSON integer
/// (fractions, strings, out-of-range numbers) is likewise non-positive.
fn quantity(value: Option<&serde_json::Value>) -> i64 {
    value.and_then(serde_json::Value::as_i64).unwrap_or(0)
}

// -------------------------
// Response mapping
// -------------------------

pub fn warehouse_to_json(w: &Warehouse) -> serde_json::Value {
    serde_json::json!({
        "id": w.id.to_string(),
        "name": w.name,
        "address": w.address,
        "owner": w.owner.to_string(),
    })
}

pub fn product_to_json(p: &Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "name": p.name,
        "description": p.description,
        "price": p.price.amount().to_string(),
    })
}

pub fn stock_to_json(rec: &StockRecord) -> serde_json::Value {
    serde_json::json!({
        "id": rec.stock.id.to_string(),
        "warehouse": rec.stock.warehouse_id.to_string(),
        "warehouse_detail": warehouse_to_json(&rec.warehouse),
        "product": rec.stock.product_id.to_string(),
        "product_detail": product_to_json(&rec.product),
        "quantity": rec.stock.quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> StockMutationRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn missing_quantity_is_zero() {
        let w = Uuid::now_v7();
        let cmd = request(json!({ "warehouse": w.to_string(), "product": w.to_string() }))
            .into_supply();
        assert_eq!(cmd.quantity, 0);
        assert_eq!(*cmd.warehouse_id.as_uuid(), w);
    }

    #[test]
    fn non_integer_quantities_are_non_positive() {
        for q in [json!(2.5), json!("7"), json!(null), json!(u64::MAX)] {
            let cmd = request(json!({ "quantity": q })).into_consume();
            assert_eq!(cmd.quantity, 0, "quantity {q}");
        }
        assert_eq!(request(json!({ "quantity": -4 })).into_consume().quantity, -4);
    }

    #[test]
    fn malformed_references_never_resolve() {
        let cmd = request(json!({ "warehouse": "warehouse-1", "product": 42 })).into_supply();
        assert!(cmd.warehouse_id.as_uuid().is_nil());
        assert!(cmd.product_id.as_uuid().is_nil());
    }
}
