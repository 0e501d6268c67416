use axum::{
    Router,
    routing::{get, post, put},
};

pub mod products;
pub mod stocks;
pub mod system;
pub mod warehouses;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/warehouses", post(warehouses::create_warehouse))
        .route("/products", post(products::create_product))
        .route("/stocks", get(stocks::list_stocks))
        .route("/stocks/:id", get(stocks::get_stock))
        .route("/supply", post(stocks::supply))
        .route("/consume", put(stocks::consume))
}
