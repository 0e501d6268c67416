use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use stockroom_core::StockId;
use stockroom_infra::ServiceError;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub async fn list_stocks(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.list_stocks(principal.principal()).await {
        Ok(records) => Json(serde_json::Value::Array(
            records.iter().map(dto::stock_to_json).collect(),
        ))
        .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: StockId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(ServiceError::from(e)),
    };

    match services.get_stock(principal.principal(), id).await {
        Ok(rec) => Json(dto::stock_to_json(&rec)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn supply(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::StockMutationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.supply(principal.principal(), body.into_supply()).await {
        Ok(rec) => (StatusCode::OK, Json(dto::stock_to_json(&rec))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn consume(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::StockMutationRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.consume(principal.principal(), body.into_consume()).await {
        Ok(rec) => (StatusCode::OK, Json(dto::stock_to_json(&rec))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
