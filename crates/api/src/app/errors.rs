use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::ServiceError;
use stockroom_stock::StockError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Stock(e) => stock_error_to_response(e),
        ServiceError::Store(msg) => {
            tracing::error!(error = %msg, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

fn stock_error_to_response(err: StockError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        StockError::Forbidden(_) => json_error(StatusCode::FORBIDDEN, "forbidden", message),
        StockError::InvalidQuantity => {
            json_error(StatusCode::BAD_REQUEST, "invalid_quantity", message)
        }
        StockError::NotWarehouseOwner => {
            json_error(StatusCode::NOT_FOUND, "warehouse_not_owned", message)
        }
        StockError::InsufficientStock { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock", message)
        }
        StockError::QuantityOverflow { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "quantity_overflow", message)
        }
        StockError::Domain(DomainError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        StockError::Domain(DomainError::Validation(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        // An id that does not parse cannot name any record.
        StockError::Domain(DomainError::InvalidId(msg)) => {
            json_error(StatusCode::NOT_FOUND, "not_found", msg)
        }
        StockError::WarehouseNotFound
        | StockError::ProductNotFound
        | StockError::StockNotAvailable
        | StockError::StockNotFound => json_error(StatusCode::NOT_FOUND, "not_found", message),
    }
}

/// Body that failed to extract (bad JSON, wrong field types, missing content
/// type) in the same `{error, message}` shape as domain errors.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        rejection.body_text(),
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
