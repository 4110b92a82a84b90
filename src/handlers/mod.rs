pub mod accounts;
pub mod products;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::config::StoreBackend;

pub async fn health(backend: StoreBackend) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "shop-inventory", "store": backend.as_str() })),
    )
}
