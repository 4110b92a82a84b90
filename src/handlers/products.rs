use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{Account, BuyRequest, CreateProduct, Product, ProductId, UpdateProduct},
    store::SharedProducts,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(store): State<SharedProducts>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let start = Instant::now();
    let products = store.list().await?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok((StatusCode::OK, Json(products)))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(store): State<SharedProducts>,
    Json(payload): Json<CreateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    payload.validate()?;

    let start = Instant::now();
    let product = store.insert(&payload).await?;

    info!(
        id = product.id,
        name = %product.name,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((StatusCode::CREATED, Json(product)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(store): State<SharedProducts>,
    Path(id): Path<ProductId>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let product = store.get(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(store): State<SharedProducts>,
    Path(id): Path<ProductId>,
    Json(patch): Json<UpdateProduct>,
) -> AppResult<(StatusCode, Json<Product>)> {
    patch.validate()?;

    let start = Instant::now();
    let product = store.update(id, &patch).await?;

    info!(id, elapsed_ms = start.elapsed().as_millis(), "Updated product");

    Ok((StatusCode::OK, Json(product)))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(store): State<SharedProducts>,
    Path(id): Path<ProductId>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    store.delete(id).await?;

    info!(id, "Deleted product");

    Ok((StatusCode::OK, Json(json!({ "message": "Deleted", "id": id }))))
}

// ── Buy ───────────────────────────────────────────────────────────────────────

/// `POST /buy/:id`. An empty body or one without `quantity` buys a single
/// unit; any other body must be a valid [`BuyRequest`].
pub async fn buy_product(
    State(store): State<SharedProducts>,
    Path(id): Path<ProductId>,
    buyer: Option<Extension<Account>>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let request = parse_buy_request(&body)?;
    request.validate()?;

    let product = store.purchase(id, request.quantity).await?;

    info!(
        id,
        quantity = request.quantity,
        remaining = product.quantity,
        buyer = buyer.as_ref().map(|Extension(a)| a.username.as_str()).unwrap_or("anonymous"),
        "Purchased product"
    );

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": format!("Purchased {} item(s)", request.quantity),
            "product": product,
        })),
    ))
}

/// The body is JSON whether or not `Content-Type` says so. Only a blank body
/// falls back to one unit.
fn parse_buy_request(body: &[u8]) -> AppResult<BuyRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BuyRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("invalid buy request: {e}")))
}
