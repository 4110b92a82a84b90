use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use tracing::info;

use crate::{
    auth,
    error::AppResult,
    models::{LoginRequest, RegisterRequest},
    store::SharedAccounts,
};

// ── POST /register ────────────────────────────────────────────────────────────

pub async fn register(
    State(accounts): State<SharedAccounts>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let account = auth::register(accounts.as_ref(), req).await?;

    info!(id = account.id, username = %account.username, role = %account.role, "Registered account");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "api_key": account.api_key })),
    ))
}

// ── POST /login ───────────────────────────────────────────────────────────────

pub async fn login(
    State(accounts): State<SharedAccounts>,
    Json(req): Json<LoginRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let account = auth::login(accounts.as_ref(), req).await?;

    info!(username = %account.username, "Login succeeded");

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Login successful",
            "api_key": account.api_key,
            "role": account.role,
        })),
    ))
}
