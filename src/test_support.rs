//! Helpers for driving the routers in tests without a database.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{self, API_KEY_HEADER};
use crate::models::{RegisterRequest, Role};
use crate::store::{MemoryAccountStore, MemoryProductStore};
use crate::{build_router, build_volatile_router, AppState};

/// Send one request and decode the JSON body (`Null` when empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    match body {
        Some(json) => {
            send_raw(app, method, uri, api_key, Some("application/json"), &json.to_string()).await
        }
        None => send_raw(app, method, uri, api_key, None, "").await,
    }
}

/// Like [`send`], with the body text and `Content-Type` given verbatim.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    api_key: Option<&str>,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = api_key {
        builder = builder.header(API_KEY_HEADER, key);
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub fn volatile_app() -> Router {
    build_volatile_router(Arc::new(MemoryProductStore::new()))
}

/// Gated router over in-memory stores with one admin and one user registered.
pub struct PersistentApp {
    pub router: Router,
    pub admin_key: String,
    pub user_key: String,
}

impl PersistentApp {
    pub const ADMIN: &'static str = "root";
    pub const USER: &'static str = "ana";
    pub const PASSWORD: &'static str = "correct horse";

    pub async fn new() -> Self {
        let accounts = Arc::new(MemoryAccountStore::new());

        let mut keys = Vec::new();
        for (username, role) in [(Self::ADMIN, Role::Admin), (Self::USER, Role::User)] {
            let account = auth::register(
                accounts.as_ref(),
                RegisterRequest {
                    username: username.to_string(),
                    password: Self::PASSWORD.to_string(),
                    role,
                },
            )
            .await
            .unwrap();
            keys.push(account.api_key);
        }
        let user_key = keys.pop().unwrap();
        let admin_key = keys.pop().unwrap();

        let router = build_router(AppState {
            products: Arc::new(MemoryProductStore::new()),
            accounts,
        });

        Self {
            router,
            admin_key,
            user_key,
        }
    }
}
