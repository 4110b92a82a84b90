use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod seed;
mod store;
#[cfg(test)]
mod test_support;

use crate::auth::{RoleGate, ADMIN_ONLY, ANY_ROLE, USER_ONLY};
use crate::config::{Config, StoreBackend};
use crate::db::{PgAccountStore, PgProductStore};
use crate::handlers::{accounts, products};
use crate::store::{MemoryProductStore, SharedAccounts, SharedProducts};

/// State of the persistent variant. Handlers extract the half they need.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub products: SharedProducts,
    pub accounts: SharedAccounts,
}

const DEFAULT_LOG_FILTER: &str = "info,shop_inventory=debug";

/// `RUST_LOG` when set, otherwise [`DEFAULT_LOG_FILTER`].
fn env_filter() -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| DEFAULT_LOG_FILTER.parse())?;
    Ok(filter)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    info!(store = %config.backend, "Starting shop-inventory");

    let app = match config.backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
            let pool = db::connect(database_url, config.max_connections).await?;

            let products: SharedProducts = Arc::new(PgProductStore::new(pool.clone()));
            let accounts: SharedAccounts = Arc::new(PgAccountStore::new(pool));
            if config.seed_catalog {
                seed::seed_catalog(products.as_ref()).await?;
            }
            build_router(AppState { products, accounts })
        }
        StoreBackend::Memory => {
            let products: SharedProducts = Arc::new(MemoryProductStore::new());
            if config.seed_catalog {
                seed::seed_catalog(products.as_ref()).await?;
            }
            info!("In-memory store: data is lost on restart and no authentication is applied");
            build_volatile_router(products)
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Persistent variant: every product route sits behind a role gate.
pub fn build_router(state: AppState) -> Router {
    let admin = RoleGate::new(state.accounts.clone(), ADMIN_ONLY);
    let anyone = RoleGate::new(state.accounts.clone(), ANY_ROLE);
    let buyer = RoleGate::new(state.accounts.clone(), USER_ONLY);

    Router::new()
        // ── Health ──────────────────────────────────────────────────────────
        .route("/health", get(|| handlers::health(StoreBackend::Postgres)))

        // ── Products (gated per method) ─────────────────────────────────────
        .route(
            "/products",
            anyone
                .guard(get(products::list_products))
                .merge(admin.guard(post(products::create_product))),
        )
        .route(
            "/products/:id",
            anyone.guard(get(products::get_product)).merge(
                admin.guard(put(products::update_product).delete(products::delete_product)),
            ),
        )
        .route("/buy/:id", buyer.guard(post(products::buy_product)))

        // ── Accounts ────────────────────────────────────────────────────────
        .route("/register", post(accounts::register))
        .route("/login", post(accounts::login))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Volatile variant: product routes only, no authentication.
pub fn build_volatile_router(products: SharedProducts) -> Router {
    Router::new()
        .route("/health", get(|| handlers::health(StoreBackend::Memory)))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/buy/:id", post(products::buy_product))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(products)
}
