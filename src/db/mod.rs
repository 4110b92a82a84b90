//! PostgreSQL implementations of the store traits.

mod accounts;
mod products;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub use accounts::PgAccountStore;
pub use products::PgProductStore;

/// Open the connection pool and bring the schema up to date.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    info!("Connecting to PostgreSQL...");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    info!(max_connections, "Database connection pool established.");

    info!("Running migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations complete.");

    Ok(pool)
}
