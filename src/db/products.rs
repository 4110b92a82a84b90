use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{CreateProduct, Product, ProductId, UpdateProduct};
use crate::store::ProductStore;

/// Products in the `products` table. Identities come from its `BIGSERIAL`.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, quantity FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn get(&self, id: ProductId) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            "SELECT id, name, price, quantity FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))
    }

    async fn insert(&self, payload: &CreateProduct) -> AppResult<Product> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, price, quantity)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, quantity
            "#,
        )
        .bind(&payload.name)
        .bind(payload.price)
        .bind(payload.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    async fn update(&self, id: ProductId, patch: &UpdateProduct) -> AppResult<Product> {
        // NULL parameters keep the stored column value.
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name     = COALESCE($1, name),
                price    = COALESCE($2, price),
                quantity = COALESCE($3, quantity)
            WHERE id = $4
            RETURNING id, name, price, quantity
            "#,
        )
        .bind(patch.name.as_deref())
        .bind(patch.price)
        .bind(patch.quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::product_not_found(id))
    }

    async fn delete(&self, id: ProductId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::product_not_found(id));
        }
        Ok(())
    }

    async fn purchase(&self, id: ProductId, quantity: i32) -> AppResult<Product> {
        loop {
            // The stock check and the decrement are one statement, so
            // concurrent buyers cannot both pass the check.
            let updated = sqlx::query_as::<_, Product>(
                r#"
                UPDATE products
                SET quantity = quantity - $1
                WHERE id = $2 AND quantity >= $1
                RETURNING id, name, price, quantity
                "#,
            )
            .bind(quantity)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(product) = updated {
                return Ok(product);
            }

            // No row: either the product is gone or stock is short. A restock
            // between the two statements can make the stock sufficient again.
            let current = self.get(id).await?;
            if current.quantity < quantity {
                return Err(AppError::InsufficientStock {
                    requested: quantity,
                    available: current.quantity,
                });
            }
            debug!(id, quantity, available = current.quantity, "Stock changed during purchase, retrying");
        }
    }

    async fn count(&self) -> AppResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }
}
