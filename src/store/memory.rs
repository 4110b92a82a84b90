use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::models::{CreateProduct, Product, ProductId, UpdateProduct};

use super::ProductStore;

#[derive(Debug, Default)]
struct Inventory {
    /// Last identity handed out. Never decreases, so deleted ids are not reused.
    last_id: ProductId,
    /// `IndexMap` keeps insertion order for listing.
    products: IndexMap<ProductId, Product>,
}

/// Process-local product store. All state sits behind one lock, so identity
/// assignment and every mutation are serialized.
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    inner: RwLock<Inventory>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> AppResult<Vec<Product>> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn get(&self, id: ProductId) -> AppResult<Product> {
        self.inner
            .read()
            .await
            .products
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::product_not_found(id))
    }

    async fn insert(&self, payload: &CreateProduct) -> AppResult<Product> {
        let mut inv = self.inner.write().await;
        inv.last_id += 1;
        let product = Product {
            id: inv.last_id,
            name: payload.name.clone(),
            price: payload.price,
            quantity: payload.quantity,
        };
        inv.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update(&self, id: ProductId, patch: &UpdateProduct) -> AppResult<Product> {
        let mut inv = self.inner.write().await;
        let product = inv
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::product_not_found(id))?;
        product.apply(patch);
        Ok(product.clone())
    }

    async fn delete(&self, id: ProductId) -> AppResult<()> {
        self.inner
            .write()
            .await
            .products
            .shift_remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::product_not_found(id))
    }

    async fn purchase(&self, id: ProductId, quantity: i32) -> AppResult<Product> {
        let mut inv = self.inner.write().await;
        let product = inv
            .products
            .get_mut(&id)
            .ok_or_else(|| AppError::product_not_found(id))?;
        if product.quantity < quantity {
            return Err(AppError::InsufficientStock {
                requested: quantity,
                available: product.quantity,
            });
        }
        product.quantity -= quantity;
        Ok(product.clone())
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.products.len() as i64)
    }
}

// ── Accounts (tests only) ─────────────────────────────────────────────────────

#[cfg(test)]
pub use accounts::MemoryAccountStore;
