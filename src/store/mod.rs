//! Storage seams for products and accounts.
//!
//! Handlers only ever talk to these traits; the deployment variant decides
//! whether a PostgreSQL-backed store (`crate::db`) or the process-local
//! [`MemoryProductStore`] sits behind them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{Account, CreateProduct, NewAccount, Product, ProductId, UpdateProduct};

mod memory;

pub use memory::MemoryProductStore;
#[cfg(test)]
pub use memory::MemoryAccountStore;

pub type SharedProducts = Arc<dyn ProductStore>;
pub type SharedAccounts = Arc<dyn AccountStore>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// All products, in the store's natural order.
    async fn list(&self) -> AppResult<Vec<Product>>;

    async fn get(&self, id: ProductId) -> AppResult<Product>;

    /// Assigns the next identity and persists the product.
    async fn insert(&self, payload: &CreateProduct) -> AppResult<Product>;

    /// Partial merge; fields absent from `patch` keep their stored value.
    async fn update(&self, id: ProductId, patch: &UpdateProduct) -> AppResult<Product>;

    async fn delete(&self, id: ProductId) -> AppResult<()>;

    /// Atomically takes `quantity` units out of stock.
    ///
    /// Fails with `NotFound` for an unknown id and `InsufficientStock` when
    /// fewer than `quantity` units remain, leaving the stock untouched.
    async fn purchase(&self, id: ProductId, quantity: i32) -> AppResult<Product>;

    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Stores a new account; `DuplicateUsername` if the name is taken.
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    async fn find_by_api_key(&self, api_key: &str) -> AppResult<Option<Account>>;
}
