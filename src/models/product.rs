use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub type ProductId = i64;

/// Longest product name or username the `VARCHAR(100)` columns accept.
pub const MAX_NAME_LEN: usize = 100;

/// Core product entity. `price` is an integer amount in minor currency units
/// (e.g. 799 = $7.99).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

impl Product {
    /// Merge a partial update into this record. Omitted fields keep their value.
    pub fn apply(&mut self, patch: &UpdateProduct) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
    }
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub price: i64,
    pub quantity: i32,
}

impl CreateProduct {
    pub fn validate(&self) -> AppResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        validate_quantity(self.quantity)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub quantity: Option<i32>,
}

impl UpdateProduct {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(quantity) = self.quantity {
            validate_quantity(quantity)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuyRequest {
    #[serde(default = "default_buy_quantity")]
    pub quantity: i32,
}

impl Default for BuyRequest {
    fn default() -> Self {
        Self {
            quantity: default_buy_quantity(),
        }
    }
}

fn default_buy_quantity() -> i32 {
    1
}

impl BuyRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.quantity <= 0 {
            return Err(AppError::BadRequest("quantity must be > 0".to_string()));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::BadRequest(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }
    Ok(())
}

fn validate_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(AppError::BadRequest("quantity must be >= 0".to_string()));
    }
    Ok(())
}
