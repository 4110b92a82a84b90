use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::MAX_NAME_LEN;

/// Coarse authorization label attached to every account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered account. Not `Serialize`: the password hash stays server-side.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub api_key: String,
    pub role: Role,
}

/// A fully prepared account row, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password_hash: String,
    pub api_key: String,
    pub role: Role,
}

// ── Request payloads ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.username.trim().is_empty() {
            return Err(AppError::BadRequest("username must not be empty".to_string()));
        }
        if self.username.chars().count() > MAX_NAME_LEN {
            return Err(AppError::BadRequest(format!(
                "username must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.password.is_empty() {
            return Err(AppError::BadRequest("password must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
