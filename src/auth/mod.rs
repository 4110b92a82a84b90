//! API-key authentication, role authorization and account lifecycle.
//!
//! Gated routes carry a [`RoleGate`] as a route layer. The gate resolves the
//! `X-API-KEY` header to an [`Account`], checks its role against the route's
//! allowed set and stores the account in the request extensions for the
//! handler.

mod password;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Account, LoginRequest, NewAccount, RegisterRequest, Role};
use crate::store::{AccountStore, SharedAccounts};

pub const API_KEY_HEADER: &str = "x-api-key";

pub const ADMIN_ONLY: &[Role] = &[Role::Admin];
pub const USER_ONLY: &[Role] = &[Role::User];
pub const ANY_ROLE: &[Role] = &[Role::Admin, Role::User];

// ── Role gate ─────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RoleGate {
    accounts: SharedAccounts,
    allowed: &'static [Role],
}

impl RoleGate {
    pub fn new(accounts: SharedAccounts, allowed: &'static [Role]) -> Self {
        Self { accounts, allowed }
    }

    /// Resolve an API key to an account allowed through this gate.
    pub async fn authorize(&self, api_key: Option<&str>) -> AppResult<Account> {
        let api_key = match api_key {
            Some(key) if !key.is_empty() => key,
            _ => return Err(AppError::MissingCredential),
        };

        let account = self
            .accounts
            .find_by_api_key(api_key)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !self.allowed.contains(&account.role) {
            debug!(username = %account.username, role = %account.role, "Role not allowed");
            return Err(AppError::Forbidden);
        }
        Ok(account)
    }

    /// Put this gate in front of every handler registered on `route` so far.
    pub fn guard<S>(&self, route: MethodRouter<S>) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        route.route_layer(middleware::from_fn_with_state(self.clone(), require_role))
    }
}

/// Middleware body behind [`RoleGate::guard`].
pub async fn require_role(
    State(gate): State<RoleGate>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let api_key = match req.headers().get(API_KEY_HEADER) {
        Some(value) => Some(value.to_str().map_err(|_| AppError::Unauthorized)?),
        None => None,
    };

    let account = gate.authorize(api_key).await?;
    req.extensions_mut().insert(account);
    Ok(next.run(req).await)
}

// ── Accounts ──────────────────────────────────────────────────────────────────

pub fn generate_api_key() -> String {
    Uuid::new_v4().to_string()
}

/// Create an account with a hashed password and a fresh API key.
pub async fn register(accounts: &dyn AccountStore, req: RegisterRequest) -> AppResult<Account> {
    req.validate()?;

    // Skip the hashing cost for names that are obviously taken; the insert
    // still rejects a concurrent duplicate.
    if accounts.find_by_username(&req.username).await?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let password_hash = password::hash_password_blocking(req.password).await?;
    accounts
        .insert(NewAccount {
            username: req.username,
            password_hash,
            api_key: generate_api_key(),
            role: req.role,
        })
        .await
}

/// Verify credentials and return the stored account. The API key is never
/// reissued here.
pub async fn login(accounts: &dyn AccountStore, req: LoginRequest) -> AppResult<Account> {
    let Some(account) = accounts.find_by_username(&req.username).await? else {
        // Same Argon2 cost as a wrong password, so timing does not reveal
        // which usernames exist.
        password::verify_password_blocking(req.password, password::dummy_hash().await?).await?;
        return Err(AppError::InvalidCredentials);
    };

    let matches =
        password::verify_password_blocking(req.password, account.password_hash.clone()).await?;
    if !matches {
        return Err(AppError::InvalidCredentials);
    }
    Ok(account)
}
