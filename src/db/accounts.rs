use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};
use crate::store::AccountStore;

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        // ON CONFLICT turns a concurrent duplicate registration into an
        // empty result instead of a constraint error.
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO users (username, password_hash, api_key, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, password_hash, api_key, role
            "#,
        )
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(&account.api_key)
        .bind(account.role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::DuplicateUsername)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, api_key, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_api_key(&self, api_key: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, password_hash, api_key, role FROM users WHERE api_key = $1",
        )
        .bind(api_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

// Ignored unless run against Postgres; see `db::products` tests.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_account(username: &str, api_key: &str, role: Role) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            password_hash: "hash".to_string(),
            api_key: api_key.to_string(),
            role,
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn duplicate_username_keeps_first_row(pool: PgPool) {
        let store = PgAccountStore::new(pool);
        let first = store.insert(new_account("ana", "key-1", Role::User)).await.unwrap();
        assert_eq!(first.role, Role::User);

        let err = store.insert(new_account("ana", "key-2", Role::Admin)).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));

        let stored = store.find_by_username("ana").await.unwrap().unwrap();
        assert_eq!(stored.api_key, "key-1");
        assert_eq!(stored.role, Role::User);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a Postgres DATABASE_URL"]
    async fn lookup_by_api_key_round_trips_role(pool: PgPool) {
        let store = PgAccountStore::new(pool);
        store.insert(new_account("root", "admin-key", Role::Admin)).await.unwrap();

        let found = store.find_by_api_key("admin-key").await.unwrap().unwrap();
        assert_eq!(found.username, "root");
        assert_eq!(found.role, Role::Admin);

        assert!(store.find_by_api_key("nope").await.unwrap().is_none());
        assert!(store.find_by_username("ghost").await.unwrap().is_none());
    }
}
