//! PostgreSQL-backed accounts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;

use super::AccountStore;
use crate::db;
use crate::models::Account;

/// Accounts read from the `users` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an account. Used to seed the admin account at startup.
    pub async fn create(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, pass, role, created)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(account.id)
        .bind(&account.username)
        .bind(&account.pass)
        .bind(&account.role)
        .bind(account.created)
        .execute(&self.pool)
        .await
        .context("failed to create account")?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, username, pass, role, created FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch account by username")?;

        Ok(account)
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            "SELECT id, username, pass, role, created FROM users ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list accounts")?;

        Ok(accounts)
    }

    async fn healthy(&self) -> bool {
        db::check_health(&self.pool).await
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
