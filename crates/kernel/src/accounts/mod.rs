//! Account storage.
//!
//! Login is the only place that reads accounts. All reads go through
//! [`AccountStore`] so the kernel can run against PostgreSQL in production
//! and against an in-memory table in development and tests.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

pub use memory::StaticAccountStore;
pub use postgres::PgAccountStore;

use crate::models::Account;

/// Read access to the `users` table or its stand-in.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by exact username.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// All accounts, ordered by username.
    async fn list(&self) -> Result<Vec<Account>>;

    /// Whether the backing store is reachable.
    async fn healthy(&self) -> bool;

    /// Backend name for health output and logs.
    fn backend(&self) -> &'static str;
}
