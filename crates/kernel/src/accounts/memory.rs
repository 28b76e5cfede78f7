//! In-memory accounts for development and tests.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use super::AccountStore;
use crate::models::Account;

/// A fixed set of accounts held in memory.
///
/// Built once at startup; there is no write path.
#[derive(Debug, Default, Clone)]
pub struct StaticAccountStore {
    accounts: BTreeMap<String, Account>,
}

impl StaticAccountStore {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|a| (a.username.clone(), a))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for StaticAccountStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self.accounts.get(username).cloned())
    }

    async fn list(&self) -> Result<Vec<Account>> {
        Ok(self.accounts.values().cloned().collect())
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
