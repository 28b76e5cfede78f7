//! Account records and the resolved caller identity.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::role::Role;

/// A row of the `users` table.
///
/// `role` holds the raw stored tag. It is only interpreted when an
/// [`Identity`] is built from the account.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub pass: String,
    pub role: String,
    pub created: DateTime<Utc>,
}

impl Account {
    /// Build an account with a freshly hashed password.
    pub fn new(username: &str, password: &str, role: &str) -> Result<Self> {
        Ok(Self {
            id: Uuid::now_v7(),
            username: username.to_string(),
            pass: hash_password(password)?,
            role: role.to_string(),
            created: Utc::now(),
        })
    }

    /// The stored role tag, if it is one of the known roles.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Verify a password against the stored Argon2 hash.
    pub fn verify_password(&self, password: &str) -> bool {
        if self.pass.is_empty() {
            return false;
        }

        let Ok(parsed_hash) = PasswordHash::new(&self.pass) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// The identity this account presents once logged in.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            username: self.username.clone(),
            role: self.role(),
        }
    }
}

/// The authenticated caller for the current page visit.
///
/// `role` is `None` when the stored tag was not a known role. Such an
/// identity is still authenticated but reaches no page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: Option<Role>,
}

impl Identity {
    pub fn new(id: Uuid, username: impl Into<String>, role: Option<Role>) -> Self {
        Self {
            id,
            username: username.into(),
            role,
        }
    }
}

/// Hash a password using Argon2id, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
