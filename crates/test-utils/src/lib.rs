//! Dashgate test utilities.
//!
//! Fixtures for integration testing: accounts with cheap password hashes,
//! identities, and an identity provider whose answer is fixed up front.

use std::sync::atomic::{AtomicUsize, Ordering};

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use dashgate_kernel::gate::{IdentityError, IdentityProvider};
use dashgate_kernel::models::{Account, Identity, Role};

/// Password shared by every fixture account.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// Role tag no build of the registry knows about.
pub const UNKNOWN_ROLE_TAG: &str = "auditor";

/// Build an account with a fast Argon2 hash.
///
/// Production uses the default Argon2 parameters, which are too slow to
/// run once per fixture.
///
/// # Panics
///
/// Panics if hashing fails.
#[allow(clippy::expect_used)]
pub fn test_account(username: &str, password: &str, role_tag: &str) -> Account {
    let salt = SaltString::generate(&mut OsRng);
    let params = argon2::Params::new(
        4 * 1024, // 4 MiB
        1,        // 1 iteration
        1,        // 1 lane
        None,
    )
    .expect("test Argon2 params are valid");
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
    let pass = argon2
        .hash_password(password.as_bytes(), &salt)
        .expect("failed to hash password")
        .to_string();

    Account {
        id: Uuid::now_v7(),
        username: username.to_string(),
        pass,
        role: role_tag.to_string(),
        created: Utc::now(),
    }
}

/// One account per known role, named after the role, plus `ghost` whose
/// tag is [`UNKNOWN_ROLE_TAG`]. All use [`TEST_PASSWORD`].
pub fn standard_accounts() -> Vec<Account> {
    Role::ALL
        .iter()
        .map(|role| test_account(role.as_str(), TEST_PASSWORD, role.as_str()))
        .chain(std::iter::once(test_account(
            "ghost",
            TEST_PASSWORD,
            UNKNOWN_ROLE_TAG,
        )))
        .collect()
}

/// An identity for `role`, named after it.
pub fn test_identity(role: Option<Role>) -> Identity {
    let username = role.map_or("nobody", |r| r.as_str());
    Identity::new(Uuid::now_v7(), username, role)
}

enum Script {
    Found(Identity),
    Missing,
    Failing,
}

/// Identity provider with a fixed answer that counts how often it is asked.
pub struct ScriptedIdentityProvider {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedIdentityProvider {
    /// Always resolves to `identity`.
    pub fn found(identity: Identity) -> Self {
        Self::with(Script::Found(identity))
    }

    /// Always resolves to no identity.
    pub fn missing() -> Self {
        Self::with(Script::Missing)
    }

    /// Always fails with a transport error.
    pub fn failing() -> Self {
        Self::with(Script::Failing)
    }

    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of resolutions so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    async fn resolve_identity(&self) -> Result<Option<Identity>, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Found(identity) => Ok(Some(identity.clone())),
            Script::Missing => Ok(None),
            Script::Failing => Err(IdentityError::Transport("scripted failure".to_string())),
        }
    }
}
