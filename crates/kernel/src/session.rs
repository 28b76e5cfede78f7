//! Session layer and session-backed identity markers.
//!
//! Login writes three markers into the session (`user_id`, `username`,
//! `role`). [`SessionIdentityProvider`] reads them back on every protected
//! visit; the kernel never re-reads the account store to resolve identity.

use anyhow::{Context, Result};
use async_trait::async_trait;
use fred::prelude::*;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer, SessionStore};
use tower_sessions_redis_store::RedisStore;
use uuid::Uuid;

use crate::config::Config;
use crate::gate::{IdentityError, IdentityProvider};
use crate::models::{Identity, Role};

/// Session key for the account id.
pub const SESSION_USER_ID: &str = "user_id";

/// Session key for the account name.
pub const SESSION_USERNAME: &str = "username";

/// Session key for the raw role tag.
pub const SESSION_ROLE: &str = "role";

/// Create a session layer backed by Redis.
pub async fn create_redis_session_layer(
    redis_url: &str,
    config: &Config,
) -> Result<SessionManagerLayer<RedisStore<Pool>>> {
    let redis_config = fred::prelude::Config::from_url(redis_url).context("failed to parse Redis URL")?;

    let pool = Builder::from_config(redis_config)
        .build_pool(1)
        .context("failed to create Redis pool")?;

    pool.init()
        .await
        .context("failed to connect to Redis for sessions")?;

    Ok(configure(SessionManagerLayer::new(RedisStore::new(pool)), config))
}

/// Create a session layer that keeps sessions in process memory.
///
/// Sessions do not survive a restart. Used when `REDIS_URL` is unset and in tests.
pub fn create_memory_session_layer(config: &Config) -> SessionManagerLayer<MemoryStore> {
    configure(SessionManagerLayer::new(MemoryStore::default()), config)
}

fn configure<S: SessionStore>(layer: SessionManagerLayer<S>, config: &Config) -> SessionManagerLayer<S> {
    layer
        .with_secure(config.cookie_secure)
        .with_http_only(true)
        .with_same_site(same_site(&config.cookie_same_site))
        .with_expiry(Expiry::OnInactivity(Duration::hours(config.session_expiry_hours)))
}

/// Map a configured policy name to a cookie SameSite value. Unknown names are strict.
pub fn same_site(policy: &str) -> SameSite {
    match policy {
        "lax" => SameSite::Lax,
        "none" => SameSite::None,
        _ => SameSite::Strict,
    }
}

/// Write the identity markers after a successful login.
///
/// The session id is cycled first so a pre-login id cannot be reused.
pub async fn store_identity(session: &Session, user_id: Uuid, username: &str, role: &str) -> Result<()> {
    session
        .cycle_id()
        .await
        .context("failed to cycle session id")?;
    session
        .insert(SESSION_USER_ID, user_id)
        .await
        .context("failed to insert user_id into session")?;
    session
        .insert(SESSION_USERNAME, username)
        .await
        .context("failed to insert username into session")?;
    session
        .insert(SESSION_ROLE, role)
        .await
        .context("failed to insert role into session")?;
    Ok(())
}

/// Drop the session and its markers.
pub async fn clear_identity(session: &Session) -> Result<()> {
    session.flush().await.context("failed to flush session")
}

fn transport(e: impl std::fmt::Display) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

/// Identity provider over the request's session.
pub struct SessionIdentityProvider<'a> {
    session: &'a Session,
}

impl<'a> SessionIdentityProvider<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentityProvider<'_> {
    async fn resolve_identity(&self) -> Result<Option<Identity>, IdentityError> {
        let Some(user_id) = self
            .session
            .get::<Uuid>(SESSION_USER_ID)
            .await
            .map_err(transport)?
        else {
            return Ok(None);
        };

        let username: String = self
            .session
            .get(SESSION_USERNAME)
            .await
            .map_err(transport)?
            .ok_or(IdentityError::Malformed {
                key: SESSION_USERNAME,
            })?;

        let tag: String = self
            .session
            .get(SESSION_ROLE)
            .await
            .map_err(transport)?
            .ok_or(IdentityError::Malformed { key: SESSION_ROLE })?;

        let role = Role::parse(&tag);
        if role.is_none() {
            tracing::warn!(user = %username, role = %tag, "session carries unknown role tag");
        }

        Ok(Some(Identity::new(user_id, username, role)))
    }
}
