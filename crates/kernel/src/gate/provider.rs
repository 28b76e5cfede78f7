//! Identity provider seam.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Identity;

/// Failure to look up the caller's identity.
///
/// The gate never propagates this; it treats the visit as unauthenticated.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity transport failed: {0}")]
    Transport(String),

    #[error("malformed identity marker {key:?}")]
    Malformed { key: &'static str },
}

/// Resolves the current caller.
///
/// Called once per protected page visit. Implementations must be idempotent
/// and must not create identities; `Ok(None)` means "not logged in".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve_identity(&self) -> Result<Option<Identity>, IdentityError>;
}
