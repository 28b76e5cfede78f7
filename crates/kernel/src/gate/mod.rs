//! Access gate: page-entry enforcement of the role registry.
//!
//! Each protected page visit runs a small state machine:
//!
//! ```text
//! Resolving ──► Unauthenticated ───────────────► Redirecting(login)
//!     │
//!     ├──────► Unauthorized ───────────────────► Redirecting(fallback)
//!     │
//!     └──────► Authorized (terminal)
//! ```
//!
//! The fallback for an unauthorized visit is the overview page when the role
//! can reach it, otherwise the login page, so a role that reaches nothing
//! never loops. Identity resolution errors are treated as "no identity".

mod provider;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::models::{Identity, Role};
use crate::permissions::{RoleRegistry, pages};

pub use provider::{IdentityError, IdentityProvider};

/// What the rendering layer receives for an authorized visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessContext {
    pub user: Identity,
    pub loading: bool,
    pub has_access: bool,
    pub can_manage_users: bool,
    pub is_read_only: bool,
    pub can_export_data: bool,
}

/// Why a visit is being sent elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    Unauthenticated,
    Unauthorized,
}

/// A navigation instruction for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub target: String,
    pub reason: RedirectReason,
}

/// Gate state for one page visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    /// Identity lookup in flight.
    Resolving,
    /// Resolution finished without an identity.
    Unauthenticated,
    /// Identity found, page outside its role's set.
    Unauthorized { identity: Identity },
    /// Identity found and page permitted.
    Authorized(AccessContext),
    /// The host must navigate away; nothing protected is rendered.
    Redirecting(Redirect),
}

impl GateState {
    /// `Authorized` and `Redirecting` end the cycle.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GateState::Authorized(_) | GateState::Redirecting(_))
    }

    /// Short label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            GateState::Resolving => "resolving",
            GateState::Unauthenticated => "unauthenticated",
            GateState::Unauthorized { .. } => "unauthorized",
            GateState::Authorized(_) => "authorized",
            GateState::Redirecting(_) => "redirecting",
        }
    }
}

/// Enforces registry verdicts for page visits.
#[derive(Debug, Clone)]
pub struct AccessGate {
    registry: Arc<RoleRegistry>,
    root_page: String,
    login_page: String,
}

impl AccessGate {
    /// Gate over `registry` using `/` as the root and `/login` as the login page.
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self {
            registry,
            root_page: pages::OVERVIEW.to_string(),
            login_page: pages::LOGIN.to_string(),
        }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn login_page(&self) -> &str {
        &self.login_page
    }

    /// Run a full visit: resolve identity, evaluate, advance to a terminal state.
    pub async fn resolve<P>(&self, provider: &P, page_id: &str) -> GateState
    where
        P: IdentityProvider + ?Sized,
    {
        let mut state = GateState::Resolving;

        let identity = match provider.resolve_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, page = %page_id, "identity resolution failed; treating as unauthenticated");
                None
            }
        };

        state = self.transition(state, identity, page_id);
        while !state.is_terminal() {
            state = self.advance(state);
        }
        state
    }

    /// Leave `Resolving` once the identity lookup has finished.
    ///
    /// Any other state is returned unchanged.
    pub fn transition(
        &self,
        state: GateState,
        identity: Option<Identity>,
        page_id: &str,
    ) -> GateState {
        if state != GateState::Resolving {
            return state;
        }

        match identity {
            None => GateState::Unauthenticated,
            Some(identity) if self.registry.has_page_access(identity.role, page_id) => {
                GateState::Authorized(self.context_for(identity))
            }
            Some(identity) => GateState::Unauthorized { identity },
        }
    }

    /// Move a non-terminal, post-resolution state to its redirect.
    pub fn advance(&self, state: GateState) -> GateState {
        match state {
            GateState::Unauthenticated => {
                debug!(target_page = %self.login_page, "redirecting unauthenticated visit");
                GateState::Redirecting(Redirect {
                    target: self.login_page.clone(),
                    reason: RedirectReason::Unauthenticated,
                })
            }
            GateState::Unauthorized { identity } => {
                let target = self.fallback_for(identity.role).to_string();
                debug!(
                    user = %identity.username,
                    role = ?identity.role,
                    target_page = %target,
                    "redirecting unauthorized visit"
                );
                GateState::Redirecting(Redirect {
                    target,
                    reason: RedirectReason::Unauthorized,
                })
            }
            // A visit must never stay in Resolving; fail closed.
            GateState::Resolving => GateState::Unauthenticated,
            terminal => terminal,
        }
    }

    /// Capability flags for an identity, computed now from the registry.
    ///
    /// Does not check any page. Used by JSON endpoints that only need an
    /// authenticated caller. `has_access` is false for a role that did not
    /// parse.
    pub fn context_for(&self, identity: Identity) -> AccessContext {
        let role = identity.role;
        AccessContext {
            loading: false,
            has_access: self.registry.profile(role).is_some(),
            can_manage_users: self.registry.can_manage_users(role),
            is_read_only: self.registry.is_read_only(role),
            can_export_data: self.registry.can_export_data(role),
            user: identity,
        }
    }

    /// Where an unauthorized visit goes: root if reachable, else login.
    pub fn fallback_for(&self, role: Option<Role>) -> &str {
        if self.registry.has_page_access(role, &self.root_page) {
            &self.root_page
        } else {
            &self.login_page
        }
    }
}
