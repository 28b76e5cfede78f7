//! Role tags.
//!
//! Roles are a closed set. Strings coming from the session or the account
//! store are parsed at the boundary with [`Role::parse`]; anything outside the
//! five known tags becomes `None` and every downstream check fails closed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An account's permission level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Executive,
    Operator,
    User,
}

/// Returned by [`Role::from_str`] for a tag outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Executive,
        Role::Operator,
        Role::User,
    ];

    /// The tag stored in sessions and in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Executive => "executive",
            Role::Operator => "operator",
            Role::User => "user",
        }
    }

    /// Parse a stored tag. Matching is exact: `"Admin"` is not `admin`.
    pub fn parse(tag: &str) -> Option<Role> {
        tag.parse().ok()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
