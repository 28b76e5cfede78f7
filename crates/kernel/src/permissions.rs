//! Role registry: the single table of what each role may do.
//!
//! Every access decision in the kernel goes through [`RoleRegistry`]. The
//! built-in table is constructed once ([`RoleRegistry::builtin`]) and never
//! mutated; the free functions at the bottom of this module query it
//! directly.
//!
//! Lookups take `Option<Role>`. `None` stands for a tag that did not parse
//! and always yields the restrictive answer: no pages, read-only, no export,
//! no user management.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use serde::Serialize;

use crate::models::Role;

/// Page identifiers of the built-in catalogue.
pub mod pages {
    pub const OVERVIEW: &str = "/";
    pub const STRATEGIC_EXECUTIVE: &str = "/strategic-executive";
    pub const BUSINESS_FLOW: &str = "/business-flow";
    pub const DEPOSIT: &str = "/transaction/deposit";
    pub const WITHDRAWAL: &str = "/transaction/withdrawal";
    pub const EXCHANGE_RATE: &str = "/transaction/exchange-rate";
    pub const HEADCOUNT: &str = "/transaction/headcount";
    pub const MEMBER_REPORT: &str = "/transaction/member-report";
    pub const BGO: &str = "/bgo";
    pub const OS: &str = "/os";
    pub const SR: &str = "/sr";
    pub const XOO: &str = "/xoo";
    /// Reached through the `can_manage_users` capability, never listed in a
    /// page set.
    pub const USERS: &str = "/users";
    pub const LOGIN: &str = "/login";
    pub const LOGOUT: &str = "/logout";
    pub const HEALTH: &str = "/health";
    pub const METRICS: &str = "/metrics";

    /// JSON endpoints check authentication themselves.
    pub const API_PREFIX: &str = "/api/";
    pub const STATIC_PREFIX: &str = "/static/";

    /// Every `/transaction/*` page.
    pub const TRANSACTIONS: [&str; 5] = [DEPOSIT, WITHDRAWAL, EXCHANGE_RATE, HEADCOUNT, MEMBER_REPORT];

    /// Paths served without a page-entry check.
    pub fn is_public(path: &str) -> bool {
        matches!(path, LOGIN | LOGOUT | HEALTH | METRICS)
            || path.starts_with(API_PREFIX)
            || path.starts_with(STATIC_PREFIX)
    }
}

/// The pages a role may navigate to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSet {
    /// Every page, present and future.
    All,
    /// An explicit list of page identifiers.
    Only(BTreeSet<String>),
}

impl PageSet {
    /// Build an explicit set from page identifiers.
    pub fn only<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PageSet::Only(pages.into_iter().map(Into::into).collect())
    }

    /// An explicit set with no members.
    pub fn none() -> Self {
        PageSet::Only(BTreeSet::new())
    }

    pub fn contains(&self, page_id: &str) -> bool {
        match self {
            PageSet::All => true,
            PageSet::Only(pages) => pages.contains(page_id),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, PageSet::All)
    }
}

/// Access rules attached to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleProfile {
    pub permitted_pages: PageSet,
    pub can_manage_users: bool,
    pub is_read_only: bool,
    pub can_export_data: bool,
}

impl RoleProfile {
    /// The built-in profile for a role.
    ///
    /// Only admin manages users, and only admin holds the wildcard.
    pub fn builtin(role: Role) -> Self {
        use pages::*;

        let leadership = || PageSet::only([OVERVIEW, STRATEGIC_EXECUTIVE, BUSINESS_FLOW]);
        let floor = || {
            PageSet::only(
                [OVERVIEW, BUSINESS_FLOW]
                    .into_iter()
                    .chain(TRANSACTIONS)
                    .chain([BGO, OS, SR, XOO]),
            )
        };

        match role {
            Role::Admin => Self {
                permitted_pages: PageSet::All,
                can_manage_users: true,
                is_read_only: false,
                can_export_data: true,
            },
            Role::Manager | Role::Executive => Self {
                permitted_pages: leadership(),
                can_manage_users: false,
                is_read_only: true,
                can_export_data: true,
            },
            Role::Operator => Self {
                permitted_pages: floor(),
                can_manage_users: false,
                is_read_only: false,
                can_export_data: true,
            },
            Role::User => Self {
                permitted_pages: floor(),
                can_manage_users: false,
                is_read_only: false,
                can_export_data: false,
            },
        }
    }
}

/// Immutable role → profile table.
///
/// Total over [`Role`]: construction fills every role, and overrides only
/// replace an existing entry.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    profiles: HashMap<Role, RoleProfile>,
}

static BUILTIN: LazyLock<RoleRegistry> = LazyLock::new(RoleRegistry::new);

impl RoleRegistry {
    /// Create a registry holding the built-in profiles.
    pub fn new() -> Self {
        Self {
            profiles: Role::ALL
                .into_iter()
                .map(|role| (role, RoleProfile::builtin(role)))
                .collect(),
        }
    }

    /// The process-wide built-in registry.
    pub fn builtin() -> &'static RoleRegistry {
        &BUILTIN
    }

    /// Replace one role's profile. Used to assemble registries at startup
    /// and in tests; there is no way to change a registry once shared.
    pub fn with_profile(mut self, role: Role, profile: RoleProfile) -> Self {
        self.profiles.insert(role, profile);
        self
    }

    /// The profile for a known role.
    pub fn profile(&self, role: Option<Role>) -> Option<&RoleProfile> {
        role.and_then(|r| self.profiles.get(&r))
    }

    /// Whether `role` may open `page_id`. Unknown roles reach nothing.
    pub fn has_page_access(&self, role: Option<Role>, page_id: &str) -> bool {
        self.profile(role)
            .is_some_and(|p| p.permitted_pages.contains(page_id))
    }

    /// Unknown roles never manage users.
    pub fn can_manage_users(&self, role: Option<Role>) -> bool {
        self.profile(role).is_some_and(|p| p.can_manage_users)
    }

    /// Unknown roles are read-only.
    pub fn is_read_only(&self, role: Option<Role>) -> bool {
        self.profile(role).is_none_or(|p| p.is_read_only)
    }

    /// Unknown roles cannot export.
    pub fn can_export_data(&self, role: Option<Role>) -> bool {
        self.profile(role).is_some_and(|p| p.can_export_data)
    }

    /// Whether the role's page set is the wildcard.
    pub fn has_wildcard(&self, role: Option<Role>) -> bool {
        self.profile(role)
            .is_some_and(|p| p.permitted_pages.is_wildcard())
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// [`RoleRegistry::has_page_access`] on the built-in registry.
pub fn has_page_access(role: Option<Role>, page_id: &str) -> bool {
    RoleRegistry::builtin().has_page_access(role, page_id)
}

/// [`RoleRegistry::can_manage_users`] on the built-in registry.
pub fn can_manage_users(role: Option<Role>) -> bool {
    RoleRegistry::builtin().can_manage_users(role)
}

/// [`RoleRegistry::is_read_only`] on the built-in registry.
pub fn is_read_only(role: Option<Role>) -> bool {
    RoleRegistry::builtin().is_read_only(role)
}

/// [`RoleRegistry::can_export_data`] on the built-in registry.
pub fn can_export_data(role: Option<Role>) -> bool {
    RoleRegistry::builtin().can_export_data(role)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::pages::*;
    use super::*;

    const SAMPLE_PAGES: [&str; 15] = [
        OVERVIEW,
        STRATEGIC_EXECUTIVE,
        BUSINESS_FLOW,
        DEPOSIT,
        WITHDRAWAL,
        EXCHANGE_RATE,
        HEADCOUNT,
        MEMBER_REPORT,
        BGO,
        OS,
        SR,
        XOO,
        USERS,
        "/does-not-exist",
        "",
    ];

    #[test]
    fn public_paths_skip_the_gate() {
        assert!(pages::is_public("/login"));
        assert!(pages::is_public("/api/session"));
        assert!(pages::is_public("/static/app.css"));
        assert!(!pages::is_public("/"));
        assert!(!pages::is_public("/users"));
        assert!(!pages::is_public("/loginx"));
    }

    #[test]
    fn every_role_has_a_profile() {
        let registry = RoleRegistry::new();
        for role in Role::ALL {
            assert!(registry.profile(Some(role)).is_some(), "{role} missing");
            // Queries answer for every page without panicking.
            for page in SAMPLE_PAGES {
                let _ = registry.has_page_access(Some(role), page);
            }
            let _ = registry.can_manage_users(Some(role));
            let _ = registry.is_read_only(Some(role));
            let _ = registry.can_export_data(Some(role));
        }
    }

    #[test]
    fn unknown_role_fails_closed() {
        for page in SAMPLE_PAGES {
            assert!(!has_page_access(None, page));
        }
        assert!(!can_manage_users(None));
        assert!(is_read_only(None));
        assert!(!can_export_data(None));
        assert!(!has_page_access(Role::parse("garbage"), OVERVIEW));
    }

    #[test]
    fn admin_reaches_everything() {
        for page in SAMPLE_PAGES {
            assert!(has_page_access(Some(Role::Admin), page), "{page}");
        }
        assert!(can_manage_users(Some(Role::Admin)));
        assert!(!is_read_only(Some(Role::Admin)));
        assert!(can_export_data(Some(Role::Admin)));
    }

    #[test]
    fn leadership_roles_see_three_pages() {
        let allowed = [OVERVIEW, STRATEGIC_EXECUTIVE, BUSINESS_FLOW];
        for role in [Role::Manager, Role::Executive] {
            for page in SAMPLE_PAGES {
                assert_eq!(
                    has_page_access(Some(role), page),
                    allowed.contains(&page),
                    "{role} on {page}"
                );
            }
            assert!(!has_page_access(Some(role), USERS));
            assert!(!has_page_access(Some(role), DEPOSIT));
        }
    }

    #[test]
    fn operator_and_user_share_pages() {
        let registry = RoleRegistry::new();
        let operator = registry.profile(Some(Role::Operator)).unwrap();
        let user = registry.profile(Some(Role::User)).unwrap();
        assert_eq!(operator.permitted_pages, user.permitted_pages);

        for role in [Role::Operator, Role::User] {
            assert!(!can_manage_users(Some(role)));
            for page in TRANSACTIONS.into_iter().chain([BGO, OS, SR, XOO]) {
                assert!(has_page_access(Some(role), page), "{role} on {page}");
            }
            assert!(!has_page_access(Some(role), USERS));
        }
    }

    #[test]
    fn managing_users_implies_wildcard() {
        let registry = RoleRegistry::new();
        for role in Role::ALL {
            if registry.can_manage_users(Some(role)) {
                assert!(registry.has_wildcard(Some(role)), "{role}");
            }
        }
    }

    #[test]
    fn override_replaces_single_profile() {
        let empty = RoleProfile {
            permitted_pages: PageSet::none(),
            can_manage_users: false,
            is_read_only: true,
            can_export_data: false,
        };
        let registry = RoleRegistry::new().with_profile(Role::Operator, empty);

        assert!(!registry.has_page_access(Some(Role::Operator), OVERVIEW));
        assert!(registry.has_page_access(Some(Role::User), OVERVIEW));
        // The shared built-in table is untouched.
        assert!(has_page_access(Some(Role::Operator), OVERVIEW));
    }
}
