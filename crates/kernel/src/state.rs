//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::accounts::{AccountStore, PgAccountStore, StaticAccountStore};
use crate::config::Config;
use crate::db;
use crate::gate::AccessGate;
use crate::menu::{MasterMenu, MenuNode, MenuProjector};
use crate::metrics::Metrics;
use crate::models::{Account, Role};
use crate::permissions::RoleRegistry;
use crate::theme::ThemeEngine;

/// Name of the account seeded from `SEED_ADMIN_PASSWORD`.
pub const SEED_ADMIN_USERNAME: &str = "admin";

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Role profiles, fixed at startup.
    registry: Arc<RoleRegistry>,

    /// Validated master menu, fixed at startup.
    menu: Arc<MasterMenu>,

    /// Page-entry enforcement over `registry`.
    gate: AccessGate,

    /// Theme engine for template rendering.
    theme: Arc<ThemeEngine>,

    /// Account lookup for login and the user listing.
    accounts: Arc<dyn AccountStore>,

    /// Prometheus metrics.
    metrics: Arc<Metrics>,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Connects to PostgreSQL and runs migrations when `DATABASE_URL` is set;
    /// otherwise accounts live in memory.
    pub async fn new(config: &Config) -> Result<Self> {
        let menu = match &config.menu_file {
            Some(path) => MasterMenu::load(path)?,
            None => MasterMenu::builtin(),
        };
        info!(entries = menu.nodes().len(), "master menu ready");

        let theme = match &config.templates_dir {
            Some(dir) => ThemeEngine::new(dir)?,
            None => ThemeEngine::builtin()?,
        };

        let accounts: Arc<dyn AccountStore> = match &config.database_url {
            Some(url) => {
                let pool = db::create_pool(url, config.database_max_connections)
                    .await
                    .context("failed to create database pool")?;

                db::run_migrations(&pool)
                    .await
                    .context("failed to run migrations")?;

                let store = PgAccountStore::new(pool);
                if let Some(password) = &config.seed_admin_password {
                    seed_admin(&store, password).await?;
                }
                Arc::new(store)
            }
            None => {
                let seed = match &config.seed_admin_password {
                    Some(password) => vec![Account::new(
                        SEED_ADMIN_USERNAME,
                        password,
                        Role::Admin.as_str(),
                    )?],
                    None => Vec::new(),
                };
                let store = StaticAccountStore::new(seed);
                if store.is_empty() {
                    warn!("no DATABASE_URL or SEED_ADMIN_PASSWORD; nobody can log in");
                } else {
                    info!(accounts = store.len(), "seeded in-memory accounts");
                }
                Arc::new(store)
            }
        };
        info!(backend = accounts.backend(), "account store ready");

        Ok(Self::from_parts(
            RoleRegistry::new(),
            menu,
            theme,
            accounts,
        ))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        registry: RoleRegistry,
        menu: MasterMenu,
        theme: ThemeEngine,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        let registry = Arc::new(registry);
        Self {
            inner: Arc::new(AppStateInner {
                gate: AccessGate::new(Arc::clone(&registry)),
                registry,
                menu: Arc::new(menu),
                theme: Arc::new(theme),
                accounts,
                metrics: Arc::new(Metrics::new()),
            }),
        }
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.inner.registry
    }

    pub fn menu(&self) -> &MasterMenu {
        &self.inner.menu
    }

    pub fn gate(&self) -> &AccessGate {
        &self.inner.gate
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    pub fn accounts(&self) -> &dyn AccountStore {
        self.inner.accounts.as_ref()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Where a freshly logged-in role lands.
    ///
    /// The gate fallback when it is a real page, otherwise the first page of
    /// the master menu the role may open. `None` when the role reaches no
    /// page at all.
    pub fn landing_page(&self, role: Option<Role>) -> Option<String> {
        let fallback = self.gate().fallback_for(role);
        if fallback != self.gate().login_page() {
            return Some(fallback.to_string());
        }

        self.menu()
            .leaves()
            .chain(std::iter::once(self.menu().user_management()))
            .find(|leaf| self.registry().has_page_access(role, &leaf.page_id))
            .map(|leaf| leaf.page_id.clone())
    }

    /// The menu a role sees.
    pub fn project_menu(&self, role: Option<Role>) -> Vec<MenuNode> {
        MenuProjector::new(self.registry(), self.menu()).project(role)
    }
}

/// Create the seed admin unless an account with that name already exists.
async fn seed_admin(store: &PgAccountStore, password: &str) -> Result<()> {
    if store.find_by_username(SEED_ADMIN_USERNAME).await?.is_some() {
        return Ok(());
    }

    let account = Account::new(SEED_ADMIN_USERNAME, password, Role::Admin.as_str())?;
    store.create(&account).await?;
    info!(username = SEED_ADMIN_USERNAME, "seeded admin account");
    Ok(())
}
