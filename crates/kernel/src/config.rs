//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL. When None, accounts live in memory.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Redis connection URL for sessions. When None, sessions live in memory.
    pub redis_url: Option<String>,

    /// Cookie SameSite policy: "strict", "lax", or "none" (default: "strict").
    pub cookie_same_site: String,

    /// Send the session cookie only over HTTPS (default: true).
    pub cookie_secure: bool,

    /// Session inactivity expiry in hours (default: 24).
    pub session_expiry_hours: i64,

    /// Master menu override (YAML, or JSON by extension).
    pub menu_file: Option<PathBuf>,

    /// Template override directory.
    pub templates_dir: Option<PathBuf>,

    /// Password for an `admin` account seeded into the in-memory store.
    pub seed_admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = non_empty("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = non_empty("DATABASE_URL");

        let database_max_connections = non_empty("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let redis_url = non_empty("REDIS_URL");

        let cookie_same_site = non_empty("COOKIE_SAME_SITE")
            .unwrap_or_else(|| "strict".to_string())
            .to_lowercase();

        let cookie_secure = match non_empty("COOKIE_SECURE") {
            Some(v) => parse_bool(&v).context("COOKIE_SECURE must be true or false")?,
            None => true,
        };

        let session_expiry_hours: i64 = non_empty("SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|| "24".to_string())
            .parse()
            .context("SESSION_EXPIRY_HOURS must be a valid integer")?;
        anyhow::ensure!(
            session_expiry_hours > 0,
            "SESSION_EXPIRY_HOURS must be positive"
        );

        let menu_file = non_empty("MENU_FILE").map(PathBuf::from);
        let templates_dir = non_empty("TEMPLATES_DIR").map(PathBuf::from);
        let seed_admin_password = non_empty("SEED_ADMIN_PASSWORD");

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            redis_url,
            cookie_same_site,
            cookie_secure,
            session_expiry_hours,
            menu_file,
            templates_dir,
            seed_admin_password,
        })
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("not a boolean: {other}"),
    }
}
