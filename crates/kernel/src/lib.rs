//! Dashgate kernel library.
//!
//! Role registry, access gate, and menu projection for a role-gated
//! dashboard, plus the HTTP shell that serves them. The `dashgate` binary
//! is a thin wrapper over this library.

pub mod accounts;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod gate;
pub mod menu;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod permissions;
pub mod routes;
pub mod session;
pub mod state;
pub mod theme;

pub use config::Config;
pub use state::AppState;
