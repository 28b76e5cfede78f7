//! Command-line interface.
//!
//! `dashgate` with no subcommand serves HTTP. The other subcommands are
//! operator tools that never touch the network.

use std::fmt::Write as _;
use std::io::BufRead;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::menu::{MasterMenu, MenuNode, MenuProjector};
use crate::models::{Role, hash_password};
use crate::permissions::{PageSet, RoleRegistry};

#[derive(Parser, Debug)]
#[command(name = "dashgate", version, about = "Role-gated dashboard server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Print an Argon2 hash for the `users.pass` column.
    HashPassword {
        /// Password to hash. Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
    },

    /// Validate a menu file and show what each role would see.
    CheckMenu {
        /// YAML or JSON menu definition.
        file: PathBuf,
    },

    /// Print the built-in role table.
    Roles,
}

impl Cli {
    /// The subcommand to run, `serve` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

/// Hash a password given on the command line or as the first stdin line.
pub fn hash_password_command(password: Option<String>) -> Result<String> {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    anyhow::ensure!(!password.is_empty(), "password must not be empty");
    hash_password(&password)
}

/// Load a menu file and report per-role projections.
pub fn check_menu_command(file: &std::path::Path) -> Result<String> {
    let menu = MasterMenu::load(file)?;
    Ok(summarize_menu(&menu, RoleRegistry::builtin()))
}

/// One line per role: how many entries and pages of `menu` it sees.
pub fn summarize_menu(menu: &MasterMenu, registry: &RoleRegistry) -> String {
    let projector = MenuProjector::new(registry, menu);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "menu ok: {} entries, {} pages",
        menu.nodes().len(),
        menu.leaves().count()
    );

    for role in Role::ALL {
        let nodes = projector.project(Some(role));
        let pages: usize = nodes
            .iter()
            .map(|node| match node {
                MenuNode::Leaf(_) => 1,
                MenuNode::Group(group) => group.children.len(),
            })
            .sum();
        let _ = writeln!(
            out,
            "{:<10} {} entries, {pages} pages",
            role.as_str(),
            nodes.len()
        );
    }

    out
}

/// Render the role table.
pub fn describe_roles(registry: &RoleRegistry) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<8} {:<10} {:<7} pages",
        "role", "manage", "read-only", "export"
    );

    for role in Role::ALL {
        let pages = match registry.profile(Some(role)).map(|p| &p.permitted_pages) {
            Some(PageSet::All) => "*".to_string(),
            Some(PageSet::Only(pages)) => pages.iter().cloned().collect::<Vec<_>>().join(" "),
            None => "-".to_string(),
        };
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<10} {:<7} {}",
            role.as_str(),
            yes_no(registry.can_manage_users(Some(role))),
            yes_no(registry.is_read_only(Some(role))),
            yes_no(registry.can_export_data(Some(role))),
            pages
        );
    }

    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
