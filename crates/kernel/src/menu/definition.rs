//! Master menu definition.
//!
//! The master menu is declared once at startup, either the built-in catalogue
//! or a YAML/JSON file named by `MENU_FILE`, validated, and never mutated
//! afterwards. A definition that fails validation is a programming error and
//! aborts startup.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::permissions::pages;

/// A direct link to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuLeaf {
    /// Route path of the page (e.g. "/transaction/deposit").
    pub page_id: String,
    /// Human-readable label.
    pub label: String,
    /// Icon name for the rendering shell.
    #[serde(default)]
    pub icon: String,
}

/// A labelled, expandable list of links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuGroup {
    pub label: String,
    #[serde(default)]
    pub icon: String,
    pub children: Vec<MenuLeaf>,
}

/// One entry of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MenuNode {
    Leaf(MenuLeaf),
    Group(MenuGroup),
}

impl MenuNode {
    pub fn label(&self) -> &str {
        match self {
            MenuNode::Leaf(leaf) => &leaf.label,
            MenuNode::Group(group) => &group.label,
        }
    }
}

impl MenuLeaf {
    pub fn new(page_id: &str, label: &str, icon: &str) -> Self {
        Self {
            page_id: page_id.to_string(),
            label: label.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Reasons a menu definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("failed to parse menu definition: {0}")]
    Parse(String),

    #[error("menu entry #{position} has an empty label")]
    EmptyLabel { position: usize },

    #[error("page id {page_id:?} must start with '/' and contain only [A-Za-z0-9/._-]")]
    InvalidPageId { page_id: String },

    #[error("menu group {label:?} has no children")]
    EmptyGroup { label: String },

    #[error("page id {page_id:?} appears more than once")]
    DuplicatePage { page_id: String },

    #[error("page id {page_id:?} is reserved")]
    ReservedPage { page_id: String },
}

/// On-disk shape of a menu file.
#[derive(Debug, Deserialize)]
struct MenuFile {
    items: Vec<MenuNode>,
    #[serde(default)]
    user_management: Option<MenuLeaf>,
}

/// The validated, immutable master menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterMenu {
    nodes: Vec<MenuNode>,
    user_management: MenuLeaf,
}

impl MasterMenu {
    /// Validate and build a master menu.
    pub fn new(nodes: Vec<MenuNode>, user_management: MenuLeaf) -> Result<Self, MenuError> {
        let menu = Self {
            nodes,
            user_management,
        };
        menu.validate()?;
        Ok(menu)
    }

    /// The built-in dashboard catalogue.
    pub fn builtin() -> Self {
        use pages::*;

        let nodes = vec![
            MenuNode::Leaf(MenuLeaf::new(OVERVIEW, "Overview", "gauge")),
            MenuNode::Leaf(MenuLeaf::new(
                STRATEGIC_EXECUTIVE,
                "Strategic Executive",
                "target",
            )),
            MenuNode::Leaf(MenuLeaf::new(BUSINESS_FLOW, "Business Flow", "workflow")),
            MenuNode::Group(MenuGroup {
                label: "Transactions".to_string(),
                icon: "receipt".to_string(),
                children: vec![
                    MenuLeaf::new(DEPOSIT, "Deposits", "arrow-down"),
                    MenuLeaf::new(WITHDRAWAL, "Withdrawals", "arrow-up"),
                    MenuLeaf::new(EXCHANGE_RATE, "Exchange Rates", "currency"),
                    MenuLeaf::new(HEADCOUNT, "Headcount", "users-round"),
                    MenuLeaf::new(MEMBER_REPORT, "Member Report", "clipboard"),
                ],
            }),
            MenuNode::Leaf(MenuLeaf::new(BGO, "BGO", "chart-bar")),
            MenuNode::Leaf(MenuLeaf::new(OS, "OS", "chart-bar")),
            MenuNode::Leaf(MenuLeaf::new(SR, "SR", "chart-bar")),
            MenuNode::Leaf(MenuLeaf::new(XOO, "XOO", "chart-bar")),
        ];

        Self {
            nodes,
            user_management: default_user_management(),
        }
    }

    /// Parse a YAML document.
    pub fn from_yaml(source: &str) -> Result<Self, MenuError> {
        let file: MenuFile =
            serde_yml::from_str(source).map_err(|e| MenuError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    /// Parse a JSON document.
    pub fn from_json(source: &str) -> Result<Self, MenuError> {
        let file: MenuFile =
            serde_json::from_str(source).map_err(|e| MenuError::Parse(e.to_string()))?;
        Self::from_file(file)
    }

    /// Load a menu file. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read menu file {}", path.display()))?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let menu = if is_json {
            Self::from_json(&source)
        } else {
            Self::from_yaml(&source)
        }
        .with_context(|| format!("invalid menu file {}", path.display()))?;

        debug!(
            path = %path.display(),
            entries = menu.nodes.len(),
            "loaded master menu"
        );
        Ok(menu)
    }

    fn from_file(file: MenuFile) -> Result<Self, MenuError> {
        Self::new(
            file.items,
            file.user_management
                .unwrap_or_else(default_user_management),
        )
    }

    fn validate(&self) -> Result<(), MenuError> {
        let reserved = self.user_management.page_id.as_str();
        check_leaf(&self.user_management, 0)?;

        let mut seen = HashSet::new();
        let mut position = 0;

        for node in &self.nodes {
            position += 1;
            match node {
                MenuNode::Leaf(leaf) => {
                    check_leaf(leaf, position)?;
                    check_unique(leaf, reserved, &mut seen)?;
                }
                MenuNode::Group(group) => {
                    if group.label.trim().is_empty() {
                        return Err(MenuError::EmptyLabel { position });
                    }
                    if group.children.is_empty() {
                        return Err(MenuError::EmptyGroup {
                            label: group.label.clone(),
                        });
                    }
                    for child in &group.children {
                        position += 1;
                        check_leaf(child, position)?;
                        check_unique(child, reserved, &mut seen)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Top-level entries in declared order.
    pub fn nodes(&self) -> &[MenuNode] {
        &self.nodes
    }

    /// The entry appended for roles that manage users.
    pub fn user_management(&self) -> &MenuLeaf {
        &self.user_management
    }

    /// Every leaf in declared order, group children flattened in place.
    pub fn leaves(&self) -> impl Iterator<Item = &MenuLeaf> {
        self.nodes.iter().flat_map(|node| match node {
            MenuNode::Leaf(leaf) => std::slice::from_ref(leaf).iter(),
            MenuNode::Group(group) => group.children.iter(),
        })
    }

    /// Look up a page's leaf, including the user-management entry.
    pub fn find_leaf(&self, page_id: &str) -> Option<&MenuLeaf> {
        self.leaves()
            .chain(std::iter::once(&self.user_management))
            .find(|leaf| leaf.page_id == page_id)
    }
}

impl Default for MasterMenu {
    fn default() -> Self {
        Self::builtin()
    }
}

fn default_user_management() -> MenuLeaf {
    MenuLeaf::new(pages::USERS, "User Management", "user-cog")
}

fn check_leaf(leaf: &MenuLeaf, position: usize) -> Result<(), MenuError> {
    if leaf.label.trim().is_empty() {
        return Err(MenuError::EmptyLabel { position });
    }
    if !is_valid_page_id(&leaf.page_id) {
        return Err(MenuError::InvalidPageId {
            page_id: leaf.page_id.clone(),
        });
    }
    Ok(())
}

/// Page ids are emitted unescaped into `href` attributes, so they are
/// restricted to path-safe characters.
fn is_valid_page_id(page_id: &str) -> bool {
    page_id.starts_with('/')
        && page_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
}

fn check_unique<'a>(
    leaf: &'a MenuLeaf,
    reserved: &str,
    seen: &mut HashSet<&'a str>,
) -> Result<(), MenuError> {
    if leaf.page_id == reserved || pages::is_public(&leaf.page_id) {
        return Err(MenuError::ReservedPage {
            page_id: leaf.page_id.clone(),
        });
    }
    if !seen.insert(leaf.page_id.as_str()) {
        return Err(MenuError::DuplicatePage {
            page_id: leaf.page_id.clone(),
        });
    }
    Ok(())
}
