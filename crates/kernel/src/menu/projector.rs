//! Role-filtered projection of the master menu.

use crate::models::Role;
use crate::permissions::RoleRegistry;

use super::definition::{MasterMenu, MenuGroup, MenuNode};

/// Derives the navigation tree visible to a role.
///
/// The projection is a pure function of the role, the registry and the
/// master menu. The master menu is only read; every call returns a fresh
/// copy in declared order.
#[derive(Debug, Clone, Copy)]
pub struct MenuProjector<'a> {
    registry: &'a RoleRegistry,
    menu: &'a MasterMenu,
}

impl<'a> MenuProjector<'a> {
    pub fn new(registry: &'a RoleRegistry, menu: &'a MasterMenu) -> Self {
        Self { registry, menu }
    }

    /// The menu for `role`.
    ///
    /// - Unknown roles get nothing.
    /// - Wildcard roles get the whole master menu unchanged.
    /// - Otherwise leaves are kept when the role may open their page, and a
    ///   group is kept only if at least one child survives.
    /// - Roles that manage users get the user-management entry appended,
    ///   independent of their page set.
    pub fn project(&self, role: Option<Role>) -> Vec<MenuNode> {
        let Some(profile) = self.registry.profile(role) else {
            return Vec::new();
        };

        let mut nodes = if profile.permitted_pages.is_wildcard() {
            self.menu.nodes().to_vec()
        } else {
            self.filter(role)
        };

        if profile.can_manage_users {
            nodes.push(MenuNode::Leaf(self.menu.user_management().clone()));
        }

        nodes
    }

    fn filter(&self, role: Option<Role>) -> Vec<MenuNode> {
        let allowed = |page_id: &str| self.registry.has_page_access(role, page_id);

        self.menu
            .nodes()
            .iter()
            .filter_map(|node| match node {
                MenuNode::Leaf(leaf) => allowed(&leaf.page_id).then(|| node.clone()),
                MenuNode::Group(group) => {
                    let children: Vec<_> = group
                        .children
                        .iter()
                        .filter(|child| allowed(&child.page_id))
                        .cloned()
                        .collect();

                    (!children.is_empty()).then(|| {
                        MenuNode::Group(MenuGroup {
                            label: group.label.clone(),
                            icon: group.icon.clone(),
                            children,
                        })
                    })
                }
            })
            .collect()
    }
}
