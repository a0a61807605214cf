//! The layout shell protected pages are rendered inside.

use serde_json::Value;

use crate::{
    models::{LayoutShell, NavItem, Role, User, UserProfile},
    routes::{ADMIN_ONLY, ANY_ROLE, MANAGEMENT},
};

struct NavEntry {
    label: &'static str,
    path: &'static str,
    roles: &'static [Role],
}

// Sidebar entries, in display order. Each carries the role set its router is
// guarded with, so a link is shown exactly when following it would render.
const NAVIGATION: &[NavEntry] = &[
    NavEntry {
        label: "Dashboard",
        path: "/dashboard",
        roles: ANY_ROLE,
    },
    NavEntry {
        label: "Employees",
        path: "/employees",
        roles: MANAGEMENT,
    },
    NavEntry {
        label: "Leave Requests",
        path: "/leave-requests",
        roles: MANAGEMENT,
    },
    NavEntry {
        label: "Payroll",
        path: "/payroll",
        roles: MANAGEMENT,
    },
    NavEntry {
        label: "Recruitment",
        path: "/job-applications",
        roles: MANAGEMENT,
    },
    NavEntry {
        label: "Tasks",
        path: "/tasks",
        roles: ANY_ROLE,
    },
    NavEntry {
        label: "My Leave",
        path: "/my-leave",
        roles: ANY_ROLE,
    },
    NavEntry {
        label: "User Accounts",
        path: "/admin/users",
        roles: ADMIN_ONLY,
    },
    NavEntry {
        label: "Profile",
        path: "/me",
        roles: ANY_ROLE,
    },
];

/// Sidebar links visible to `role`. Without a role only the unrestricted links show.
pub fn navigation_for(role: Option<Role>) -> Vec<NavItem> {
    NAVIGATION
        .iter()
        .filter(|entry| entry.roles.is_empty() || role.is_some_and(|r| entry.roles.contains(&r)))
        .map(|entry| NavItem {
            label: entry.label.to_string(),
            path: entry.path.to_string(),
        })
        .collect()
}

/// Frames a page's view model for `user`.
pub fn render(user: Option<&User>, content: Value) -> LayoutShell {
    LayoutShell {
        user: user.map(UserProfile::from),
        navigation: navigation_for(user.map(|u| u.role)),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(role: Option<Role>) -> Vec<String> {
        navigation_for(role).into_iter().map(|n| n.path).collect()
    }

    #[test]
    fn employees_do_not_see_management_links() {
        let links = paths(Some(Role::Employee));
        assert!(links.contains(&"/tasks".to_string()));
        assert!(!links.contains(&"/payroll".to_string()));
        assert!(!links.contains(&"/admin/users".to_string()));
    }

    #[test]
    fn hr_sees_management_but_not_admin_links() {
        let links = paths(Some(Role::Hr));
        assert!(links.contains(&"/payroll".to_string()));
        assert!(!links.contains(&"/admin/users".to_string()));
    }

    #[test]
    fn admin_sees_everything() {
        assert_eq!(paths(Some(Role::Admin)).len(), NAVIGATION.len());
    }

    #[test]
    fn render_keeps_content_verbatim() {
        let shell = render(None, serde_json::json!({"rows": [1, 2]}));
        assert!(shell.user.is_none());
        assert_eq!(shell.content["rows"][1], 2);
        assert_eq!(shell.navigation, navigation_for(None));
    }
}
