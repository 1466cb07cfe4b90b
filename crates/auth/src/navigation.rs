//! Role-partitioned navigation table.

use serde::Serialize;

use timekeep_core::UserRole;

/// Who may see a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    All,
    Admin,
    Employee,
}

impl Audience {
    pub fn admits(self, role: UserRole) -> bool {
        match self {
            Audience::All => true,
            Audience::Admin => role == UserRole::Admin,
            Audience::Employee => role == UserRole::Employee,
        }
    }
}

/// One sidebar link. `icon` is a symbolic id resolved by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationEntry {
    pub label: &'static str,
    pub target: &'static str,
    pub icon: &'static str,
    pub audience: Audience,
}

const fn entry(
    label: &'static str,
    target: &'static str,
    icon: &'static str,
    audience: Audience,
) -> NavigationEntry {
    NavigationEntry {
        label,
        target,
        icon,
        audience,
    }
}

/// Every navigation entry, in display order.
pub static NAVIGATION: &[NavigationEntry] = &[
    entry("Dashboard", "/dashboard", "layout-dashboard", Audience::All),
    entry("Admin Overview", "/dashboard/admin", "user-cog", Audience::Admin),
    entry("My Day", "/dashboard/employee", "clock", Audience::Employee),
    entry("Employees", "/dashboard/admin/employees", "users", Audience::Admin),
    entry("Timesheet", "/dashboard/employee/timesheet", "calendar", Audience::Employee),
    entry("Reports", "/dashboard/admin/reports", "file-text", Audience::Admin),
    entry("Settings", "/dashboard/settings", "settings", Audience::All),
    entry("Profile", "/dashboard/profile", "user", Audience::All),
];

/// Entries visible to `role`, in table order.
pub fn visible_navigation(role: UserRole) -> Vec<&'static NavigationEntry> {
    NAVIGATION
        .iter()
        .filter(|entry| entry.audience.admits(role))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(role: UserRole) -> Vec<&'static str> {
        visible_navigation(role).iter().map(|e| e.label).collect()
    }

    #[test]
    fn admin_sees_shared_and_admin_entries() {
        assert_eq!(
            labels(UserRole::Admin),
            ["Dashboard", "Admin Overview", "Employees", "Reports", "Settings", "Profile"]
        );
    }

    #[test]
    fn employee_sees_shared_and_employee_entries() {
        assert_eq!(
            labels(UserRole::Employee),
            ["Dashboard", "My Day", "Timesheet", "Settings", "Profile"]
        );
    }

    #[test]
    fn partition_covers_table_in_order() {
        for role in [UserRole::Admin, UserRole::Employee] {
            let visible = visible_navigation(role);

            let expected: Vec<_> = NAVIGATION
                .iter()
                .filter(|e| match e.audience {
                    Audience::All => true,
                    Audience::Admin => role == UserRole::Admin,
                    Audience::Employee => role == UserRole::Employee,
                })
                .collect();
            assert_eq!(visible, expected);

            let mut last = None;
            for entry in &visible {
                let index = NAVIGATION.iter().position(|e| e == *entry).unwrap();
                assert!(last.is_none_or(|prev| prev < index));
                last = Some(index);
            }
        }
    }

    #[test]
    fn targets_are_unique() {
        let mut targets: Vec<_> = NAVIGATION.iter().map(|e| e.target).collect();
        targets.sort_unstable();
        targets.dedup();
        assert_eq!(targets.len(), NAVIGATION.len());
    }
}
