//! Capability flags derived from a member's role set.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{Role, RoleAssignment};

const ADMIN_ROLES: &[Role] = &[Role::Chair, Role::ViceChair];
const MEMBER_MANAGERS: &[Role] = &[Role::Chair, Role::ViceChair, Role::Secretary];
const FINANCE_MANAGERS: &[Role] = &[Role::Chair, Role::ViceChair, Role::Treasurer];
const ACTIVITY_MANAGERS: &[Role] = &[
    Role::Chair,
    Role::ViceChair,
    Role::Secretary,
    Role::AssistantSecretary,
    Role::Committee,
];

/// The distinct roles a user holds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }

    /// Collect the roles of `assignments`, whoever they belong to.
    pub fn from_assignments(assignments: &[RoleAssignment]) -> Self {
        Self::new(assignments.iter().map(|a| a.role))
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn contains_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|r| self.0.contains(r))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.0.iter()
    }

    /// Highest-ranking role, used for the profile badge.
    pub fn primary(&self) -> Option<Role> {
        self.0.iter().next().copied()
    }
}

/// Booleans gating administrative UI.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub is_admin: bool,
    pub can_manage_members: bool,
    pub can_manage_finances: bool,
    pub can_manage_activities: bool,
    pub can_view_reports: bool,
}

impl Capabilities {
    pub fn from_roles(roles: &RoleSet) -> Self {
        Self {
            is_admin: roles.contains_any(ADMIN_ROLES),
            can_manage_members: roles.contains_any(MEMBER_MANAGERS),
            can_manage_finances: roles.contains_any(FINANCE_MANAGERS),
            can_manage_activities: roles.contains_any(ACTIVITY_MANAGERS),
            can_view_reports: roles.iter().any(|r| *r != Role::Member),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_role_set_has_no_capabilities() {
        let caps = Capabilities::from_roles(&RoleSet::default());
        assert_eq!(caps, Capabilities::default());
        assert!(!caps.can_manage_members);
    }

    #[test]
    fn test_can_manage_members() {
        for role in [Role::Chair, Role::ViceChair, Role::Secretary] {
            let caps = Capabilities::from_roles(&RoleSet::new([role]));
            assert!(caps.can_manage_members, "{role:?}");
        }
        for role in [
            Role::AssistantSecretary,
            Role::Treasurer,
            Role::Committee,
            Role::Member,
        ] {
            let caps = Capabilities::from_roles(&RoleSet::new([role]));
            assert!(!caps.can_manage_members, "{role:?}");
        }
    }

    #[test]
    fn test_multiple_roles_union() {
        let roles = RoleSet::new([Role::Member, Role::Treasurer]);
        let caps = Capabilities::from_roles(&roles);
        assert!(caps.can_manage_finances);
        assert!(caps.can_view_reports);
        assert!(!caps.is_admin);
        assert!(!caps.can_manage_activities);
    }

    #[test]
    fn test_member_only_cannot_view_reports() {
        let caps = Capabilities::from_roles(&RoleSet::new([Role::Member]));
        assert!(!caps.can_view_reports);
    }

    #[test]
    fn test_primary_role_is_highest_ranking() {
        let roles = RoleSet::new([Role::Member, Role::Treasurer, Role::ViceChair]);
        assert_eq!(roles.primary(), Some(Role::ViceChair));
        assert_eq!(RoleSet::default().primary(), None);
    }
}
