//! Route group policy.
//!
//! Maps each role-restricted route group to the URL prefixes it covers and the
//! roles it admits. Built once at startup and shared read-only.

use std::fmt;

use mbg_auth::{Role, RoleSet};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RouteGroup {
    SuperAdmin,
    Admin,
    Supplier,
    Parent,
}

impl RouteGroup {
    pub const ALL: [RouteGroup; 4] = [
        RouteGroup::SuperAdmin,
        RouteGroup::Admin,
        RouteGroup::Supplier,
        RouteGroup::Parent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteGroup::SuperAdmin => "super_admin",
            RouteGroup::Admin => "admin",
            RouteGroup::Supplier => "supplier",
            RouteGroup::Parent => "parent",
        }
    }

    fn default_prefixes(self) -> &'static [&'static str] {
        match self {
            RouteGroup::SuperAdmin => &["/api/v1/roles", "/api/v1/users/{id}/role"],
            RouteGroup::Admin => &[
                "/api/v1/users/{id}",
                "/api/v1/schools",
                "/api/v1/students",
                "/api/v1/meals",
                "/api/v1/orders",
                "/api/v1/announcements",
            ],
            RouteGroup::Supplier => &["/api/v1/orders", "/api/v1/suppliers"],
            RouteGroup::Parent => &["/api/v1/students", "/api/v1/orders", "/api/v1/meal-plans"],
        }
    }

    fn default_roles(self) -> RoleSet {
        match self {
            RouteGroup::SuperAdmin => RoleSet::from([Role::SuperAdmin]),
            RouteGroup::Admin => RoleSet::from([Role::Admin, Role::SuperAdmin]),
            RouteGroup::Supplier => RoleSet::from([Role::Supplier, Role::SuperAdmin]),
            RouteGroup::Parent => RoleSet::from([Role::Parent, Role::SuperAdmin]),
        }
    }
}

impl fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GroupPolicy {
    pub group: RouteGroup,
    pub prefixes: Vec<&'static str>,
    pub roles: RoleSet,
}

#[derive(Debug, Clone)]
pub struct RouteGroupPolicy {
    groups: Vec<GroupPolicy>,
}

impl Default for RouteGroupPolicy {
    fn default() -> Self {
        Self {
            groups: RouteGroup::ALL
                .into_iter()
                .map(|group| GroupPolicy {
                    group,
                    prefixes: group.default_prefixes().to_vec(),
                    roles: group.default_roles(),
                })
                .collect(),
        }
    }
}

impl RouteGroupPolicy {
    /// Replaces the role set admitted by `group`.
    pub fn with_roles(mut self, group: RouteGroup, roles: impl Into<RoleSet>) -> Self {
        let roles = roles.into();
        if let Some(policy) = self.groups.iter_mut().find(|p| p.group == group) {
            policy.roles = roles;
        }
        self
    }

    pub fn get(&self, group: RouteGroup) -> &GroupPolicy {
        // Every group is present: `Default` builds all of them and nothing removes one.
        let index = RouteGroup::ALL
            .iter()
            .position(|g| *g == group)
            .unwrap_or_default();
        &self.groups[index]
    }

    pub fn roles(&self, group: RouteGroup) -> &RoleSet {
        &self.get(group).roles
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupPolicy> {
        self.groups.iter()
    }

    /// Groups that admit `role`, in declaration order.
    pub fn groups_for(&self, role: Role) -> Vec<RouteGroup> {
        self.groups
            .iter()
            .filter(|p| p.roles.allows(role))
            .map(|p| p.group)
            .collect()
    }
}
