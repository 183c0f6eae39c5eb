use mbg_auth::Role;

use crate::policy::RouteGroupPolicy;

use super::model::{RoleCatalogue, RoleInfo};

/// Every known role with the groups the active policy lets it into.
pub fn role_catalogue(policy: &RouteGroupPolicy) -> RoleCatalogue {
    RoleCatalogue {
        roles: Role::ALL
            .into_iter()
            .map(|role| RoleInfo {
                role,
                groups: policy.groups_for(role),
            })
            .collect(),
    }
}
