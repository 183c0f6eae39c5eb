use mbg_auth::Role;
use serde::Serialize;
use utoipa::ToSchema;

use crate::policy::RouteGroup;

/// A role and the route groups that admit it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleInfo {
    pub role: Role,
    pub groups: Vec<RouteGroup>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoleCatalogue {
    pub roles: Vec<RoleInfo>,
}
