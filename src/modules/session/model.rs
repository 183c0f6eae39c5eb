use mbg_auth::Role;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionStatus {
    pub status: String,
    pub user_id: String,
    pub user_role: Role,
    pub email: String,
    pub timestamp: i64,
}
