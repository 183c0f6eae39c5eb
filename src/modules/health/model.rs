use mbg_db::PoolHealth;
use serde::Serialize;
use utoipa::ToSchema;

use crate::context::Identity;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: i64,
    pub environment: String,
    pub database: PoolHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    pub status: String,
    pub timestamp: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthDetailsResponse {
    #[serde(flatten)]
    pub health: HealthResponse,
    pub user: Identity,
}
