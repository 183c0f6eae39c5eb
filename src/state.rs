use std::sync::Arc;

use mbg_auth::TokenVerifier;
use mbg_config::AppConfig;
use mbg_db::{PgPool, init_db_pool};
use mbg_observability::PrometheusHandle;

use crate::modules::auth::provider::{IdentityProvider, ProviderError};
use crate::policy::RouteGroupPolicy;

/// Shared, read-only application state. The pool is the only mutable resource
/// and it synchronises itself.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub verifier: Arc<TokenVerifier>,
    pub policy: Arc<RouteGroupPolicy>,
    pub identity_provider: Option<Arc<IdentityProvider>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: AppConfig, db: PgPool) -> Result<Self, ProviderError> {
        let identity_provider = IdentityProvider::from_config(&config.identity_provider)?.map(Arc::new);

        Ok(Self {
            db,
            verifier: Arc::new(TokenVerifier::new(&config.jwt)),
            policy: Arc::new(RouteGroupPolicy::default()),
            identity_provider,
            metrics: None,
            config: Arc::new(config),
        })
    }

    pub fn with_policy(mut self, policy: RouteGroupPolicy) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let db = init_db_pool(&config.database).await?;
    Ok(AppState::new(config, db)?)
}
