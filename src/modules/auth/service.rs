use mbg_auth::{Role, issue_token};
use mbg_config::{DevAuthConfig, JwtConfig};
use mbg_core::AppError;
use tracing::{instrument, warn};

use super::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshTokenRequest, RefreshTokenResponse,
    UserSummary,
};
use super::provider::{IdentityProvider, ProviderError, ProviderSession};

pub const DEV_SUPER_ADMIN_ID: &str = "dev-super-admin";
const TOKEN_TYPE: &str = "Bearer";

pub struct AuthService;

impl AuthService {
    /// Signs the caller in. Outside production a configured super-admin bypass is
    /// checked first; every other login goes to the identity provider.
    #[instrument(skip_all, fields(email = %dto.email))]
    pub async fn login(
        provider: Option<&IdentityProvider>,
        dev: Option<&DevAuthConfig>,
        jwt: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<LoginResponse, AppError> {
        if let Some(dev) = dev.filter(|dev| dev.matches(&dto.email, &dto.password)) {
            return Self::dev_login(dev, jwt);
        }

        let provider = provider.ok_or_else(|| {
            AppError::unauthorized("Login failed: invalid credentials")
                .with_source(ProviderError::NotConfigured)
        })?;

        let session = provider
            .sign_in(dto.email.trim(), &dto.password)
            .await
            .map_err(|err| {
                AppError::unauthorized("Login failed: invalid credentials").with_source(err)
            })?;

        let ProviderSession {
            access_token,
            refresh_token,
            expires_in,
            user,
            ..
        } = session;
        let user = user.ok_or_else(|| AppError::unauthorized("Login failed: no session returned"))?;

        Ok(LoginResponse {
            user: UserSummary {
                role: user.role(),
                email: user.email.clone().unwrap_or(dto.email),
                id: user.id,
            },
            access_token,
            refresh_token,
            expires_in,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    fn dev_login(dev: &DevAuthConfig, jwt: &JwtConfig) -> Result<LoginResponse, AppError> {
        warn!(
            email = %dev.email,
            "Development super admin bypass used; disable SUPERADMIN_EMAIL/SUPERADMIN_PASSWORD outside local setups"
        );

        let access_token = issue_token(
            DEV_SUPER_ADMIN_ID,
            &dev.email,
            Role::SuperAdmin,
            jwt.access_token_expiry,
            jwt,
        )?;

        Ok(LoginResponse {
            user: UserSummary {
                id: DEV_SUPER_ADMIN_ID.to_string(),
                email: dev.email.clone(),
                role: Some(Role::SuperAdmin),
            },
            access_token,
            refresh_token: String::new(),
            expires_in: jwt.access_token_expiry,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    #[instrument(skip_all)]
    pub async fn refresh(
        provider: Option<&IdentityProvider>,
        dto: RefreshTokenRequest,
    ) -> Result<RefreshTokenResponse, AppError> {
        let provider = provider.ok_or_else(|| {
            AppError::unauthorized("Token refresh failed").with_source(ProviderError::NotConfigured)
        })?;

        let session = provider
            .refresh(&dto.refresh_token)
            .await
            .map_err(|err| AppError::unauthorized("Token refresh failed").with_source(err))?;

        Ok(RefreshTokenResponse {
            access_token: session.access_token,
            expires_in: session.expires_in,
            token_type: TOKEN_TYPE.to_string(),
        })
    }

    /// Revokes the provider session behind `access_token`. Locally issued tokens
    /// have no provider session and cannot be revoked.
    #[instrument(skip_all)]
    pub async fn logout(
        provider: Option<&IdentityProvider>,
        access_token: &str,
    ) -> Result<LogoutResponse, AppError> {
        let provider = provider.ok_or_else(|| {
            AppError::internal_error("Logout failed").with_source(ProviderError::NotConfigured)
        })?;

        provider
            .sign_out(access_token)
            .await
            .map_err(|err| AppError::internal_error("Logout failed").with_source(err))?;

        Ok(LogoutResponse {
            message: "Logged out successfully".to_string(),
        })
    }
}
