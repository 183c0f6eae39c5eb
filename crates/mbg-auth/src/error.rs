use mbg_core::AppError;
use thiserror::Error;

/// Why a bearer token was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token algorithm is not accepted")]
    InvalidAlgorithm,
    #[error("token has expired")]
    Expired,
    #[error("token is not valid yet")]
    NotYetValid,
    #[error("token audience does not match")]
    InvalidAudience,
    #[error("token claims are invalid: {0}")]
    InvalidClaims(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short label used for the `auth_failures_total` metric.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::InvalidSignature => "invalid_signature",
            TokenError::InvalidAlgorithm => "invalid_algorithm",
            TokenError::Expired => "expired",
            TokenError::NotYetValid => "not_yet_valid",
            TokenError::InvalidAudience => "invalid_audience",
            TokenError::InvalidClaims(_) => "invalid_claims",
            TokenError::Signing(_) => "signing",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidClaims(_) => AppError::unauthorized("Invalid token claims"),
            TokenError::Signing(_) => AppError::internal(err),
            _ => AppError::unauthorized("Invalid or expired token"),
        }
    }
}
