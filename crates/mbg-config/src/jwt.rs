use crate::env::{self, Lookup};

/// Placeholder secret used when `JWT_SECRET` is unset. Rejected in production.
pub const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-this";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Shared HMAC secret. The identity provider signs with the same secret.
    pub secret: String,
    /// Clock skew tolerated on `exp`/`nbf`, in seconds.
    pub leeway_secs: u64,
    /// Expected `aud` claim. Audience is not checked when unset.
    pub audience: Option<String>,
    /// Lifetime of tokens this service signs itself (dev login), in seconds.
    pub access_token_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            secret: env::string_or(lookup, "JWT_SECRET", DEFAULT_JWT_SECRET),
            leeway_secs: env::parse_or(lookup, "JWT_LEEWAY_SECS", 0),
            audience: env::string(lookup, "JWT_AUDIENCE"),
            access_token_expiry: env::parse_or(lookup, "JWT_ACCESS_EXPIRY", 86400), // 24 hours
        }
    }
}
