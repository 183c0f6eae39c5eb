use std::time::Duration;

use crate::env::{self, Lookup};

/// External identity provider (GoTrue-compatible).
#[derive(Clone, Debug)]
pub struct IdentityProviderConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl IdentityProviderConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(&env::process_env)
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            url: env::string(lookup, "SUPABASE_URL").map(|u| u.trim_end_matches('/').to_string()),
            api_key: env::string(lookup, "SUPABASE_API_KEY"),
            timeout: env::duration_or(lookup, "SUPABASE_TIMEOUT", Duration::from_secs(10)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.url.is_some()
    }
}

/// Local super-admin login. Never honoured in production.
#[derive(Clone)]
pub struct DevAuthConfig {
    pub email: String,
    pub password: String,
}

impl DevAuthConfig {
    /// `Some` only when both `SUPERADMIN_EMAIL` and `SUPERADMIN_PASSWORD` are set.
    pub fn from_lookup(lookup: Lookup<'_>) -> Option<Self> {
        Some(Self {
            email: env::string(lookup, "SUPERADMIN_EMAIL")?,
            password: env::string(lookup, "SUPERADMIN_PASSWORD")?,
        })
    }

    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email.eq_ignore_ascii_case(email) && self.password == password
    }
}

impl std::fmt::Debug for DevAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevAuthConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
