//! Claims carried by bearer tokens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::role::{Role, UnknownRole};

/// Decoded, verified token claims.
///
/// `sub`, `email`, `exp` and `iat` must be present. The role is read from
/// `app_metadata.role`, then `user_metadata.role`, then the top-level `role`
/// claim, so both provider sessions (whose top-level role is the database role
/// `authenticated`) and locally signed tokens resolve to an application role. A
/// token with no known role anywhere does not deserialize, so a verified token
/// always carries a usable role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClaims")]
pub struct IdentityClaims {
    /// User ID at the identity provider
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiry (Unix timestamp)
    pub exp: i64,
    /// Issued-at (Unix timestamp)
    pub iat: i64,
    /// Not-before (Unix timestamp), checked only when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,
}

/// Claims as they appear on the wire.
#[derive(Deserialize)]
struct RawClaims {
    sub: String,
    email: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    app_metadata: Option<Value>,
    #[serde(default)]
    user_metadata: Option<Value>,
    exp: i64,
    iat: i64,
    #[serde(default)]
    nbf: Option<i64>,
}

impl TryFrom<RawClaims> for IdentityClaims {
    type Error = UnknownRole;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let role = resolve_role(&raw)?;
        Ok(Self {
            sub: raw.sub,
            email: raw.email,
            role,
            exp: raw.exp,
            iat: raw.iat,
            nbf: raw.nbf,
        })
    }
}

fn resolve_role(raw: &RawClaims) -> Result<Role, UnknownRole> {
    let from_metadata = [&raw.app_metadata, &raw.user_metadata]
        .into_iter()
        .flatten()
        .filter_map(|meta| meta.get("role").and_then(Value::as_str))
        .find_map(|role| role.parse().ok());

    match (from_metadata, raw.role.as_deref()) {
        (Some(role), _) => Ok(role),
        (None, Some(role)) => role.parse(),
        (None, None) => Err(UnknownRole("<none>".to_string())),
    }
}
