//! Bearer token verification and signing.
//!
//! Tokens are HMAC-signed JWTs sharing a secret with the identity provider.
//! [`TokenVerifier`] is built once at startup and shared; it never touches the
//! network.
//!
//! # Example
//!
//! ```ignore
//! use mbg_auth::{Role, TokenVerifier, issue_token};
//! use mbg_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let verifier = TokenVerifier::new(&config);
//!
//! let token = issue_token("user-1", "user@example.com", Role::Parent, 3600, &config)?;
//! let claims = verifier.verify(&token)?;
//! assert_eq!(claims.role, Role::Parent);
//! ```

use chrono::Utc;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, decode_header, encode,
};

use mbg_config::JwtConfig;

use crate::claims::IdentityClaims;
use crate::error::TokenError;
use crate::role::Role;

/// HMAC algorithms accepted on incoming tokens. Everything else is rejected,
/// including `none` and asymmetric algorithms.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        match &config.audience {
            Some(aud) => {
                validation.set_audience(&[aud]);
                validation.set_required_spec_claims(&["exp", "aud"]);
            }
            None => {
                validation.validate_aud = false;
                validation.set_required_spec_claims(&["exp"]);
            }
        }

        Self {
            key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Verifies signature, algorithm and time claims, then returns the claims.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        // Header first: an unknown `alg` (such as `none`) fails to parse at all
        // and would otherwise look like a malformed token.
        decode_header(token).map_err(header_error)?;

        decode::<IdentityClaims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(claims_error)
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

fn header_error(err: JwtError) -> TokenError {
    match err.kind() {
        ErrorKind::Json(e) if e.to_string().contains("unknown variant") => {
            TokenError::InvalidAlgorithm
        }
        _ => TokenError::Malformed,
    }
}

fn claims_error(err: JwtError) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            TokenError::InvalidAlgorithm
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::NotYetValid,
        ErrorKind::InvalidAudience => TokenError::InvalidAudience,
        ErrorKind::MissingRequiredClaim(claim) => {
            TokenError::InvalidClaims(format!("missing {claim}"))
        }
        ErrorKind::Json(e) => TokenError::InvalidClaims(e.to_string()),
        _ => TokenError::Malformed,
    }
}

/// Signs `claims` with HS256.
pub fn encode_claims(claims: &IdentityClaims, config: &JwtConfig) -> Result<String, TokenError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

/// Issues a token valid for `ttl_secs` from now.
///
/// Only the dev login and tests sign tokens locally; real sessions come from the
/// identity provider.
pub fn issue_token(
    sub: &str,
    email: &str,
    role: Role,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: sub.to_string(),
        email: email.to_string(),
        role,
        exp: now + ttl_secs,
        iat: now,
        nbf: None,
    };
    encode_claims(&claims, config)
}
