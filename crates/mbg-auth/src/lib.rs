//! # MBG Auth
//!
//! Bearer token verification for the MBG API.
//!
//! - [`claims`]: the claims a verified token carries
//! - [`role`]: the closed set of account roles and insertion-ordered role sets
//! - [`jwt`]: [`TokenVerifier`] plus local token signing for the dev login and tests
//! - [`error`]: [`TokenError`] and its mapping onto the HTTP error taxonomy
//!
//! Every verification failure maps to `401 UNAUTHORIZED`. Claim-shape failures
//! (missing claim, unknown role) read `Invalid token claims`; everything else reads
//! `Invalid or expired token`.

pub mod claims;
pub mod error;
pub mod jwt;
pub mod role;

pub use claims::IdentityClaims;
pub use error::TokenError;
pub use jwt::{ACCEPTED_ALGORITHMS, TokenVerifier, encode_claims, issue_token};
pub use role::{Role, RoleSet, UnknownRole};
