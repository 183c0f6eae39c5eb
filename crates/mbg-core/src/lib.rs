//! # MBG Core
//!
//! Core types shared by every layer of the MBG API.
//!
//! - [`errors`]: the error taxonomy ([`ErrorCode`]) and [`AppError`], the error type
//!   handlers and services return
//! - [`envelope`]: the uniform `{success, data?, error?, meta}` response envelope and
//!   [`ApiResponse`], the success counterpart of [`AppError`]
//!
//! Handlers never build JSON bodies themselves. Both [`AppError`] and [`ApiResponse`]
//! produce a response that carries an [`EnvelopePayload`] in its extensions; the
//! request pipeline renders it once the request's trace id is known.
//!
//! # Example
//!
//! ```ignore
//! use mbg_core::{ApiResponse, AppError};
//!
//! async fn get_school() -> Result<ApiResponse<School>, AppError> {
//!     let school = find_school().await.ok_or_else(|| AppError::not_found("School not found"))?;
//!     Ok(ApiResponse::ok(school))
//! }
//! ```

pub mod envelope;
pub mod errors;

// Re-export commonly used types at crate root
pub use envelope::{ApiResponse, Envelope, EnvelopePayload, ErrorBody, Meta};
pub use errors::{AppError, ErrorCode, ErrorReport, GENERIC_INTERNAL_MESSAGE};
