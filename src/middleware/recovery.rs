//! Outermost stage: turns a panic anywhere inside the pipeline into a 500
//! envelope instead of a dropped connection.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use futures::FutureExt;
use mbg_core::{Envelope, ErrorBody, ErrorCode, GENERIC_INTERNAL_MESSAGE, Meta};
use tracing::error;

use crate::context::TraceSlot;
use crate::middleware::trace::REQUEST_ID_HEADER;

pub async fn recover_panics(mut req: Request, next: Next) -> Response {
    let slot = TraceSlot::default();
    req.extensions_mut().insert(slot.clone());
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let trace_id = slot.get().unwrap_or_default().to_string();
            error!(
                trace_id = %trace_id,
                method = %method,
                path = %path,
                panic = %panic_message(panic.as_ref()),
                "Panic recovered"
            );

            let body = ErrorBody {
                code: ErrorCode::InternalServerError,
                message: GENERIC_INTERNAL_MESSAGE.to_string(),
                details: None,
            };
            let mut response = Envelope::failure(body, Meta::new(trace_id.clone(), method, path))
                .render(StatusCode::INTERNAL_SERVER_ERROR);
            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload")
}
