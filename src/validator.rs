use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use mbg_core::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    // field_errors() is a HashMap; keep the output stable.
    messages.sort();
    messages.join(", ")
}

fn rejection_message(rejection: &JsonRejection) -> String {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return "Missing 'Content-Type: application/json' header".to_string();
    }

    let body = rejection.body_text();
    if let Some(field) = body
        .split("missing field `")
        .nth(1)
        .and_then(|s| s.split('`').next())
    {
        return format!("{} is required", field);
    }
    if body.contains("invalid type") {
        return "Invalid field type in request".to_string();
    }
    "Invalid request body".to_string()
}

/// JSON body extractor that runs `validator` rules. Both malformed bodies and
/// rule violations reject with 400 `BAD_REQUEST`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request("Invalid request format")
                    .with_details(rejection_message(&rejection))
            })?;

        value.validate().map_err(|errors| {
            AppError::bad_request("Validation failed").with_details(format_errors(&errors))
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(email(message = "email must be a valid email address"))]
        email: String,
        #[validate(length(min = 6, message = "password must be at least 6 characters"))]
        password: String,
    }

    fn request(body: &str, json: bool) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if json {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body() {
        let req = request(r#"{"email":"a@b.co","password":"secret1"}"#, true);
        let ValidatedJson(payload) = ValidatedJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.email, "a@b.co");
    }

    #[tokio::test]
    async fn test_rule_violations() {
        let req = request(r#"{"email":"nope","password":"123"}"#, true);
        let err = ValidatedJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "Validation failed");
        assert_eq!(
            err.details.as_deref(),
            Some("email must be a valid email address, password must be at least 6 characters")
        );
    }

    #[tokio::test]
    async fn test_missing_field() {
        let req = request(r#"{"email":"a@b.co"}"#, true);
        let err = ValidatedJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.details.as_deref(), Some("password is required"));
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = request(r#"{"email":"a@b.co","password":"secret1"}"#, false);
        let err = ValidatedJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.details.as_deref(),
            Some("Missing 'Content-Type: application/json' header")
        );
    }
}
