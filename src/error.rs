//!
//! # Error Taxonomy and Translation
//!
//! This module defines `AppError`, the closed set of failure kinds that travel
//! through the request pipeline, and `translate`, the single place where a
//! failure is turned into a status code and a response envelope.
//!
//! Validators, the token service, the auth gate and the handlers all return
//! `Result<_, AppError>`; nothing is rendered until the error reaches actix,
//! which calls `ResponseError::error_response` and therefore `translate`.
//! `From` implementations for `sqlx::Error`, `bcrypt::BcryptError`,
//! `jsonwebtoken::errors::Error`, `serde_json::Error` and actix's
//! `JsonPayloadError` keep the `?` operator usable across layers.

use actix_web::{error::JsonPayloadError, error::ResponseError, http::StatusCode, HttpResponse};
use std::backtrace::Backtrace;
use std::fmt;

use crate::response::Envelope;

/// Message used for every validation failure envelope.
pub const VALIDATION_MESSAGE: &str = "Validation error.";

/// Message used whenever a credential is missing, tampered with or expired.
pub const INVALID_CREDENTIALS: &str = "Invalid Credentials";

/// Represents every failure the pipeline can produce.
///
/// Each variant maps to exactly one status code in [`translate`].
#[derive(Debug)]
pub enum AppError {
    /// Untrusted input broke one or more schema rules (HTTP 400).
    /// Carries one message per violated rule, in schema order.
    Validation { issues: Vec<String> },
    /// A handler rejected the request on a domain rule (HTTP 400),
    /// e.g. a duplicate registration or a malformed id.
    BadRequest(String),
    /// Missing, invalid or expired credentials, or a failed login (HTTP 401).
    Unauthorized(String),
    /// The requested entity does not exist for this user (HTTP 404).
    NotFound(String),
    /// Anything else (HTTP 500). The message and backtrace are logged,
    /// never sent to the client.
    Unexpected { message: String, backtrace: String },
}

impl AppError {
    pub fn validation(issues: Vec<String>) -> Self {
        AppError::Validation { issues }
    }

    /// Wraps an internal failure, capturing the current backtrace.
    pub fn unexpected(message: impl Into<String>) -> Self {
        AppError::Unexpected {
            message: message.into(),
            backtrace: Backtrace::force_capture().to_string(),
        }
    }

    /// Status code for this failure kind.
    pub fn code(&self) -> u16 {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::Unexpected { .. } => 500,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation { issues } => {
                write!(f, "Validation Error: {}", issues.join("; "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Unexpected { message, .. } => write!(f, "Unexpected Error: {}", message),
        }
    }
}

impl std::error::Error for AppError {}

/// Maps a failure to the envelope sent to the client.
///
/// Unexpected failures are logged once here, with their backtrace, and
/// rendered with the generic 500 message. Expected kinds are not logged.
pub fn translate(error: &AppError) -> Envelope {
    let code = error.code();
    match error {
        AppError::Validation { issues } => Envelope::new(
            code,
            Some(VALIDATION_MESSAGE),
            None,
            Some(issues.clone().into()),
        ),
        AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
            Envelope::new(code, Some(msg), None, None)
        }
        AppError::Unexpected { message, backtrace } => {
            log::error!("{}\nStack: {}", message, backtrace);
            Envelope::new(code, None, None, None)
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        translate(self).into_response()
    }
}

/// `RowNotFound` becomes `NotFound`; every other database failure is unexpected.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::unexpected(format!("Database error: {}", error)),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(error: sqlx::migrate::MigrateError) -> AppError {
        AppError::unexpected(format!("Migration error: {}", error))
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::unexpected(format!("Password hashing error: {}", error))
    }
}

/// Only reached on the signing side; verification failures are mapped to
/// `Unauthorized` by the token service itself.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        AppError::unexpected(format!("Failed to generate token: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> AppError {
        AppError::unexpected(format!("Serialization error: {}", error))
    }
}

/// Body extraction failures are input defects, reported as validation issues.
impl From<JsonPayloadError> for AppError {
    fn from(error: JsonPayloadError) -> AppError {
        let issue = match error {
            JsonPayloadError::ContentType => "Content type must be application/json.",
            JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
                "Request body is too large."
            }
            _ => "Request body must be valid JSON.",
        };
        AppError::validation(vec![issue.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_error_responses() {
        let error = AppError::Unauthorized(INVALID_CREDENTIALS.into());
        assert_eq!(error.error_response().status(), 401);

        let error = AppError::BadRequest("Invalid task id.".into());
        assert_eq!(error.error_response().status(), 400);

        let error = AppError::NotFound("Resource not found".into());
        assert_eq!(error.error_response().status(), 404);

        let error = AppError::validation(vec!["Title is required.".into()]);
        assert_eq!(error.error_response().status(), 400);
    }

    #[test]
    fn test_validation_failure_carries_issues() {
        let error = AppError::validation(vec!["some issue".into(), "another".into()]);
        let envelope = translate(&error);

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "success": false,
                "code": 400,
                "message": "Validation error.",
                "data": { "issues": ["some issue", "another"] }
            })
        );
    }

    #[test]
    fn test_expected_failures_keep_their_message() {
        let envelope = translate(&AppError::Unauthorized("Unauthorized".into()));
        assert_eq!(envelope.code, 401);
        assert_eq!(envelope.message, "Unauthorized");
        assert!(envelope.data.is_none());

        let envelope = translate(&AppError::NotFound("Task not found to delete.".into()));
        assert_eq!(envelope.code, 404);
        assert_eq!(envelope.message, "Task not found to delete.");
        assert!(!envelope.success);
    }

    #[test_log::test]
    fn test_unexpected_failure_does_not_leak_its_message() {
        let error = AppError::unexpected("connection refused by 10.0.0.7:5432");
        let envelope = translate(&error);

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({ "success": false, "code": 500, "message": "Internal Server Error" })
        );
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unexpected_failure_records_a_backtrace() {
        match AppError::unexpected("boom") {
            AppError::Unexpected { message, backtrace } => {
                assert_eq!(message, "boom");
                assert!(!backtrace.is_empty());
            }
            other => panic!("Unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_not_found() {
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::Unexpected { .. }
        ));
    }

    #[test]
    fn test_json_payload_errors_become_validation_failures() {
        match AppError::from(JsonPayloadError::ContentType) {
            AppError::Validation { issues } => {
                assert_eq!(issues, vec!["Content type must be application/json."]);
            }
            other => panic!("Unexpected variant: {:?}", other),
        }
    }
}
