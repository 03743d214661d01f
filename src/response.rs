//!
//! # Response Envelope
//!
//! Every response leaving the API, success or failure, is wrapped in the same
//! JSON shape:
//!
//! ```json
//! { "success": true, "code": 200, "message": "OK", "data": { } }
//! ```
//!
//! `success` is derived from `code` and is never passed in. `message` falls back
//! to a fixed phrase per status code. `data` is only present when the caller
//! supplied it, and an error payload always wins over `data`, rendered as
//! `{ "issues": [...] }`.

use actix_web::{body::BoxBody, http::StatusCode, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Returns the fixed default message for a status code.
///
/// Codes outside the API's own table fall back to the HTTP canonical reason.
pub fn default_message(code: u16) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => StatusCode::from_u16(code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown Status"),
    }
}

/// Error payload attached to an envelope: a single issue or a list of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issues {
    One(String),
    Many(Vec<String>),
}

impl Issues {
    /// Normalizes the payload to a list.
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Issues::One(issue) => vec![issue],
            Issues::Many(issues) => issues,
        }
    }
}

impl From<&str> for Issues {
    fn from(issue: &str) -> Self {
        Issues::One(issue.to_string())
    }
}

impl From<String> for Issues {
    fn from(issue: String) -> Self {
        Issues::One(issue)
    }
}

impl From<Vec<String>> for Issues {
    fn from(issues: Vec<String>) -> Self {
        Issues::Many(issues)
    }
}

/// The wire shape shared by every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Builds an envelope.
    ///
    /// An empty `message` counts as absent, and so does a JSON `null` in `data`.
    /// When `error` is given it replaces `data` with `{ "issues": [...] }`.
    pub fn new(code: u16, message: Option<&str>, data: Option<Value>, error: Option<Issues>) -> Self {
        let message = match message {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => default_message(code).to_string(),
        };

        let data = match error {
            Some(issues) => Some(json!({ "issues": issues.into_vec() })),
            None => data.filter(|value| !value.is_null()),
        };

        Self {
            success: (200..300).contains(&code),
            code,
            message,
            data,
        }
    }

    /// 200 with a message and optional data.
    pub fn ok(message: &str, data: Option<Value>) -> Self {
        Self::new(200, Some(message), data, None)
    }

    /// 201 with a message and optional data.
    pub fn created(message: &str, data: Option<Value>) -> Self {
        Self::new(201, Some(message), data, None)
    }

    /// The HTTP status matching `code`.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::build(self.status()).json(self)
    }
}

impl Responder for Envelope {
    type Body = BoxBody;

    fn respond_to(self, _req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.into_response()
    }
}
