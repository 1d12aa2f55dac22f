//! Request validation
//!
//! Rejects malformed requests before they reach the reviewer. Every rejection
//! becomes a 4xx response with a JSON `{"error": ...}` body.

use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::document::DocumentError;

/// Default maximum request payload size (10MB)
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Schema for the simulate request
pub static SIMULATE_REQUEST_SCHEMA: Lazy<JSONSchema> = Lazy::new(|| {
    let schema = json!({
        "type": "object",
        "required": ["text", "role"],
        "properties": {
            "text": {
                "type": "string",
                "minLength": 1
            },
            "role": {
                "type": "string",
                "enum": ["founder", "investor"]
            }
        }
    });

    JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(&schema)
        .expect("Invalid schema")
});

/// Error response for validation failures
#[derive(Debug, serde::Serialize)]
pub struct ValidationErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Validation error for API requests
#[derive(Debug, thiserror::Error)]
pub enum ApiValidationError {
    #[error("Invalid request format: {0}")]
    InvalidFormat(String),

    #[error("Content type must be {0}")]
    ContentType(String),

    #[error("Request payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Schema validation error")]
    Schema(Vec<String>),

    #[error("{0} is required")]
    MissingField(String),

    #[error("No file or text provided")]
    NoInput,

    #[error("Failed to parse PDF file: {0}")]
    Document(#[from] DocumentError),
}

impl ApiValidationError {
    /// Convert to HTTP status code and error response
    pub fn to_response(&self) -> (StatusCode, Json<ValidationErrorResponse>) {
        let status = match self {
            Self::ContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        let details = match self {
            Self::Schema(details) if !details.is_empty() => Some(details.clone()),
            _ => None,
        };

        (
            status,
            Json(ValidationErrorResponse {
                error: self.to_string(),
                code: status.as_u16(),
                details,
            }),
        )
    }
}

/// Validate the Content-Type header
pub fn validate_content_type(headers: &HeaderMap, expected: &str) -> Result<(), ApiValidationError> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with(expected) {
        return Err(ApiValidationError::ContentType(format!(
            "Expected content type '{}', got '{}'",
            expected, content_type
        )));
    }

    Ok(())
}

/// Validate a JSON payload against a compiled schema
pub fn validate_json_schema(schema: &JSONSchema, json: &Value) -> Result<(), ApiValidationError> {
    if let Err(errors) = schema.validate(json) {
        let details: Vec<String> = errors
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    err.to_string()
                } else {
                    format!("{} at {}", err, path)
                }
            })
            .collect();

        return Err(ApiValidationError::Schema(details));
    }

    Ok(())
}

/// Parse a JSON body, rejecting oversized or malformed input
pub fn parse_json_body(body: &[u8]) -> Result<Value, ApiValidationError> {
    if body.len() > MAX_PAYLOAD_SIZE {
        return Err(ApiValidationError::PayloadTooLarge(format!(
            "Payload size ({} bytes) exceeds maximum allowed size ({} bytes)",
            body.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    serde_json::from_slice::<Value>(body)
        .map_err(|e| ApiValidationError::InvalidFormat(format!("Invalid JSON: {}", e)))
}

/// Trim strings and strip NUL bytes throughout a JSON value
pub fn sanitize_json_object(value: &mut Value) {
    match value {
        Value::String(s) => {
            let cleaned = s.trim().replace('\u{0000}', "");
            if &cleaned != s {
                *s = cleaned;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(sanitize_json_object),
        Value::Object(obj) => obj.values_mut().for_each(sanitize_json_object),
        _ => {}
    }
}

/// Non-blank form value, trimmed
pub fn require_field(value: Option<&String>, label: &str) -> Result<String, ApiValidationError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiValidationError::MissingField(label.to_string()))
}

/// Generate middleware config for payload limits
pub fn payload_limit_config() -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE)
}
