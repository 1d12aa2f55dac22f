//! Error mapping for the Gemini API
//!
//! Converts vendor error responses to [`ServiceError`] and folds any
//! [`ServiceError`] into the small set of [`FailureCategory`] values the
//! report fallbacks are keyed on.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Vendor messages meaning the credential is unusable.
const CREDENTIAL_MARKERS: &[&str] = &["API key not valid", "API key expired", "API key not found"];

/// Vendor messages meaning the generative API is switched off for the project.
const DISABLED_MARKERS: &[&str] = &[
    "API has not been enabled",
    "has not been used in project",
    "SERVICE_DISABLED",
];

/// User-facing failure categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCategory {
    /// No credential configured, or the vendor rejected it
    CredentialMissingOrInvalid,

    /// The generative API is not enabled for the caller's account
    CapabilityNotEnabled,

    /// Every attempt ran out of time
    Timeout,

    /// Anything else; carries the raw message for diagnosis
    Unclassified(String),
}

impl FailureCategory {
    /// Classify an error. Total: every error lands in exactly one category.
    pub fn classify(error: &ServiceError) -> Self {
        let message = error.to_string();

        if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) {
            return FailureCategory::CredentialMissingOrInvalid;
        }
        if DISABLED_MARKERS.iter().any(|m| message.contains(m))
            || error.error_code() == Some("SERVICE_DISABLED")
        {
            return FailureCategory::CapabilityNotEnabled;
        }

        match error.root() {
            ServiceError::Timeout(_) => FailureCategory::Timeout,
            ServiceError::Authentication(_) => FailureCategory::CredentialMissingOrInvalid,
            root => FailureCategory::Unclassified(root.to_string()),
        }
    }

    /// Short label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            FailureCategory::CredentialMissingOrInvalid => "credential_missing_or_invalid",
            FailureCategory::CapabilityNotEnabled => "capability_not_enabled",
            FailureCategory::Timeout => "timeout",
            FailureCategory::Unclassified(_) => "unclassified",
        }
    }
}

/// Map a Gemini API error body to a ServiceError
///
/// Gemini reports errors as `{"error": {"code", "message", "status"}}`. An
/// invalid key comes back as 400 `INVALID_ARGUMENT`, so the message is checked
/// before the status code.
pub fn map_gemini_error(status: StatusCode, json: &Value, context: &mut ErrorContext) -> ServiceError {
    context.service = "gemini".to_string();

    let error = json.get("error").unwrap_or(json);

    if let Some(vendor_status) = error.get("status").and_then(|s| s.as_str()) {
        context.error_code = Some(vendor_status.to_string());
    }

    // `details[].reason` carries SERVICE_DISABLED / API_KEY_INVALID
    if let Some(reason) = error
        .get("details")
        .and_then(|d| d.as_array())
        .and_then(|details| details.iter().find_map(|d| d.get("reason").and_then(|r| r.as_str())))
    {
        context.add("reason", reason);
    }

    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown Gemini error");

    if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) {
        return ServiceError::authentication(message);
    }

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limit(message),
        StatusCode::BAD_REQUEST => ServiceError::validation(message),
        _ => ServiceError::service(message),
    }
}

/// Map a generic HTTP error to a ServiceError
pub fn map_http_error(status: StatusCode, body: &str, context: &mut ErrorContext) -> ServiceError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if context.service == "gemini" || json.get("error").is_some() {
            return map_gemini_error(status, &json, context);
        }
    }

    let message = if body.is_empty() {
        status.to_string()
    } else if body.chars().count() > 100 {
        format!("{}: {}...", status, body.chars().take(100).collect::<String>())
    } else {
        format!("{}: {}", status, body)
    };

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limit(message),
        StatusCode::BAD_REQUEST => ServiceError::validation(message),
        _ => ServiceError::service(message),
    }
}
