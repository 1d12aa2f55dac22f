//! Contract audit HTTP service
//!
//! Accepts contract uploads or pasted text, runs them through the model
//! prompts and returns structured reports. Model failures never become HTTP
//! errors: they arrive as fallback report content. Only malformed requests
//! are rejected.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod document;
pub mod prompts;
pub mod reports;
pub mod reviewer;
pub mod settings;
pub mod validation;

use document::{StubPdfExtractor, TextExtractor};
use model_sdk::{GeminiConfig, ResilientModelInvoker};
use reviewer::{ContractReviewer, Role};
use validation::{
    parse_json_body, payload_limit_config, require_field, sanitize_json_object, validate_content_type,
    validate_json_schema, ApiValidationError, ValidationErrorResponse, MAX_PAYLOAD_SIZE, SIMULATE_REQUEST_SCHEMA,
};

type ApiError = (StatusCode, Json<ValidationErrorResponse>);

/// Report plus the text extracted from an uploaded file
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse<T: Serialize> {
    #[serde(flatten)]
    pub report: T,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

/// Simulate request body (JSON)
#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub text: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub service_name: String,
    pub uptime_seconds: u64,
    pub status: String,
    pub model_configured: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// An uploaded file
#[derive(Debug)]
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// Parsed multipart form
#[derive(Debug, Default)]
struct FormInput {
    upload: Option<Upload>,
    fields: HashMap<String, String>,
}

impl FormInput {
    async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, ApiValidationError> {
        let mut multipart = multipart.map_err(|e| ApiValidationError::InvalidFormat(e.body_text()))?;
        let mut form = FormInput::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiValidationError::InvalidFormat(format!("Failed to read form data: {}", e)))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "file" {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiValidationError::InvalidFormat(format!("Failed to read upload: {}", e)))?;

                // Browsers send an empty, unnamed part when no file was chosen
                if bytes.is_empty() && file_name.as_deref().map_or(true, str::is_empty) {
                    continue;
                }
                form.upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes,
                });
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiValidationError::InvalidFormat(format!("Failed to read field {}: {}", name, e)))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }
}

/// Core service state and functionality
pub struct AuditService {
    reviewer: ContractReviewer,
    extractor: Arc<dyn TextExtractor>,
    started_at: Instant,
}

impl AuditService {
    pub fn new(reviewer: ContractReviewer, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            reviewer,
            extractor,
            started_at: Instant::now(),
        }
    }

    /// Service backed by Gemini and the stub PDF extractor
    pub fn from_config(config: &GeminiConfig) -> model_sdk::Result<Self> {
        let invoker = ResilientModelInvoker::from_config(config)?;
        Ok(Self::new(ContractReviewer::new(invoker), Arc::new(StubPdfExtractor)))
    }

    /// Create the Axum router with all routes and middleware
    pub fn create_router(self: Arc<Self>) -> Router {
        Router::new()
            .route("/", get(Self::root_handler))
            .route("/health", get(Self::health_handler))
            .route("/api/audit", post(Self::audit_handler))
            .route("/api/compare", post(Self::compare_handler))
            .route("/api/negotiate", post(Self::negotiate_handler))
            .route("/api/simulate", post(Self::simulate_handler))
            .layer(DefaultBodyLimit::max(MAX_PAYLOAD_SIZE))
            .layer(payload_limit_config())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .with_state(self)
    }

    /// Contract text from an upload or the `text` field. The second value is
    /// the extracted text, present only for uploads.
    fn contract_text(&self, form: &FormInput) -> Result<(String, Option<String>), ApiValidationError> {
        if let Some(upload) = &form.upload {
            tracing::info!(
                file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
                content_type = upload.content_type.as_deref().unwrap_or("<none>"),
                size = upload.bytes.len(),
                "Processing uploaded file"
            );
            let text = self
                .extractor
                .extract_text(&upload.bytes, upload.content_type.as_deref())
                .map_err(|e| {
                    tracing::error!("Error parsing upload: {}", e);
                    ApiValidationError::from(e)
                })?;
            tracing::info!("Extracted {} characters from upload", text.chars().count());
            return Ok((text.clone(), Some(text)));
        }

        match form.fields.get("text").filter(|t| !t.trim().is_empty()) {
            Some(text) => {
                tracing::info!("Processing text input of length {} characters", text.chars().count());
                Ok((text.clone(), None))
            }
            None => Err(ApiValidationError::NoInput),
        }
    }

    async fn root_handler() -> impl IntoResponse {
        Json(serde_json::json!({
            "service": "Contract Audit",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": [
                "GET /health",
                "POST /api/audit",
                "POST /api/compare",
                "POST /api/negotiate",
                "POST /api/simulate"
            ]
        }))
    }

    async fn health_handler(State(state): State<Arc<Self>>) -> impl IntoResponse {
        let model_configured = state.reviewer.is_configured();

        Json(HealthResponse {
            healthy: true,
            service_name: "contract-audit".to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            status: if model_configured { "SERVING" } else { "DEGRADED" }.to_string(),
            model_configured,
            timestamp: chrono::Utc::now(),
        })
    }

    /// POST /api/audit - Compliance analysis of an upload or pasted text
    async fn audit_handler(
        State(state): State<Arc<Self>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        tracing::info!("Received audit request");
        let form = FormInput::read(multipart).await.map_err(|e| e.to_response())?;
        let (text, extracted_text) = state.contract_text(&form).map_err(|e| e.to_response())?;

        let report = state.reviewer.analyze(&text).await;
        tracing::info!(
            issues = report.issues.len(),
            unparsed = report.raw_response.is_some(),
            "Analysis complete"
        );

        Ok(Json(ReportResponse { report, extracted_text }))
    }

    /// POST /api/compare - Comparison with the YC SAFE template
    async fn compare_handler(
        State(state): State<Arc<Self>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        tracing::info!("Received compare request");
        let form = FormInput::read(multipart).await.map_err(|e| e.to_response())?;
        let (text, extracted_text) = state.contract_text(&form).map_err(|e| e.to_response())?;

        let report = state.reviewer.compare(&text).await;
        tracing::info!(
            differences = report.differences.len(),
            missing = report.missing_elements.len(),
            "Comparison complete"
        );

        Ok(Json(ReportResponse { report, extracted_text }))
    }

    /// POST /api/negotiate - Negotiation simulation from form fields
    async fn negotiate_handler(
        State(state): State<Arc<Self>>,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        tracing::info!("Received negotiate request");
        let form = FormInput::read(multipart).await.map_err(|e| e.to_response())?;

        let clause = require_field(form.fields.get("clause"), "Contract clause").map_err(|e| e.to_response())?;
        let perspective = require_field(form.fields.get("perspective"), "Perspective").map_err(|e| e.to_response())?;

        let report = state.reviewer.negotiate(&clause, &perspective).await;
        tracing::info!(points = report.negotiation_points.len(), "Negotiation complete");

        Ok(Json(report))
    }

    /// POST /api/simulate - Negotiation simulation from a JSON body
    async fn simulate_handler(
        State(state): State<Arc<Self>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<impl IntoResponse, ApiError> {
        validate_content_type(&headers, "application/json").map_err(|e| e.to_response())?;

        let mut json_value = parse_json_body(&body).map_err(|e| e.to_response())?;
        sanitize_json_object(&mut json_value);
        validate_json_schema(&SIMULATE_REQUEST_SCHEMA, &json_value).map_err(|e| e.to_response())?;

        let request: SimulateRequest = serde_json::from_value(json_value)
            .map_err(|e| ApiValidationError::InvalidFormat(e.to_string()).to_response())?;

        let report = state
            .reviewer
            .negotiate(&request.text, &request.role.to_string())
            .await;

        Ok(Json(serde_json::json!({ "result": report })))
    }
}
