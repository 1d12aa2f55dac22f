//! Gemini API client implementation
//!
//! This module provides a strongly-typed client for the Gemini
//! `generateContent` endpoint.

mod models;
pub use models::*;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use crate::config::{GeminiConfig, ServiceConfig};
use crate::core::{GenerationResponse, TextGenerator};
use crate::error::{ErrorContext, Result, ServiceError};
use crate::services::common::{build_http_client, parse_error_response, UserAgent};
use crate::util::sanitize_for_logging;

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Extra time the transport allows beyond the guard's per-attempt budget
const TRANSPORT_GRACE: Duration = Duration::from_secs(5);

/// Gemini API client
pub struct GeminiClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: GeminiConfig,

    /// Credential, checked non-empty at construction
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Create a new Gemini client with custom configuration
    pub fn new_with_config(config: GeminiConfig) -> Result<Self> {
        config.validate()?;

        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ServiceError::authentication("API key not found: no Gemini API key configured"))?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("Gemini-Client".to_string()),
                ..UserAgent::default()
            }),
            Some(Duration::from_secs(config.timeout_seconds) + TRANSPORT_GRACE),
        )?;

        Ok(Self {
            http_client,
            config,
            api_key,
        })
    }

    /// Create a new builder for the Gemini client
    pub fn builder() -> GeminiClientBuilder {
        GeminiClientBuilder::default()
    }

    /// Model this client talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        let model = self.config.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!("{}/{}:generateContent", self.config.base_url.trim_end_matches('/'), model_path)
    }

    /// Send a raw `generateContent` request
    pub async fn generate_content(&self, request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint();
        debug!("Sending request to Gemini: POST {}", url);

        let start_time = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::timeout(format!("Request timed out: {}", e))
                } else {
                    ServiceError::network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error = parse_error_response("gemini", response).await;
            warn!(
                "Gemini request failed with status {}: {}",
                status,
                sanitize_for_logging(&error.to_string())
            );
            return Err(error);
        }

        let body = response.json::<GenerateContentResponse>().await.map_err(|e| {
            ServiceError::parsing(format!("Failed to parse response: {}", e))
                .with_context(ErrorContext::for_service("gemini").status_code(status.as_u16()))
        })?;

        debug!("Gemini responded in {:?}", start_time.elapsed());
        Ok(body)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse> {
        let body = self.generate_content(&GenerateContentRequest::from_prompt(prompt)).await?;

        Ok(GenerationResponse {
            model: body.model_version.clone().unwrap_or_else(|| self.config.model.clone()),
            text: body.text(),
            finish_reason: body.finish_reason().map(str::to_string),
            total_tokens: body.usage_metadata.as_ref().and_then(|u| u.total_token_count),
        })
    }
}

/// Builder for Gemini client
#[derive(Default)]
pub struct GeminiClientBuilder {
    config: GeminiConfig,
}

impl GeminiClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn config(mut self, config: GeminiConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the per-attempt timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.config.timeout_seconds = seconds;
        self
    }

    /// Build the Gemini client
    pub fn build(self) -> Result<GeminiClient> {
        GeminiClient::new_with_config(self.config)
    }
}
