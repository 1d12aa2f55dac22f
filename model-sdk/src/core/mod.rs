//! Core abstractions for the model SDK
//!
//! - `TextGenerator`: one network call that turns a prompt into generated text
//! - `GenerationResponse`: the vendor-neutral result of that call
//! - `PromptEnvelope`: the immutable request handed to the invoker

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single call to an external text-generation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt. One invocation is one network round trip;
    /// retries and timeouts are the caller's concern.
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse>;
}

/// Result of one generation call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model that produced the output
    pub model: String,

    /// Generated text. `None` when the vendor returned an envelope without
    /// any candidate content.
    pub text: Option<String>,

    /// Vendor finish reason (e.g. `STOP`, `MAX_TOKENS`)
    pub finish_reason: Option<String>,

    /// Total tokens reported by the vendor
    pub total_tokens: Option<u32>,
}

impl GenerationResponse {
    /// Build a response carrying text, used by tests and simple generators
    pub fn from_text(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// The generated text, if any
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether generation stopped on the token limit, i.e. the text is
    /// likely truncated
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("MAX_TOKENS")
    }
}

/// Request envelope: a prompt plus named parameters
///
/// Built once by the caller and consumed by a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptEnvelope {
    request_id: String,
    prompt: String,
    params: BTreeMap<String, String>,
}

impl PromptEnvelope {
    /// Create an envelope around a prompt
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            prompt: prompt.into(),
            params: BTreeMap::new(),
        }
    }

    /// Attach a named parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
