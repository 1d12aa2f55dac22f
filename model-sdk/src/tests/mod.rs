//! Unit tests for the model SDK
//!
//! This module contains tests for various components of the SDK.

pub mod config_tests;
pub mod gemini_mock_tests;
pub mod recovery_tests;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::PromptEnvelope;
use crate::error::FailureCategory;
use crate::recovery::{excerpt, StructuredReport};

/// Minimal report shape used across the SDK tests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleReport {
    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub findings: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredReport for SampleReport {
    const KEYS: &'static [&'static str] = &["summary", "findings"];

    fn unparsed(raw: &str, _envelope: &PromptEnvelope) -> Self {
        Self {
            summary: "Could not process in structured format".to_string(),
            findings: vec![serde_json::json!({ "description": excerpt(raw) })],
            raw_response: Some(raw.to_string()),
            extra: Map::new(),
        }
    }

    fn from_failure(category: &FailureCategory, _envelope: &PromptEnvelope) -> Self {
        Self {
            summary: format!("failure:{}", category.label()),
            findings: Vec::new(),
            raw_response: None,
            extra: Map::new(),
        }
    }
}
