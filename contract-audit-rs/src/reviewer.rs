//! The three contract operations

use std::fmt;

use model_sdk::{PromptEnvelope, ResilientModelInvoker};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::prompts::{self, MAX_CONTRACT_CHARS};
use crate::reports::{AnalysisReport, ComparisonReport, NegotiationReport, CLAUSE_PARAM};

/// Side of the table a negotiation is simulated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Founder,
    Investor,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Founder => write!(f, "founder"),
            Role::Investor => write!(f, "investor"),
        }
    }
}

/// Runs contract prompts through a [`ResilientModelInvoker`]
///
/// Every operation returns a well-shaped report; model failures surface as
/// fallback content, never as errors.
#[derive(Debug, Clone)]
pub struct ContractReviewer {
    invoker: ResilientModelInvoker,
}

impl ContractReviewer {
    pub fn new(invoker: ResilientModelInvoker) -> Self {
        Self { invoker }
    }

    /// Whether a model credential is configured
    pub fn is_configured(&self) -> bool {
        self.invoker.is_configured()
    }

    /// Compliance review of a whole document
    pub async fn analyze(&self, document_text: &str) -> AnalysisReport {
        let prepared = Self::prepare(document_text);
        let envelope = PromptEnvelope::new(prompts::analysis_prompt(&prepared)).with_param("operation", "analyze");

        info!(request_id = envelope.request_id(), "Analyzing contract");
        self.invoker.invoke(&envelope).await
    }

    /// Simulate negotiating one clause from `perspective`
    pub async fn negotiate(&self, clause_text: &str, perspective: &str) -> NegotiationReport {
        let envelope = PromptEnvelope::new(prompts::negotiation_prompt(clause_text, perspective))
            .with_param("operation", "negotiate")
            .with_param(CLAUSE_PARAM, clause_text)
            .with_param("perspective", perspective);

        info!(request_id = envelope.request_id(), perspective, "Simulating negotiation");
        self.invoker.invoke(&envelope).await
    }

    /// Compare a document with the YC SAFE template
    pub async fn compare(&self, document_text: &str) -> ComparisonReport {
        let prepared = Self::prepare(document_text);
        let envelope = PromptEnvelope::new(prompts::comparison_prompt(&prepared)).with_param("operation", "compare");

        info!(request_id = envelope.request_id(), "Comparing contract with YC template");
        self.invoker.invoke(&envelope).await
    }

    fn prepare(document_text: &str) -> String {
        let prepared = prompts::truncate_contract(document_text, MAX_CONTRACT_CHARS);
        if prepared != document_text {
            info!(
                "Contract truncated from {} to {} characters",
                document_text.chars().count(),
                prepared.chars().count()
            );
        }
        prepared
    }
}
