//! The resilient model invoker
//!
//! Ties the pieces together: a missing credential short-circuits to the
//! credential fallback, the call runs under the [`InvocationGuard`], guard
//! errors are classified into a [`FailureCategory`], and successful output
//! goes through [`recovery::recover`]. Every path ends in a report value.

use std::sync::Arc;

use log::{error, info, warn};

use crate::config::GeminiConfig;
use crate::core::{PromptEnvelope, TextGenerator};
use crate::error::{ErrorContext, FailureCategory, Result, ServiceError};
use crate::recovery::{self, StructuredReport};
use crate::resilience::{GuardConfig, InvocationGuard};
use crate::services::gemini::GeminiClient;
use crate::util::{measure_time_async, sanitize_for_logging};

/// Wraps a [`TextGenerator`] so that invocation is total
#[derive(Clone)]
pub struct ResilientModelInvoker {
    /// `None` when no credential is configured
    generator: Option<Arc<dyn TextGenerator>>,
    guard: InvocationGuard,
}

impl std::fmt::Debug for ResilientModelInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientModelInvoker")
            .field("configured", &self.is_configured())
            .field("guard", self.guard.config())
            .finish()
    }
}

impl ResilientModelInvoker {
    /// Invoker over an explicit generator
    pub fn new(generator: Arc<dyn TextGenerator>, guard: GuardConfig) -> Self {
        Self {
            generator: Some(generator),
            guard: InvocationGuard::new(guard),
        }
    }

    /// Invoker with no credential. Every invocation returns the credential
    /// fallback without touching the network.
    pub fn unconfigured(guard: GuardConfig) -> Self {
        Self {
            generator: None,
            guard: InvocationGuard::new(guard),
        }
    }

    /// Build from configuration. A missing key yields an unconfigured
    /// invoker rather than an error; only an unusable configuration fails.
    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        if !config.has_credential() {
            warn!("No Gemini API key configured; model calls will return the credential fallback");
            return Ok(Self::unconfigured(config.guard_config()));
        }

        let client = GeminiClient::new_with_config(config.clone())?;
        info!("Gemini client ready for model {}", client.model());
        Ok(Self::new(Arc::new(client), config.guard_config()))
    }

    /// Whether calls will actually reach a generator
    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Invoke the model for `envelope` and return a report of type `T`.
    ///
    /// Never fails: call errors become `T::from_failure`, unusable output
    /// becomes `T::unparsed`.
    pub async fn invoke<T: StructuredReport>(&self, envelope: &PromptEnvelope) -> T {
        let Some(generator) = self.generator.as_ref() else {
            warn!("[{}] skipping model call: no credential", envelope.request_id());
            return T::from_failure(&FailureCategory::CredentialMissingOrInvalid, envelope);
        };

        let (result, elapsed) =
            measure_time_async(|| self.guard.run(|| generator.generate(envelope.prompt()))).await;

        match result {
            Ok(response) => {
                info!(
                    "[{}] model {} answered in {:?} (finish reason: {})",
                    envelope.request_id(),
                    response.model,
                    elapsed,
                    response.finish_reason.as_deref().unwrap_or("unknown")
                );
                if response.is_truncated() {
                    warn!("[{}] model output hit the token limit", envelope.request_id());
                }
                recovery::recover(response.text().unwrap_or_default(), envelope)
            }
            Err(err) => {
                let err = annotate(err, envelope);
                let category = FailureCategory::classify(&err);
                error!(
                    "[{}] model call failed after {:?} ({}): {}",
                    envelope.request_id(),
                    elapsed,
                    category.label(),
                    sanitize_for_logging(&err.to_string())
                );
                T::from_failure(&category, envelope)
            }
        }
    }
}

/// Tag a failed call with the envelope's request id and operation
pub(crate) fn annotate(err: ServiceError, envelope: &PromptEnvelope) -> ServiceError {
    err.with_context(
        ErrorContext::for_service("invoker")
            .request_id(envelope.request_id())
            .with("operation", envelope.param("operation").unwrap_or("unspecified")),
    )
}
