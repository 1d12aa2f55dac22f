//! # Model SDK
//!
//! Resilient access to an external generative model for the contract audit
//! service.
//!
//! This crate provides:
//!
//! - A `TextGenerator` abstraction and a typed Gemini client implementing it
//! - An invocation guard: per-attempt timeout, retry on timeout only,
//!   exponential backoff between attempts
//! - Structured-response recovery from noisy model text
//! - An error taxonomy that folds every failure into a small set of
//!   user-facing categories
//! - Configuration loading from the environment or memory
//!
//! ## Architecture
//!
//! - `TextGenerator`: one network call, prompt in, text out
//! - `InvocationGuard`: bounds and retries a `TextGenerator` call
//! - `recovery`: ordered salvage strategies, `StructuredReport` fallbacks
//! - `ResilientModelInvoker`: the total entry point callers use
//! - `ServiceError` / `FailureCategory`: error handling system

// Re-export core modules
pub mod core;
pub use self::core::{GenerationResponse, PromptEnvelope, TextGenerator};

// Re-export service-specific modules
pub mod services;
pub use services::gemini;

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, FailureCategory, Result, ServiceError};

// Re-export resilience patterns
pub mod resilience;
pub use resilience::{GuardConfig, InvocationGuard};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, GeminiConfig, ServiceConfig};

pub mod recovery;
pub use recovery::StructuredReport;

mod invoker;
pub use invoker::ResilientModelInvoker;

// Utility module for common functionality
pub mod util;

#[cfg(test)]
mod tests;
