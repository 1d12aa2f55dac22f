//! Resilience patterns for model calls
//!
//! The invocation guard bounds each attempt in time and retries timeouts
//! with exponential backoff. Nothing else is retried.

mod guard;

pub use guard::{AttemptOutcome, GuardConfig, InvocationAttempt, InvocationGuard};
