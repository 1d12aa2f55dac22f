//! Structured-response recovery
//!
//! Model output is nominally JSON but often arrives wrapped in prose, fenced
//! in markdown, or with a reasoning preamble. Recovery runs an ordered list of
//! pure strategies over the raw text and takes the first value that fits the
//! caller's report shape. When nothing fits, the report's own fallback is
//! built from the raw text, so recovery never fails.

mod scan;

pub use scan::top_level_spans;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::PromptEnvelope;
use crate::error::FailureCategory;
use crate::util::truncate_chars;

/// Characters of raw text kept in a fallback description
pub const FALLBACK_EXCERPT_CHARS: usize = 500;

/// Markdown code-fence markers, with an optional language tag
static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("fence pattern is valid"));

/// A report shape the invoker can produce
///
/// Implementors describe their keys and how to build a well-shaped value when
/// the model output cannot be used or the call itself failed.
pub trait StructuredReport: DeserializeOwned + Sized {
    /// Top-level keys of the report. A candidate object must carry at least
    /// one of them to be taken for this report.
    const KEYS: &'static [&'static str];

    /// Whether a salvaged value plausibly is this report
    fn accepts(value: &Value) -> bool {
        value
            .as_object()
            .map_or(false, |object| Self::KEYS.iter().any(|key| object.contains_key(*key)))
    }

    /// Fallback for output that could not be recovered. Must keep `raw`
    /// verbatim in a debug field.
    fn unparsed(raw: &str, envelope: &PromptEnvelope) -> Self;

    /// Fallback for a failed invocation
    fn from_failure(category: &FailureCategory, envelope: &PromptEnvelope) -> Self;
}

/// A recovery strategy: raw text and an acceptance test in, a value out
pub type Strategy = fn(&str, &dyn Fn(&Value) -> bool) -> Option<Value>;

/// Strategies in the order they are tried
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("direct_parse", direct_parse),
    ("balanced_scan", balanced_scan),
    ("fence_strip", fence_strip),
];

fn parse_structured(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .filter(|v| v.is_object() || v.is_array())
}

/// The whole text is JSON.
pub fn direct_parse(text: &str, accept: &dyn Fn(&Value) -> bool) -> Option<Value> {
    parse_structured(text.trim()).filter(|v| accept(v))
}

/// JSON embedded in surrounding text.
///
/// Complete top-level structures are tried last first, so a final answer wins
/// over an earlier draft. The greedy first-opener-to-last-closer spans are the
/// last resort.
pub fn balanced_scan(text: &str, accept: &dyn Fn(&Value) -> bool) -> Option<Value> {
    let balanced = scan::top_level_spans(text).into_iter().rev();
    let greedy = [scan::greedy_span(text, '{', '}'), scan::greedy_span(text, '[', ']')]
        .into_iter()
        .flatten();

    balanced
        .chain(greedy)
        .filter_map(|(start, end)| parse_structured(&text[start..end]))
        .find(|v| accept(v))
}

/// JSON inside markdown code fences.
pub fn fence_strip(text: &str, accept: &dyn Fn(&Value) -> bool) -> Option<Value> {
    let cleaned = FENCE_MARKER.replace_all(text, "");
    parse_structured(cleaned.trim()).filter(|v| accept(v))
}

/// First structured value any strategy can find in `text`.
pub fn salvage(text: &str) -> Option<Value> {
    let any = |_: &Value| true;
    STRATEGIES.iter().find_map(|(_, strategy)| strategy(text, &any))
}

/// Recover a report from raw model output. Total: falls back to
/// [`StructuredReport::unparsed`] when no strategy yields a usable value.
pub fn recover<T: StructuredReport>(raw: &str, envelope: &PromptEnvelope) -> T {
    let fits = |v: &Value| T::accepts(v) && serde_json::from_value::<T>(v.clone()).is_ok();

    for (name, strategy) in STRATEGIES {
        if let Some(value) = strategy(raw, &fits) {
            if let Ok(report) = serde_json::from_value::<T>(value) {
                debug!("[{}] recovered response with {}", envelope.request_id(), name);
                return report;
            }
        }
    }

    warn!(
        "[{}] could not recover structured output from {} characters of model text",
        envelope.request_id(),
        raw.chars().count()
    );
    T::unparsed(raw, envelope)
}

/// Fallback description text: the first 500 characters, with `...` appended
/// when anything was cut.
pub fn excerpt(raw: &str) -> String {
    truncate_chars(raw, FALLBACK_EXCERPT_CHARS)
}
