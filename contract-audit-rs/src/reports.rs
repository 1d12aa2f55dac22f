//! Report shapes returned by the three contract operations
//!
//! Every report deserializes leniently from model output and knows how to
//! build its own fallback, so callers always receive the same shape whether
//! the model answered, rambled, or was never reached.

use model_sdk::recovery::excerpt;
use model_sdk::{FailureCategory, PromptEnvelope, StructuredReport};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Where to switch on the Generative Language API
pub const ENABLE_API_URL: &str =
    "https://console.cloud.google.com/apis/library/generativelanguage.googleapis.com";

const UNPARSED_HEADLINE: &str = "Could not process in structured format";
const UNPARSED_REMEDY: &str = "Contact legal counsel";
const NOT_APPLICABLE: &str = "N/A";
const UNKNOWN: &str = "Unknown";

/// Envelope parameter carrying the clause under negotiation
pub const CLAUSE_PARAM: &str = "clause";

/// Strings the model may send as null or a number
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Scores the model may quote as a string
fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Number, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n,
        Value::String(s) => s.trim().parse::<Number>().unwrap_or_else(|_| Number::from(0)),
        _ => Number::from(0),
    })
}

fn zero() -> Number {
    Number::from(0)
}

/// User-facing text for one failure category
#[derive(Debug, Clone, PartialEq)]
pub struct FailureNotice {
    pub headline: String,
    pub detail: String,
    pub remedy: String,
}

impl FailureNotice {
    /// `activity` completes "An error occurred while ..."; `fallback_headline`
    /// titles unclassified failures.
    pub fn for_category(category: &FailureCategory, activity: &str, fallback_headline: &str) -> Self {
        match category {
            FailureCategory::CredentialMissingOrInvalid => Self {
                headline: "API Key Configuration Error".to_string(),
                detail: "Gemini API key is not configured or invalid. To use this feature, you need to enable \
                         the Generative Language API in your Google Cloud project."
                    .to_string(),
                remedy: format!("Visit {} to enable the API and get a valid API key.", ENABLE_API_URL),
            },
            FailureCategory::CapabilityNotEnabled => Self {
                headline: "Gemini API Not Enabled".to_string(),
                detail: "The Generative Language API is not enabled for your Google Cloud project.".to_string(),
                remedy: format!("Visit {} to enable the API.", ENABLE_API_URL),
            },
            FailureCategory::Timeout => Self {
                headline: "Request Timed Out".to_string(),
                detail: "The request took too long to process. This could be due to high API load or network \
                         issues. Please try again in a few moments."
                    .to_string(),
                remedy: "1. Wait a few moments and try again\n2. If the issue persists, try with a shorter \
                         contract\n3. If problems continue, contact support"
                    .to_string(),
            },
            FailureCategory::Unclassified(message) => Self {
                headline: fallback_headline.to_string(),
                detail: format!("An error occurred while {}: {}", activity, message),
                remedy: "Try again or contact support.".to_string(),
            },
        }
    }
}

/// One compliance finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceIssue {
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,

    /// Law or regulation the finding relates to
    #[serde(default, deserialize_with = "lenient_string")]
    pub law: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub fix: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yc_reference: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,

    #[serde(default)]
    pub issues: Vec<ComplianceIssue>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub overall_risk: String,

    /// 0-100
    #[serde(default = "zero", deserialize_with = "lenient_score")]
    pub compliance_score: Number,

    /// Full model text when it could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StructuredReport for AnalysisReport {
    const KEYS: &'static [&'static str] = &["summary", "issues", "overallRisk", "complianceScore"];

    fn unparsed(raw: &str, _envelope: &PromptEnvelope) -> Self {
        Self {
            summary: UNPARSED_HEADLINE.to_string(),
            issues: vec![ComplianceIssue {
                severity: UNKNOWN.to_string(),
                description: excerpt(raw),
                law: NOT_APPLICABLE.to_string(),
                fix: UNPARSED_REMEDY.to_string(),
                yc_reference: None,
                extra: Map::new(),
            }],
            overall_risk: UNKNOWN.to_string(),
            compliance_score: zero(),
            raw_response: Some(raw.to_string()),
            extra: Map::new(),
        }
    }

    fn from_failure(category: &FailureCategory, _envelope: &PromptEnvelope) -> Self {
        let notice = FailureNotice::for_category(category, "analyzing the contract", "Error Processing Contract");

        Self {
            summary: notice.headline,
            issues: vec![ComplianceIssue {
                severity: "Error".to_string(),
                description: notice.detail,
                law: NOT_APPLICABLE.to_string(),
                fix: notice.remedy,
                yc_reference: Some(NOT_APPLICABLE.to_string()),
                extra: Map::new(),
            }],
            overall_risk: UNKNOWN.to_string(),
            compliance_score: zero(),
            raw_response: None,
            extra: Map::new(),
        }
    }
}

/// One point to raise in a negotiation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationPoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub point: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub justification: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub suggested_revision: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `negotiate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub original_clause: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub analysis: String,

    #[serde(default)]
    pub negotiation_points: Vec<NegotiationPoint>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub suggested_response: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NegotiationReport {
    fn clause_of(envelope: &PromptEnvelope) -> String {
        envelope.param(CLAUSE_PARAM).unwrap_or_default().to_string()
    }
}

impl StructuredReport for NegotiationReport {
    const KEYS: &'static [&'static str] = &["originalClause", "analysis", "negotiationPoints", "suggestedResponse"];

    fn unparsed(raw: &str, envelope: &PromptEnvelope) -> Self {
        Self {
            original_clause: Self::clause_of(envelope),
            analysis: UNPARSED_HEADLINE.to_string(),
            negotiation_points: vec![NegotiationPoint {
                point: UNKNOWN.to_string(),
                justification: excerpt(raw),
                suggested_revision: UNPARSED_REMEDY.to_string(),
                extra: Map::new(),
            }],
            suggested_response: String::new(),
            raw_response: Some(raw.to_string()),
            extra: Map::new(),
        }
    }

    fn from_failure(category: &FailureCategory, envelope: &PromptEnvelope) -> Self {
        let notice = FailureNotice::for_category(
            category,
            "simulating the negotiation",
            "Error occurred during processing",
        );
        let suggested_response = match category {
            FailureCategory::CredentialMissingOrInvalid => "Please configure a valid Gemini API key and try again.",
            FailureCategory::CapabilityNotEnabled => {
                "Please enable the Generative Language API in your Google Cloud project."
            }
            FailureCategory::Timeout => "The request timed out. Please try again.",
            FailureCategory::Unclassified(_) => "An error occurred. Please try again with a different clause.",
        };

        Self {
            original_clause: Self::clause_of(envelope),
            analysis: notice.headline,
            negotiation_points: vec![NegotiationPoint {
                point: "ERROR".to_string(),
                justification: notice.detail,
                suggested_revision: notice.remedy,
                extra: Map::new(),
            }],
            suggested_response: suggested_response.to_string(),
            raw_response: None,
            extra: Map::new(),
        }
    }
}

/// A section where the contract departs from the YC SAFE
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDifference {
    #[serde(default, deserialize_with = "lenient_string")]
    pub section: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub yc_version: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub contract_version: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub impact: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A standard YC SAFE element the contract lacks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingElement {
    #[serde(default, deserialize_with = "lenient_string")]
    pub element: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub importance: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub impact: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub recommendation: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of `compare`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,

    /// High / Medium / Low
    #[serde(default, deserialize_with = "lenient_string")]
    pub adherence: String,

    #[serde(default)]
    pub differences: Vec<TemplateDifference>,

    #[serde(default)]
    pub missing_elements: Vec<MissingElement>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComparisonReport {
    fn single_difference(section: &str, impact: String, recommendation: String) -> TemplateDifference {
        TemplateDifference {
            section: section.to_string(),
            yc_version: NOT_APPLICABLE.to_string(),
            contract_version: NOT_APPLICABLE.to_string(),
            impact,
            recommendation,
            extra: Map::new(),
        }
    }
}

impl StructuredReport for ComparisonReport {
    const KEYS: &'static [&'static str] = &["summary", "adherence", "differences", "missingElements"];

    fn unparsed(raw: &str, _envelope: &PromptEnvelope) -> Self {
        Self {
            summary: UNPARSED_HEADLINE.to_string(),
            adherence: UNKNOWN.to_string(),
            differences: vec![Self::single_difference(UNKNOWN, excerpt(raw), UNPARSED_REMEDY.to_string())],
            missing_elements: Vec::new(),
            raw_response: Some(raw.to_string()),
            extra: Map::new(),
        }
    }

    fn from_failure(category: &FailureCategory, _envelope: &PromptEnvelope) -> Self {
        let notice = FailureNotice::for_category(
            category,
            "comparing with the YC template",
            "Error Processing Comparison",
        );

        Self {
            summary: notice.headline,
            adherence: UNKNOWN.to_string(),
            differences: vec![Self::single_difference("ERROR", notice.detail, notice.remedy)],
            missing_elements: Vec::new(),
            raw_response: None,
            extra: Map::new(),
        }
    }
}
