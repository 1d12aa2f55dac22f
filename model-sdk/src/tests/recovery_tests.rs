//! Tests for structured-response recovery

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::core::PromptEnvelope;
    use crate::recovery::{balanced_scan, recover, salvage, top_level_spans, STRATEGIES};
    use crate::tests::SampleReport;

    fn envelope() -> PromptEnvelope {
        PromptEnvelope::new("Review this contract")
    }

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = STRATEGIES.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["direct_parse", "balanced_scan", "fence_strip"]);
    }

    #[test]
    fn test_salvage_finds_embedded_values() {
        let values = vec![
            json!({"summary": "Fair terms", "issues": []}),
            json!([{"point": "Valuation cap", "rationale": "Too low"}]),
            json!({"nested": {"deep": [1, {"x": "}"}]}, "quote": "she said \"{\""}),
        ];

        for value in values {
            let serialized = serde_json::to_string_pretty(&value).unwrap();
            let wrapped = [
                serialized.clone(),
                format!("Here is my analysis:\n{}\nLet me know if you need more.", serialized),
                format!("```json\n{}\n```", serialized),
                format!("Thinking... the user wants JSON.\n\n```json\n{}\n```\nDone.", serialized),
            ];

            for text in wrapped.iter() {
                assert_eq!(salvage(text).as_ref(), Some(&value), "failed on: {}", text);
            }
        }
    }

    #[test]
    fn test_fenced_with_leading_prose() {
        let raw = "Here is the result:\n```json\n{\"summary\":\"ok\",\"findings\":[]}\n```\nThanks";
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.summary, "ok");
        assert!(report.findings.is_empty());
        assert!(report.raw_response.is_none());
    }

    #[test]
    fn test_inner_fragment_is_not_taken_for_report() {
        // Only the nested object is complete; it lacks every report key
        let raw = r#"Partial output: {"summary": "cut off", "findings": [{"severity": "High"}"#;
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.summary, "Could not process in structured format");
        assert_eq!(report.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn test_later_structure_wins() {
        let raw = r#"First draft: {"summary": "draft"} Final answer: {"summary": "final", "findings": ["a"]}"#;
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.summary, "final");
        assert_eq!(report.findings, vec![json!("a")]);
    }

    #[test]
    fn test_wrong_field_types_fall_back() {
        let raw = r#"{"summary": 5, "findings": "none"}"#;
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.summary, "Could not process in structured format");
        assert_eq!(report.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn test_unknown_fields_survive() {
        let raw = r#"{"summary": "ok", "findings": [], "overallScore": 85, "notes": {"a": 1}}"#;
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.extra.get("overallScore"), Some(&json!(85)));
        assert_eq!(report.extra.get("notes"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_fallback_truncates_description() {
        let raw = "x".repeat(1000);
        let report: SampleReport = recover(&raw, &envelope());

        let description = report.findings[0]["description"].as_str().unwrap();
        assert_eq!(description.chars().count(), 503);
        assert_eq!(description, format!("{}...", "x".repeat(500)));
        assert_eq!(report.raw_response.as_deref(), Some(raw.as_str()));
    }

    #[test]
    fn test_short_fallback_is_not_truncated() {
        let raw = "The model refused to answer.";
        let report: SampleReport = recover(raw, &envelope());

        assert_eq!(report.findings[0]["description"], json!(raw));
    }

    #[test]
    fn test_empty_text_gives_unparsed_report() {
        let report: SampleReport = recover("", &envelope());

        assert_eq!(report.summary, "Could not process in structured format");
        assert_eq!(report.findings, vec![json!({"description": ""})]);
        assert_eq!(report.raw_response.as_deref(), Some(""));
        assert_eq!(salvage(""), None);
    }

    #[test]
    fn test_recovery_is_idempotent() {
        let inputs = [
            "```json\n{\"summary\": \"ok\", \"findings\": [{\"a\": 1}], \"score\": 7}\n```".to_string(),
            "no structure at all".to_string(),
            "y".repeat(800),
        ];

        for raw in inputs.iter() {
            let first: SampleReport = recover(raw, &envelope());
            let serialized = serde_json::to_string(&first).unwrap();
            let second: SampleReport = recover(&serialized, &envelope());
            assert_eq!(first, second, "not idempotent for: {}", raw);
        }
    }

    #[test]
    fn test_balanced_scan_respects_acceptance() {
        let text = r#"{"a": 1} and then {"b": 2}"#;
        let only_a = |v: &Value| v.get("a").is_some();

        assert_eq!(balanced_scan(text, &only_a), Some(json!({"a": 1})));
        assert_eq!(top_level_spans(text).len(), 2);
    }
}
