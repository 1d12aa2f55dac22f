//! Mock tests for the Gemini service
//!
//! These tests use WireMock to simulate the Gemini API and verify that the
//! client and the invoker handle its responses and failures.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::core::{PromptEnvelope, TextGenerator};
    use crate::error::{FailureCategory, ServiceError};
    use crate::resilience::GuardConfig;
    use crate::services::gemini::{GeminiClient, GeminiClientBuilder};
    use crate::tests::SampleReport;
    use crate::ResilientModelInvoker;

    const GENERATE_PATH: &str = "/models/gemini-1.5-pro:generateContent";

    /// Creates a test Gemini client configured to use the mock server
    fn create_test_client(mock_server: &MockServer) -> GeminiClient {
        GeminiClientBuilder::new()
            .api_key("mock_api_key_for_testing")
            .base_url(mock_server.uri())
            .timeout(5)
            .build()
            .expect("Failed to build Gemini client")
    }

    fn text_response(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": text }]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 12,
                "candidatesTokenCount": 30,
                "totalTokenCount": 42
            },
            "modelVersion": "gemini-1.5-pro-002"
        })
    }

    fn error_response(code: u16, status: &str, message: &str, reason: Option<&str>) -> ResponseTemplate {
        let details = reason
            .map(|r| json!([{ "@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": r }]))
            .unwrap_or_else(|| json!([]));

        ResponseTemplate::new(code).set_body_json(json!({
            "error": {
                "code": code,
                "message": message,
                "status": status,
                "details": details
            }
        }))
    }

    #[tokio::test]
    async fn test_generate() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "mock_api_key_for_testing"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "Hello, Gemini" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("Hello back")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let response = client.generate("Hello, Gemini").await.unwrap();

        assert_eq!(response.text(), Some("Hello back"));
        assert_eq!(response.model, "gemini-1.5-pro-002");
        assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(response.total_tokens, Some(42));
    }

    #[tokio::test]
    async fn test_model_prefix_is_not_doubled() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = GeminiClient::builder()
            .api_key("key")
            .model("models/gemini-1.5-flash")
            .base_url(format!("{}/", mock_server.uri()))
            .build()
            .unwrap();

        assert_eq!(client.generate("hi").await.unwrap().text(), Some("ok"));
    }

    #[tokio::test]
    async fn test_missing_candidates_yield_no_text() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let response = client.generate("prompt").await.unwrap();

        assert!(response.text.is_none());
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let result = GeminiClientBuilder::new().api_key("").build();

        let err = result.unwrap_err();
        assert!(matches!(err, ServiceError::Authentication(_)));
        assert_eq!(FailureCategory::classify(&err), FailureCategory::CredentialMissingOrInvalid);
    }

    #[tokio::test]
    async fn test_invalid_key_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(error_response(
                400,
                "INVALID_ARGUMENT",
                "API key not valid. Please pass a valid API key.",
                Some("API_KEY_INVALID"),
            ))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::Authentication(_)));
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.error_code(), Some("INVALID_ARGUMENT"));
        assert_eq!(
            err.context().unwrap().data.get("reason").map(String::as_str),
            Some("API_KEY_INVALID")
        );
        assert_eq!(FailureCategory::classify(&err), FailureCategory::CredentialMissingOrInvalid);
    }

    #[tokio::test]
    async fn test_disabled_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(error_response(
                403,
                "PERMISSION_DENIED",
                "Generative Language API has not been used in project 42 before or it is disabled.",
                Some("SERVICE_DISABLED"),
            ))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::Authorization(_)));
        assert_eq!(FailureCategory::classify(&err), FailureCategory::CapabilityNotEnabled);
    }

    #[tokio::test]
    async fn test_rate_limit_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(error_response(429, "RESOURCE_EXHAUSTED", "Resource has been exhausted", None))
            .mount(&mock_server)
            .await;

        let client = create_test_client(&mock_server);
        let err = client.generate("prompt").await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::RateLimit(_)));
        assert!(matches!(FailureCategory::classify(&err), FailureCategory::Unclassified(_)));
    }

    #[tokio::test]
    async fn test_invoker_recovers_fenced_output() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(
                "Here is the analysis:\n```json\n{\"summary\": \"Standard SAFE\", \"findings\": [{\"severity\": \"Low\"}]}\n```",
            )))
            .expect(1)
            .mount(&mock_server)
            .await;

        let invoker = ResilientModelInvoker::new(Arc::new(create_test_client(&mock_server)), GuardConfig::default());
        let report: SampleReport = invoker.invoke(&PromptEnvelope::new("Analyze")).await;

        assert_eq!(report.summary, "Standard SAFE");
        assert_eq!(report.findings, vec![json!({"severity": "Low"})]);
    }

    #[tokio::test]
    async fn test_invoker_does_not_retry_server_errors() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(error_response(500, "INTERNAL", "Internal error encountered.", None))
            .expect(1)
            .mount(&mock_server)
            .await;

        let invoker = ResilientModelInvoker::new(Arc::new(create_test_client(&mock_server)), GuardConfig::default());
        let report: SampleReport = invoker.invoke(&PromptEnvelope::new("Analyze")).await;

        assert_eq!(report.summary, "failure:unclassified");
    }

    #[tokio::test]
    async fn test_invoker_does_not_retry_vendor_deadline() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(error_response(504, "DEADLINE_EXCEEDED", "Deadline expired before operation could complete.", None))
            .expect(1)
            .mount(&mock_server)
            .await;

        let invoker = ResilientModelInvoker::new(Arc::new(create_test_client(&mock_server)), GuardConfig::default());
        let report: SampleReport = invoker.invoke(&PromptEnvelope::new("Analyze")).await;

        assert_eq!(report.summary, "failure:unclassified");
    }

    #[tokio::test]
    async fn test_invoker_retries_slow_responses_once() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(text_response("{\"summary\": \"late\"}"))
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        let guard = GuardConfig {
            attempt_timeout: Duration::from_millis(300),
            max_retries: 1,
            backoff_base: Duration::from_millis(50),
        };
        let invoker = ResilientModelInvoker::new(Arc::new(create_test_client(&mock_server)), guard);
        let report: SampleReport = invoker.invoke(&PromptEnvelope::new("Analyze")).await;

        assert_eq!(report.summary, "failure:timeout");
    }
}
