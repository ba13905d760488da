use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::AnalysisError;

/// Public Gemini endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Connection establishment limit; the overall deadline is enforced by the caller.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gemini `generateContent` client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate_content(&self, prompt: &str) -> Result<String, AnalysisError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    AnalysisError::ServiceConnection(self.base_url.clone())
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::HttpClient(format!("Unreadable response body: {e}")))?;

        extract_candidate_text(parsed)
    }
}

impl LlmClient for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AnalysisError>> {
        self.generate_content(prompt).boxed()
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Request body for `generateContent`.
#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Response body from `generateContent`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Join the text parts of the first candidate.
fn extract_candidate_text(response: GenerateContentResponse) -> Result<String, AnalysisError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AnalysisError::ServiceRejected(format!("prompt blocked: {reason}")));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or(AnalysisError::EmptyResponse)?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return match candidate.finish_reason {
            Some(reason) if reason != "STOP" => Err(AnalysisError::ServiceRejected(format!(
                "generation stopped: {reason}"
            ))),
            _ => Err(AnalysisError::EmptyResponse),
        };
    }

    Ok(text)
}

/// What a `MockLlmClient` does when called.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Respond(String),
    Fail { status: u16, body: String },
    Delay(Duration, String),
    Hang,
}

/// Mock reasoning service for testing: replays a configured behavior and
/// records every prompt it receives.
pub struct MockLlmClient {
    behavior: MockBehavior,
    prompts: Mutex<Vec<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_behavior(MockBehavior::Respond(response.to_string()))
    }

    pub fn failing(status: u16, body: &str) -> Self {
        Self::with_behavior(MockBehavior::Fail {
            status,
            body: body.to_string(),
        })
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, AnalysisError>> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let behavior = self.behavior.clone();
        async move {
            match behavior {
                MockBehavior::Respond(text) => Ok(text),
                MockBehavior::Fail { status, body } => {
                    Err(AnalysisError::ServiceStatus { status, body })
                }
                MockBehavior::Delay(delay, text) => {
                    tokio::time::sleep(delay).await;
                    Ok(text)
                }
                MockBehavior::Hang => futures_util::future::pending::<Result<String, AnalysisError>>().await,
            }
        }
        .boxed()
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = GeminiClient::new("https://example.test/", "key", "gemini-2.0-flash").unwrap();
        assert_eq!(client.base_url, "https://example.test");
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn joins_candidate_parts() {
        let parsed = response(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "{\"a\":"}, {"text": "1}"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }));
        assert_eq!(extract_candidate_text(parsed).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn blocked_prompt_is_rejected() {
        let parsed = response(serde_json::json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }));
        let err = extract_candidate_text(parsed).unwrap_err();
        assert!(matches!(err, AnalysisError::ServiceRejected(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn missing_candidates_is_empty_response() {
        let parsed = response(serde_json::json!({"candidates": []}));
        assert!(matches!(
            extract_candidate_text(parsed),
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn empty_text_with_abnormal_finish_is_rejected() {
        let parsed = response(serde_json::json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }));
        assert!(matches!(
            extract_candidate_text(parsed),
            Err(AnalysisError::ServiceRejected(_))
        ));
    }

    #[tokio::test]
    async fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        assert_eq!(client.generate("prompt").await.unwrap(), "test response");
        assert_eq!(client.prompts(), vec!["prompt".to_string()]);
    }

    #[tokio::test]
    async fn failing_mock_returns_status_error() {
        let client = MockLlmClient::failing(429, "quota exceeded");
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AnalysisError::ServiceStatus { status: 429, .. }));
    }

    #[tokio::test]
    async fn unreachable_service_is_connection_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let client = GeminiClient::new("http://127.0.0.1:9", "key", DEFAULT_MODEL).unwrap();
        let err = client.generate("prompt").await.unwrap_err();
        assert_eq!(err.kind(), super::super::ErrorKind::Service);
    }
}
