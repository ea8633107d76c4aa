//! Gemini provider implementation for Chatty
//!
//! This module implements the `Provider` trait for Google's generative-language
//! `generateContent` endpoint. Each call posts a single content block holding
//! the prompt; the API key travels as the `key` query parameter.

use crate::config::GeminiConfig;
use crate::credential::Credential;
use crate::error::{ChattyError, Result};
use crate::providers::base::check_preconditions;
use crate::providers::Provider;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Gemini API provider
///
/// # Examples
///
/// ```no_run
/// use chatty::config::GeminiConfig;
/// use chatty::credential::Credential;
/// use chatty::providers::{GeminiProvider, Provider};
///
/// # async fn example() -> chatty::error::Result<()> {
/// let provider = GeminiProvider::new(GeminiConfig::default())?;
/// let credential = Credential::new("my-key");
/// let answer = provider.send("Hello!", credential.as_ref()).await?;
/// println!("{}", answer);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// The HTTP client enforces `config.timeout_seconds` on every request.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use chatty::config::GeminiConfig;
    /// use chatty::providers::{GeminiProvider, Provider};
    ///
    /// let provider = GeminiProvider::new(GeminiConfig::default()).unwrap();
    /// assert_eq!(provider.model(), "gemini-2.0-flash");
    /// ```
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("chatty/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChattyError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::debug!(
            api_base = %config.api_base,
            model = %config.model,
            timeout_seconds = config.timeout_seconds,
            "Initialized Gemini provider"
        );

        Ok(Self { client, config })
    }

    /// Full `generateContent` URL, without the key
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }

    fn map_transport_error(&self, e: reqwest::Error) -> ChattyError {
        // Strip the URL: it carries the key in its query string.
        let e = e.without_url();
        if e.is_timeout() {
            ChattyError::Network(format!(
                "request timed out after {} seconds",
                self.config.timeout_seconds
            ))
        } else {
            ChattyError::Network(e.to_string())
        }
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a decoded response
///
/// Only the answer path is required. Usage counts, finish reason and block
/// reason are read best-effort for logging and error text; a field of an
/// unexpected type there is skipped rather than failing the answer.
fn extract_text(response: &Value) -> std::result::Result<String, ChattyError> {
    if let Some(usage) = response.get("usageMetadata") {
        tracing::debug!(
            prompt_tokens = ?usage.get("promptTokenCount").and_then(serde_json::Value::as_u64),
            completion_tokens = ?usage.get("candidatesTokenCount").and_then(serde_json::Value::as_u64),
            total_tokens = ?usage.get("totalTokenCount").and_then(serde_json::Value::as_u64),
            "Gemini token usage"
        );
    }

    let Some(candidate) = response.pointer("/candidates/0") else {
        let reason = response
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
            .map(|r| format!("prompt was blocked ({})", r))
            .unwrap_or_else(|| "response contained no candidates".to_string());
        return Err(ChattyError::MalformedResponse(reason));
    };

    if let Some(reason) = candidate.get("finishReason").and_then(Value::as_str) {
        tracing::debug!(finish_reason = %reason, "Gemini candidate finished");
    }

    candidate
        .pointer("/content/parts/0/text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ChattyError::MalformedResponse("first candidate has no text part".to_string())
        })
}

/// Provider message from an error body, when the body carries one
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()?
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn send(&self, prompt: &str, credential: Option<&Credential>) -> Result<String> {
        let credential = check_preconditions(prompt, credential)?;

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", credential.expose())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let err = self.map_transport_error(e);
                tracing::warn!("Gemini request failed: {}", err);
                err
            })?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if !status.is_success() => {
                tracing::debug!("Failed to read error body: {}", e.without_url());
                String::new()
            }
            Err(e) => return Err(self.map_transport_error(e).into()),
        };

        if !status.is_success() {
            let err = ChattyError::http(status.as_u16(), extract_error_message(&text));
            tracing::error!(status = status.as_u16(), "Gemini returned error: {}", err);
            return Err(err.into());
        }

        let decoded: Value = serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            ChattyError::MalformedResponse(format!("invalid JSON body: {}", e))
        })?;

        let answer = extract_text(&decoded)?;
        tracing::debug!(answer_chars = answer.chars().count(), "Gemini answered");
        Ok(answer)
    }

    fn model(&self) -> String {
        self.config.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(body: &str) -> Value {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: "Hi" }],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "contents": [ { "parts": [ { "text": "Hi" } ] } ] })
        );
    }

    #[test]
    fn test_extract_text_reads_first_part() {
        let response = decode(
            r#"{"candidates":[{"content":{"parts":[{"text":"line 1\nline 2"},{"text":"ignored"}],"role":"model"},"finishReason":"STOP"}],
                "usageMetadata":{"promptTokenCount":3,"candidatesTokenCount":5,"totalTokenCount":8}}"#,
        );
        assert_eq!(extract_text(&response).unwrap(), "line 1\nline 2");
    }

    #[test]
    fn test_extract_text_ignores_unexpected_metadata_types() {
        let response = decode(
            r#"{"candidates":[{"content":{"parts":[{"text":"Hello!"}]},"finishReason":7,"safetyRatings":"n/a"}],
                "usageMetadata":{"promptTokenCount":"3"},"promptFeedback":[]}"#,
        );
        assert_eq!(extract_text(&response).unwrap(), "Hello!");
    }

    #[test]
    fn test_extract_text_non_string_text_is_malformed() {
        let err = extract_text(&decode(r#"{"candidates":[{"content":{"parts":[{"text":42}]}}]}"#))
            .unwrap_err();
        assert!(matches!(err, ChattyError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let err = extract_text(&decode(r#"{"candidates":[]}"#)).unwrap_err();
        assert!(matches!(err, ChattyError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_missing_candidates_field() {
        let err = extract_text(&decode("{}")).unwrap_err();
        assert!(matches!(err, ChattyError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let err = extract_text(&decode(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#))
            .unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_empty_text_is_malformed() {
        let err = extract_text(&decode(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#))
            .unwrap_err();
        assert!(matches!(err, ChattyError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_text_missing_content() {
        let err =
            extract_text(&decode(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#)).unwrap_err();
        assert!(matches!(err, ChattyError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            extract_error_message(body),
            Some("API key not valid.".to_string())
        );
        assert_eq!(extract_error_message("<html>oops</html>"), None);
        assert_eq!(extract_error_message(r#"{"error":{}}"#), None);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = GeminiProvider::new(GeminiConfig {
            api_base: "http://localhost:8080/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_send_without_credential_fails_fast() {
        let provider = GeminiProvider::new(GeminiConfig {
            // Unroutable: the call must fail before any connection attempt.
            api_base: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        })
        .unwrap();
        let err = provider.send("Hi", None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ChattyError>(),
            Some(ChattyError::MissingCredential)
        ));
    }
}
