//! The single text-generation call.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;

/// Something that turns a finished prompt into text.
#[async_trait]
pub trait TextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Error>;
}

/// Client for the Gemini `generateContent` endpoint.
///
/// One request per call: no streaming, no retries, and no timeout beyond
/// whatever `reqwest` does by default.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.api_base.trim_end_matches('/'),
            config.model
        );
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            endpoint,
        }
    }

    /// The URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, Error> {
        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(endpoint = %self.endpoint, prompt_len = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            // Prefer the structured message when the body has one
            let message = serde_json::from_str::<ApiErrorBody>(&body_text)
                .map(|b| b.error.message)
                .unwrap_or(body_text);
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body_text)?;
        let text = parsed.into_text()?;
        tracing::info!(response_len = text.len(), "generation succeeded");
        Ok(text)
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

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
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Result<String, Error> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Error::Blocked { reason },
                None => Error::NoCandidates,
            });
        };

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        if parts.is_empty() {
            return Err(Error::EmptyCandidate {
                finish_reason: candidate
                    .finish_reason
                    .unwrap_or_else(|| "UNSPECIFIED".to_string()),
            });
        }

        Ok(parts.into_iter().filter_map(|p| p.text).collect())
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors from a generation call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("prompt was blocked ({reason})")]
    Blocked { reason: String },

    #[error("response contained no candidates")]
    NoCandidates,

    #[error("response candidate had no content (finish reason: {finish_reason})")]
    EmptyCandidate { finish_reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, Error> {
        serde_json::from_str::<GenerateContentResponse>(json)
            .unwrap()
            .into_text()
    }

    #[test]
    fn joins_all_text_parts() {
        let text = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Solar "},{"text":"panels."}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(text, "Solar panels.");
    }

    #[test]
    fn only_first_candidate_counts() {
        let text = parse(
            r#"{"candidates":[{"content":{"parts":[{"text":"first"}]}},{"content":{"parts":[{"text":"second"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(text, "first");
    }

    #[test]
    fn empty_text_is_valid() {
        let text = parse(r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#).unwrap();
        assert_eq!(text, "");
    }

    #[test]
    fn blocked_prompt() {
        let err = parse(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap_err();
        assert!(matches!(err, Error::Blocked { ref reason } if reason == "SAFETY"));
    }

    #[test]
    fn no_candidates_without_feedback() {
        assert!(matches!(parse("{}").unwrap_err(), Error::NoCandidates));
    }

    #[test]
    fn candidate_without_parts() {
        let err = parse(r#"{"candidates":[{"finishReason":"RECITATION"}]}"#).unwrap_err();
        assert!(
            matches!(err, Error::EmptyCandidate { ref finish_reason } if finish_reason == "RECITATION")
        );
    }

    #[test]
    fn endpoint_from_config() {
        let config = Config {
            api_key: "k".into(),
            model: "gemini-2.5-pro".into(),
            api_base: "https://example.test/v1beta/".into(),
            template: Default::default(),
        };
        assert_eq!(
            GeminiClient::new(&config).endpoint(),
            "https://example.test/v1beta/models/gemini-2.5-pro:generateContent"
        );
    }
}
