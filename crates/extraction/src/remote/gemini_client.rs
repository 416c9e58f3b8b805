use async_trait::async_trait;
use common::config::GeminiConfig;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::traits::TextGenerator;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("AI API error ({status}): {body}")]
    Api { status: StatusCode, body: String },
    #[error("AI service blocked the prompt: {0}")]
    Blocked(String),
    #[error("AI response contained no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    pub fn into_text(self) -> Result<String, AiError> {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return match self.prompt_feedback.and_then(|f| f.block_reason) {
                Some(reason) => Err(AiError::Blocked(reason)),
                None => Err(AiError::EmptyResponse),
            };
        };

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return match candidate.finish_reason {
                Some(reason) if reason != "STOP" => Err(AiError::Blocked(reason)),
                _ => Err(AiError::EmptyResponse),
            };
        }
        Ok(text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    cfg: GeminiConfig,
}

impl GeminiClient {
    pub fn new(cfg: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg,
        }
    }

    pub fn model(&self) -> &str {
        &self.cfg.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.cfg.base_url, self.cfg.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let api_key = self.cfg.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: prompt }],
            }],
        };

        info!("Calling Gemini model {}", self.cfg.model);

        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await?;
            error!("Gemini request failed with {}: {}", status, body);
            return Err(AiError::Api { status, body });
        }

        resp.json::<GenerateContentResponse>().await?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(api_key: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    fn parse(raw: &str) -> GenerateContentResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_endpoint_includes_model() {
        let client = GeminiClient::new(cfg(Some("k")));
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(client.model(), "gemini-pro");
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: "hello" }],
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_text_parts_are_joined() {
        let resp = parse(
            r#"{
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "{\"a\":"}, {"text": "1}"}]},
                    "finishReason": "STOP"
                }]
            }"#,
        );
        assert_eq!(resp.into_text().unwrap(), "{\"a\":1}");
    }

    #[test]
    fn test_blocked_prompt_is_reported() {
        let resp = parse(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        let err = resp.into_text().unwrap_err();
        assert!(matches!(err, AiError::Blocked(reason) if reason == "SAFETY"));
    }

    #[test]
    fn test_candidate_without_text_is_empty() {
        let resp = parse(r#"{"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}"#);
        assert!(matches!(resp.into_text(), Err(AiError::EmptyResponse)));

        let resp = parse(r#"{"candidates": []}"#);
        assert!(matches!(resp.into_text(), Err(AiError::EmptyResponse)));
    }

    #[test]
    fn test_candidate_stopped_for_safety_is_blocked() {
        let resp = parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#);
        assert!(matches!(resp.into_text(), Err(AiError::Blocked(reason)) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_at_call_time() {
        let client = GeminiClient::new(cfg(None));
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }
}
