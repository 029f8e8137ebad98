//! Google Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use quill_core::ports::{TextGenError, TextGenerator};

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// `None` when `GOOGLE_API_KEY` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|k| !k.is_empty())?;
        let mut config = Self::new(api_key);
        if let Ok(model) = std::env::var("AI_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        Some(config)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let parts = self.candidates.into_iter().next()?.content?.parts;
        let text: String = parts.into_iter().map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct GeminiTextGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiTextGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, TextGenError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TextGenError::Provider(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, TextGenError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| TextGenError::Provider(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%status, model = %self.config.model, "Text generation rejected");
            return Err(TextGenError::Provider(format!(
                "{status}: {}",
                detail.chars().take(200).collect::<String>()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| TextGenError::Provider(e.without_url().to_string()))?;

        parsed.into_text().ok_or(TextGenError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "Hello" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "contents": [{ "parts": [{ "text": "Hello" }] }] })
        );
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let raw = serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "It adds " }, { "text": "up fast." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some("It adds up fast."));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let raw = serde_json::json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.into_text().is_none());

        let empty: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.into_text().is_none());
    }

    #[test]
    fn test_endpoint() {
        let mut config = GeminiConfig::new("k");
        config.base_url = "http://localhost:9000/v1beta/".to_string();
        let generator = GeminiTextGenerator::new(config).unwrap();
        assert_eq!(
            generator.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }
}
