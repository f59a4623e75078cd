//! REST client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::model::TaskModel;

/// HTTP client for one Gemini model.
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

// ---- wire types ----

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
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

impl GenerateResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiClient {
    /// Create a client for `model` authenticated by `api_key`.
    ///
    /// * `base_url` - e.g. `https://generativelanguage.googleapis.com`.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from configuration. Returns `None` when no API key is set.
    pub fn from_config(config: &GenerationConfig) -> Result<Option<Self>, GenerationError> {
        let Some(api_key) = &config.api_key else {
            return Ok(None);
        };
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
        .map(Some)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TaskModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        parsed.into_text().ok_or(GenerationError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
