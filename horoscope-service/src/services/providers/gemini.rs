//! Gemini text generation backend.

use super::{ProviderError, TextGenerator};
use crate::services::credentials::Credential;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini text generator.
pub struct GeminiGenerator {
    model: String,
    base_url: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_base_url(model, GEMINI_API_BASE)
    }

    /// Point the generator at a non-default endpoint, e.g. a regional
    /// proxy in front of the API.
    pub fn with_base_url(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            model: model.into(),
            base_url: base_url.into(),
            client,
        }
    }

    fn api_url(&self, credential: &Credential) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            credential.as_str()
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<String, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url(credential))
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::Api(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("Failed to parse response: {}", e)))?;

        api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|text| !text.is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ContentPart {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}
