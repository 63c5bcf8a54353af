/// Google generative-language API provider
///
/// Sends the recommendation prompt to the `generateContent` endpoint and
/// returns the model's text verbatim. Sanitizing and validating that text
/// is the recommendation service's job, not this client's.
use crate::{
    error::{AppError, AppResult},
    services::providers::CompletionProvider,
};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

const PROVIDER_NAME: &str = "recommendation API";

#[derive(Clone)]
pub struct GeminiProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: String,
}

impl GeminiProvider {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url,
            model,
        }
    }

    fn extract_text(response: GeminiResponse) -> AppResult<String> {
        response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| AppError::malformed_response("no content in model response"))
    }
}

#[async_trait::async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_url, self.model, self.api_key
        );

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::provider_unavailable(
                PROVIDER_NAME,
                format!("status {}: {}", status, body),
            ));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::provider_unavailable(PROVIDER_NAME, e.to_string()))?;

        let text = Self::extract_text(gemini_response)?;

        tracing::debug!(
            provider = "gemini",
            model = %self.model,
            chars = text.len(),
            "Completion received"
        );

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_first_candidate() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "[{\"title\": \"Up (2009)\"}]"}]}}
                ]
            }"#,
        )
        .unwrap();

        let text = GeminiProvider::extract_text(response).unwrap();
        assert!(text.contains("Up (2009)"));
    }

    #[test]
    fn test_extract_text_empty_candidates_fails() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let result = GeminiProvider::extract_text(response);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }

    #[test]
    fn test_extract_text_candidate_without_parts_fails() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"content": {"parts": []}}]}"#).unwrap();
        let result = GeminiProvider::extract_text(response);
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
