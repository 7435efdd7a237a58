//! Gemini `generateContent` client.

use amino_config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::TextGenerator;
use crate::error::LlmError;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
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
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .filter(|text| !text.trim().is_empty())
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl GeminiClient {
    /// Build a client from settings.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] if no API key is set, or
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        config.require_api_key()?;
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.api_url.trim_end_matches('/'),
            self.config.model,
            urlencoding::encode(&self.config.api_key)
        )
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status.as_u16() {
        401 | 403 => Err(LlmError::AuthenticationFailed),
        429 => Err(LlmError::RateLimited {
            retry_after_secs: response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
        }),
        code => Err(LlmError::Api {
            status: code,
            message: response.text().await.unwrap_or_default(),
        }),
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: "application/json",
            },
        };

        tracing::debug!(model = %self.config.model, "requesting generation");
        let response = self.http.post(self.endpoint()).json(&request).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        let body: GenerateResponse = serde_json::from_slice(&bytes)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        body.into_text()
            .ok_or_else(|| LlmError::EmptyResponse(self.config.model.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FIXTURE: &str = r#"{
        "candidates": [{
            "content": {
                "parts": [{"text": "```json\n{\"name\": \"TP53\"}\n```"}],
                "role": "model"
            },
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 12}
    }"#;

    fn mock_response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[test]
    fn parse_candidate_text() {
        let body: GenerateResponse = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(
            body.into_text().as_deref(),
            Some("```json\n{\"name\": \"TP53\"}\n```")
        );
    }

    #[test]
    fn blocked_prompt_has_no_text() {
        let body: GenerateResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(body.into_text().is_none());
    }

    #[test]
    fn endpoint_includes_model_and_key() {
        let client = GeminiClient::new(&LlmConfig {
            api_key: "k/ey".to_string(),
            ..LlmConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=k%2Fey"
        );
    }

    #[test]
    fn missing_key_is_rejected() {
        let outcome = GeminiClient::new(&LlmConfig::default());
        assert!(matches!(outcome, Err(LlmError::Config(_))));
    }

    #[tokio::test]
    async fn status_mapping() {
        assert!(matches!(
            check_status(mock_response(403, "")).await,
            Err(LlmError::AuthenticationFailed)
        ));
        assert!(matches!(
            check_status(mock_response(429, "")).await,
            Err(LlmError::RateLimited {
                retry_after_secs: 60
            })
        ));
        assert!(matches!(
            check_status(mock_response(500, "boom")).await,
            Err(LlmError::Api { status: 500, .. })
        ));
        assert!(check_status(mock_response(200, "{}")).await.is_ok());
    }
}
