use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::TextGenerator;
use crate::error::LlmError;

/// Canned-response generator for tests and offline runs.
///
/// Responses are matched by substring against the prompt, first match wins.
/// Unmatched prompts get the fallback response, or an
/// [`LlmError::EmptyResponse`] when none is set.
#[derive(Default)]
pub struct MockGenerator {
    responses: Vec<(String, String)>,
    fallback: Option<String>,
    fail: bool,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_response(mut self, pattern: &str, response: &str) -> Self {
        self.responses.push((pattern.to_string(), response.to_string()));
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, response: &str) -> Self {
        self.fallback = Some(response.to_string());
        self
    }

    /// Every call fails with an API error.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if self.fail {
            return Err(LlmError::Api {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        self.responses
            .iter()
            .find(|(pattern, _)| prompt.contains(pattern.as_str()))
            .map(|(_, response)| response.clone())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| LlmError::EmptyResponse(self.name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_matching_pattern_wins() {
        let mock = MockGenerator::new()
            .with_response("TP53", "{\"name\": \"TP53\"}")
            .with_response("P", "other")
            .with_fallback("fallback");

        assert_eq!(mock.generate("about TP53").await.unwrap(), "{\"name\": \"TP53\"}");
        assert_eq!(mock.generate("nothing").await.unwrap(), "fallback");
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.prompts(), vec!["about TP53", "nothing"]);
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let mock = MockGenerator::failing();
        assert!(mock.generate("x").await.is_err());
        assert_eq!(mock.calls(), 1);
    }
}
