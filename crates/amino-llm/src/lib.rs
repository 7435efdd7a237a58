//! # amino-llm
//!
//! Text generation for the generative fallback tier.
//!
//! [`TextGenerator`] is the seam the resolver depends on. [`GeminiClient`]
//! talks to the Gemini `generateContent` API; [`MockGenerator`] serves
//! canned responses. [`extract_json`] recovers the JSON value a model was
//! asked to produce from whatever text it actually returned.

mod error;
mod extract;
mod gemini;
mod mock;

pub use error::{ExtractError, LlmError};
pub use extract::{extract_as, extract_json};
pub use gemini::GeminiClient;
pub use mock::MockGenerator;

use async_trait::async_trait;

/// A prompt-in, text-out generator.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
