use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] amino_config::ConfigError),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The response carried no candidate text.
    #[error("empty response from {0}")]
    EmptyResponse(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure to pull a JSON value out of generated text.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object or array found in generated text")]
    NoJson,

    #[error("generated JSON does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}
