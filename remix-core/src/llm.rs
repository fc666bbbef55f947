//! Text-generation seam.
//!
//! The pipeline and judge talk to a [`TextGenerator`] trait object rather
//! than a concrete client, so tests substitute a scripted generator and the
//! binary plugs in Gemini.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a text-generation collaborator.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key not configured")]
    NoApiKey,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed completion: {0}")]
    Malformed(String),
}

impl From<gemini::Error> for GenerateError {
    fn from(err: gemini::Error) -> Self {
        match err {
            gemini::Error::NoApiKey => Self::NoApiKey,
            gemini::Error::Network(message) => Self::Network(message),
            gemini::Error::Api { status, message } => Self::Api { status, message },
            gemini::Error::Parse(message) => Self::Malformed(message),
            gemini::Error::EmptyResponse => Self::Malformed("empty response".to_string()),
        }
    }
}

/// A collaborator that turns a prompt into a text completion.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Gemini-backed generator.
pub struct GeminiGenerator {
    client: gemini::Gemini,
}

impl GeminiGenerator {
    /// Wrap an already-configured client.
    pub fn new(client: gemini::Gemini) -> Self {
        Self { client }
    }

    /// Build a generator from the GEMINI_API_KEY environment variable.
    pub fn from_env() -> Result<Self, GenerateError> {
        Ok(Self {
            client: gemini::Gemini::from_env()?,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        Ok(self.client.generate(prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: GenerateError = gemini::Error::Network("timed out".to_string()).into();
        assert!(matches!(err, GenerateError::Network(_)));

        let err: GenerateError = gemini::Error::EmptyResponse.into();
        assert!(matches!(err, GenerateError::Malformed(_)));
    }
}
