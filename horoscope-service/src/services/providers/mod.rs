//! Generative-text provider abstraction.
//!
//! The cache manager talks to a [`TextGenerator`] trait object so the
//! real Gemini backend and the scriptable mock are interchangeable. The
//! credential is passed per call, not baked into the provider, so the
//! pool can rotate without rebuilding the HTTP client.

pub mod gemini;
pub mod mock;

use crate::services::credentials::Credential;
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
///
/// The cache manager treats every variant the same way (one rotation
/// retry); the split exists for logging.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no text")]
    EmptyResponse,
}

/// Trait for text generation providers.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for `prompt` using `credential`.
    async fn generate(
        &self,
        prompt: &str,
        credential: &Credential,
    ) -> Result<String, ProviderError>;
}
