//! Research crew LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for Google's Gemini API.
//! Additional providers are added as new modules in this crate without any
//! changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, response
//! parsing, error classification, and retry back-off live here. The
//! [`pipeline`] crate sees only [`pipeline::LlmProvider`] and
//! [`pipeline::ModelError`].

pub mod gemini;
pub mod retry;

pub use gemini::{mask_secret, GeminiConfig, GeminiProvider, API_KEY_ENV, DEFAULT_BASE_URL};
pub use retry::{RetryConfig, RetryingProvider};

use thiserror::Error;

/// Errors raised while constructing a provider.
///
/// Failures of individual calls are reported as [`pipeline::ModelError`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The underlying `reqwest` client rejected its configuration.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
