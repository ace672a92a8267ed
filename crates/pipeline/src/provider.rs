//! The hosted-model port.
//!
//! [`LlmProvider`] is the only seam between the domain and the network. The
//! `llm` crate implements it over HTTP; tests implement it with scripted
//! replies.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelId, Temperature};

/// Which model to call and how to sample from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionOptions {
    /// Target hosted model.
    #[serde(rename = "id")]
    pub model: ModelId,

    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Temperature,
}

impl CompletionOptions {
    /// Creates options for `model` at the default temperature.
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            temperature: Temperature::default(),
        }
    }

    /// Replaces the sampling temperature.
    pub fn with_temperature(mut self, temperature: Temperature) -> Self {
        self.temperature = temperature;
        self
    }
}

/// One text-completion call: `{model, prompt, temperature}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Target model.
    pub model: ModelId,
    /// Sampling temperature.
    pub temperature: Temperature,
}

impl CompletionRequest {
    /// Builds a request for `prompt` using `options`.
    pub fn new(prompt: impl Into<String>, options: &CompletionOptions) -> Self {
        Self {
            prompt: prompt.into(),
            model: options.model.clone(),
            temperature: options.temperature,
        }
    }
}

/// Sends a prompt to a hosted model and returns the generated text.
///
/// Implementations make exactly one logical call per invocation and retain no
/// state between calls. The returned text has no guaranteed format; callers
/// shape it by prompting.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Completes `request`, or fails with a classified [`ModelError`].
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError>;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Arc<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for Box<P> {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        (**self).complete(request).await
    }
}
