//! Google Gemini `generateContent` provider.
//!
//! One HTTP `POST {base_url}/models/{model}:generateContent` per completion.
//! The API key travels in the `x-goog-api-key` header so it never appears in
//! URLs, logs, or error messages.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use pipeline::{CompletionRequest, LlmProvider, ModelError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ProviderError;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Routing prefix accepted (and stripped) on model identifiers.
pub const MODEL_PREFIX: &str = "gemini";

const API_KEY_HEADER: &str = "x-goog-api-key";
const MAX_ERROR_BODY_CHARS: usize = 300;
const FINISH_REASON_STOP: &str = "STOP";

/// Gemini client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    /// API key. `None` makes every call fail with an authentication error.
    pub api_key: Option<String>,
    /// Base endpoint URL, without a trailing slash.
    pub base_url: String,
    /// Per-call timeout covering connect, request and response body.
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    /// Reads the API key from [`API_KEY_ENV`]. A blank value counts as unset.
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var(API_KEY_ENV)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            ..Self::default()
        }
    }

    /// Replaces the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the client at another endpoint; a trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns a redacted description of the key suitable for display.
    pub fn masked_api_key(&self) -> Option<String> {
        self.api_key.as_deref().map(mask_secret)
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.masked_api_key())
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Shows at most the first four characters of a secret plus its length.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}… ({} chars)", secret.chars().count())
}

/// Gemini LLM provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiProvider {
    /// Creates a provider. Fails only if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    fn build_url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.base_url, model)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    status: Option<String>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Maps a non-success HTTP response onto the [`ModelError`] taxonomy.
fn classify_status(status: u16, retry_after: Option<Duration>, body: &str) -> ModelError {
    let message = format!("HTTP {status}: {}", error_message(body));
    match status {
        400 if is_api_key_rejection(body) => ModelError::Authentication { message },
        401 | 403 => ModelError::Authentication { message },
        408 | 429 | 500..=599 => ModelError::TransientService {
            message,
            retry_after,
        },
        _ => ModelError::InvalidRequest { message },
    }
}

// Gemini answers a bad key with 400 INVALID_ARGUMENT rather than 401.
fn is_api_key_rejection(body: &str) -> bool {
    body.contains("API_KEY_INVALID") || body.contains("API key not valid")
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match (envelope.error.status, envelope.error.message) {
            (Some(status), Some(message)) => format!("{status}: {message}"),
            (None, Some(message)) => message,
            (Some(status), None) => status,
            (None, None) => "no error detail".to_string(),
        },
        Err(_) => body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

fn classify_transport(err: &reqwest::Error) -> ModelError {
    if err.is_builder() {
        return ModelError::InvalidRequest {
            message: format!("could not build request: {err}"),
        };
    }
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "network error"
    };
    ModelError::TransientService {
        message: format!("{kind}: {err}"),
        retry_after: None,
    }
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Concatenates the text parts of the first candidate.
///
/// A candidate that stopped normally may legitimately carry no text; one that
/// was cut off (safety, recitation, token limit) with nothing to show is an
/// error.
fn extract_text(response: GenerateContentResponse) -> Result<String, ModelError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ModelError::InvalidRequest {
            message: format!("prompt was blocked: {reason}"),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::InvalidRequest {
            message: "response contained no candidates".to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    match candidate.finish_reason.as_deref() {
        Some(reason) if text.is_empty() && reason != FINISH_REASON_STOP => {
            Err(ModelError::InvalidRequest {
                message: format!("candidate contained no text (finish reason {reason})"),
            })
        }
        _ => Ok(text),
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| ModelError::Authentication {
                message: format!("{API_KEY_ENV} is not set"),
            })?;

        if request.prompt.trim().is_empty() {
            return Err(ModelError::InvalidRequest {
                message: "prompt is empty".to_string(),
            });
        }

        let model = request.model.without_prefix(MODEL_PREFIX);
        let url = self.build_url(model);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key_value =
            HeaderValue::from_str(api_key).map_err(|_| ModelError::Authentication {
                message: format!("{API_KEY_ENV} contains characters not allowed in a header"),
            })?;
        key_value.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key_value);

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature.as_f64(),
            },
        };

        debug!(model, prompt_chars = request.prompt.len(), "Calling Gemini");

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            let err = classify_status(status.as_u16(), retry_after, &text);
            warn!(model, status = status.as_u16(), error = %err, "Gemini call failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ModelError::TransientService {
                message: format!("could not read response body: {e}"),
                retry_after: None,
            })?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                model,
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        extract_text(parsed)
    }
}
