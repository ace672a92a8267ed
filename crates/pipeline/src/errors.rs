//! Error and retry-policy types for the research crew domain.
//!
//! The taxonomy is layered the same way execution is:
//!
//! - [`TemplateError`]: a template names a parameter that does not exist.
//! - [`ModelError`]: a hosted model call failed (authentication, transient
//!   service fault, or invalid request).
//! - [`StepError`]: either of the above, raised while one task step runs.
//! - [`PipelineError`]: a [`StepError`] tagged with the failing step's identity
//!   and ordinal position.
//! - [`DefinitionError`]: a pipeline definition could not be parsed or
//!   validated; produced before any run starts.
//!
//! [`RetryPolicy`] is a cross-cutting concern: any error type that participates
//! in retry decisions must be able to produce a [`RetryPolicy`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::StepId;

// ---------------------------------------------------------------------------
// Retry semantics
// ---------------------------------------------------------------------------

/// Whether an error condition is safe to retry and, if so, after what delay.
///
/// - `Retryable` errors: API timeouts, rate-limit responses, network faults.
/// - `NonRetryable` errors: bad credentials, malformed requests, template errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// The operation may be retried.
    Retryable {
        /// Minimum back-off before the next attempt. `None` means apply the
        /// caller's own back-off schedule.
        after: Option<Duration>,
    },
    /// The operation must not be retried.
    NonRetryable,
}

// ---------------------------------------------------------------------------
// Template errors
// ---------------------------------------------------------------------------

/// Errors raised while rendering a prompt template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template contains a placeholder for a parameter that is not defined.
    #[error("template references undefined parameter '{parameter}'")]
    UndefinedParameter {
        /// The placeholder name, without braces.
        parameter: String,
    },
}

// ---------------------------------------------------------------------------
// Model errors
// ---------------------------------------------------------------------------

/// Errors returned by an [`crate::LlmProvider`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// The credential is missing or was rejected by the service. Fatal.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Description of the failure (never contains the credential itself).
        message: String,
    },

    /// Rate limit, timeout, or network fault. Retryable by policy.
    #[error("transient service error: {message}")]
    TransientService {
        /// Description of the failure.
        message: String,
        /// Server-suggested delay before retrying, when one was given.
        retry_after: Option<Duration>,
    },

    /// The prompt or its parameters were rejected (e.g. an unknown model). Fatal.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the failure.
        message: String,
    },
}

impl ModelError {
    /// Returns whether the failed call may be attempted again.
    pub fn retry_policy(&self) -> RetryPolicy {
        match self {
            Self::TransientService { retry_after, .. } => RetryPolicy::Retryable {
                after: *retry_after,
            },
            Self::Authentication { .. } | Self::InvalidRequest { .. } => RetryPolicy::NonRetryable,
        }
    }

    /// Returns `true` for [`ModelError::Authentication`].
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }
}

// ---------------------------------------------------------------------------
// Step and pipeline errors
// ---------------------------------------------------------------------------

/// A failure while executing one task step. Propagated unchanged.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StepError {
    /// A prompt template could not be rendered for the topic.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The model call failed.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A failed pipeline run.
///
/// No partial result accompanies this error; a run is all-or-nothing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    /// Step `ordinal` (1-based) of `total` failed; later steps never ran.
    #[error("step {ordinal} of {total} ('{step}') failed")]
    StepFailed {
        /// Identity of the failing step.
        step: StepId,
        /// 1-based position of the failing step.
        ordinal: usize,
        /// Number of steps in the pipeline.
        total: usize,
        /// The underlying step failure.
        #[source]
        source: StepError,
    },
}

impl PipelineError {
    /// Returns the identity of the failing step.
    pub fn step(&self) -> &StepId {
        match self {
            Self::StepFailed { step, .. } => step,
        }
    }

    /// Returns the underlying model error, if the step failed in the model call.
    pub fn model_error(&self) -> Option<&ModelError> {
        match self {
            Self::StepFailed {
                source: StepError::Model(e),
                ..
            } => Some(e),
            Self::StepFailed { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Definition errors
// ---------------------------------------------------------------------------

/// Errors produced while loading or validating a pipeline definition.
///
/// The pipeline never starts from an invalid definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DefinitionError {
    /// The definition text could not be parsed.
    #[error("failed to parse pipeline definition: {message}")]
    Parse {
        /// Parser diagnostic.
        message: String,
    },

    /// The definition parsed but violates a structural rule.
    #[error("invalid pipeline definition: {message}")]
    Invalid {
        /// Description of the violated rule.
        message: String,
    },

    /// One of a step's templates cannot be rendered.
    #[error("step '{step}' has an invalid {field} template")]
    Template {
        /// Step whose template is invalid.
        step: StepId,
        /// Which template (`goal`, `backstory`, `description`).
        field: &'static str,
        /// The template failure.
        #[source]
        source: TemplateError,
    },
}
