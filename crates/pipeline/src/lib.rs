//! Core domain for the research crew.
//!
//! This crate contains every domain concept used to describe and run a
//! sequential crew of LLM-backed task steps: identifiers, value types, prompt
//! templates, roles, task steps, the execution context, pipeline definitions,
//! the error taxonomy, and the [`LlmProvider`] port.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates (`llm`) define *how* to
//! supply it, and the `crew` crate sequences the steps.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`StepId`, `ModelId`, `PipelineRunId`, ...) |
//! | [`types`] | Value types (`Temperature`, `Timestamp`) |
//! | [`errors`] | Error taxonomy and retry policy |
//! | [`provider`] | `LlmProvider` port and request types |
//! | [`template`] | `{topic}` prompt templates |
//! | [`role`] | Role bindings |
//! | [`task`] | Task steps and prompt construction |
//! | [`context`] | Execution context and pipeline result |
//! | [`definition`] | Serializable pipeline definitions and the validated `Pipeline` |

pub mod context;
pub mod definition;
pub mod errors;
pub mod identifiers;
pub mod provider;
pub mod role;
pub mod task;
pub mod template;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use context::{ContextEntry, ExecutionContext, PipelineResult};
pub use definition::{Pipeline, PipelineDefinition, StepDefinition};
pub use errors::{DefinitionError, ModelError, PipelineError, RetryPolicy, StepError, TemplateError};
pub use identifiers::{ModelId, PipelineName, PipelineRunId, StepId};
pub use provider::{CompletionOptions, CompletionRequest, LlmProvider};
pub use role::{RenderedRole, Role};
pub use task::TaskStep;
pub use template::{PromptTemplate, TOPIC_PARAMETER};
pub use types::{Temperature, Timestamp};
