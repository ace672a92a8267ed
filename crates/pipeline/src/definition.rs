//! Pipeline definitions: configuration records that describe a crew.
//!
//! A [`PipelineDefinition`] is plain data (usually loaded from TOML) and is
//! turned into a validated, immutable [`Pipeline`] before anything runs. A
//! pipeline is built once per instance and passed explicitly to the executor;
//! there is no process-wide registry of roles or steps.
//!
//! ```toml
//! name = "research-crew"
//!
//! [model]
//! id = "gemini/gemini-2.0-flash"
//! temperature = 0.7
//!
//! [[steps]]
//! id = "research"
//! description = "Search for 5 relevant academic papers about {topic}."
//! expected_output = "A list of 5 papers."
//!
//! [steps.role]
//! identity = "Research Paper Finder"
//! goal = "Find relevant academic papers on {topic}"
//! backstory = "You are an expert at searching academic databases."
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{CompletionOptions, DefinitionError, PipelineName, Role, StepId, TaskStep};

/// Serializable description of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineDefinition {
    pub name: PipelineName,
    /// `[model]` table: `id` and optional `temperature`.
    pub model: CompletionOptions,
    /// Steps in execution order.
    pub steps: Vec<StepDefinition>,
}

/// Serializable description of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepDefinition {
    pub id: StepId,
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
    pub role: Role,
}

impl PipelineDefinition {
    /// Parses a definition from TOML text. Structural rules are checked by
    /// [`Self::build`], not here.
    pub fn from_toml_str(text: &str) -> Result<Self, DefinitionError> {
        toml::from_str(text).map_err(|e| DefinitionError::Parse {
            message: e.to_string(),
        })
    }

    /// Serializes the definition as TOML.
    pub fn to_toml_string(&self) -> Result<String, DefinitionError> {
        toml::to_string_pretty(self).map_err(|e| DefinitionError::Parse {
            message: e.to_string(),
        })
    }

    /// Validates the definition and produces a runnable [`Pipeline`].
    pub fn build(&self) -> Result<Pipeline, DefinitionError> {
        let steps = self
            .steps
            .iter()
            .map(|s| {
                TaskStep::new(
                    s.id.clone(),
                    s.role.clone(),
                    s.description.as_str(),
                    s.expected_output.clone(),
                )
            })
            .collect();
        Pipeline::new(self.name.clone(), self.model.clone(), steps)
    }
}

/// A validated, immutable, ordered sequence of task steps plus the model
/// settings every step uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    name: PipelineName,
    options: CompletionOptions,
    steps: Vec<TaskStep>,
}

impl Pipeline {
    /// Builds a pipeline, rejecting it if:
    ///
    /// - it has no steps,
    /// - two steps share an id,
    /// - a role identity or step description is blank,
    /// - any template references a parameter other than `topic`.
    pub fn new(
        name: PipelineName,
        options: CompletionOptions,
        steps: Vec<TaskStep>,
    ) -> Result<Self, DefinitionError> {
        if steps.is_empty() {
            return Err(DefinitionError::Invalid {
                message: format!("pipeline '{name}' has no steps"),
            });
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if !seen.insert(step.id.as_str()) {
                return Err(DefinitionError::Invalid {
                    message: format!("duplicate step id '{}'", step.id),
                });
            }
            if step.role.identity.trim().is_empty() {
                return Err(DefinitionError::Invalid {
                    message: format!("step '{}' has an empty role identity", step.id),
                });
            }
            if step.description.as_str().trim().is_empty() {
                return Err(DefinitionError::Invalid {
                    message: format!("step '{}' has an empty description", step.id),
                });
            }
            step.check_templates()
                .map_err(|(field, source)| DefinitionError::Template {
                    step: step.id.clone(),
                    field,
                    source,
                })?;
        }

        Ok(Self {
            name,
            options,
            steps,
        })
    }

    /// Name the pipeline was defined under.
    pub fn name(&self) -> &PipelineName {
        &self.name
    }

    /// Model settings shared by every step.
    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    /// Steps in execution order. Never empty.
    pub fn steps(&self) -> &[TaskStep] {
        &self.steps
    }

    /// Returns a copy of this pipeline using different model settings.
    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}
