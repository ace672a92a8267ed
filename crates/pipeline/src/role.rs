//! Role bindings: the persona a task step speaks as.

use serde::{Deserialize, Serialize};

use crate::{PromptTemplate, TemplateError};

/// A static identity used to frame prompts to the model.
///
/// Immutable after construction. The goal and backstory are templates and may
/// reference `{topic}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Role {
    /// Short identity label, e.g. `"Research Analyst"`.
    pub identity: String,
    /// Objective template.
    pub goal: PromptTemplate,
    /// Background text.
    pub backstory: PromptTemplate,
}

/// A [`Role`] with the topic substituted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRole {
    /// Identity label, unchanged from the role.
    pub identity: String,
    /// Goal with `{topic}` substituted.
    pub goal: String,
    /// Backstory with `{topic}` substituted.
    pub backstory: String,
}

impl Role {
    /// Creates a role.
    pub fn new(
        identity: impl Into<String>,
        goal: impl Into<PromptTemplate>,
        backstory: impl Into<PromptTemplate>,
    ) -> Self {
        Self {
            identity: identity.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    /// Renders the goal and backstory for `topic`. Pure and deterministic.
    pub fn render(&self, topic: &str) -> Result<RenderedRole, TemplateError> {
        Ok(RenderedRole {
            identity: self.identity.clone(),
            goal: self.goal.render(topic)?,
            backstory: self.backstory.render(topic)?,
        })
    }
}

impl RenderedRole {
    /// Formats the persona preamble that opens every step prompt.
    pub fn preamble(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.identity,
            normalize_whitespace(&self.backstory),
            self.goal
        )
    }
}

// Backstories are usually written as indented multi-line literals.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
