//! Prompt templates with `{name}` placeholders.
//!
//! A placeholder is `{` + an identifier (`[A-Za-z_][A-Za-z0-9_-]*`) + `}`.
//! Any other brace text, such as JSON in an example answer, is copied through
//! untouched. The only parameter a pipeline run defines is [`TOPIC_PARAMETER`].

use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::TemplateError;

/// Name of the single runtime parameter substituted into every template.
pub const TOPIC_PARAMETER: &str = "topic";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_\-]*)\}").expect("placeholder pattern is valid")
});

/// An immutable prompt template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// Wraps template text. No validation happens here; see [`Self::check`].
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw template text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the parameter names referenced by the template, in order of
    /// first appearance.
    pub fn parameters(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.0) {
            if let Some(name) = caps.get(1).map(|m| m.as_str()) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Fails if the template references any parameter other than `topic`.
    pub fn check(&self) -> Result<(), TemplateError> {
        match self
            .parameters()
            .into_iter()
            .find(|name| *name != TOPIC_PARAMETER)
        {
            Some(name) => Err(TemplateError::UndefinedParameter {
                parameter: name.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Substitutes `topic` for every `{topic}` placeholder.
    ///
    /// Substitution is a single pass: placeholder-like text inside `topic`
    /// itself is not expanded again.
    pub fn render(&self, topic: &str) -> Result<String, TemplateError> {
        self.check()?;
        Ok(PLACEHOLDER.replace_all(&self.0, NoExpand(topic)).into_owned())
    }
}

impl From<&str> for PromptTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for PromptTemplate {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
