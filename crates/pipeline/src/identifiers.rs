//! Newtype domain identifiers.
//!
//! Every named concept in a research crew is represented as a distinct newtype
//! wrapping a primitive, so a [`StepId`] can never be passed where a
//! [`ModelId`] is expected even though both are strings under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty
            /// or whitespace only.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value).ok_or_else(|| {
                    format!("{} must not be empty", stringify!($name))
                })
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single pipeline execution run.
///
/// Generated fresh for every run; propagated through spans and returned in the
/// [`crate::PipelineResult`] so all activity from one run can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PipelineRunId(Uuid);

impl PipelineRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for PipelineRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (configuration names)
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies a task step by its configured name within a pipeline
    /// (e.g. `"research"`, `"analysis"`, `"quiz"`).
    ///
    /// Step names are unique per pipeline; the executor tags errors and
    /// transcript entries with them.
    StepId
}

string_id! {
    /// Names a hosted model (e.g. `"gemini-2.0-flash"`).
    ///
    /// A provider-routing prefix such as `"gemini/gemini-2.0-flash"` is kept
    /// verbatim here; each provider decides which prefixes it understands.
    ModelId
}

string_id! {
    /// Names a pipeline definition (e.g. `"research-crew"`).
    PipelineName
}

impl ModelId {
    /// Returns the model name with `prefix/` removed, if present.
    pub fn without_prefix(&self, prefix: &str) -> &str {
        self.0
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_id_rejects_blank_values() {
        assert!(StepId::new("").is_none());
        assert!(StepId::new("   ").is_none());
        assert_eq!(StepId::new("research").unwrap().as_str(), "research");
    }

    #[test]
    fn test_model_id_strips_only_matching_prefix() {
        let routed = ModelId::new("gemini/gemini-2.0-flash").unwrap();
        assert_eq!(routed.without_prefix("gemini"), "gemini-2.0-flash");

        let bare = ModelId::new("gemini-2.0-flash").unwrap();
        assert_eq!(bare.without_prefix("gemini"), "gemini-2.0-flash");

        let other = ModelId::new("openai/gpt-4o").unwrap();
        assert_eq!(other.without_prefix("gemini"), "openai/gpt-4o");
    }

    #[test]
    fn test_step_id_deserialisation_rejects_empty() {
        let ok: Result<StepId, _> = serde_json::from_str("\"quiz\"");
        assert_eq!(ok.unwrap().as_str(), "quiz");

        let err: Result<StepId, _> = serde_json::from_str("\"\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_run_ids_are_unique() {
        assert_ne!(PipelineRunId::new_random(), PipelineRunId::new_random());
    }
}
