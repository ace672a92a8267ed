//! The built-in three-step research crew.
//!
//! Research paper finder -> research analyst -> knowledge assessment
//! specialist, run sequentially on `gemini/gemini-2.0-flash` at temperature
//! 0.7. Roles never delegate to one another.
//!
//! The crew ships as TOML (`research_crew.toml`) so the same file doubles as a
//! starting point for `--config`.

use pipeline::{DefinitionError, PipelineDefinition};

/// Model used by the built-in crew.
pub const DEFAULT_MODEL: &str = "gemini/gemini-2.0-flash";

/// Topic used when the caller does not supply one.
pub const DEFAULT_TOPIC: &str = "multi-agent AI systems";

/// TOML source of the built-in crew.
pub const RESEARCH_CREW_TOML: &str = include_str!("research_crew.toml");

/// Returns the definition of the built-in research crew.
pub fn research_crew() -> Result<PipelineDefinition, DefinitionError> {
    PipelineDefinition::from_toml_str(RESEARCH_CREW_TOML)
}
