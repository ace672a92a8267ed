//! Per-run state: the execution context and the final pipeline result.

use serde::{Deserialize, Serialize};

use crate::{PipelineName, PipelineRunId, StepId, Timestamp};

/// One completed step's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// The step that produced the output.
    pub step: StepId,
    /// The model's text, unmodified.
    pub output: String,
    /// When the step finished.
    pub completed_at: Timestamp,
}

/// Ordered record of the outputs of every step completed so far in one run.
///
/// Append-only: entries are added in execution order and never removed or
/// rewritten, so a step can only ever see outputs of steps that ran before it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    entries: Vec<ContextEntry>,
}

impl ExecutionContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the output of a step that just completed.
    pub fn record(&mut self, step: StepId, output: impl Into<String>) {
        self.entries.push(ContextEntry {
            step,
            output: output.into(),
            completed_at: Timestamp::now(),
        });
    }

    /// Returns all entries in execution order.
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` before the first step completes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the most recent entry.
    pub fn last(&self) -> Option<&ContextEntry> {
        self.entries.last()
    }

    /// Returns `(step, output)` pairs in execution order.
    pub fn transcript(&self) -> Vec<(&str, &str)> {
        self.entries
            .iter()
            .map(|e| (e.step.as_str(), e.output.as_str()))
            .collect()
    }
}

/// The outcome of a successful run. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Correlates this result with the run's log spans.
    pub run_id: PipelineRunId,
    /// Name of the pipeline that ran.
    pub pipeline: PipelineName,
    /// Topic every template was rendered with.
    pub topic: String,
    /// Output of the last step.
    pub final_output: String,
    /// Every step's output, one entry per step, in input order.
    pub context: ExecutionContext,
    /// When the first step started.
    pub started_at: Timestamp,
    /// When the last step completed.
    pub finished_at: Timestamp,
}
