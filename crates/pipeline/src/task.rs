//! Task steps: one prompt, one model call, one text artifact.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CompletionOptions, CompletionRequest, ExecutionContext, LlmProvider, PromptTemplate, Role,
    StepError, StepId, TemplateError,
};

const FINAL_ANSWER_INSTRUCTION: &str =
    "You MUST return the actual complete content as the final answer, not a summary.";

/// One stage of a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStep {
    /// Unique within a pipeline; labels this step's output for later steps.
    pub id: StepId,
    /// Persona the prompt is written as.
    pub role: Role,
    /// Instruction template; may reference `{topic}`.
    pub description: PromptTemplate,
    /// What a good answer looks like. Included in the prompt as guidance; the
    /// model's output is never checked against it.
    pub expected_output: String,
}

impl TaskStep {
    /// Creates a step. Templates are checked when the step joins a
    /// [`crate::Pipeline`], not here.
    pub fn new(
        id: StepId,
        role: Role,
        description: impl Into<PromptTemplate>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id,
            role,
            description: description.into(),
            expected_output: expected_output.into(),
        }
    }

    /// Checks every template on this step without rendering it, returning the
    /// name of the offending field on failure.
    pub fn check_templates(&self) -> Result<(), (&'static str, TemplateError)> {
        self.role.goal.check().map_err(|e| ("goal", e))?;
        self.role.backstory.check().map_err(|e| ("backstory", e))?;
        self.description.check().map_err(|e| ("description", e))?;
        Ok(())
    }

    /// Builds the full prompt for this step.
    ///
    /// Layout: persona preamble, the task description, the expected-output
    /// guidance, then (when `prior` is non-empty) every prior step's output
    /// verbatim under a heading naming the step.
    pub fn build_prompt(&self, topic: &str, prior: &ExecutionContext) -> Result<String, TemplateError> {
        let role = self.role.render(topic)?;
        let description = self.description.render(topic)?;

        let mut prompt = String::new();
        prompt.push_str(&role.preamble());
        prompt.push_str("\n\nCurrent Task: ");
        prompt.push_str(description.trim());
        prompt.push_str("\n\nThis is the expected criteria for your final answer: ");
        prompt.push_str(self.expected_output.trim());

        if !prior.is_empty() {
            prompt.push_str("\n\nThis is the context you're working with:\n");
            for entry in prior.entries() {
                prompt.push_str(&format!("\n### Output of step '{}'\n", entry.step));
                prompt.push_str(&entry.output);
                prompt.push('\n');
            }
        }

        prompt.push_str("\n\n");
        prompt.push_str(FINAL_ANSWER_INSTRUCTION);
        prompt.push_str("\n\nBegin!");
        Ok(prompt)
    }

    /// Renders the prompt and sends it to `provider`, returning the model's
    /// text unchanged. Errors propagate without local recovery.
    pub async fn execute<P>(
        &self,
        topic: &str,
        prior: &ExecutionContext,
        provider: &P,
        options: &CompletionOptions,
    ) -> Result<String, StepError>
    where
        P: LlmProvider + ?Sized,
    {
        let prompt = self.build_prompt(topic, prior)?;
        debug!(
            step = %self.id,
            prompt_chars = prompt.len(),
            prior_entries = prior.len(),
            "Sending step prompt"
        );

        let output = provider
            .complete(CompletionRequest::new(prompt, options))
            .await?;

        debug!(step = %self.id, output_chars = output.len(), "Step completed");
        Ok(output)
    }
}
