//! The sequential pipeline executor.
//!
//! Runs the steps of a [`Pipeline`] strictly one after another. Each step sees
//! the outputs of every step before it; the first failure aborts the run and
//! is returned tagged with the failing step's identity and position.
//!
//! ## Run states
//!
//! ```text
//! Pending -> Running(1 of N) -> ... -> Running(N of N) -> Completed
//!                    \                        \
//!                     `-> Failed(i of N)       `-> Failed(N of N)
//! ```
//!
//! Transitions are reported to an optional [`RunObserver`] and logged through
//! `tracing`. There are no retries, no parallelism, and no timeout of the
//! executor's own; a hung provider call hangs the run.

use std::fmt;

use pipeline::{
    ExecutionContext, LlmProvider, Pipeline, PipelineError, PipelineResult, PipelineRunId, StepId,
    Timestamp,
};
use tracing::{error, info, info_span, Instrument};

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    /// Created, no step started yet.
    Pending,
    /// Step `ordinal` (1-based) of `total` is waiting on the model.
    Running {
        /// 1-based position of the step.
        ordinal: usize,
        /// Number of steps in the pipeline.
        total: usize,
        /// The step being executed.
        step: StepId,
    },
    /// Every step succeeded.
    Completed,
    /// Step `ordinal` failed; later steps will not run.
    Failed {
        /// 1-based position of the failing step.
        ordinal: usize,
        /// Number of steps in the pipeline.
        total: usize,
        /// The step that failed.
        step: StepId,
    },
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running {
                ordinal,
                total,
                step,
            } => write!(f, "running step {ordinal} of {total} ({step})"),
            Self::Completed => write!(f, "completed"),
            Self::Failed {
                ordinal,
                total,
                step,
            } => write!(f, "failed at step {ordinal} of {total} ({step})"),
        }
    }
}

/// Receives every state transition of a run, in order.
pub trait RunObserver: Send + Sync {
    /// Called synchronously as the run enters `state`.
    fn on_transition(&self, state: &RunState);
}

impl<F> RunObserver for F
where
    F: Fn(&RunState) + Send + Sync,
{
    fn on_transition(&self, state: &RunState) {
        self(state)
    }
}

/// Drives a [`Pipeline`] against one [`LlmProvider`].
///
/// The executor holds no per-run state; each call to [`Self::run`] owns its
/// own [`ExecutionContext`], so one executor may serve many runs.
pub struct PipelineExecutor<P> {
    provider: P,
    observer: Option<Box<dyn RunObserver>>,
}

impl<P: LlmProvider> PipelineExecutor<P> {
    /// Creates an executor that sends every step to `provider`.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            observer: None,
        }
    }

    /// Attaches an observer that is told about every state transition.
    pub fn with_observer(mut self, observer: impl RunObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Runs every step of `pipeline` for `topic`.
    ///
    /// On success the result's context holds exactly one entry per step, in
    /// pipeline order, and `final_output` equals the last entry's output. On
    /// failure nothing but the tagged error is returned.
    pub async fn run(&self, pipeline: &Pipeline, topic: &str) -> Result<PipelineResult, PipelineError> {
        let run_id = PipelineRunId::new_random();
        let total = pipeline.steps().len();
        let span = info_span!(
            "pipeline_run",
            run_id = %run_id,
            pipeline = %pipeline.name(),
            steps = total
        );

        async move {
            let started_at = Timestamp::now();
            let mut context = ExecutionContext::new();
            let mut final_output = String::new();
            self.notify(&RunState::Pending);
            info!(topic, "Pipeline run started");

            for (index, step) in pipeline.steps().iter().enumerate() {
                let ordinal = index + 1;
                self.notify(&RunState::Running {
                    ordinal,
                    total,
                    step: step.id.clone(),
                });

                let outcome = step
                    .execute(topic, &context, &self.provider, pipeline.options())
                    .instrument(info_span!("task_step", step = %step.id, ordinal))
                    .await;

                match outcome {
                    Ok(output) => {
                        info!(step = %step.id, ordinal, total, "Step completed");
                        context.record(step.id.clone(), output.clone());
                        final_output = output;
                    }
                    Err(source) => {
                        error!(step = %step.id, ordinal, total, error = %source, "Step failed");
                        self.notify(&RunState::Failed {
                            ordinal,
                            total,
                            step: step.id.clone(),
                        });
                        return Err(PipelineError::StepFailed {
                            step: step.id.clone(),
                            ordinal,
                            total,
                            source,
                        });
                    }
                }
            }

            self.notify(&RunState::Completed);
            info!("Pipeline run completed");

            Ok(PipelineResult {
                run_id,
                pipeline: pipeline.name().clone(),
                topic: topic.to_string(),
                final_output,
                context,
                started_at,
                finished_at: Timestamp::now(),
            })
        }
        .instrument(span)
        .await
    }

    fn notify(&self, state: &RunState) {
        if let Some(observer) = &self.observer {
            observer.on_transition(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_state_display() {
        let step = StepId::new("quiz").unwrap();
        assert_eq!(RunState::Pending.to_string(), "pending");
        assert_eq!(
            RunState::Running {
                ordinal: 3,
                total: 3,
                step: step.clone()
            }
            .to_string(),
            "running step 3 of 3 (quiz)"
        );
        assert_eq!(
            RunState::Failed {
                ordinal: 1,
                total: 3,
                step
            }
            .to_string(),
            "failed at step 1 of 3 (quiz)"
        );
    }
}
