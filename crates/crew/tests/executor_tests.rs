use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use crew::{research_crew, PipelineExecutor, RunState, DEFAULT_TOPIC};
use pipeline::{
    CompletionOptions, CompletionRequest, LlmProvider, ModelError, ModelId, Pipeline,
    PipelineError, PipelineName, Role, StepError, StepId, TaskStep, TemplateError,
};

/// Replays a fixed list of replies and records every request it receives.
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<Result<String, ModelError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn answering(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ModelError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("unscripted".to_string()))
    }
}

/// Rejects every call the way a provider without a credential does.
struct NoCredential {
    calls: Mutex<usize>,
}

#[async_trait]
impl LlmProvider for NoCredential {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, ModelError> {
        *self.calls.lock().unwrap() += 1;
        Err(ModelError::Authentication {
            message: "GEMINI_API_KEY is not set".into(),
        })
    }
}

fn numbered_pipeline(n: usize) -> Pipeline {
    let steps = (1..=n)
        .map(|i| {
            TaskStep::new(
                StepId::new(format!("step{i}")).unwrap(),
                Role::new(format!("Worker {i}"), "Work on {topic}", "Diligent."),
                format!("Do part {i} of the work on {{topic}}"),
                "Text",
            )
        })
        .collect();
    Pipeline::new(
        PipelineName::new("numbered").unwrap(),
        CompletionOptions::new(ModelId::new("gemini-2.0-flash").unwrap()),
        steps,
    )
    .unwrap()
}

#[tokio::test]
async fn test_transcript_matches_scripted_outputs_in_order() {
    let provider = ScriptedProvider::answering(&["A", "B", "C"]);
    let executor = PipelineExecutor::new(provider);

    let result = executor
        .run(&numbered_pipeline(3), DEFAULT_TOPIC)
        .await
        .unwrap();

    assert_eq!(result.final_output, "C");
    assert_eq!(
        result.context.transcript(),
        vec![("step1", "A"), ("step2", "B"), ("step3", "C")]
    );
    assert_eq!(result.topic, DEFAULT_TOPIC);
    assert_eq!(result.pipeline.as_str(), "numbered");
    assert!(result.started_at <= result.finished_at);
}

#[tokio::test]
async fn test_context_has_one_entry_per_step_for_many_sizes() {
    for n in 1..=6 {
        let replies: Vec<String> = (0..n).map(|i| format!("out-{i}")).collect();
        let refs: Vec<&str> = replies.iter().map(String::as_str).collect();
        let executor = PipelineExecutor::new(ScriptedProvider::answering(&refs));

        let result = executor.run(&numbered_pipeline(n), "t").await.unwrap();

        assert_eq!(result.context.len(), n);
        let steps: Vec<String> = result
            .context
            .entries()
            .iter()
            .map(|e| e.step.to_string())
            .collect();
        let expected: Vec<String> = (1..=n).map(|i| format!("step{i}")).collect();
        assert_eq!(steps, expected);
        assert_eq!(
            result.final_output,
            result.context.last().unwrap().output
        );
    }
}

#[tokio::test]
async fn test_each_prompt_contains_every_earlier_output_verbatim() {
    let outputs = ["first answer\nwith lines", "second {answer}", "third"];
    let provider = Arc::new(ScriptedProvider::answering(&outputs));
    let executor = PipelineExecutor::new(Arc::clone(&provider));

    executor
        .run(&numbered_pipeline(3), "swarms")
        .await
        .unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(!prompts[0].contains("first answer"));
    assert!(prompts[1].contains(outputs[0]));
    assert!(prompts[2].contains(outputs[0]));
    assert!(prompts[2].contains(outputs[1]));
    assert!(!prompts[2].contains(outputs[2]));
    for prompt in &prompts {
        assert!(prompt.contains("swarms"));
        assert!(!prompt.contains("{topic}"));
    }
}

#[tokio::test]
async fn test_failure_stops_the_run_and_tags_the_step() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok("A".into()),
        Err(ModelError::TransientService {
            message: "429 Too Many Requests".into(),
            retry_after: None,
        }),
        Ok("never used".into()),
    ]));
    let executor = PipelineExecutor::new(Arc::clone(&provider));

    let err = executor
        .run(&numbered_pipeline(4), "t")
        .await
        .unwrap_err();

    match &err {
        PipelineError::StepFailed {
            step,
            ordinal,
            total,
            source,
        } => {
            assert_eq!(step.as_str(), "step2");
            assert_eq!(*ordinal, 2);
            assert_eq!(*total, 4);
            assert!(matches!(
                source,
                StepError::Model(ModelError::TransientService { .. })
            ));
        }
    }
    // Steps 3 and 4 never reached the provider.
    assert_eq!(provider.prompts().len(), 2);
}

#[tokio::test]
async fn test_missing_credential_fails_on_first_step() {
    let provider = Arc::new(NoCredential {
        calls: Mutex::new(0),
    });
    let executor = PipelineExecutor::new(Arc::clone(&provider));
    let pipeline = research_crew().unwrap().build().unwrap();

    let err = executor.run(&pipeline, DEFAULT_TOPIC).await.unwrap_err();

    assert_eq!(err.step().as_str(), "research");
    assert!(err.model_error().is_some_and(ModelError::is_authentication));
    assert_eq!(*provider.calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_render_time_template_error_propagates_from_step() {
    // A pipeline refuses the bad template up front; a bare step only finds out
    // when it renders.
    let mut steps = numbered_pipeline(2).steps().to_vec();
    let valid = Pipeline::new(
        PipelineName::new("p").unwrap(),
        CompletionOptions::new(ModelId::new("m").unwrap()),
        steps.clone(),
    );
    assert!(valid.is_ok());

    steps[1].description = "Needs {audience}".into();
    assert!(Pipeline::new(
        PipelineName::new("p").unwrap(),
        CompletionOptions::new(ModelId::new("m").unwrap()),
        steps,
    )
    .is_err());

    let bad_step = TaskStep::new(
        StepId::new("broken").unwrap(),
        Role::new("R", "{missing}", ""),
        "x",
        "",
    );
    let err = bad_step
        .execute(
            "t",
            &Default::default(),
            &ScriptedProvider::answering(&[]),
            &CompletionOptions::new(ModelId::new("m").unwrap()),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StepError::Template(TemplateError::UndefinedParameter { .. })
    ));
}

#[tokio::test]
async fn test_observer_sees_every_transition_in_order() {
    let seen: Arc<Mutex<Vec<RunState>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let executor = PipelineExecutor::new(ScriptedProvider::new(vec![
        Ok("A".into()),
        Err(ModelError::InvalidRequest {
            message: "bad".into(),
        }),
    ]))
    .with_observer(move |state: &RunState| sink.lock().unwrap().push(state.clone()));

    let _ = executor.run(&numbered_pipeline(3), "t").await;

    let states = seen.lock().unwrap().clone();
    let step = |s: &str| StepId::new(s).unwrap();
    assert_eq!(
        states,
        vec![
            RunState::Pending,
            RunState::Running {
                ordinal: 1,
                total: 3,
                step: step("step1")
            },
            RunState::Running {
                ordinal: 2,
                total: 3,
                step: step("step2")
            },
            RunState::Failed {
                ordinal: 2,
                total: 3,
                step: step("step2")
            },
        ]
    );
}

#[tokio::test]
async fn test_requests_use_pipeline_model_settings() {
    let provider = Arc::new(ScriptedProvider::answering(&["A", "B", "C"]));
    let executor = PipelineExecutor::new(Arc::clone(&provider));
    let pipeline = research_crew().unwrap().build().unwrap();

    executor.run(&pipeline, DEFAULT_TOPIC).await.unwrap();

    let requests = provider.requests.lock().unwrap();
    assert_eq!(requests.len(), 3);
    for request in requests.iter() {
        assert_eq!(request.model.as_str(), "gemini/gemini-2.0-flash");
        assert_eq!(request.temperature.as_f64(), 0.7);
    }
    assert!(requests[0].prompt.contains("You are Research Paper Finder."));
    assert!(requests[0]
        .prompt
        .contains("Search for 5 relevant academic papers about multi-agent AI systems."));
    assert!(requests[2]
        .prompt
        .contains("### Output of step 'analysis'\nB\n"));
}
