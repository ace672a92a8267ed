//! Command handlers.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crew::{research_crew, PipelineExecutor, RunState};
use llm::{GeminiConfig, GeminiProvider, RetryConfig, RetryingProvider};
use pipeline::{
    CompletionOptions, CompletionRequest, LlmProvider, ModelId, Pipeline, PipelineDefinition,
    PipelineResult,
};
use serde::Serialize;
use tracing::info;

use crate::args::{Command, ModelArgs, OutputFormat, PingArgs, RunArgs, ValidateArgs};

const PING_PROMPT: &str = "Hello, are you working?";
const PING_PREVIEW_CHARS: usize = 100;

pub async fn dispatch(command: Command, verbose: bool) -> Result<()> {
    match command {
        Command::Run(args) => run(args, verbose).await,
        Command::Validate(args) => validate(args),
        Command::Ping(args) => ping(args).await,
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let definition = load_definition(args.config.as_deref())?;
    let pipeline = build_pipeline(&definition, args.config.as_deref())?;
    let pipeline = apply_model_overrides(pipeline, &args.model);

    let gemini = GeminiProvider::new(
        GeminiConfig::from_env().with_timeout(Duration::from_secs(args.timeout_secs)),
    )?;
    let provider = RetryingProvider::new(
        gemini,
        RetryConfig::default().with_max_retries(args.max_retries),
    );

    let mut executor = PipelineExecutor::new(provider);
    if verbose {
        executor = executor.with_observer(|state: &RunState| eprintln!("--- {state}"));
    }

    info!(
        pipeline = %pipeline.name(),
        model = %pipeline.options().model,
        temperature = %pipeline.options().temperature,
        "Starting crew"
    );
    let result = executor.run(&pipeline, &args.topic).await?;
    info!(run_id = %result.run_id, "Crew finished");

    print_result(&result, args.format, args.transcript)
}

fn apply_model_overrides(pipeline: Pipeline, overrides: &ModelArgs) -> Pipeline {
    let mut options = pipeline.options().clone();
    if let Some(model) = &overrides.model {
        options.model = model.clone();
    }
    if let Some(temperature) = overrides.temperature {
        options.temperature = temperature;
    }
    pipeline.with_options(options)
}

#[derive(Serialize)]
struct FinalOutput<'a> {
    run_id: String,
    pipeline: &'a str,
    topic: &'a str,
    final_output: &'a str,
}

fn print_result(result: &PipelineResult, format: OutputFormat, transcript: bool) -> Result<()> {
    match format {
        OutputFormat::Json if transcript => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
        OutputFormat::Json => {
            let summary = FinalOutput {
                run_id: result.run_id.to_string(),
                pipeline: result.pipeline.as_str(),
                topic: &result.topic,
                final_output: &result.final_output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            if transcript {
                for entry in result.context.entries() {
                    println!("=== {} ===", entry.step);
                    println!("{}\n", entry.output.trim_end());
                }
            }
            println!("=== FINAL RESULT ===");
            println!("{}", result.final_output.trim_end());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(args: ValidateArgs) -> Result<()> {
    let definition = load_definition(args.config.as_deref())?;
    let pipeline = build_pipeline(&definition, args.config.as_deref())?;

    if args.dump {
        print!("{}", definition.to_toml_string()?);
        return Ok(());
    }

    let order: Vec<&str> = pipeline.steps().iter().map(|s| s.id.as_str()).collect();
    println!(
        "Pipeline '{}' is valid: {} step(s) ({})",
        pipeline.name(),
        order.len(),
        order.join(" -> ")
    );
    println!(
        "Model: {} (temperature {})",
        pipeline.options().model,
        pipeline.options().temperature
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

async fn ping(args: PingArgs) -> Result<()> {
    let config = GeminiConfig::from_env().with_timeout(Duration::from_secs(args.timeout_secs));
    match config.masked_api_key() {
        Some(masked) => println!("API key: {masked}"),
        None => println!("API key: not set ({})", llm::API_KEY_ENV),
    }

    let model = match args.model.model {
        Some(model) => model,
        None => ModelId::new(crew::DEFAULT_MODEL).context("default model id is empty")?,
    };
    let mut options = CompletionOptions::new(model);
    if let Some(temperature) = args.model.temperature {
        options = options.with_temperature(temperature);
    }

    let provider = GeminiProvider::new(config)?;
    let reply = provider
        .complete(CompletionRequest::new(PING_PROMPT, &options))
        .await
        .with_context(|| format!("API call to {} failed", options.model))?;

    let preview: String = reply.chars().take(PING_PREVIEW_CHARS).collect();
    println!("API call successful: {}...", preview.trim_end());
    Ok(())
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

fn load_definition(path: Option<&Path>) -> Result<PipelineDefinition> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            PipelineDefinition::from_toml_str(&text)
                .with_context(|| format!("failed to load crew definition {}", path.display()))
        }
        None => research_crew().context("built-in research crew is invalid"),
    }
}

fn build_pipeline(definition: &PipelineDefinition, path: Option<&Path>) -> Result<Pipeline> {
    definition.build().with_context(|| match path {
        Some(path) => format!("invalid crew definition {}", path.display()),
        None => "built-in research crew is invalid".to_string(),
    })
}
