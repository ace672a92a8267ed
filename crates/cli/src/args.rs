//! Command-line definitions.
//!
//! The API key is deliberately not an argument: it is read from
//! `GEMINI_API_KEY` (optionally loaded from a `.env` file) so it never shows up
//! in shell history or process listings.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pipeline::{ModelId, Temperature};

/// Sequential research crew: find papers, analyse them, write a quiz.
#[derive(Parser, Debug)]
#[command(
    name = "research-crew",
    version,
    about = "Run a sequential research -> analysis -> quiz crew against a hosted Gemini model",
    after_help = "Examples:\n  \
        research-crew run --topic \"graph neural networks\"\n  \
        research-crew run --config crew.toml --transcript\n  \
        research-crew validate --dump > crew.toml\n  \
        research-crew ping\n\n\
        The API key is read from GEMINI_API_KEY (a .env file in the working directory is honoured)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging and per-step progress output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the crew for one topic and print the final result
    Run(RunArgs),

    /// Check a crew definition without calling the model
    Validate(ValidateArgs),

    /// Send one short prompt to check the credential and connectivity
    Ping(PingArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Topic substituted into every role and task template
    #[arg(short, long, default_value = crew::DEFAULT_TOPIC)]
    pub topic: String,

    /// Crew definition file (TOML); the built-in research crew when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Extra attempts for rate-limited or failed-in-transit model calls
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub max_retries: u32,

    /// Per-call timeout for the model API
    #[arg(long, default_value_t = 60, value_name = "SECS")]
    pub timeout_secs: u64,

    /// Also print every step's output, not just the final one
    #[arg(long)]
    pub transcript: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Crew definition file (TOML); the built-in research crew when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the definition as TOML after validating it
    #[arg(long)]
    pub dump: bool,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Per-call timeout for the model API
    #[arg(long, default_value_t = 30, value_name = "SECS")]
    pub timeout_secs: u64,
}

/// Overrides for the definition's model settings.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model identifier, e.g. gemini/gemini-2.0-flash
    #[arg(long, env = "RESEARCH_CREW_MODEL", value_parser = parse_model_id)]
    pub model: Option<ModelId>,

    /// Sampling temperature in [0.0, 1.0]
    #[arg(long, env = "RESEARCH_CREW_TEMPERATURE")]
    pub temperature: Option<Temperature>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_model_id(value: &str) -> Result<ModelId, String> {
    ModelId::new(value).ok_or_else(|| "model identifier must not be empty".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["research-crew", "run"]).unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.topic, "multi-agent AI systems");
        assert_eq!(args.max_retries, 0);
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.transcript);
    }

    #[test]
    fn test_temperature_is_range_checked() {
        let ok = Cli::try_parse_from(["research-crew", "run", "--temperature", "0.2"]);
        assert!(ok.is_ok());
        let err = Cli::try_parse_from(["research-crew", "run", "--temperature", "1.2"]);
        assert!(err.is_err());
    }
}
