//! Research crew CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Load the environment**: read `.env` (if present) so `GEMINI_API_KEY`
//!    can live outside the shell profile.
//! 2. **Wire observability**: configure `tracing-subscriber` (text or JSON)
//!    and, when configured, an OpenTelemetry OTLP exporter. All `tracing`
//!    spans and events emitted by every crate in the workspace flow through it.
//! 3. **Construct infrastructure**: create the Gemini provider, wrap it in the
//!    retry policy, and inject it into the `PipelineExecutor`.
//! 4. **Dispatch**: `run` a crew, `validate` a definition, or `ping` the API.

mod args;
mod commands;
mod telemetry;

use clap::Parser;

use crate::args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal; the variable may come from the shell.
    // Telemetry is not up yet, so a malformed one is reported directly.
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => eprintln!("warning: failed to load .env: {err}"),
    }

    let cli = Cli::parse();
    let telemetry = telemetry::init(cli.verbose)?;

    let outcome = commands::dispatch(cli.command, cli.verbose).await;

    telemetry.shutdown();
    outcome
}
