// model-pusher-cli/src/main.rs
// ============================================================================
// Module: Model Pusher CLI Entry Point
// Description: Command dispatcher for the model publication stage.
// Purpose: Wire configuration, store, and publisher for one publish attempt.
// Dependencies: clap, model-pusher-config, model-pusher-core, model-pusher-store-s3
// ============================================================================

//! ## Overview
//! The CLI runs exactly one publication attempt per invocation, mirroring
//! how the pipeline orchestrator invokes the stage once per training run.
//! The publication record is written to stdout as JSON; audit events go to
//! the configured sink; classified errors go to stderr with their cause
//! chain.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use clap::Subcommand;
use model_pusher_config::ConfigError;
use model_pusher_config::ModelPusherConfig;
use model_pusher_core::ModelPublisher;
use model_pusher_core::PublishError;
use model_pusher_core::TransferError;
use model_pusher_store_s3::S3ModelStore;

// ============================================================================
// SECTION: CLI Definition
// ============================================================================

/// Publish trained model artifacts to object storage.
#[derive(Debug, Parser)]
#[command(name = "model-pusher", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Command to execute.
    #[command(subcommand)]
    command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Publish a serialized model artifact to the configured destination.
    Publish {
        /// Path to the serialized model artifact.
        #[arg(long, value_name = "PATH")]
        model: PathBuf,
        /// Remove the local artifact after a confirmed upload.
        #[arg(long)]
        delete_source: bool,
    },
    /// Validate the configuration and report the resolved destination.
    CheckConfig,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI failure classification.
#[derive(Debug, thiserror::Error)]
enum CliError {
    /// Configuration loading or validation failed.
    #[error("configuration error")]
    Config(#[from] ConfigError),
    /// Store construction failed.
    #[error("store error")]
    Store(#[from] TransferError),
    /// Publication failed.
    #[error("publish error")]
    Publish(#[from] PublishError),
    /// Output serialization or write failure.
    #[error("output error: {0}")]
    Output(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Process entry point.
fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

/// Writes the error and its cause chain to stderr.
fn report_error(err: &CliError) {
    let mut stderr = io::stderr();
    let _ = writeln!(stderr, "model-pusher: {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        let _ = writeln!(stderr, "  caused by: {inner}");
        cause = inner.source();
    }
}

/// Dispatches the parsed command.
fn run(cli: &Cli) -> Result<(), CliError> {
    let config = ModelPusherConfig::load(cli.config.as_deref())?;
    match &cli.command {
        Command::CheckConfig => {
            let summary = serde_json::json!({
                "bucket": config.storage.bucket,
                "destination_key": config.publish.model_key,
                "delete_source": config.publish.delete_source,
            });
            write_stdout(&serde_json::to_string_pretty(&summary)
                .map_err(|err| CliError::Output(err.to_string()))?)
        }
        Command::Publish {
            model,
            delete_source,
        } => {
            let store = Arc::new(S3ModelStore::new(&config.storage)?);
            let audit = config.audit_sink()?;
            let publisher = ModelPublisher::with_audit(store, audit);
            let mut request = config.publish_request(model);
            if *delete_source {
                request = request.with_delete_source(true);
            }
            let record = publisher.publish(&request)?;
            let payload = serde_json::to_string_pretty(&record)
                .map_err(|err| CliError::Output(err.to_string()))?;
            write_stdout(&payload)
        }
    }
}

/// Writes one line to stdout.
fn write_stdout(payload: &str) -> Result<(), CliError> {
    writeln!(io::stdout(), "{payload}").map_err(|err| CliError::Output(err.to_string()))
}
