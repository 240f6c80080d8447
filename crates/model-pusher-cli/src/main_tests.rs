// model-pusher-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Argument Tests
// Description: Unit tests for the command-line argument surface.
// Purpose: Validate parsing of commands, flags, and defaults.
// Dependencies: model-pusher-cli, clap
// ============================================================================

//! ## Overview
//! Exercises the clap definition without executing any command: the
//! argument surface is part of the stage's external interface and must
//! stay stable for the pipeline orchestrator.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use super::*;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn publish_command_parses_model_path() {
    let cli = Cli::try_parse_from(["model-pusher", "publish", "--model", "/tmp/model.pkl"])
        .expect("parse");

    match cli.command {
        Command::Publish {
            model,
            delete_source,
        } => {
            assert_eq!(model, PathBuf::from("/tmp/model.pkl"));
            assert!(!delete_source);
        }
        Command::CheckConfig => panic!("expected publish command"),
    }
}

#[test]
fn publish_command_accepts_delete_source_flag() {
    let cli = Cli::try_parse_from([
        "model-pusher",
        "publish",
        "--model",
        "/tmp/model.pkl",
        "--delete-source",
    ])
    .expect("parse");

    assert!(matches!(cli.command, Command::Publish { delete_source: true, .. }));
}

#[test]
fn publish_command_requires_model_path() {
    assert!(Cli::try_parse_from(["model-pusher", "publish"]).is_err());
}

#[test]
fn check_config_command_parses() {
    let cli = Cli::try_parse_from(["model-pusher", "check-config"]).expect("parse");

    assert!(matches!(cli.command, Command::CheckConfig));
}

#[test]
fn config_flag_is_global() {
    let cli = Cli::try_parse_from([
        "model-pusher",
        "publish",
        "--model",
        "/tmp/model.pkl",
        "--config",
        "/etc/model-pusher.toml",
    ])
    .expect("parse");

    assert_eq!(cli.config, Some(PathBuf::from("/etc/model-pusher.toml")));
}
