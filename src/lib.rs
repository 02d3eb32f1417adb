// src/lib.rs

pub mod cli;
pub mod config;
pub mod credential;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod process;
pub mod readiness;
pub mod request;
pub mod types;

use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_and_validate};
use crate::engine::{RunOutcome, RunReport, run_gated};
use crate::errors::Result;
use crate::process::TokioProcessBackend;
use crate::request::HttpOperation;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and validation
/// - payload loading and the HTTP gated operation
/// - the real process backend
/// - one gated run
///
/// Returns the exit code the binary should terminate with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_and_validate(&args.config)?;

    if args.dry_run {
        print_dry_run(&cfg)?;
        return Ok(0);
    }

    // Resolve everything that can fail before a process exists.
    let settings = cfg.run_settings()?;
    let operation = HttpOperation::new(cfg.request_settings()?)?;
    let mut backend = TokioProcessBackend::new();

    let report = run_gated(&settings, &mut backend, operation).await?;
    print_report(&report);

    info!(exit_code = report.exit_code, outcome = %report.outcome, "readygate finished");
    Ok(report.exit_code)
}

/// Print the response body of a successful run to stdout.
fn print_report(report: &RunReport) {
    if let RunOutcome::Success(resp) = &report.outcome {
        println!("{}", resp.body);
    }
}

/// Dry-run output: the launch plan with the token masked.
fn print_dry_run(cfg: &ConfigFile) -> Result<()> {
    let settings = cfg.run_settings()?;
    let request = cfg.request_settings()?;
    let launch = settings.launch.preview();

    println!("readygate dry-run");
    println!("service:");
    println!("  program: {}", launch.program);
    println!("  args: {:?}", launch.args);
    if let Some(ref cwd) = launch.cwd {
        println!("  cwd: {}", cwd.display());
    }
    for (key, value) in &launch.env {
        println!("  env: {key}={value}");
    }
    println!("  ready: {}", settings.marker.describe());
    println!();

    println!("credential:");
    println!("  bytes: {}", settings.token_bytes);
    println!();

    println!("wait:");
    println!("  interval: {:?}", settings.wait.interval);
    println!("  checkpoints: {}", settings.wait.checkpoints);
    println!("  budget: {:?}", settings.wait.budget());
    println!();

    println!("request:");
    println!("  {} {}", request.method.as_str(), request.url);
    println!("  authorization: {} <token>", request.auth_scheme);
    println!("  timeout: {:?}", request.timeout);
    match request.payload {
        Some(ref body) => println!("  body: {body}"),
        None => println!("  body: (none)"),
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
