// src/engine/run.rs

use tracing::{info, warn};

use crate::credential::Token;
use crate::errors::Result;
use crate::process::{ProcessBackend, ProcessHandle, ProcessState};
use crate::readiness::ReadinessDetector;
use crate::request::GatedOperation;

use super::shutdown::{RunReport, conclude};
use super::wait::{WaitVerdict, await_readiness};
use super::{RunOutcome, RunSettings};

/// Drive one complete run.
///
/// Order: token, launch, readiness wait, (at most one) gated operation,
/// shutdown. Errors returned from here happen before a process exists
/// (entropy, launch). Once launched, every path ends in [`conclude`].
pub async fn run_gated<B, O>(
    settings: &RunSettings,
    backend: &mut B,
    operation: O,
) -> Result<RunReport>
where
    B: ProcessBackend,
    O: GatedOperation,
{
    let token = Token::generate(settings.token_bytes)?;

    let preview = settings.launch.preview();
    info!(
        program = %preview.program,
        args = ?preview.args,
        port = settings.launch.port,
        "launching service"
    );

    let mut handle = backend.launch(&settings.launch.render(token.expose()))?;
    let outcome = drive(settings, &mut handle, operation, &token).await;

    Ok(conclude(&mut handle, outcome).await)
}

async fn drive<O>(
    settings: &RunSettings,
    handle: &mut ProcessHandle,
    operation: O,
    token: &Token,
) -> RunOutcome
where
    O: GatedOperation,
{
    let (detector, mut readiness) = ReadinessDetector::new(settings.marker.clone());
    let _detector = detector.spawn(handle.take_stdout(), handle.take_stderr());

    let mut exit = handle.exit_watcher();

    match await_readiness(settings.wait, &mut readiness, &mut exit).await {
        WaitVerdict::Ready => {}
        WaitVerdict::Crashed(code) => return RunOutcome::ProcessCrashed(code),
        WaitVerdict::TimedOut => return RunOutcome::Timeout,
    }

    info!("issuing gated request");
    let outcome = match operation.execute(token.clone()).await {
        Ok(response) => RunOutcome::Success(response),
        Err(e) => {
            warn!(error = %e, "gated request failed");
            RunOutcome::RequestFailed(e.to_string())
        }
    };

    // A nonzero exit while the request was in flight still counts as a crash.
    match exit.current() {
        ProcessState::Exited { code } if code != Some(0) => {
            warn!(exit_code = ?code, "service exited while the gated request was in flight");
            RunOutcome::ProcessCrashed(code)
        }
        _ => outcome,
    }
}
