// src/engine/shutdown.rs

use tracing::{debug, error, info, warn};

use crate::process::{ProcessHandle, ProcessState};

use super::RunOutcome;

/// Exit code for failures that carry no child exit code of their own.
pub const GENERIC_FAILURE_CODE: i32 = 1;

/// What a run reports back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub exit_code: i32,
    /// Process state after teardown.
    pub final_state: ProcessState,
}

/// Tear the supervised process down and turn `outcome` into a report.
///
/// Called exactly once per launched process, on every path. Killing is
/// idempotent, so a process that already exited is left as it is.
pub async fn conclude(handle: &mut ProcessHandle, outcome: RunOutcome) -> RunReport {
    let final_state = handle.kill().await;
    let exit_code = outcome.exit_code();

    match &outcome {
        RunOutcome::Success(resp) if resp.is_success() => {
            info!(status = resp.status, "gated request succeeded");
            debug!(body = %resp.body, "gated response body");
        }
        RunOutcome::Success(resp) => {
            warn!(status = resp.status, body = %resp.body, "gated request answered with a non-success status");
        }
        RunOutcome::Timeout | RunOutcome::ProcessCrashed(_) | RunOutcome::RequestFailed(_) => {
            error!(outcome = %outcome, "run failed");
        }
    }

    info!(
        program = %handle.program(),
        final_state = ?final_state,
        exit_code,
        "supervised process shut down"
    );

    RunReport {
        outcome,
        exit_code,
        final_state,
    }
}
