// src/engine/wait.rs

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::process::ExitWatcher;
use crate::readiness::ReadinessState;

use super::core::{BoundedWait, Observation, WaitDecision, WaitPolicy, WaitTrigger};

/// Final answer of the bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitVerdict {
    Ready,
    Crashed(Option<i32>),
    TimedOut,
}

/// Wait for the earliest of: readiness, process exit, or the last checkpoint.
///
/// This is the async shell around [`BoundedWait`]. Every wake-up takes a
/// fresh snapshot of both the readiness flag and the exit state and hands it
/// to the core, so the precedence rules live in one place. Checkpoints are
/// measured from the start of the wait, not from the previous wake-up.
pub async fn await_readiness(
    policy: WaitPolicy,
    readiness: &mut ReadinessState,
    exit: &mut ExitWatcher,
) -> WaitVerdict {
    let start = Instant::now();
    let mut core = BoundedWait::new(policy);
    let mut readiness_open = true;

    info!(
        interval = ?policy.interval,
        checkpoints = policy.checkpoints,
        "waiting for service readiness"
    );

    loop {
        let deadline = start + policy.checkpoint_offset(core.elapsed_checkpoints());

        let trigger = tokio::select! {
            biased;

            _ = exit.exited() => WaitTrigger::Woken,
            ready = readiness.ready(), if readiness_open => {
                if !ready {
                    // Both streams closed without the marker; only exit or
                    // the timer can end the wait now.
                    debug!("readiness detector finished without observing the marker");
                    readiness_open = false;
                }
                WaitTrigger::Woken
            }
            _ = sleep_until(deadline) => WaitTrigger::CheckpointElapsed,
        };

        let obs = Observation {
            ready: readiness.is_ready(),
            process: exit.current(),
        };

        match core.step(trigger, obs) {
            WaitDecision::Proceed => {
                info!(elapsed = ?start.elapsed(), "service reported ready");
                return WaitVerdict::Ready;
            }
            WaitDecision::Crashed(code) => {
                warn!(exit_code = ?code, elapsed = ?start.elapsed(), "service exited before becoming ready");
                return WaitVerdict::Crashed(code);
            }
            WaitDecision::TimedOut => {
                warn!(waited = ?policy.budget(), "service did not become ready in time; giving up");
                return WaitVerdict::TimedOut;
            }
            WaitDecision::KeepWaiting => {
                if trigger == WaitTrigger::CheckpointElapsed {
                    info!(
                        waited = ?start.elapsed(),
                        checkpoint = core.elapsed_checkpoints(),
                        next_in = ?policy.interval,
                        "service not ready yet; waiting another interval"
                    );
                }
            }
        }
    }
}
