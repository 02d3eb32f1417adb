// src/engine/mod.rs

//! Orchestration engine for readygate.
//!
//! This module ties together:
//! - the bounded-wait policy that arbitrates between readiness, process
//!   exit and checkpoint timers
//! - the single gated operation
//! - the shutdown coordinator that always tears the process down
//!
//! The pure wait state machine lives in [`core`]; the async shell that feeds
//! it timer/readiness/exit events is [`wait`]. [`run`] drives one complete
//! run and [`shutdown`] converts its outcome into an exit code.

use std::fmt;

use crate::process::LaunchTemplate;
use crate::readiness::ReadinessMarker;
use crate::request::GatedResponse;

pub mod core;
pub mod run;
pub mod shutdown;
pub mod wait;

pub use self::core::{BoundedWait, Observation, WaitDecision, WaitPolicy, WaitTrigger};
pub use run::run_gated;
pub use shutdown::{GENERIC_FAILURE_CODE, RunReport, conclude};
pub use wait::{WaitVerdict, await_readiness};

/// Result of a whole run. Produced once, after which only shutdown follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The gated request got a well-formed response (any HTTP status).
    Success(GatedResponse),
    /// Readiness was never observed within the wait budget.
    Timeout,
    /// The process exited before the outcome was recorded.
    ProcessCrashed(Option<i32>),
    /// The gated request failed at the transport level.
    RequestFailed(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    /// Exit code reported to the host: `0` on success, the crashed child's
    /// code when there is a meaningful one, otherwise
    /// [`GENERIC_FAILURE_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success(_) => 0,
            RunOutcome::ProcessCrashed(Some(code)) if *code != 0 => *code,
            RunOutcome::ProcessCrashed(_) | RunOutcome::Timeout | RunOutcome::RequestFailed(_) => {
                GENERIC_FAILURE_CODE
            }
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Success(resp) => write!(f, "success (HTTP {})", resp.status),
            RunOutcome::Timeout => f.write_str("timed out waiting for readiness"),
            RunOutcome::ProcessCrashed(Some(code)) => {
                write!(f, "process crashed with exit code {code}")
            }
            RunOutcome::ProcessCrashed(None) => f.write_str("process crashed (no exit code)"),
            RunOutcome::RequestFailed(cause) => write!(f, "request failed: {cause}"),
        }
    }
}

/// Launch and gating settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Bytes of entropy in the run's token.
    pub token_bytes: usize,
    pub launch: LaunchTemplate,
    pub marker: ReadinessMarker,
    pub wait: WaitPolicy,
}
