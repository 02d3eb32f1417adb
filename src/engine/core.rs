// src/engine/core.rs

//! Pure bounded-wait state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! observations of (readiness flag, process state) together with the reason
//! it was woken, and decides whether to proceed, keep waiting, or abort.
//!
//! The async shell (`engine::wait`) owns the timers and channels. The core
//! has no Tokio types and is unit tested on its own.

use std::time::Duration;

use crate::process::ProcessState;

/// Escalating wait: `checkpoints` intervals of `interval` each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub checkpoints: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            checkpoints: 2,
        }
    }
}

impl WaitPolicy {
    pub fn new(interval: Duration, checkpoints: u32) -> Self {
        Self {
            interval,
            checkpoints,
        }
    }

    /// Worst-case time spent waiting for readiness.
    pub fn budget(&self) -> Duration {
        self.interval * self.checkpoints
    }

    /// Offset from the start of the wait at which checkpoint `index`
    /// (zero-based) fires.
    pub fn checkpoint_offset(&self, index: u32) -> Duration {
        self.interval * (index + 1)
    }
}

/// Why the shell consulted the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTrigger {
    /// Readiness or exit changed between checkpoints.
    Woken,
    /// The current checkpoint interval elapsed.
    CheckpointElapsed,
}

/// Snapshot of the shared state at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub ready: bool,
    pub process: ProcessState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitDecision {
    Proceed,
    KeepWaiting,
    Crashed(Option<i32>),
    TimedOut,
}

impl WaitDecision {
    pub fn is_final(&self) -> bool {
        !matches!(self, WaitDecision::KeepWaiting)
    }
}

/// Wait state: how many checkpoints have elapsed.
#[derive(Debug, Clone)]
pub struct BoundedWait {
    policy: WaitPolicy,
    elapsed: u32,
}

impl BoundedWait {
    pub fn new(policy: WaitPolicy) -> Self {
        Self { policy, elapsed: 0 }
    }

    pub fn policy(&self) -> WaitPolicy {
        self.policy
    }

    pub fn elapsed_checkpoints(&self) -> u32 {
        self.elapsed
    }

    /// Evaluate one observation.
    ///
    /// Precedence: exit beats readiness beats timer. A process that printed
    /// the marker and then died is never treated as usable, and a flag that
    /// was set by the time a checkpoint fires still counts.
    pub fn step(&mut self, trigger: WaitTrigger, obs: Observation) -> WaitDecision {
        if let ProcessState::Exited { code } = obs.process {
            return WaitDecision::Crashed(code);
        }

        if obs.ready {
            return WaitDecision::Proceed;
        }

        match trigger {
            WaitTrigger::Woken => WaitDecision::KeepWaiting,
            WaitTrigger::CheckpointElapsed => {
                self.elapsed += 1;
                if self.elapsed >= self.policy.checkpoints {
                    WaitDecision::TimedOut
                } else {
                    WaitDecision::KeepWaiting
                }
            }
        }
    }
}
