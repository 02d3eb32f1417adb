// src/process/backend.rs

//! Pluggable process backend abstraction.
//!
//! The orchestrator talks to a `ProcessBackend` instead of spawning
//! `tokio::process::Command` directly. This makes it easy to swap in a
//! scripted process in tests while keeping the production implementation in
//! [`super::supervisor`].
//!
//! - `TokioProcessBackend` is the implementation used by `readygate`.
//! - Tests can provide their own `ProcessBackend` that builds a handle with
//!   [`super::channel`] and drives output/exit by hand.

use crate::errors::Result;

use super::handle::ProcessHandle;
use super::launch::LaunchSpec;

/// Trait abstracting how the supervised process is started.
pub trait ProcessBackend: Send {
    /// Start the process described by `spec`.
    ///
    /// Must return as soon as the process is started; output and exit are
    /// delivered through the returned handle. Failure to start is reported
    /// synchronously as [`crate::errors::GateError::Launch`].
    fn launch(&mut self, spec: &LaunchSpec) -> Result<ProcessHandle>;
}
