// src/process/mod.rs

//! Process supervision layer.
//!
//! This module owns the single supervised service process of a run and
//! exposes it as a [`ProcessHandle`]:
//!
//! - [`handle`] defines the handle itself, its two output streams and the
//!   exit watcher, plus [`channel`] which builds the handle together with
//!   the writer half a backend drives.
//! - [`launch`] turns the configured command template into a concrete
//!   [`LaunchSpec`] once the run's token is known.
//! - [`backend`] provides the `ProcessBackend` trait so tests can replace
//!   real OS processes with scripted ones.
//! - [`supervisor`] is the production backend built on
//!   `tokio::process::Command`.

pub mod backend;
pub mod handle;
pub mod launch;
pub mod supervisor;

pub use backend::ProcessBackend;
pub use handle::{
    Chunk, ExitWatcher, OutputStream, ProcessHandle, ProcessSide, ProcessState, StreamKind,
    channel,
};
pub use launch::{LaunchSpec, LaunchTemplate};
pub use supervisor::TokioProcessBackend;
