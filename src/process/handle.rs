// src/process/handle.rs

//! The supervised process as seen by the rest of the run.
//!
//! A backend never hands out its `tokio::process::Child`. Instead it calls
//! [`channel`] and keeps the [`ProcessSide`] (the only writer of the exit
//! state and the only producer of output chunks), while the orchestrator
//! gets the [`ProcessHandle`] (readers plus a kill request line).

use std::fmt;

use tokio::sync::{mpsc, watch};
use tracing::debug;

/// One read's worth of output, in emission order. Not aligned to lines.
pub type Chunk = Vec<u8>;

/// Buffered chunks per stream before the producer waits for the consumer.
const CHUNK_BUFFER: usize = 64;

/// Which of the two output streams a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Live/exited state of the supervised process.
///
/// `code` is `None` when the process was terminated by a signal or its
/// status could not be collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Running,
    Exited { code: Option<i32> },
}

impl ProcessState {
    pub fn is_running(&self) -> bool {
        matches!(self, ProcessState::Running)
    }

    /// Exit code, absent while the process is live.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessState::Running => None,
            ProcessState::Exited { code } => *code,
        }
    }
}

/// Lazy, ordered, non-restartable sequence of output chunks.
#[derive(Debug)]
pub struct OutputStream {
    kind: StreamKind,
    rx: mpsc::Receiver<Chunk>,
}

impl OutputStream {
    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Next chunk, or `None` once the stream has closed.
    pub async fn next_chunk(&mut self) -> Option<Chunk> {
        self.rx.recv().await
    }
}

/// Read-only view of the process exit state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ExitWatcher {
    rx: watch::Receiver<ProcessState>,
}

impl ExitWatcher {
    /// Current state. A writer that went away without publishing an exit is
    /// reported as an exit with unknown code.
    pub fn current(&self) -> ProcessState {
        let state = *self.rx.borrow();
        match state {
            ProcessState::Running if self.rx.has_changed().is_err() => {
                ProcessState::Exited { code: None }
            }
            other => other,
        }
    }

    /// Resolve once the process has exited, yielding its exit code.
    pub async fn exited(&mut self) -> Option<i32> {
        loop {
            if let ProcessState::Exited { code } = self.current() {
                return code;
            }
            // An error means the writer is gone; `current()` reports that
            // as an exit on the next iteration.
            let _ = self.rx.changed().await;
        }
    }
}

/// Handle to the supervised process, owned by the orchestrator.
pub struct ProcessHandle {
    program: String,
    pid: Option<u32>,
    stdout: Option<OutputStream>,
    stderr: Option<OutputStream>,
    exit: ExitWatcher,
    kill_tx: mpsc::Sender<()>,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("program", &self.program)
            .field("pid", &self.pid)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl ProcessHandle {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Take the stdout stream. Returns `None` on the second call.
    pub fn take_stdout(&mut self) -> Option<OutputStream> {
        self.stdout.take()
    }

    /// Take the stderr stream. Returns `None` on the second call.
    pub fn take_stderr(&mut self) -> Option<OutputStream> {
        self.stderr.take()
    }

    pub fn exit_watcher(&self) -> ExitWatcher {
        self.exit.clone()
    }

    pub fn state(&self) -> ProcessState {
        self.exit.current()
    }

    /// Most recent exit code; `None` while the process is live.
    pub fn exit_code(&self) -> Option<i32> {
        self.state().exit_code()
    }

    /// Terminate the process and wait until its exit has been recorded.
    ///
    /// Idempotent: on an already-exited process this returns the recorded
    /// state without sending anything.
    pub async fn kill(&mut self) -> ProcessState {
        let state = self.state();
        if !state.is_running() {
            debug!(program = %self.program, ?state, "kill requested on exited process; nothing to do");
            return state;
        }

        // Full means a kill is already pending; closed means the backend
        // already finished. Both leave us waiting for the recorded exit.
        let _ = self.kill_tx.try_send(());
        self.exit.exited().await;
        self.state()
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if self.state().is_running() {
            let _ = self.kill_tx.try_send(());
        }
    }
}

/// Writer half of a supervised process, driven by a [`crate::process::ProcessBackend`].
#[derive(Debug)]
pub struct ProcessSide {
    pub stdout: mpsc::Sender<Chunk>,
    pub stderr: mpsc::Sender<Chunk>,
    pub exit: watch::Sender<ProcessState>,
    pub kill: mpsc::Receiver<()>,
}

/// Build a connected [`ProcessHandle`] / [`ProcessSide`] pair.
pub fn channel(program: impl Into<String>, pid: Option<u32>) -> (ProcessHandle, ProcessSide) {
    let (stdout_tx, stdout_rx) = mpsc::channel(CHUNK_BUFFER);
    let (stderr_tx, stderr_rx) = mpsc::channel(CHUNK_BUFFER);
    let (exit_tx, exit_rx) = watch::channel(ProcessState::Running);
    let (kill_tx, kill_rx) = mpsc::channel(1);

    let handle = ProcessHandle {
        program: program.into(),
        pid,
        stdout: Some(OutputStream {
            kind: StreamKind::Stdout,
            rx: stdout_rx,
        }),
        stderr: Some(OutputStream {
            kind: StreamKind::Stderr,
            rx: stderr_rx,
        }),
        exit: ExitWatcher { rx: exit_rx },
        kill_tx,
    };

    let side = ProcessSide {
        stdout: stdout_tx,
        stderr: stderr_tx,
        exit: exit_tx,
        kill: kill_rx,
    };

    (handle, side)
}
