// src/process/supervisor.rs

//! Production process backend.

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::errors::{GateError, Result};

use super::backend::ProcessBackend;
use super::handle::{Chunk, ProcessHandle, ProcessSide, ProcessState, StreamKind, channel};
use super::launch::LaunchSpec;

/// Spawns real OS processes with `tokio::process::Command`.
///
/// Per launched process three background tasks are started:
/// - one pump per output stream, forwarding each read as a chunk, in order,
/// - one supervisor that waits for exit (or a kill request) and records the
///   exit state. It is the only writer of that state.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessBackend;

/// Upper bound on a single forwarded chunk.
const READ_BUFFER: usize = 8 * 1024;

impl TokioProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for TokioProcessBackend {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<ProcessHandle> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd.spawn().map_err(|source| GateError::Launch {
            program: spec.program.clone(),
            source,
        })?;

        let pid = child.id();
        info!(program = %spec.program, pid, "supervised process started");

        let (handle, side) = channel(spec.program.clone(), pid);
        let ProcessSide {
            stdout,
            stderr,
            exit,
            kill,
        } = side;

        if let Some(out) = child.stdout.take() {
            tokio::spawn(pump_output(StreamKind::Stdout, out, stdout));
        }
        if let Some(err) = child.stderr.take() {
            tokio::spawn(pump_output(StreamKind::Stderr, err, stderr));
        }

        tokio::spawn(supervise(spec.program.clone(), child, exit, kill));

        Ok(handle)
    }
}

/// Forward one output pipe, one chunk per read.
///
/// Chunks are whatever a single read returned: no line framing, so output
/// without a trailing newline is delivered as soon as it is written. If
/// nobody is listening anymore the pipe is still drained so the child never
/// blocks on a full pipe.
async fn pump_output<R>(kind: StreamKind, mut pipe: R, tx: mpsc::Sender<Chunk>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_BUFFER];
    let mut receiver_gone = false;

    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if !receiver_gone && tx.send(buf[..n].to_vec()).await.is_err() {
                    debug!(stream = %kind, "output receiver dropped; draining without forwarding");
                    receiver_gone = true;
                }
            }
            Err(e) => {
                warn!(stream = %kind, error = %e, "failed reading process output");
                break;
            }
        }
    }

    debug!(stream = %kind, "output stream ended");
}

/// Wait for the child to exit on its own or because a kill was requested,
/// then record the exit state.
async fn supervise(
    program: String,
    mut child: Child,
    exit: watch::Sender<ProcessState>,
    mut kill_rx: mpsc::Receiver<()>,
) {
    let status = tokio::select! {
        status = child.wait() => status,
        Some(()) = kill_rx.recv() => {
            info!(program = %program, "termination requested; killing process");
            if let Err(e) = child.start_kill() {
                // Usually means it exited between the request and now.
                debug!(program = %program, error = %e, "start_kill failed");
            }
            child.wait().await
        }
    };

    let code = match status {
        Ok(status) => {
            info!(
                program = %program,
                exit_code = ?status.code(),
                success = status.success(),
                "supervised process exited"
            );
            status.code()
        }
        Err(e) => {
            warn!(program = %program, error = %e, "failed waiting for supervised process");
            None
        }
    };

    exit.send_replace(ProcessState::Exited { code });
}
