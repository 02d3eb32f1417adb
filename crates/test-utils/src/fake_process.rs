use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use readygate::errors::{GateError, Result};
use readygate::process::{
    channel, Chunk, LaunchSpec, ProcessBackend, ProcessHandle, ProcessState,
};

/// Fake pid reported by scripted processes.
pub const SCRIPTED_PID: u32 = 4242;

/// Test-side control of a scripted process.
///
/// Output is pushed with `try_send`, so emitting never yields: a test can put
/// a chunk and an exit into the same batch of events. Dropping the script
/// closes both output streams.
pub struct ProcessScript {
    stdout: mpsc::Sender<Chunk>,
    stderr: mpsc::Sender<Chunk>,
    exit: Arc<watch::Sender<ProcessState>>,
}

impl ProcessScript {
    pub fn emit_stdout(&self, text: &str) -> bool {
        self.stdout.try_send(text.as_bytes().to_vec()).is_ok()
    }

    pub fn emit_stderr(&self, text: &str) -> bool {
        self.stderr.try_send(text.as_bytes().to_vec()).is_ok()
    }

    /// Record an exit with `code`. The first recorded exit wins.
    pub fn exit(&self, code: i32) -> bool {
        record_exit(&self.exit, Some(code))
    }

    pub fn state(&self) -> ProcessState {
        *self.exit.borrow()
    }

    /// Keep the process "alive" (streams open) until something records an
    /// exit, e.g. the orchestrator's kill.
    pub async fn until_exit(self) {
        let mut rx = self.exit.subscribe();
        loop {
            let state = *rx.borrow_and_update();
            if !state.is_running() {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

fn record_exit(exit: &watch::Sender<ProcessState>, code: Option<i32>) -> bool {
    exit.send_if_modified(|state| {
        if state.is_running() {
            *state = ProcessState::Exited { code };
            true
        } else {
            false
        }
    })
}

/// Build a handle driven by a [`ProcessScript`].
///
/// A kill request through the handle records an exit without a code, like a
/// signal would. Must be called inside a Tokio runtime.
pub fn scripted_process(program: &str) -> (ProcessHandle, ProcessScript) {
    let (handle, side) = channel(program, Some(SCRIPTED_PID));
    let exit = Arc::new(side.exit);

    let kill_exit = Arc::clone(&exit);
    let mut kill_rx = side.kill;
    tokio::spawn(async move {
        if kill_rx.recv().await.is_some() {
            record_exit(&kill_exit, None);
        }
    });

    let script = ProcessScript {
        stdout: side.stdout,
        stderr: side.stderr,
        exit,
    };

    (handle, script)
}

type Behaviour = Box<dyn FnOnce(ProcessScript) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send>;

/// A `ProcessBackend` that launches scripted processes instead of real ones.
///
/// - records every `LaunchSpec` it is asked to start
/// - runs the given behaviour as a background task against the script
pub struct ScriptedBackend {
    behaviour: Option<Behaviour>,
    launches: Arc<Mutex<Vec<LaunchSpec>>>,
    fail_launch: bool,
}

impl ScriptedBackend {
    pub fn new<F, Fut>(behaviour: F) -> Self
    where
        F: FnOnce(ProcessScript) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            behaviour: Some(Box::new(move |script| Box::pin(behaviour(script)))),
            launches: Arc::new(Mutex::new(Vec::new())),
            fail_launch: false,
        }
    }

    /// A backend whose launch always fails as if the executable was missing.
    pub fn failing() -> Self {
        Self {
            behaviour: None,
            launches: Arc::new(Mutex::new(Vec::new())),
            fail_launch: true,
        }
    }

    pub fn launches(&self) -> Arc<Mutex<Vec<LaunchSpec>>> {
        Arc::clone(&self.launches)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn launch(&mut self, spec: &LaunchSpec) -> Result<ProcessHandle> {
        self.launches.lock().unwrap().push(spec.clone());

        if self.fail_launch {
            return Err(GateError::Launch {
                program: spec.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted launch failure"),
            });
        }

        let (handle, script) = scripted_process(&spec.program);
        match self.behaviour.take() {
            Some(behaviour) => {
                tokio::spawn(behaviour(script));
            }
            None => {
                tokio::spawn(script.until_exit());
            }
        }

        Ok(handle)
    }
}
