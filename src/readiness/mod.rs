// src/readiness/mod.rs

//! Readiness detection.
//!
//! - [`ReadinessMarker`] is what the service prints once it accepts
//!   connections (a fixed substring, or a regex).
//! - [`readiness_flag`] creates the one-shot flag: a single
//!   [`ReadinessSignal`] writer and any number of [`ReadinessState`] readers.
//! - [`detector`] consumes both output streams and flips the flag.

pub mod detector;

use regex::Regex;
use tokio::sync::watch;

pub use detector::ReadinessDetector;

/// Text that announces the service is ready.
#[derive(Debug, Clone)]
pub enum ReadinessMarker {
    Substring(String),
    Pattern(Regex),
}

impl ReadinessMarker {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            ReadinessMarker::Substring(s) => text.contains(s.as_str()),
            ReadinessMarker::Pattern(re) => re.is_match(text),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ReadinessMarker::Substring(s) => format!("substring {s:?}"),
            ReadinessMarker::Pattern(re) => format!("pattern /{}/", re.as_str()),
        }
    }
}

/// Value of the readiness flag. Moves `NotReady -> Ready` once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    NotReady,
    Ready,
}

/// Sole writer of the readiness flag. Deliberately not `Clone`.
#[derive(Debug)]
pub struct ReadinessSignal {
    tx: watch::Sender<Readiness>,
}

impl ReadinessSignal {
    /// Flip the flag to `Ready`. Returns `true` only for the call that
    /// performed the transition.
    pub fn mark_ready(&self) -> bool {
        self.tx.send_if_modified(|state| match state {
            Readiness::Ready => false,
            Readiness::NotReady => {
                *state = Readiness::Ready;
                true
            }
        })
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow() == Readiness::Ready
    }
}

/// Reader of the readiness flag.
#[derive(Debug, Clone)]
pub struct ReadinessState {
    rx: watch::Receiver<Readiness>,
}

impl ReadinessState {
    pub fn get(&self) -> Readiness {
        *self.rx.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.get() == Readiness::Ready
    }

    /// Resolve once the flag is `Ready` (returns `true`) or once the writer
    /// is gone without ever setting it (returns `false`).
    pub async fn ready(&mut self) -> bool {
        loop {
            if self.is_ready() {
                return true;
            }
            if self.rx.changed().await.is_err() {
                return self.is_ready();
            }
        }
    }
}

/// Create a fresh `NotReady` flag.
pub fn readiness_flag() -> (ReadinessSignal, ReadinessState) {
    let (tx, rx) = watch::channel(Readiness::NotReady);
    (ReadinessSignal { tx }, ReadinessState { rx })
}
