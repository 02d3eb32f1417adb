// src/readiness/detector.rs

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::process::{OutputStream, StreamKind};

use super::{ReadinessMarker, ReadinessSignal, ReadinessState, readiness_flag};

/// Longest partial line kept between chunks for a regex marker.
const MAX_PARTIAL_LINE: usize = 8 * 1024;

/// Watches both output streams of the supervised process for the marker.
///
/// Purely reactive: no timers live here. Every chunk is consumed and logged
/// whether or not the service is ready yet, so the child never stalls on a
/// full pipe.
///
/// Chunks carry no line framing, so a marker may arrive split across two
/// reads. Each stream keeps a short tail of what it has seen: the last
/// `marker.len() - 1` bytes for a substring, the current partial line
/// (bounded) for a pattern.
#[derive(Debug)]
pub struct ReadinessDetector {
    marker: ReadinessMarker,
    signal: ReadinessSignal,
    stdout_tail: Vec<u8>,
    stderr_tail: Vec<u8>,
}

impl ReadinessDetector {
    /// Create a detector together with a reader of the flag it owns.
    pub fn new(marker: ReadinessMarker) -> (Self, ReadinessState) {
        let (signal, state) = readiness_flag();
        let detector = Self {
            marker,
            signal,
            stdout_tail: Vec::new(),
            stderr_tail: Vec::new(),
        };
        (detector, state)
    }

    /// Test one chunk together with the stream's tail. Returns `true` if this
    /// chunk flipped the flag.
    pub fn observe(&mut self, kind: StreamKind, chunk: &[u8]) -> bool {
        debug!(stream = %kind, "{}", String::from_utf8_lossy(chunk).trim_end());

        if self.signal.is_set() {
            return false;
        }

        let window = match kind {
            StreamKind::Stdout => &mut self.stdout_tail,
            StreamKind::Stderr => &mut self.stderr_tail,
        };
        window.extend_from_slice(chunk);

        let matched = self.marker.matches(&String::from_utf8_lossy(window));
        let keep = retained_len(&self.marker, window);
        window.drain(..window.len() - keep);

        if !matched {
            return false;
        }

        let transitioned = self.signal.mark_ready();
        if transitioned {
            info!(stream = %kind, marker = %self.marker.describe(), "readiness marker observed");
        }
        transitioned
    }

    /// Consume both streams concurrently until both have closed.
    ///
    /// Chunks of one stream are observed in the order they were emitted; the
    /// two streams may interleave. Dropping the detector at the end closes
    /// the flag, which readers see as "will never become ready".
    pub fn spawn(
        mut self,
        stdout: Option<OutputStream>,
        stderr: Option<OutputStream>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut stdout_open = stdout.is_some();
            let mut stderr_open = stderr.is_some();
            let mut stdout = stdout;
            let mut stderr = stderr;

            loop {
                tokio::select! {
                    chunk = next_chunk(&mut stdout), if stdout_open => match chunk {
                        Some(chunk) => {
                            self.observe(StreamKind::Stdout, &chunk);
                        }
                        None => stdout_open = false,
                    },
                    chunk = next_chunk(&mut stderr), if stderr_open => match chunk {
                        Some(chunk) => {
                            self.observe(StreamKind::Stderr, &chunk);
                        }
                        None => stderr_open = false,
                    },
                    else => break,
                }
            }

            debug!(ready = self.signal.is_set(), "readiness detector finished");
        })
    }
}

async fn next_chunk(stream: &mut Option<OutputStream>) -> Option<Vec<u8>> {
    match stream {
        Some(stream) => stream.next_chunk().await,
        None => None,
    }
}

/// How many trailing bytes of `window` may still be the start of a match.
fn retained_len(marker: &ReadinessMarker, window: &[u8]) -> usize {
    match marker {
        ReadinessMarker::Substring(s) => s.len().saturating_sub(1).min(window.len()),
        ReadinessMarker::Pattern(_) => {
            let line_start = window
                .iter()
                .rposition(|&b| b == b'\n')
                .map_or(0, |i| i + 1);
            (window.len() - line_start).min(MAX_PARTIAL_LINE)
        }
    }
}
