use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use readygate::credential::Token;
use readygate::request::{GatedOperation, GatedResponse, RequestError, RequestFuture};

/// One recorded call of a [`RecordingOperation`].
#[derive(Debug, Clone)]
pub struct Invocation {
    pub token: Token,
    pub at: Instant,
}

/// A fake gated operation that:
/// - records every invocation (token + Tokio time)
/// - optionally takes some time to "respond"
/// - answers with a fixed response or a fixed failure.
///
/// Clones share the same record, so keep one before handing it to the run.
#[derive(Clone)]
pub struct RecordingOperation {
    calls: Arc<Mutex<Vec<Invocation>>>,
    response: std::result::Result<GatedResponse, String>,
    delay: Duration,
}

impl RecordingOperation {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Ok(GatedResponse {
                status,
                body: body.to_string(),
            }),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Err(cause.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl GatedOperation for RecordingOperation {
    fn execute(self, token: Token) -> RequestFuture {
        Box::pin(async move {
            {
                let mut guard = self.calls.lock().unwrap();
                guard.push(Invocation {
                    token,
                    at: Instant::now(),
                });
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.response.map_err(RequestError::Malformed)
        })
    }
}
