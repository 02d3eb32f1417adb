// src/request/mod.rs

//! The single gated operation.
//!
//! - [`GatedOperation`] is the seam the orchestrator calls exactly once, after
//!   readiness. `execute` consumes the operation, so a second call does not
//!   type-check.
//! - [`http`] is the production implementation on `reqwest`.
//! - [`payload`] loads the request body from config.

pub mod http;
pub mod payload;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

use crate::credential::Token;
use crate::types::HttpMethod;

pub use http::HttpOperation;
pub use payload::PayloadSource;

/// Status and body of a well-formed response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedResponse {
    pub status: u16,
    pub body: String,
}

impl GatedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure of the gated request.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("no response within {0:?}")]
    TimedOut(Duration),

    #[error("malformed response: {0}")]
    Malformed(String),
}

pub type RequestResult = std::result::Result<GatedResponse, RequestError>;

/// Boxed future returned by [`GatedOperation::execute`].
pub type RequestFuture = Pin<Box<dyn Future<Output = RequestResult> + Send>>;

/// The authenticated, state-mutating call made once the service is ready.
///
/// Production code uses [`HttpOperation`]; tests can provide their own
/// implementation that records invocations instead of talking HTTP.
pub trait GatedOperation: Send {
    fn execute(self, token: Token) -> RequestFuture
    where
        Self: Sized;
}

/// Resolved `[request]` settings.
#[derive(Debug, Clone)]
pub struct RequestSettings {
    pub method: HttpMethod,
    pub url: String,
    pub auth_scheme: String,
    pub timeout: Duration,
    pub payload: Option<serde_json::Value>,
}
