// src/request/http.rs

use std::time::Duration;

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use tracing::{debug, info};

use crate::credential::Token;
use crate::errors::Result;
use crate::types::HttpMethod;

use super::{GatedOperation, GatedResponse, RequestError, RequestFuture, RequestSettings};

/// Gated operation performed over HTTP with `reqwest`.
///
/// Sends `Authorization: <scheme> <token>` and, when a payload is
/// configured, a JSON body. No retries.
#[derive(Debug, Clone)]
pub struct HttpOperation {
    client: reqwest::Client,
    settings: RequestSettings,
}

impl HttpOperation {
    pub fn new(settings: RequestSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &RequestSettings {
        &self.settings
    }
}

impl GatedOperation for HttpOperation {
    fn execute(self, token: Token) -> RequestFuture {
        Box::pin(async move {
            let HttpOperation { client, settings } = self;

            info!(method = settings.method.as_str(), url = %settings.url, "sending gated request");

            let mut request = client
                .request(to_method(settings.method), &settings.url)
                .header(
                    AUTHORIZATION,
                    format!("{} {}", settings.auth_scheme, token.expose()),
                );
            if let Some(body) = &settings.payload {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .map_err(|e| classify(e, settings.timeout))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| match classify(e, settings.timeout) {
                    RequestError::Transport(e) => RequestError::Malformed(e.to_string()),
                    other => other,
                })?;

            debug!(status, bytes = body.len(), "gated request answered");
            Ok(GatedResponse { status, body })
        })
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> RequestError {
    if err.is_timeout() {
        RequestError::TimedOut(timeout)
    } else {
        RequestError::Transport(err)
    }
}

fn to_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}
