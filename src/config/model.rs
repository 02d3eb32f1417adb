// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::credential::DEFAULT_TOKEN_BYTES;
use crate::engine::{RunSettings, WaitPolicy};
use crate::errors::{GateError, Result};
use crate::process::LaunchTemplate;
use crate::readiness::ReadinessMarker;
use crate::request::{PayloadSource, RequestSettings};
use crate::types::{HttpMethod, parse_duration};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [service]
/// program = "jupyter"
/// args = ["notebook", "--no-browser", "--NotebookApp.token={token}", "--port={port}"]
/// port = 9988
/// ready_marker = "Jupyter Notebook is running at"
///
/// [wait]
/// interval = "3s"
/// checkpoints = 2
///
/// [request]
/// method = "PUT"
/// path = "/api/contents/ci-local-writeout.ipynb"
/// body_file = "notebook.json"
/// ```
///
/// `[credential]` and `[wait]` are optional and have defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    pub service: ServiceSection,

    #[serde(default)]
    pub credential: CredentialSection,

    #[serde(default)]
    pub wait: WaitSection,

    pub request: RequestSection,
}

/// `[service]` section: what to launch and how to recognise readiness.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    /// Executable to launch (looked up on `PATH` when not a path).
    pub program: String,

    /// Arguments; `{token}` and `{port}` are substituted before launch.
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory, relative to the config file's directory.
    #[serde(default)]
    pub cwd: Option<String>,

    /// Port the service listens on; also used to build the request URL.
    pub port: u16,

    /// Extra environment variables; values support the same placeholders.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Substring printed by the service once it accepts connections.
    #[serde(default)]
    pub ready_marker: Option<String>,

    /// Regex alternative to `ready_marker`.
    #[serde(default)]
    pub ready_pattern: Option<String>,
}

/// `[credential]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialSection {
    /// Bytes of entropy in the generated token.
    #[serde(default = "default_token_bytes")]
    pub bytes: usize,
}

fn default_token_bytes() -> usize {
    DEFAULT_TOKEN_BYTES
}

impl Default for CredentialSection {
    fn default() -> Self {
        Self {
            bytes: default_token_bytes(),
        }
    }
}

/// `[wait]` section: the escalating readiness wait.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitSection {
    /// Length of each checkpoint interval (e.g. `"3s"`).
    #[serde(default = "default_interval")]
    pub interval: String,

    /// How many intervals to wait before giving up.
    #[serde(default = "default_checkpoints")]
    pub checkpoints: u32,
}

fn default_interval() -> String {
    "3s".to_string()
}

fn default_checkpoints() -> u32 {
    2
}

impl Default for WaitSection {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            checkpoints: default_checkpoints(),
        }
    }
}

/// `[request]` section: the single gated request.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSection {
    #[serde(default)]
    pub method: HttpMethod,

    #[serde(default = "default_host")]
    pub host: String,

    /// Absolute path on the service, e.g. `/api/contents/x.ipynb`.
    pub path: String,

    /// Scheme word in `Authorization: <scheme> <token>`.
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    #[serde(default = "default_request_timeout")]
    pub timeout: String,

    /// Inline JSON-compatible body.
    #[serde(default)]
    pub body: Option<toml::Table>,

    /// JSON file holding the body, relative to the config file's directory.
    #[serde(default)]
    pub body_file: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_auth_scheme() -> String {
    "token".to_string()
}

fn default_request_timeout() -> String {
    "30s".to_string()
}

/// Validated configuration.
///
/// Only obtainable through `TryFrom<RawConfigFile>`, so every accessor below
/// may rely on the checks in `validate.rs`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub service: ServiceSection,
    pub credential: CredentialSection,
    pub wait: WaitSection,
    pub request: RequestSection,
    base_dir: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        service: ServiceSection,
        credential: CredentialSection,
        wait: WaitSection,
        request: RequestSection,
    ) -> Self {
        Self {
            service,
            credential,
            wait,
            request,
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve relative paths (`cwd`, `body_file`) against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn launch_template(&self) -> LaunchTemplate {
        LaunchTemplate {
            program: self.service.program.clone(),
            args: self.service.args.clone(),
            cwd: self
                .service
                .cwd
                .as_ref()
                .map(|cwd| self.base_dir.join(cwd)),
            env: self
                .service
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            port: self.service.port,
        }
    }

    pub fn readiness_marker(&self) -> Result<ReadinessMarker> {
        match (&self.service.ready_marker, &self.service.ready_pattern) {
            (Some(marker), None) => Ok(ReadinessMarker::Substring(marker.clone())),
            (None, Some(pattern)) => Regex::new(pattern)
                .map(ReadinessMarker::Pattern)
                .map_err(|e| {
                    GateError::ConfigError(format!(
                        "[service].ready_pattern is not a valid regex: {e}"
                    ))
                }),
            _ => Err(GateError::ConfigError(
                "[service] needs exactly one of ready_marker or ready_pattern".to_string(),
            )),
        }
    }

    pub fn wait_policy(&self) -> Result<WaitPolicy> {
        let interval = parse_duration(&self.wait.interval)
            .map_err(|e| GateError::ConfigError(format!("[wait].interval: {e}")))?;
        Ok(WaitPolicy::new(interval, self.wait.checkpoints))
    }

    /// Everything the orchestrator needs to launch and gate one run.
    pub fn run_settings(&self) -> Result<RunSettings> {
        Ok(RunSettings {
            token_bytes: self.credential.bytes,
            launch: self.launch_template(),
            marker: self.readiness_marker()?,
            wait: self.wait_policy()?,
        })
    }

    pub fn payload_source(&self) -> PayloadSource {
        match (&self.request.body, &self.request.body_file) {
            (Some(table), _) => PayloadSource::Inline(table.clone()),
            (None, Some(file)) => PayloadSource::File(self.base_dir.join(file)),
            (None, None) => PayloadSource::Empty,
        }
    }

    /// Resolve the request section, loading the payload from disk if needed.
    pub fn request_settings(&self) -> Result<RequestSettings> {
        let timeout = parse_duration(&self.request.timeout)
            .map_err(|e| GateError::ConfigError(format!("[request].timeout: {e}")))?;

        Ok(RequestSettings {
            method: self.request.method,
            url: format!(
                "http://{}:{}{}",
                self.request.host, self.service.port, self.request.path
            ),
            auth_scheme: self.request.auth_scheme.clone(),
            timeout,
            payload: self.payload_source().load()?,
        })
    }
}
