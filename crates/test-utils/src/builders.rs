#![allow(dead_code)]

use std::collections::BTreeMap;
use std::time::Duration;

use regex::Regex;
use readygate::config::{
    ConfigFile, CredentialSection, RawConfigFile, RequestSection, ServiceSection, WaitSection,
};
use readygate::engine::{RunSettings, WaitPolicy};
use readygate::process::LaunchTemplate;
use readygate::readiness::ReadinessMarker;
use readygate::types::HttpMethod;

/// Builder for `RawConfigFile` / `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                service: ServiceSection {
                    program: "fake-service".to_string(),
                    args: vec!["--token={token}".to_string(), "--port={port}".to_string()],
                    cwd: None,
                    port: 9988,
                    env: BTreeMap::new(),
                    ready_marker: Some("running at".to_string()),
                    ready_pattern: None,
                },
                credential: CredentialSection::default(),
                wait: WaitSection::default(),
                request: RequestSection {
                    method: HttpMethod::Put,
                    host: "127.0.0.1".to_string(),
                    path: "/api/contents/ci-local-writeout.ipynb".to_string(),
                    auth_scheme: "token".to_string(),
                    timeout: "30s".to_string(),
                    body: None,
                    body_file: None,
                },
            },
        }
    }

    pub fn program(mut self, program: &str) -> Self {
        self.config.service.program = program.to_string();
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.config.service.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.service.port = port;
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config
            .service
            .env
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn ready_marker(mut self, marker: &str) -> Self {
        self.config.service.ready_marker = Some(marker.to_string());
        self.config.service.ready_pattern = None;
        self
    }

    pub fn ready_pattern(mut self, pattern: &str) -> Self {
        self.config.service.ready_marker = None;
        self.config.service.ready_pattern = Some(pattern.to_string());
        self
    }

    pub fn token_bytes(mut self, bytes: usize) -> Self {
        self.config.credential.bytes = bytes;
        self
    }

    pub fn wait(mut self, interval: &str, checkpoints: u32) -> Self {
        self.config.wait.interval = interval.to_string();
        self.config.wait.checkpoints = checkpoints;
        self
    }

    pub fn request_path(mut self, path: &str) -> Self {
        self.config.request.path = path.to_string();
        self
    }

    pub fn request_timeout(mut self, timeout: &str) -> Self {
        self.config.request.timeout = timeout.to_string();
        self
    }

    pub fn body(mut self, table: toml::Table) -> Self {
        self.config.request.body = Some(table);
        self
    }

    pub fn body_file(mut self, path: &str) -> Self {
        self.config.request.body_file = Some(path.to_string());
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RunSettings` used by orchestration tests.
pub struct RunSettingsBuilder {
    settings: RunSettings,
}

impl RunSettingsBuilder {
    pub fn new() -> Self {
        Self {
            settings: RunSettings {
                token_bytes: 32,
                launch: LaunchTemplate {
                    program: "fake-service".to_string(),
                    args: vec!["--token={token}".to_string(), "--port={port}".to_string()],
                    cwd: None,
                    env: Vec::new(),
                    port: 9988,
                },
                marker: ReadinessMarker::Substring("running at".to_string()),
                wait: WaitPolicy::default(),
            },
        }
    }

    pub fn program(mut self, program: &str, args: &[&str]) -> Self {
        self.settings.launch.program = program.to_string();
        self.settings.launch.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn marker(mut self, marker: &str) -> Self {
        self.settings.marker = ReadinessMarker::Substring(marker.to_string());
        self
    }

    pub fn pattern(mut self, pattern: &str) -> Self {
        self.settings.marker =
            ReadinessMarker::Pattern(Regex::new(pattern).expect("valid test regex"));
        self
    }

    pub fn wait(mut self, interval: Duration, checkpoints: u32) -> Self {
        self.settings.wait = WaitPolicy::new(interval, checkpoints);
        self
    }

    pub fn token_bytes(mut self, bytes: usize) -> Self {
        self.settings.token_bytes = bytes;
        self
    }

    pub fn build(self) -> RunSettings {
        self.settings
    }
}

impl Default for RunSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
