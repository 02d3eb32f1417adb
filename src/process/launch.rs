// src/process/launch.rs

use std::path::PathBuf;

/// Placeholder replaced with the run's token.
pub const TOKEN_PLACEHOLDER: &str = "{token}";

/// Placeholder replaced with the configured listening port.
pub const PORT_PLACEHOLDER: &str = "{port}";

/// Shown instead of the secret in logs and dry-run output.
const REDACTED_TOKEN: &str = "<token>";

/// Command as configured, before the token exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTemplate {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub port: u16,
}

/// Fully resolved command handed to a [`crate::process::ProcessBackend`].
#[derive(Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl LaunchTemplate {
    /// Substitute the token and port into args and env values.
    pub fn render(&self, token: &str) -> LaunchSpec {
        LaunchSpec {
            program: self.program.clone(),
            args: self.args.iter().map(|a| self.substitute(a, token)).collect(),
            cwd: self.cwd.clone(),
            env: self
                .env
                .iter()
                .map(|(k, v)| (k.clone(), self.substitute(v, token)))
                .collect(),
        }
    }

    /// Same as [`render`](Self::render) with the token masked; safe to log.
    pub fn preview(&self) -> LaunchSpec {
        self.render(REDACTED_TOKEN)
    }

    fn substitute(&self, value: &str, token: &str) -> String {
        value
            .replace(TOKEN_PLACEHOLDER, token)
            .replace(PORT_PLACEHOLDER, &self.port.to_string())
    }
}

// Args and env values may carry the rendered token.
impl std::fmt::Debug for LaunchSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunchSpec")
            .field("program", &self.program)
            .field("args", &self.args.len())
            .field("cwd", &self.cwd)
            .field("env", &self.env.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}
