// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! `GateError` covers everything that aborts a run *before* there is a
//! supervised process to tear down (config, entropy, launch). Failures after
//! launch are expressed as [`crate::engine::RunOutcome`] variants instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Entropy source unavailable: {0}")]
    EntropySource(#[from] rand::Error),

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GateError>;
