// src/request/payload.rs

use std::fs;
use std::path::PathBuf;

use crate::errors::Result;

/// Where the gated request's body comes from.
///
/// The body's content is opaque to readygate; it is only loaded and sent.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadSource {
    /// No body.
    Empty,
    /// Inline `[request.body]` table from the config.
    Inline(toml::Table),
    /// JSON file on disk.
    File(PathBuf),
}

impl PayloadSource {
    /// Load the body as JSON. `None` for [`PayloadSource::Empty`].
    pub fn load(&self) -> Result<Option<serde_json::Value>> {
        match self {
            PayloadSource::Empty => Ok(None),
            PayloadSource::Inline(table) => Ok(Some(serde_json::to_value(table)?)),
            PayloadSource::File(path) => {
                let contents = fs::read_to_string(path)?;
                Ok(Some(serde_json::from_str(&contents)?))
            }
        }
    }
}
