// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::credential::MIN_TOKEN_BYTES;
use crate::errors::{GateError, Result};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::GateError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(
            raw.service,
            raw.credential,
            raw.wait,
            raw.request,
        ))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_service(cfg)?;
    validate_readiness(cfg)?;
    validate_credential(cfg)?;
    validate_wait(cfg)?;
    validate_request(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> GateError {
    GateError::ConfigError(msg.into())
}

fn validate_service(cfg: &RawConfigFile) -> Result<()> {
    if cfg.service.program.trim().is_empty() {
        return Err(config_error("[service].program must not be empty"));
    }
    if cfg.service.port == 0 {
        return Err(config_error("[service].port must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_readiness(cfg: &RawConfigFile) -> Result<()> {
    match (&cfg.service.ready_marker, &cfg.service.ready_pattern) {
        (Some(_), Some(_)) => Err(config_error(
            "[service] sets both ready_marker and ready_pattern; pick one",
        )),
        (None, None) => Err(config_error(
            "[service] needs a ready_marker (substring) or ready_pattern (regex)",
        )),
        (Some(marker), None) => {
            if marker.is_empty() {
                return Err(config_error("[service].ready_marker must not be empty"));
            }
            Ok(())
        }
        (None, Some(pattern)) => match Regex::new(pattern) {
            Ok(_) => Ok(()),
            Err(e) => Err(config_error(format!(
                "[service].ready_pattern '{pattern}' is not a valid regex: {e}"
            ))),
        },
    }
}

fn validate_credential(cfg: &RawConfigFile) -> Result<()> {
    if cfg.credential.bytes < MIN_TOKEN_BYTES {
        return Err(config_error(format!(
            "[credential].bytes must be >= {MIN_TOKEN_BYTES} (got {})",
            cfg.credential.bytes
        )));
    }
    Ok(())
}

fn validate_wait(cfg: &RawConfigFile) -> Result<()> {
    let interval = parse_duration(&cfg.wait.interval)
        .map_err(|e| config_error(format!("[wait].interval: {e}")))?;
    if interval.is_zero() {
        return Err(config_error("[wait].interval must be greater than zero"));
    }
    if cfg.wait.checkpoints == 0 {
        return Err(config_error("[wait].checkpoints must be >= 1 (got 0)"));
    }
    Ok(())
}

fn validate_request(cfg: &RawConfigFile) -> Result<()> {
    let request = &cfg.request;

    if !request.path.starts_with('/') {
        return Err(config_error(format!(
            "[request].path must start with '/' (got '{}')",
            request.path
        )));
    }

    if request.host.trim().is_empty() {
        return Err(config_error("[request].host must not be empty"));
    }

    if request.auth_scheme.is_empty() || request.auth_scheme.contains(char::is_whitespace) {
        return Err(config_error(format!(
            "[request].auth_scheme must be a single word (got '{}')",
            request.auth_scheme
        )));
    }

    let timeout = parse_duration(&request.timeout)
        .map_err(|e| config_error(format!("[request].timeout: {e}")))?;
    if timeout.is_zero() {
        return Err(config_error("[request].timeout must be greater than zero"));
    }

    if request.body.is_some() && request.body_file.is_some() {
        return Err(config_error(
            "[request] sets both body and body_file; pick one",
        ));
    }

    Ok(())
}
