//! Configuration validation.
//!
//! Checks the INI sections before any adapter is built, so startup fails with
//! a config error instead of a connection error.

use crate::domain::error::TrackerError;
use crate::ports::config_port::ConfigPort;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub const DEFAULT_BUSY_TIMEOUT_SECS: i64 = 120;
pub const MAX_BUSY_TIMEOUT_SECS: i64 = 3600;

/// Storage engine selected by `[database] backend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

pub fn validate_database_config(config: &dyn ConfigPort) -> Result<Backend, TrackerError> {
    let backend = backend(config)?;
    match backend {
        Backend::Sqlite => {
            require(config, "sqlite", "path")?;
            validate_pool_size(config, "sqlite")?;
            sqlite_busy_timeout(config)?;
        }
        Backend::Postgres => {
            require(config, "postgres", "connection_string")?;
            validate_pool_size(config, "postgres")?;
        }
    }
    Ok(backend)
}

pub fn validate_server_config(config: &dyn ConfigPort) -> Result<SocketAddr, TrackerError> {
    validate_database_config(config)?;
    validate_log_format(config)?;
    listen_addr(config)
}

pub fn backend(config: &dyn ConfigPort) -> Result<Backend, TrackerError> {
    let value = config.get_string_or("database", "backend", "sqlite");
    match value.trim().to_ascii_lowercase().as_str() {
        "sqlite" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(TrackerError::ConfigInvalid {
            section: "database".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{other}' (expected sqlite or postgres)"),
        }),
    }
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, TrackerError> {
    let value = config.get_string_or("web", "listen", DEFAULT_LISTEN);
    value
        .trim()
        .parse()
        .map_err(|_| TrackerError::ConfigInvalid {
            section: "web".to_string(),
            key: "listen".to_string(),
            reason: format!("'{value}' is not a socket address"),
        })
}

/// `[sqlite] busy_timeout` in seconds, `0..=3600`.
pub fn sqlite_busy_timeout(config: &dyn ConfigPort) -> Result<Duration, TrackerError> {
    let value = config.get_int("sqlite", "busy_timeout", DEFAULT_BUSY_TIMEOUT_SECS);
    if !(0..=MAX_BUSY_TIMEOUT_SECS).contains(&value) {
        return Err(TrackerError::ConfigInvalid {
            section: "sqlite".to_string(),
            key: "busy_timeout".to_string(),
            reason: format!("busy_timeout must be between 0 and {MAX_BUSY_TIMEOUT_SECS} seconds"),
        });
    }
    Ok(Duration::from_secs(value.unsigned_abs()))
}

fn require(config: &dyn ConfigPort, section: &str, key: &str) -> Result<String, TrackerError> {
    config
        .get_string(section, key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| TrackerError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn validate_pool_size(config: &dyn ConfigPort, section: &str) -> Result<(), TrackerError> {
    let value = config.get_int(section, "pool_size", 4);
    if !(1..=64).contains(&value) {
        return Err(TrackerError::ConfigInvalid {
            section: section.to_string(),
            key: "pool_size".to_string(),
            reason: "pool_size must be between 1 and 64".to_string(),
        });
    }
    Ok(())
}

fn validate_log_format(config: &dyn ConfigPort) -> Result<(), TrackerError> {
    let value = config.get_string_or("log", "format", "text");
    if !value.eq_ignore_ascii_case("text") && !value.eq_ignore_ascii_case("json") {
        return Err(TrackerError::ConfigInvalid {
            section: "log".to_string(),
            key: "format".to_string(),
            reason: "format must be text or json".to_string(),
        });
    }
    Ok(())
}
