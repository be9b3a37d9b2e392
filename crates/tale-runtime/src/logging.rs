#![forbid(unsafe_code)]

//! Logging bootstrap.
//!
//! Library code only emits `tracing` events. Hosts that want them printed
//! call [`init`] once at startup (requires the `tracing-json` feature).

use std::fmt;

use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;

/// Failure to install the global subscriber.
#[derive(Debug)]
pub enum LoggingError {
    /// The filter directive did not parse.
    Filter(String),
    /// A global subscriber is already installed.
    AlreadyInstalled(String),
}

impl fmt::Display for LoggingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggingError::Filter(msg) => write!(f, "invalid log filter: {msg}"),
            LoggingError::AlreadyInstalled(msg) => write!(f, "subscriber already set: {msg}"),
        }
    }
}

impl std::error::Error for LoggingError {}

/// Install a global subscriber honoring `log_filter` and `log_json`.
pub fn init(config: &RuntimeConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| LoggingError::Filter(e.to_string()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let result = if config.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))?;
    tracing::debug!(filter = %config.log_filter, json = config.log_json, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = LoggingError::Filter("bad directive".into());
        assert_eq!(err.to_string(), "invalid log filter: bad directive");
    }
}
