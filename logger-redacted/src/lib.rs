//! Tracing setup for the symptom engine and its tooling.
//!
//! Free-text utterances are the only user data the engine sees. They are
//! routed through [`UtteranceRedactor::loggable`] before they reach a log
//! line, so log output can be shipped without carrying what a user typed.
//!
//! # Example
//!
//! ```rust
//! use logger_redacted::{LoggerConfig, UtteranceRedactor};
//!
//! let config = LoggerConfig::default();
//! let _ = logger_redacted::init_tracing(&config, false);
//!
//! let redactor = UtteranceRedactor::default();
//! tracing::info!(utterance = %redactor.loggable("I have a headache"), "🔍 Extracting symptoms");
//! ```

pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Errors raised while installing the subscriber
#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Global subscriber already installed")]
    AlreadyInitialized,
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. `verbose` forces `debug`
/// when `RUST_LOG` is unset.
pub fn init_tracing(config: &LoggerConfig, verbose: bool) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = if verbose { "debug" } else { config.log_level.as_str() };
            EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidFilter {
                directive: directive.to_string(),
                message: e.to_string(),
            })?
        }
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|_| LoggerError::AlreadyInitialized)
}

/// Redactor matching the logging configuration
pub fn redactor_for(config: &LoggerConfig) -> UtteranceRedactor {
    UtteranceRedactor::new(RedactionConfig {
        fingerprint_only: config.redact_utterances,
        ..RedactionConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        // Only meaningful when RUST_LOG is unset in the test environment
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggerConfig {
            log_level: "symptom_engine=loudest".to_string(),
            ..LoggerConfig::default()
        };
        let result = init_tracing(&config, false);
        assert!(matches!(result, Err(LoggerError::InvalidFilter { .. })));
    }

    #[test]
    fn test_redactor_for_follows_config() {
        let plain = redactor_for(&LoggerConfig {
            redact_utterances: false,
            ..LoggerConfig::default()
        });
        assert_eq!(plain.loggable("sore throat"), "sore throat");

        let hidden = redactor_for(&LoggerConfig::default());
        assert!(hidden.loggable("sore throat").starts_with("utt#"));
    }
}
