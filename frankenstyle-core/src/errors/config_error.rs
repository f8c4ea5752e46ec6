//! Configuration errors.

use super::error_code::{self, FrankenstyleErrorCode};

/// Errors raised while reading or validating [`crate::ComponentConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {message}")]
    Read { path: String, message: String },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration is missing `dirroot`")]
    MissingDirroot,

    #[error("Invalid value for `{field}`: {message}")]
    InvalidValue { field: String, message: String },
}

impl FrankenstyleErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => error_code::CONFIG_PARSE_ERROR,
            Self::MissingDirroot => error_code::CONFIG_MISSING_DIRROOT,
            _ => error_code::CONFIG_ERROR,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
