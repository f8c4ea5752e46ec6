//! Errors surfaced by the registry query API.
//!
//! "Not found" is never an error; lookups return `None` or an empty map.

use super::error_code::{self, FrankenstyleErrorCode};
use super::{CacheError, ConfigError};

#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Cannot alias {old} to {new}")]
    InvalidAlias { old: String, new: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl FrankenstyleErrorCode for ComponentError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cache(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::InvalidAlias { .. } => error_code::INVALID_ALIAS,
            Self::InvalidArgument { .. } => error_code::INVALID_ARGUMENT,
        }
    }
}

pub type ComponentResult<T> = Result<T, ComponentError>;
