//! Errors reading per-component manifest files.
//! These are always logged and skipped by the builder, never surfaced.

use super::error_code::{self, FrankenstyleErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest {path}: {details}")]
    Parse { path: String, details: String },
}

impl FrankenstyleErrorCode for ManifestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::MANIFEST_IO_ERROR,
            Self::Parse { .. } => error_code::MANIFEST_PARSE_ERROR,
        }
    }
}

pub type ManifestResult<T> = Result<T, ManifestError>;
