//! Cache artifact errors.
//!
//! Everything except the two `AlternativeCache*` variants degrades to an
//! in-memory rebuild. Those two are hard stops for initialization.

use super::error_code::{self, FrankenstyleErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache artifact {path} is corrupt: {details}")]
    Corrupt { path: String, details: String },

    #[error("Failed to serialize cache snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Outdated component cache file {path} defined as alternative_component_cache, can not continue")]
    AlternativeCacheOutdated { path: String },

    #[error("Can not create alternative component cache file {path}, can not continue")]
    AlternativeCacheUnwritable { path: String },
}

impl CacheError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Whether this error must stop initialization.
    pub fn is_hard_stop(&self) -> bool {
        matches!(
            self,
            Self::AlternativeCacheOutdated { .. } | Self::AlternativeCacheUnwritable { .. }
        )
    }
}

impl FrankenstyleErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => error_code::CACHE_IO_ERROR,
            Self::Corrupt { .. } => error_code::CACHE_CORRUPT,
            Self::Serialize(_) => error_code::CACHE_SERIALIZE_ERROR,
            Self::AlternativeCacheOutdated { .. } => error_code::ALTERNATIVE_CACHE_OUTDATED,
            Self::AlternativeCacheUnwritable { .. } => error_code::ALTERNATIVE_CACHE_UNWRITABLE,
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
