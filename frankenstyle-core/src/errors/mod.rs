//! Error enums for every layer, each mapped to a stable error code.

pub mod cache_error;
pub mod component_error;
pub mod config_error;
pub mod error_code;
pub mod manifest_error;

pub use cache_error::{CacheError, CacheResult};
pub use component_error::{ComponentError, ComponentResult};
pub use config_error::{ConfigError, ConfigResult};
pub use manifest_error::{ManifestError, ManifestResult};
