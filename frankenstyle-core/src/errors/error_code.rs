//! Stable error codes exposed to callers and tooling.

/// Maps an error variant to a stable, machine-readable code.
pub trait FrankenstyleErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CONFIG_PARSE_ERROR: &str = "CONFIG_PARSE_ERROR";
pub const CONFIG_MISSING_DIRROOT: &str = "CONFIG_MISSING_DIRROOT";
pub const CACHE_IO_ERROR: &str = "CACHE_IO_ERROR";
pub const CACHE_CORRUPT: &str = "CACHE_CORRUPT";
pub const CACHE_SERIALIZE_ERROR: &str = "CACHE_SERIALIZE_ERROR";
pub const ALTERNATIVE_CACHE_OUTDATED: &str = "ALTERNATIVE_CACHE_OUTDATED";
pub const ALTERNATIVE_CACHE_UNWRITABLE: &str = "ALTERNATIVE_CACHE_UNWRITABLE";
pub const MANIFEST_IO_ERROR: &str = "MANIFEST_IO_ERROR";
pub const MANIFEST_PARSE_ERROR: &str = "MANIFEST_PARSE_ERROR";
pub const INVALID_ALIAS: &str = "INVALID_ALIAS";
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";
