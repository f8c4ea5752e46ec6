//! # frankenstyle-core
//!
//! Foundation crate for the Frankenstyle component registry.
//! Defines configuration, errors, tracing setup, collection aliases, and the
//! compiled-in component tables (core subsystems, plugin types, ignore lists).
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{AlternativeCachePolicy, ComponentConfig};
pub use errors::error_code::FrankenstyleErrorCode;
pub use types::collections::FxHashSet;
