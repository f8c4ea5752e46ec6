//! Configuration for the component registry.

pub mod component_config;

pub use component_config::{AlternativeCachePolicy, ComponentConfig, CONFIG_FILE_NAME};
