//! # frankenstyle-registry
//!
//! Component discovery and cache engine.
//! Scans a plugin tree into a [`CacheSnapshot`], persists it as a cache
//! artifact, and answers component, plugin, class and file lookups through
//! [`ComponentRegistry`].

pub mod builder;
pub mod cache;
pub mod manifest;
pub mod registry;
pub mod runtime;
pub mod scanner;
pub mod snapshot;

pub use builder::RegistryBuilder;
pub use cache::CacheStore;
pub use registry::{normalize_component, normalize_componentname, ClassResolution, ComponentRegistry};
pub use runtime::{HostRuntime, NoopRuntime};
pub use scanner::PluginList;
pub use snapshot::CacheSnapshot;
