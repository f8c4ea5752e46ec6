//! Hooks into the host application's runtime.
//!
//! The registry only maps names to paths. Anything that executes or caches
//! compiled host code goes through [`HostRuntime`].

use std::path::Path;

/// Host callbacks invoked by the registry.
pub trait HostRuntime: Send + Sync {
    /// A cache artifact at `path` was replaced; drop any compiled copy of it.
    fn invalidate_compiled_cache(&self, _path: &Path) {}

    /// Load the host source file at `path`.
    fn include_file(&self, _path: &Path) {}
}

/// Runtime that ignores every hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRuntime;

impl HostRuntime for NoopRuntime {}
