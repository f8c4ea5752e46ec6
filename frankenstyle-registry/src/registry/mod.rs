//! `ComponentRegistry`: lazily initialized, read-only component queries.
//!
//! The first query runs the load-or-build protocol; every later query is an
//! in-memory lookup on the shared snapshot until [`ComponentRegistry::reset`].

mod init;
pub mod normalize;
mod resolve;
mod versions;

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use frankenstyle_core::constants::SUBPLUGIN_CAPABLE_TYPES;
use frankenstyle_core::errors::{CacheResult, ComponentResult};
use frankenstyle_core::ComponentConfig;
use indexmap::IndexMap;

pub use normalize::{normalize_component, normalize_componentname};
pub use resolve::ClassResolution;

use crate::builder::RegistryBuilder;
use crate::cache::render;
use crate::runtime::{HostRuntime, NoopRuntime};
use crate::scanner::{self, PluginList};
use crate::snapshot::CacheSnapshot;

/// Component registry for one site.
pub struct ComponentRegistry {
    config: ComponentConfig,
    runtime: Arc<dyn HostRuntime>,
    state: RwLock<Option<Arc<CacheSnapshot>>>,
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("dirroot", &self.config.effective_dirroot())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new(config: ComponentConfig) -> Self {
        Self::with_runtime(config, Arc::new(NoopRuntime))
    }

    pub fn with_runtime(config: ComponentConfig, runtime: Arc<dyn HostRuntime>) -> Self {
        Self {
            config,
            runtime,
            state: RwLock::new(None),
        }
    }

    /// Registry for the site described by a TOML configuration file.
    pub fn from_config_file(path: &Path) -> ComponentResult<Self> {
        Ok(Self::new(ComponentConfig::load(path)?))
    }

    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Load or build the snapshot. No-op once initialized.
    pub fn initialize(&self) -> CacheResult<()> {
        self.current().map(|_| ())
    }

    pub fn is_initialized(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the snapshot; the next query initializes again.
    pub fn reset(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Shared handle to the current snapshot.
    pub fn snapshot(&self) -> ComponentResult<Arc<CacheSnapshot>> {
        Ok(self.current()?)
    }

    fn current(&self) -> CacheResult<Arc<CacheSnapshot>> {
        if let Some(snapshot) = self
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(snapshot));
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(snapshot) = state.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        let snapshot = Arc::new(self.load_or_build()?);
        *state = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// Canonical artifact bytes of the current snapshot, for admin tooling
    /// that maintains an alternative cache file.
    ///
    /// An uninitialized registry is filled by a fresh build, bypassing any
    /// cache artifact.
    pub fn get_cache_content(&self) -> ComponentResult<Vec<u8>> {
        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            match state.as_ref() {
                Some(snapshot) => Arc::clone(snapshot),
                None => {
                    let snapshot = Arc::new(RegistryBuilder::new(&self.config).build());
                    *state = Some(Arc::clone(&snapshot));
                    snapshot
                }
            }
        };
        Ok(render(&snapshot)?)
    }

    pub fn get_core_subsystems(&self) -> ComponentResult<IndexMap<String, Option<PathBuf>>> {
        Ok(self.current()?.subsystems.clone())
    }

    pub fn get_plugin_types(&self) -> ComponentResult<IndexMap<String, PathBuf>> {
        Ok(self.current()?.plugintypes.clone())
    }

    /// Plugins of one type, empty for an unknown type.
    pub fn get_plugin_list(&self, plugintype: &str) -> ComponentResult<PluginList> {
        Ok(self
            .current()?
            .plugins
            .get(plugintype)
            .cloned()
            .unwrap_or_default())
    }

    pub fn get_plugin_directory(&self, plugintype: &str, pluginname: &str) -> ComponentResult<Option<PathBuf>> {
        if pluginname.is_empty() {
            return Ok(None);
        }
        Ok(self
            .current()?
            .plugins
            .get(plugintype)
            .and_then(|plugins| plugins.get(pluginname))
            .cloned())
    }

    /// Directory of a core subsystem. `None` for unknown and for symbolic
    /// subsystems alike.
    pub fn get_subsystem_directory(&self, subsystem: &str) -> ComponentResult<Option<PathBuf>> {
        Ok(self
            .current()?
            .subsystems
            .get(subsystem)
            .cloned()
            .flatten())
    }

    pub fn normalize_component(&self, component: &str) -> (String, Option<String>) {
        normalize_component(component)
    }

    pub fn normalize_componentname(&self, component: &str) -> String {
        normalize_componentname(component)
    }

    /// Directory of any component. Core itself maps to the library directory.
    pub fn get_component_directory(&self, component: &str) -> ComponentResult<Option<PathBuf>> {
        match normalize_component(component) {
            (plugintype, None) if plugintype == "core" => Ok(Some(self.config.effective_libdir())),
            (plugintype, Some(subsystem)) if plugintype == "core" => {
                self.get_subsystem_directory(&subsystem)
            }
            (plugintype, plugin) => {
                self.get_plugin_directory(&plugintype, plugin.as_deref().unwrap_or_default())
            }
        }
    }

    /// Subplugin-capable plugin types with their directories.
    pub fn get_plugin_types_with_subplugins(&self) -> ComponentResult<IndexMap<String, PathBuf>> {
        let snapshot = self.current()?;
        Ok(SUBPLUGIN_CAPABLE_TYPES
            .iter()
            .filter_map(|plugintype| {
                snapshot
                    .plugintypes
                    .get(*plugintype)
                    .map(|dir| ((*plugintype).to_string(), dir.clone()))
            })
            .collect())
    }

    /// Owning component of a subplugin type.
    pub fn get_subtype_parent(&self, subtype: &str) -> ComponentResult<Option<String>> {
        Ok(self.current()?.parents.get(subtype).cloned())
    }

    /// Subplugin types declared by `component` with their plugin names.
    /// `None` when the component declares none.
    pub fn get_subplugins(&self, component: &str) -> ComponentResult<Option<IndexMap<String, Vec<String>>>> {
        Ok(self.current()?.subplugins.get(component).cloned())
    }

    pub fn is_valid_plugin_name(&self, plugintype: &str, pluginname: &str) -> bool {
        scanner::is_valid_plugin_name(plugintype, pluginname)
    }

    pub fn is_core_subsystem(&self, name: &str) -> bool {
        frankenstyle_core::constants::is_core_subsystem(name)
    }
}
