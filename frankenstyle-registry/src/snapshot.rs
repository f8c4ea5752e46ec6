//! The registry snapshot: everything one build discovers, persisted as a unit.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::scanner::PluginList;

/// Complete registry state.
///
/// Ordered containers keep the serialized form canonical: plugin lists and
/// class maps are sorted by name, type tables keep discovery order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CacheSnapshot {
    /// Core subsystem → directory, `None` for symbolic subsystems.
    pub subsystems: IndexMap<String, Option<PathBuf>>,
    /// Plugin type → root directory, in discovery order (`local` last among
    /// the standard types).
    pub plugintypes: IndexMap<String, PathBuf>,
    /// Plugin type → plugin name → plugin directory.
    pub plugins: IndexMap<String, PluginList>,
    /// Subplugin type → owning component.
    pub parents: IndexMap<String, String>,
    /// Owning component → subplugin type → plugin names.
    pub subplugins: IndexMap<String, IndexMap<String, Vec<String>>>,
    /// Class name → defining file.
    pub classmap: BTreeMap<String, PathBuf>,
    /// Deprecated class name → replacement class name.
    pub classmaprenames: BTreeMap<String, String>,
    /// Whitelisted file → plugin type → plugin name → file path.
    pub filemap: IndexMap<String, IndexMap<String, PluginList>>,
    /// Site version at build time.
    pub version: Option<f64>,
    /// PSR-0 class name → defining file.
    pub psrclassmap: BTreeMap<String, PathBuf>,
}

impl CacheSnapshot {
    /// Root directory of a plugin type.
    pub fn plugintype_root(&self, plugintype: &str) -> Option<&Path> {
        self.plugintypes.get(plugintype).map(PathBuf::as_path)
    }

    /// Total number of plugins across all types.
    pub fn plugin_count(&self) -> usize {
        self.plugins.values().map(BTreeMap::len).sum()
    }
}
