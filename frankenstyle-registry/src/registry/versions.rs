//! Digest over the versions of core and every installed plugin.

use frankenstyle_core::constants::VERSION_FILE;
use frankenstyle_core::errors::{CacheError, ComponentResult};
use tracing::debug;

use super::ComponentRegistry;
use crate::builder::RegistryBuilder;
use crate::cache::hash_bytes;
use crate::manifest;

impl ComponentRegistry {
    /// Hash of `core` plus every `type_plugin` version, in plugin type order.
    ///
    /// Plugin lists are rescanned from disk unless caching is disabled, so
    /// the hash notices plugins added since the snapshot was built. Slow; not
    /// for hot paths.
    pub fn get_all_versions_hash(&self) -> ComponentResult<String> {
        let snapshot = self.current()?;
        let builder = RegistryBuilder::new(&self.config);
        let use_cache = self.config.effective_cache_disable_all()
            || self.config.effective_ignore_component_cache();

        let mut versions: Vec<(String, Option<f64>)> = vec![("core".to_string(), builder.core_version())];
        for (plugintype, typedir) in &snapshot.plugintypes {
            let rescanned;
            let plugins = if use_cache {
                match snapshot.plugins.get(plugintype) {
                    Some(plugins) => plugins,
                    None => continue,
                }
            } else {
                rescanned = builder.fetch_plugins(plugintype, typedir);
                &rescanned
            };

            for (plugin, fulldir) in plugins {
                let path = fulldir.join(VERSION_FILE);
                let version = manifest::read_plugin_version(&path).unwrap_or_else(|e| {
                    debug!(error = %e, "plugin version unavailable");
                    None
                });
                versions.push((format!("{plugintype}_{plugin}"), version));
            }
        }

        let bytes = serde_json::to_vec(&versions).map_err(CacheError::from)?;
        Ok(hash_bytes(&bytes))
    }
}
