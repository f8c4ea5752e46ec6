//! Load-or-build protocol run once per registry lifetime.

use std::fs;

use frankenstyle_core::constants::CACHE_FILE_NAME;
use frankenstyle_core::errors::{CacheError, CacheResult};
use frankenstyle_core::AlternativeCachePolicy;
use tracing::{debug, error, info, warn};

use super::ComponentRegistry;
use crate::builder::RegistryBuilder;
use crate::cache::{content_hash, hash_bytes, render, staleness, CacheStore, StaleReason};
use crate::snapshot::CacheSnapshot;

impl ComponentRegistry {
    pub(super) fn load_or_build(&self) -> CacheResult<CacheSnapshot> {
        let config = &self.config;
        let builder = RegistryBuilder::new(config);
        let cache_disable_all = config.effective_cache_disable_all();

        if config.effective_ignore_component_cache() {
            debug!("component cache ignored, building in memory");
            return Ok(builder.build());
        }

        let store = match &config.alternative_component_cache {
            Some(path) => {
                let store = CacheStore::new(path);
                if store.exists() {
                    return self.use_alternative_cache(&store, &builder, cache_disable_all);
                }
                if !store.is_writable_location() {
                    self.alternative_cache_failure(CacheError::AlternativeCacheUnwritable {
                        path: store.path().display().to_string(),
                    })?;
                    return Ok(builder.build());
                }
                store
            }
            None => CacheStore::new(config.effective_cachedir().join(CACHE_FILE_NAME)),
        };

        if !cache_disable_all && !config.effective_developer_mode() {
            if let Some(cached) = store.load() {
                match staleness(&cached, builder.core_version(), builder.dirroot()) {
                    None => {
                        debug!(path = %store.path().display(), "component cache loaded");
                        return Ok(cached);
                    }
                    Some(StaleReason::VersionChanged { current, .. }) => {
                        error!(
                            version = ?current,
                            "Resetting component cache after core upgrade to version {}",
                            current.map_or_else(|| "unknown".to_string(), |v| v.to_string())
                        );
                    }
                    Some(StaleReason::DirrootMoved) => {}
                }
            }
        }

        let fresh = builder.build();
        self.persist(&store, &fresh);
        Ok(fresh)
    }

    /// The alternative artifact exists: it is authoritative, except on
    /// upgrade runs where it must match a fresh build byte for byte.
    fn use_alternative_cache(
        &self,
        store: &CacheStore,
        builder: &RegistryBuilder<'_>,
        cache_disable_all: bool,
    ) -> CacheResult<CacheSnapshot> {
        if cache_disable_all {
            let fresh = builder.build();
            let expected = content_hash(&fresh)?;
            if store.file_hash().as_deref() != Some(expected.as_str()) {
                self.alternative_cache_failure(CacheError::AlternativeCacheOutdated {
                    path: store.path().display().to_string(),
                })?;
            }
            return Ok(fresh);
        }

        match store.try_load() {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                error!(error = %e, "alternative component cache unreadable, building in memory");
                Ok(builder.build())
            }
        }
    }

    fn alternative_cache_failure(&self, err: CacheError) -> CacheResult<()> {
        match self.config.effective_alternative_cache_policy() {
            AlternativeCachePolicy::Strict => Err(err),
            AlternativeCachePolicy::Warn => {
                warn!(error = %err, "continuing with an in-memory component registry");
                Ok(())
            }
        }
    }

    /// Write `fresh` unless an identical artifact is already there.
    /// Failures are logged; the in-memory snapshot is still used.
    fn persist(&self, store: &CacheStore, fresh: &CacheSnapshot) {
        let bytes = match render(fresh) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "cannot render component cache");
                return;
            }
        };

        if store.exists() {
            if store.file_hash().as_deref() == Some(hash_bytes(&bytes).as_str()) {
                return;
            }
            info!(path = %store.path().display(), "stale component cache detected");
            if let Err(e) = store.remove() {
                warn!(error = %e, "cannot remove stale component cache");
            }
        }

        if let Some(dir) = store.path().parent() {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!(dir = %dir.display(), error = %e, "cannot create component cache directory");
                return;
            }
        }
        if let Err(e) = store.save_bytes(&bytes, self.runtime.as_ref()) {
            warn!(error = %e, "cannot write component cache");
        }
    }
}
