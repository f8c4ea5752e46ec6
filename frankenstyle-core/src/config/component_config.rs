//! Component registry configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};

/// Conventional configuration file name at the site root.
pub const CONFIG_FILE_NAME: &str = "frankenstyle.toml";

/// What to do when the administrator-managed cache artifact cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AlternativeCachePolicy {
    /// Refuse to initialize the registry.
    #[default]
    Strict,
    /// Log a warning and continue with a fresh in-memory snapshot.
    Warn,
}

/// Configuration for the component registry.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ComponentConfig {
    /// Site root every subsystem and plugin type directory is derived from.
    pub dirroot: Option<PathBuf>,
    /// Core library directory. Default: `<dirroot>/lib`.
    pub libdir: Option<PathBuf>,
    /// Admin directory name below `dirroot`. Default: "admin".
    pub admin: Option<String>,
    /// Alternative theme directory. Used only if it exists.
    pub themedir: Option<PathBuf>,
    /// Cache directory shared by every worker. Default: `<dirroot>/.cache`.
    pub cachedir: Option<PathBuf>,
    /// Administrator-managed, immutable cache artifact.
    pub alternative_component_cache: Option<PathBuf>,
    /// Behaviour when the alternative artifact is outdated or cannot be created.
    pub alternative_cache_policy: Option<AlternativeCachePolicy>,
    /// Developer mode: never trust the cache artifact. Default: false.
    pub developer_mode: Option<bool>,
    /// Install/upgrade mode: never read the cache artifact. Default: false.
    pub cache_disable_all: Option<bool>,
    /// Build in memory only, never touch the cache artifact. Default: false.
    pub ignore_component_cache: Option<bool>,
}

impl ComponentConfig {
    /// Config rooted at `dirroot` with every other field defaulted.
    pub fn for_dirroot(dirroot: impl Into<PathBuf>) -> Self {
        Self {
            dirroot: Some(dirroot.into()),
            ..Default::default()
        }
    }

    /// Parse a TOML document.
    pub fn from_toml(raw: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file. A relative `dirroot` is resolved against the
    /// file's directory.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config: Self = toml::from_str(&raw)?;
        if let Some(base) = path.parent() {
            config.dirroot = Some(match config.dirroot.take() {
                Some(dir) if dir.is_relative() => base.join(dir),
                Some(dir) => dir,
                None => base.to_path_buf(),
            });
        }
        config.validate()?;
        debug!(
            path = %path.display(),
            dirroot = ?config.dirroot,
            "component configuration loaded"
        );
        Ok(config)
    }

    /// Check the fields that have no sensible default.
    pub fn validate(&self) -> ConfigResult<()> {
        match &self.dirroot {
            None => Err(ConfigError::MissingDirroot),
            Some(dir) if dir.as_os_str().is_empty() => Err(ConfigError::MissingDirroot),
            Some(_) => {
                if let Some(admin) = &self.admin {
                    if admin.is_empty() || admin.contains(['/', '\\']) {
                        return Err(ConfigError::InvalidValue {
                            field: "admin".to_string(),
                            message: format!("'{admin}' is not a single directory name"),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Returns the site root. Falls back to "." when unset.
    pub fn effective_dirroot(&self) -> PathBuf {
        self.dirroot.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Returns the library directory, defaulting to `<dirroot>/lib`.
    pub fn effective_libdir(&self) -> PathBuf {
        self.libdir
            .clone()
            .unwrap_or_else(|| self.effective_dirroot().join("lib"))
    }

    /// Returns the admin directory name, defaulting to "admin".
    pub fn effective_admin(&self) -> &str {
        self.admin.as_deref().unwrap_or("admin")
    }

    /// Returns the cache directory, defaulting to `<dirroot>/.cache`.
    pub fn effective_cachedir(&self) -> PathBuf {
        self.cachedir
            .clone()
            .unwrap_or_else(|| self.effective_dirroot().join(".cache"))
    }

    /// Returns the alternative cache policy, defaulting to strict.
    pub fn effective_alternative_cache_policy(&self) -> AlternativeCachePolicy {
        self.alternative_cache_policy.unwrap_or_default()
    }

    /// Returns whether developer mode is on, defaulting to false.
    pub fn effective_developer_mode(&self) -> bool {
        self.developer_mode.unwrap_or(false)
    }

    /// Returns whether all caches are disabled, defaulting to false.
    pub fn effective_cache_disable_all(&self) -> bool {
        self.cache_disable_all.unwrap_or(false)
    }

    /// Returns whether the component cache is bypassed, defaulting to false.
    pub fn effective_ignore_component_cache(&self) -> bool {
        self.ignore_component_cache.unwrap_or(false)
    }

    /// The custom theme directory, only when configured and present on disk.
    pub fn existing_themedir(&self) -> Option<&Path> {
        self.themedir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty() && dir.is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_derive_from_dirroot() {
        let config = ComponentConfig::for_dirroot("/srv/site");
        assert_eq!(config.effective_libdir(), PathBuf::from("/srv/site/lib"));
        assert_eq!(config.effective_cachedir(), PathBuf::from("/srv/site/.cache"));
        assert_eq!(config.effective_admin(), "admin");
        assert_eq!(
            config.effective_alternative_cache_policy(),
            AlternativeCachePolicy::Strict
        );
        assert!(!config.effective_developer_mode());
        assert!(!config.effective_cache_disable_all());
        assert!(!config.effective_ignore_component_cache());
    }

    #[test]
    fn parses_toml() {
        let config = ComponentConfig::from_toml(
            r#"
dirroot = "/srv/site"
admin = "siteadmin"
alternative_component_cache = "/var/cache/site/components.json"
alternative_cache_policy = "warn"
developer_mode = true
"#,
        )
        .unwrap();
        assert_eq!(config.effective_admin(), "siteadmin");
        assert_eq!(
            config.effective_alternative_cache_policy(),
            AlternativeCachePolicy::Warn
        );
        assert!(config.effective_developer_mode());
    }

    #[test]
    fn missing_dirroot_is_rejected() {
        let err = ComponentConfig::from_toml("admin = \"admin\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingDirroot));
    }

    #[test]
    fn nested_admin_is_rejected() {
        let err = ComponentConfig::from_toml("dirroot = \"/srv\"\nadmin = \"a/b\"").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_resolves_relative_dirroot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "dirroot = \"site\"\n").unwrap();
        let config = ComponentConfig::load(&path).unwrap();
        assert_eq!(config.effective_dirroot(), dir.path().join("site"));

        std::fs::write(&path, "developer_mode = false\n").unwrap();
        let config = ComponentConfig::load(&path).unwrap();
        assert_eq!(config.effective_dirroot(), dir.path());
    }

    #[test]
    fn themedir_only_used_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ComponentConfig::for_dirroot(dir.path());
        config.themedir = Some(dir.path().join("missing"));
        assert!(config.existing_themedir().is_none());
        config.themedir = Some(dir.path().to_path_buf());
        assert_eq!(config.existing_themedir(), Some(dir.path()));
    }
}
