//! Subcommand implementations. Each returns the text to print.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use frankenstyle_core::config::CONFIG_FILE_NAME;
use frankenstyle_core::ComponentConfig;
use frankenstyle_registry::cache::{content_hash, hash_bytes, render};
use frankenstyle_registry::{
    CacheStore, ClassResolution, ComponentRegistry, NoopRuntime, RegistryBuilder,
};
use tracing::info;

/// Resolve the configuration: an explicit file, else `frankenstyle.toml` in
/// the site root (or the working directory), else defaults for the site root.
pub fn load_config(config: Option<&Path>, dirroot: Option<&Path>) -> anyhow::Result<ComponentConfig> {
    let root = match dirroot {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };
    let candidate = match config {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };

    let mut loaded = match candidate {
        Some(path) => ComponentConfig::load(&path)
            .with_context(|| format!("cannot load configuration from {}", path.display()))?,
        None => ComponentConfig::for_dirroot(&root),
    };
    if dirroot.is_some() {
        loaded.dirroot = Some(root);
    }
    loaded.validate()?;
    Ok(loaded)
}

fn alternative_path(config: &ComponentConfig, explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| config.alternative_component_cache.clone())
        .context("no cache file given: pass a path or set alternative_component_cache")
}

/// Write a fresh artifact to the alternative cache path.
pub fn build(config: &ComponentConfig, output: Option<&Path>) -> anyhow::Result<String> {
    let target = alternative_path(config, output)?;
    let snapshot = RegistryBuilder::new(config).build();
    let bytes = render(&snapshot)?;
    let digest = hash_bytes(&bytes);

    if let Some(dir) = target.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    }
    let store = CacheStore::new(&target);
    store.save_bytes(&bytes, &NoopRuntime)?;
    if store.file_hash().as_deref() != Some(digest.as_str()) {
        bail!(
            "{} was not updated, another writer holds {}.tmp",
            target.display(),
            target.display()
        );
    }

    info!(path = %target.display(), plugins = snapshot.plugin_count(), "alternative component cache written");
    Ok(format!("{}\t{digest}\n", target.display()))
}

/// Compare the alternative cache file with a fresh scan.
pub fn verify(config: &ComponentConfig, file: Option<&Path>) -> anyhow::Result<String> {
    let target = alternative_path(config, file)?;
    let store = CacheStore::new(&target);
    let Some(actual) = store.file_hash() else {
        bail!("{} does not exist", target.display());
    };
    let expected = content_hash(&RegistryBuilder::new(config).build())?;
    if actual != expected {
        bail!("{} is outdated", target.display());
    }
    Ok(format!("{}\tup to date\n", target.display()))
}

/// Plugin types, or the plugins of one type.
pub fn list(config: &ComponentConfig, plugintype: Option<&str>, json: bool) -> anyhow::Result<String> {
    let registry = ComponentRegistry::new(config.clone());
    match plugintype {
        Some(plugintype) => {
            let plugins = registry.get_plugin_list(plugintype)?;
            render_entries(plugins.iter(), json)
        }
        // Types are printed in discovery order.
        None => {
            let types = registry.get_plugin_types()?;
            render_entries(types.iter(), json)
        }
    }
}

fn render_entries<'a>(
    entries: impl Iterator<Item = (&'a String, &'a PathBuf)>,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .map(|(name, path)| (name.clone(), serde_json::Value::String(path.display().to_string())))
            .collect();
        let mut out = serde_json::to_string_pretty(&map)?;
        out.push('\n');
        return Ok(out);
    }
    let mut out = String::new();
    for (name, path) in entries {
        writeln!(out, "{name}\t{}", path.display())?;
    }
    Ok(out)
}

pub fn resolve(config: &ComponentConfig, classname: &str) -> anyhow::Result<String> {
    let registry = ComponentRegistry::new(config.clone());
    match registry.resolve_class(classname)? {
        Some(ClassResolution::File(path)) => Ok(format!("{}\n", path.display())),
        Some(ClassResolution::Psr(path)) => Ok(format!("{}\tpsr-0\n", path.display())),
        Some(ClassResolution::Alias { old, new, path }) => {
            Ok(format!("{}\talias {old} -> {new}\n", path.display()))
        }
        None => bail!("class {classname} not found"),
    }
}

pub fn component(config: &ComponentConfig, name: &str) -> anyhow::Result<String> {
    let registry = ComponentRegistry::new(config.clone());
    let normalized = registry.normalize_componentname(name);
    let directory = registry
        .get_component_directory(name)?
        .map_or_else(|| "-".to_string(), |dir| dir.display().to_string());
    Ok(format!("{normalized}\t{directory}\n"))
}

pub fn versions_hash(config: &ComponentConfig) -> anyhow::Result<String> {
    let registry = ComponentRegistry::new(config.clone());
    Ok(format!("{}\n", registry.get_all_versions_hash()?))
}
