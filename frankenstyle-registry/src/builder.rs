//! Registry builder: one full scan of the site tree into a [`CacheSnapshot`].
//!
//! The build depends only on the filesystem and the configuration, never on
//! a previous snapshot. Missing directories and manifests produce empty
//! branches; bad manifest entries are logged and skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use frankenstyle_core::constants::{
    is_core_subsystem, supports_subplugins, CLASS_FILE_EXTENSION, CORE_SUBSYSTEMS, FILES_TO_MAP,
    LOCAL_DIR, PSR_SYSTEMS, RENAMED_CLASSES_MANIFEST, STANDARD_PLUGIN_TYPES, SUBPLUGINS_MANIFEST,
    SUBPLUGIN_CAPABLE_TYPES, THEME_DIR, VERSION_FILE,
};
use frankenstyle_core::ComponentConfig;
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::manifest;
use crate::scanner::{self, PluginList};
use crate::snapshot::CacheSnapshot;

type PluginTypes = IndexMap<String, PathBuf>;
type Parents = IndexMap<String, String>;
type Subplugins = IndexMap<String, IndexMap<String, Vec<String>>>;

/// Builds snapshots for one site configuration.
pub struct RegistryBuilder<'a> {
    config: &'a ComponentConfig,
    dirroot: PathBuf,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(config: &'a ComponentConfig) -> Self {
        Self {
            config,
            dirroot: config.effective_dirroot(),
        }
    }

    pub fn dirroot(&self) -> &Path {
        &self.dirroot
    }

    /// Scan everything and return a fresh snapshot.
    pub fn build(&self) -> CacheSnapshot {
        let started = Instant::now();

        let subsystems = self.fetch_subsystems();
        let (plugintypes, parents, subplugins) = self.fetch_plugintypes();

        let mut plugins = IndexMap::with_capacity(plugintypes.len());
        for (plugintype, dir) in &plugintypes {
            plugins.insert(plugintype.clone(), self.fetch_plugins(plugintype, dir));
        }

        let classmap = self.fill_classmap(&subsystems, &plugins);
        let classmaprenames = self.fill_classmap_renames(&subsystems, &plugins);
        let filemap = fill_filemap(&plugins);
        let psrclassmap = self.fill_psr_classmap();
        let version = self.core_version();

        let snapshot = CacheSnapshot {
            subsystems,
            plugintypes,
            plugins,
            parents,
            subplugins,
            classmap,
            classmaprenames,
            filemap,
            version,
            psrclassmap,
        };

        info!(
            dirroot = %self.dirroot.display(),
            plugintypes = snapshot.plugintypes.len(),
            plugins = snapshot.plugin_count(),
            classes = snapshot.classmap.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "component registry built"
        );
        snapshot
    }

    /// Site version from `dirroot/version.php`, `None` when unreadable.
    pub fn core_version(&self) -> Option<f64> {
        let path = self.dirroot.join(VERSION_FILE);
        match manifest::read_core_version(&path) {
            Ok(Some(version)) => Some(version),
            Ok(None) => {
                warn!(path = %path.display(), "version descriptor declares no $version");
                None
            }
            Err(e) => {
                warn!(error = %e, "cannot read site version descriptor");
                None
            }
        }
    }

    /// Compiled-in subsystems resolved against the site root.
    pub fn fetch_subsystems(&self) -> IndexMap<String, Option<PathBuf>> {
        let admin = self.config.effective_admin();
        CORE_SUBSYSTEMS
            .iter()
            .map(|(name, location)| {
                (
                    (*name).to_string(),
                    location.map(|rel| rel.resolve(&self.dirroot, admin)),
                )
            })
            .collect()
    }

    /// Plugin types, subplugin parents and subplugin lists.
    fn fetch_plugintypes(&self) -> (PluginTypes, Parents, Subplugins) {
        let admin = self.config.effective_admin();
        let mut types: PluginTypes = STANDARD_PLUGIN_TYPES
            .iter()
            .map(|(name, rel)| ((*name).to_string(), rel.resolve(&self.dirroot, admin)))
            .collect();
        let mut parents = Parents::new();
        let mut subplugins = Subplugins::new();

        let theme = match self.config.existing_themedir() {
            Some(dir) => dir.to_path_buf(),
            None => self.dirroot.join(THEME_DIR),
        };
        types.insert("theme".to_string(), theme);

        for plugintype in SUBPLUGIN_CAPABLE_TYPES {
            if *plugintype == "local" {
                // Local subplugins must be after local plugins.
                continue;
            }
            self.register_subplugins(plugintype, &mut types, &mut parents, &mut subplugins);
        }

        // Local is always last.
        types.insert("local".to_string(), self.dirroot.join(LOCAL_DIR));
        if supports_subplugins("local") {
            self.register_subplugins("local", &mut types, &mut parents, &mut subplugins);
        }

        (types, parents, subplugins)
    }

    fn register_subplugins(
        &self,
        plugintype: &str,
        types: &mut PluginTypes,
        parents: &mut Parents,
        subplugins: &mut Subplugins,
    ) {
        let Some(typedir) = types.get(plugintype).cloned() else {
            return;
        };
        for (plugin, fulldir) in self.fetch_plugins(plugintype, &typedir) {
            let subtypes = self.fetch_subtypes(&fulldir);
            if subtypes.is_empty() {
                continue;
            }
            let component = format!("{plugintype}_{plugin}");
            let owned = subplugins.entry(component.clone()).or_default();
            for (subtype, subdir) in subtypes {
                // `local` is reserved even before it is registered.
                if types.contains_key(&subtype) || subtype == "local" {
                    error!(subtype = %subtype, owner = %component, "invalid subtype, duplicate detected");
                    continue;
                }
                let names = self
                    .fetch_plugins(&subtype, &subdir)
                    .into_keys()
                    .collect();
                types.insert(subtype.clone(), subdir);
                parents.insert(subtype.clone(), component.clone());
                owned.insert(subtype, names);
            }
        }
    }

    /// Subtypes declared in `<ownerdir>/db/subplugins.php`, in manifest order.
    pub fn fetch_subtypes(&self, ownerdir: &Path) -> IndexMap<String, PathBuf> {
        let mut result = IndexMap::new();
        let manifest_path = ownerdir.join(SUBPLUGINS_MANIFEST);
        if !manifest_path.is_file() {
            return result;
        }
        let declared = match manifest::read_string_map(&manifest_path, "subplugins") {
            Ok(Some(declared)) => declared,
            Ok(None) => return result,
            Err(e) => {
                error!(error = %e, "cannot read subplugin manifest");
                return result;
            }
        };

        let admin = self.config.effective_admin();
        for (subtype, dir) in declared {
            if !scanner::is_valid_subtype_name(&subtype) {
                error!(
                    subtype = %subtype,
                    owner = %ownerdir.display(),
                    "invalid subtype detected, invalid characters present"
                );
                continue;
            }
            if is_core_subsystem(&subtype) {
                error!(
                    subtype = %subtype,
                    owner = %ownerdir.display(),
                    "invalid subtype detected, duplicates core subsystem"
                );
                continue;
            }
            let dir = match dir.strip_prefix("admin/") {
                Some(rest) if admin != "admin" => format!("{admin}/{rest}"),
                _ => dir,
            };
            let fulldir = self.dirroot.join(&dir);
            if !fulldir.is_dir() {
                error!(
                    dir = %dir,
                    owner = %ownerdir.display(),
                    "invalid subtype directory detected"
                );
                continue;
            }
            result.insert(subtype, fulldir);
        }
        result
    }

    /// Plugins of `plugintype` rooted at `dir` (plus the standard theme dir).
    pub fn fetch_plugins(&self, plugintype: &str, dir: &Path) -> PluginList {
        let roots = scanner::plugin_type_roots(plugintype, dir, &self.dirroot);
        scanner::scan_plugins(plugintype, &roots)
    }

    fn fill_classmap(
        &self,
        subsystems: &IndexMap<String, Option<PathBuf>>,
        plugins: &IndexMap<String, PluginList>,
    ) -> BTreeMap<String, PathBuf> {
        let mut classmap = BTreeMap::new();
        scanner::scan_classes(
            "core",
            &self.dirroot.join("lib").join("classes"),
            CLASS_FILE_EXTENSION,
            &mut classmap,
        );
        for (subsystem, fulldir) in subsystems {
            let Some(fulldir) = fulldir else {
                continue;
            };
            scanner::scan_classes(
                &format!("core_{subsystem}"),
                &fulldir.join("classes"),
                CLASS_FILE_EXTENSION,
                &mut classmap,
            );
        }
        for (plugintype, list) in plugins {
            for (pluginname, fulldir) in list {
                scanner::scan_classes(
                    &format!("{plugintype}_{pluginname}"),
                    &fulldir.join("classes"),
                    CLASS_FILE_EXTENSION,
                    &mut classmap,
                );
            }
        }
        classmap
    }

    fn fill_classmap_renames(
        &self,
        subsystems: &IndexMap<String, Option<PathBuf>>,
        plugins: &IndexMap<String, PluginList>,
    ) -> BTreeMap<String, String> {
        let mut renames = BTreeMap::new();
        load_renamed_classes(&self.dirroot.join("lib"), &mut renames);
        for fulldir in subsystems.values().flatten() {
            load_renamed_classes(fulldir, &mut renames);
        }
        for list in plugins.values() {
            for fulldir in list.values() {
                load_renamed_classes(fulldir, &mut renames);
            }
        }
        renames
    }

    fn fill_psr_classmap(&self) -> BTreeMap<String, PathBuf> {
        let libdir = self.config.effective_libdir();
        let mut psrmap = BTreeMap::new();
        for (system, dir) in PSR_SYSTEMS {
            if dir.is_empty() {
                continue;
            }
            debug!(system = %system, "loading PSR-0 classes");
            scanner::scan_psr_classes(&libdir.join(dir), CLASS_FILE_EXTENSION, &mut psrmap);
        }
        psrmap
    }
}

fn load_renamed_classes(fulldir: &Path, renames: &mut BTreeMap<String, String>) {
    let file = fulldir.join(RENAMED_CLASSES_MANIFEST);
    if !file.is_file() {
        return;
    }
    match manifest::read_string_map(&file, "renamedclasses") {
        Ok(Some(pairs)) => renames.extend(pairs),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "cannot read renamed classes manifest"),
    }
}

fn fill_filemap(plugins: &IndexMap<String, PluginList>) -> IndexMap<String, IndexMap<String, PluginList>> {
    let mut filemap = IndexMap::new();
    for file in FILES_TO_MAP {
        let mut by_type = IndexMap::with_capacity(plugins.len());
        for (plugintype, list) in plugins {
            let found: PluginList = list
                .iter()
                .map(|(pluginname, fulldir)| (pluginname, fulldir.join(file)))
                .filter(|(_, path)| path.exists())
                .map(|(pluginname, path)| (pluginname.clone(), path))
                .collect();
            by_type.insert(plugintype.clone(), found);
        }
        filemap.insert((*file).to_string(), by_type);
    }
    filemap
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("version.php"), "<?php\n$version = 2015111600.00;\n").unwrap();
        fs::create_dir_all(root.join("mod/forum/classes")).unwrap();
        fs::write(root.join("mod/forum/lib.php"), "<?php").unwrap();
        fs::write(root.join("mod/forum/classes/post.php"), "<?php").unwrap();
        fs::create_dir_all(root.join("blocks/html")).unwrap();
        fs::write(root.join("blocks/html/settings.php"), "<?php").unwrap();
        dir
    }

    #[test]
    fn builds_types_in_order_with_local_last() {
        let dir = site();
        let config = ComponentConfig::for_dirroot(dir.path());
        let snapshot = RegistryBuilder::new(&config).build();

        let types: Vec<&str> = snapshot.plugintypes.keys().map(String::as_str).collect();
        assert_eq!(types.first(), Some(&"availability"));
        assert_eq!(types.last(), Some(&"local"));
        let theme_pos = types.iter().position(|t| *t == "theme").unwrap();
        let cachelock_pos = types.iter().position(|t| *t == "cachelock").unwrap();
        assert_eq!(theme_pos, cachelock_pos + 1);
        assert_eq!(snapshot.plugintypes["tool"], dir.path().join("admin/tool"));
        assert_eq!(snapshot.version, Some(2015111600.0));
    }

    #[test]
    fn fills_maps() {
        let dir = site();
        let config = ComponentConfig::for_dirroot(dir.path());
        let snapshot = RegistryBuilder::new(&config).build();

        assert_eq!(
            snapshot.plugins["mod"]["forum"],
            dir.path().join("mod/forum")
        );
        assert_eq!(
            snapshot.classmap["mod_forum_post"],
            dir.path().join("mod/forum/classes/post.php")
        );
        assert_eq!(
            snapshot.filemap["lib.php"]["mod"]["forum"],
            dir.path().join("mod/forum/lib.php")
        );
        assert!(snapshot.filemap["lib.php"]["block"].is_empty());
        assert_eq!(
            snapshot.filemap["settings.php"]["block"]["html"],
            dir.path().join("blocks/html/settings.php")
        );
        assert!(snapshot.subsystems["access"].is_none());
        assert_eq!(
            snapshot.subsystems["role"],
            Some(dir.path().join("admin/roles"))
        );
    }

    #[test]
    fn custom_admin_dir_rewrites_subtype_paths() {
        let dir = site();
        let root = dir.path();
        fs::create_dir_all(root.join("siteadmin/tool/dataprivacy/db")).unwrap();
        fs::create_dir_all(root.join("siteadmin/tool/dataprivacy/rules/basic")).unwrap();
        fs::write(
            root.join("siteadmin/tool/dataprivacy/db/subplugins.php"),
            "<?php\n$subplugins = array('dataprivacyrule' => 'admin/tool/dataprivacy/rules');\n",
        )
        .unwrap();

        let mut config = ComponentConfig::for_dirroot(root);
        config.admin = Some("siteadmin".to_string());
        let snapshot = RegistryBuilder::new(&config).build();

        assert_eq!(
            snapshot.plugintypes["dataprivacyrule"],
            root.join("siteadmin/tool/dataprivacy/rules")
        );
        assert_eq!(snapshot.parents["dataprivacyrule"], "tool_dataprivacy");
        assert_eq!(
            snapshot.subplugins["tool_dataprivacy"]["dataprivacyrule"],
            vec!["basic".to_string()]
        );
    }

    #[test]
    fn subtype_cannot_claim_local() {
        let dir = site();
        let root = dir.path();
        fs::create_dir_all(root.join("mod/forum/db")).unwrap();
        fs::create_dir_all(root.join("mod/forum/local/extra")).unwrap();
        fs::create_dir_all(root.join("local/custom")).unwrap();
        fs::write(
            root.join("mod/forum/db/subplugins.php"),
            "<?php\n$subplugins = array('local' => 'mod/forum/local');\n",
        )
        .unwrap();

        let config = ComponentConfig::for_dirroot(root);
        let snapshot = RegistryBuilder::new(&config).build();

        assert_eq!(snapshot.plugintypes.last(), Some((&"local".to_string(), &root.join("local"))));
        assert!(!snapshot.parents.contains_key("local"));
        assert!(snapshot.subplugins["mod_forum"].is_empty());
        assert_eq!(
            snapshot.plugins["local"].keys().collect::<Vec<_>>(),
            vec!["custom"]
        );
    }

    #[test]
    fn missing_version_descriptor_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let config = ComponentConfig::for_dirroot(dir.path());
        let snapshot = RegistryBuilder::new(&config).build();
        assert_eq!(snapshot.version, None);
        assert_eq!(snapshot.plugin_count(), 0);
    }
}
