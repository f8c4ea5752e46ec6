//! Class and file lookups across plugins.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use frankenstyle_core::errors::{ComponentError, ComponentResult};
use tracing::warn;

use super::ComponentRegistry;
use crate::manifest;
use crate::scanner::PluginList;
use crate::snapshot::CacheSnapshot;

/// Where a class name resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassResolution {
    /// Declared in the component class map.
    File(PathBuf),
    /// Deprecated name; the host should alias `old` to `new` after loading `path`.
    Alias {
        old: String,
        new: String,
        path: PathBuf,
    },
    /// PSR-0 library class.
    Psr(PathBuf),
}

impl ClassResolution {
    /// File that defines the class.
    pub fn path(&self) -> &Path {
        match self {
            Self::File(path) | Self::Psr(path) => path.as_path(),
            Self::Alias { path, .. } => path.as_path(),
        }
    }
}

/// A plugin-relative file name; absolute paths and `..` are rejected.
fn plugin_relative(file: &str) -> ComponentResult<&Path> {
    let path = Path::new(file);
    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if file.is_empty() || escapes {
        return Err(ComponentError::InvalidArgument {
            message: format!("'{file}' is not a file path inside a plugin"),
        });
    }
    Ok(path)
}

/// `\null` as any namespace segment after the first.
fn has_null_segment(classname: &str) -> bool {
    classname.split('\\').skip(1).any(|segment| segment == "null")
}

pub(super) fn resolve_in(snapshot: &CacheSnapshot, classname: &str) -> ComponentResult<Option<ClassResolution>> {
    let classname = classname.trim_start_matches('\\');

    if let Some(path) = snapshot.classmap.get(classname) {
        return Ok(Some(ClassResolution::File(path.clone())));
    }

    if let Some(newname) = snapshot.classmaprenames.get(classname) {
        if let Some(path) = snapshot.classmap.get(newname) {
            warn!(
                old = %classname,
                new = %newname,
                "Class '{classname}' has been renamed for the autoloader and is now deprecated. Please use '{newname}' instead."
            );
            if has_null_segment(classname) {
                return Err(ComponentError::InvalidAlias {
                    old: classname.to_string(),
                    new: newname.clone(),
                });
            }
            return Ok(Some(ClassResolution::Alias {
                old: classname.to_string(),
                new: newname.clone(),
                path: path.clone(),
            }));
        }
    }

    let normalized = classname.replace(['/', '\\'], "_");
    Ok(snapshot
        .psrclassmap
        .get(&normalized)
        .map(|path| ClassResolution::Psr(path.clone())))
}

impl ComponentRegistry {
    /// Resolve a class name to the file that defines it.
    ///
    /// Checked in order: the class map, renamed classes whose replacement is
    /// in the class map, then the PSR-0 map with `/` and `\` read as `_`.
    pub fn resolve_class(&self, classname: &str) -> ComponentResult<Option<ClassResolution>> {
        let snapshot = self.current()?;
        resolve_in(&snapshot, classname)
    }

    /// Plugins of `plugintype` that define a class, as component → class name.
    ///
    /// Per plugin the first hit wins: `\type_plugin\class` (only for a non-empty
    /// `class`), then `type_plugin_class` (`type_plugin` for an empty `class`),
    /// then the flat name declared in `file` inside the plugin directory. The
    /// fallback file is handed to the host runtime before it is inspected.
    pub fn get_plugin_list_with_class(
        &self,
        plugintype: &str,
        class: &str,
        file: Option<&str>,
    ) -> ComponentResult<BTreeMap<String, String>> {
        let file = file.filter(|f| !f.is_empty()).map(plugin_relative).transpose()?;
        let snapshot = self.current()?;
        let mut found = BTreeMap::new();
        let Some(plugins) = snapshot.plugins.get(plugintype) else {
            return Ok(found);
        };

        for (plugin, fulldir) in plugins {
            let component = format!("{plugintype}_{plugin}");

            if !class.is_empty() {
                let namespaced = format!("\\{component}\\{class}");
                if resolve_in(&snapshot, &namespaced)?.is_some() {
                    found.insert(component, namespaced);
                    continue;
                }
            }

            let flat = if class.is_empty() {
                component.clone()
            } else {
                format!("{component}_{class}")
            };
            if resolve_in(&snapshot, &flat)?.is_some() {
                found.insert(component, flat);
                continue;
            }

            if let Some(file) = file {
                let path = fulldir.join(file);
                if path.exists() {
                    self.runtime.include_file(&path);
                    if manifest::declares_class(&path, &flat) {
                        found.insert(component, flat);
                    }
                }
            }
        }
        Ok(found)
    }

    /// Plugins of `plugintype` containing `file`, as plugin name → path.
    ///
    /// Mapped files come from the snapshot; any other file is checked on disk.
    /// With `load`, every match is handed to the host runtime.
    pub fn get_plugin_list_with_file(
        &self,
        plugintype: &str,
        file: &str,
        load: bool,
    ) -> ComponentResult<PluginList> {
        let relative = plugin_relative(file)?;
        let snapshot = self.current()?;
        let found = match snapshot.filemap.get(file) {
            Some(by_type) => by_type.get(plugintype).cloned().unwrap_or_default(),
            None => snapshot
                .plugins
                .get(plugintype)
                .map(|plugins| {
                    plugins
                        .iter()
                        .map(|(plugin, fulldir)| (plugin.clone(), fulldir.join(relative)))
                        .filter(|(_, path)| path.exists())
                        .collect()
                })
                .unwrap_or_default(),
        };

        if load {
            for path in found.values() {
                self.runtime.include_file(path);
            }
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> CacheSnapshot {
        let mut snapshot = CacheSnapshot::default();
        snapshot.classmap.insert(
            "core\\event\\base".to_string(),
            PathBuf::from("/srv/site/lib/classes/event/base.php"),
        );
        snapshot.classmap.insert(
            "core\\task\\nullable".to_string(),
            PathBuf::from("/srv/site/lib/classes/task/nullable.php"),
        );
        snapshot.classmaprenames.insert(
            "core\\event\\legacy".to_string(),
            "core\\event\\base".to_string(),
        );
        snapshot.classmaprenames.insert(
            "core\\null\\thing".to_string(),
            "core\\task\\nullable".to_string(),
        );
        snapshot.classmaprenames.insert(
            "core\\event\\orphan".to_string(),
            "core\\event\\missing".to_string(),
        );
        snapshot.psrclassmap.insert(
            "Horde_Imap_Client".to_string(),
            PathBuf::from("/srv/site/lib/horde/framework/Horde/Imap/Client.php"),
        );
        snapshot
    }

    #[test]
    fn classmap_then_rename_then_psr() {
        let snapshot = snapshot();
        assert_eq!(
            resolve_in(&snapshot, "\\core\\event\\base").unwrap(),
            Some(ClassResolution::File(PathBuf::from(
                "/srv/site/lib/classes/event/base.php"
            )))
        );
        assert_eq!(
            resolve_in(&snapshot, "core\\event\\legacy").unwrap(),
            Some(ClassResolution::Alias {
                old: "core\\event\\legacy".to_string(),
                new: "core\\event\\base".to_string(),
                path: PathBuf::from("/srv/site/lib/classes/event/base.php"),
            })
        );
        let psr = resolve_in(&snapshot, "Horde\\Imap/Client").unwrap().unwrap();
        assert_eq!(
            psr.path(),
            Path::new("/srv/site/lib/horde/framework/Horde/Imap/Client.php")
        );
    }

    #[test]
    fn rename_to_unknown_class_is_unresolved() {
        assert_eq!(resolve_in(&snapshot(), "core\\event\\orphan").unwrap(), None);
        assert_eq!(resolve_in(&snapshot(), "nothing_here").unwrap(), None);
    }

    #[test]
    fn plugin_files_stay_inside_the_plugin() {
        assert_eq!(plugin_relative("db/install.xml").unwrap(), Path::new("db/install.xml"));
        assert!(plugin_relative("./lib.php").is_ok());
        for bad in ["", "/etc/passwd", "../forum/lib.php", "db/../../x.php"] {
            assert!(matches!(
                plugin_relative(bad),
                Err(ComponentError::InvalidArgument { .. })
            ));
        }
    }

    #[test]
    fn null_segment_cannot_be_aliased() {
        let err = resolve_in(&snapshot(), "core\\null\\thing").unwrap_err();
        assert!(matches!(err, ComponentError::InvalidAlias { .. }));
        assert!(has_null_segment("core\\null"));
        assert!(!has_null_segment("null\\core"));
        assert!(!has_null_segment("core\\nullable"));
    }
}
