//! Directory walkers built on the `ignore` crate's `WalkBuilder`.
//!
//! Standard filters (hidden files, .gitignore) are disabled: a plugin tree is
//! indexed exactly as it sits on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use frankenstyle_core::constants::{IGNORED_DIRS, THEME_DIR};

use super::naming::is_valid_plugin_name;

/// Plugin name → absolute plugin directory, sorted by name.
pub type PluginList = BTreeMap<String, PathBuf>;

fn walker(root: &Path, max_depth: Option<usize>) -> ignore::Walk {
    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(true)
        .max_depth(max_depth)
        .sort_by_file_name(|a, b| a.cmp(b));
    builder.build()
}

/// Immediate subdirectories of `root` as (name, path) pairs.
fn subdirectories(root: &Path) -> Vec<(String, PathBuf)> {
    if !root.is_dir() {
        return Vec::new();
    }
    let mut dirs = Vec::new();
    for entry in walker(root, Some(1)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.depth() != 1 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        // Non UTF-8 names can never be valid plugin names.
        if let Some(name) = entry.file_name().to_str() {
            dirs.push((name.to_string(), entry.path().to_path_buf()));
        }
    }
    dirs
}

/// Directories to scan for a plugin type rooted at `dir`.
///
/// Themes in the standard location are always included, ahead of a custom
/// theme directory that differs from it.
pub fn plugin_type_roots(plugintype: &str, dir: &Path, dirroot: &Path) -> Vec<PathBuf> {
    let mut roots = vec![dir.to_path_buf()];
    if plugintype == "theme" {
        let standard = dirroot.join(THEME_DIR);
        if !same_location(dir, &standard) {
            roots.insert(0, standard);
        }
    }
    roots
}

fn same_location(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Scan plugin directories of `plugintype` below every root.
///
/// Ignored directory names and names failing [`is_valid_plugin_name`] are
/// skipped silently. `auth/db` is a historical exception to the ignore list.
/// When roots overlap, the later root wins for a given name.
pub fn scan_plugins(plugintype: &str, roots: &[PathBuf]) -> PluginList {
    let mut result = PluginList::new();
    for root in roots {
        for (name, path) in subdirectories(root) {
            let auth_db = plugintype == "auth" && name == "db";
            if !auth_db && IGNORED_DIRS.contains(&name.as_str()) {
                continue;
            }
            if !is_valid_plugin_name(plugintype, &name) {
                continue;
            }
            result.insert(name, path);
        }
    }
    result
}

/// Collect autoloadable classes of `component` from its `classes` directory.
///
/// Files directly in `classes_dir` produce both the flat `component_name` and
/// the namespaced `component\name` entries. Each nested directory adds one
/// namespace segment: `component\sub\name`.
pub fn scan_classes(
    component: &str,
    classes_dir: &Path,
    extension: &str,
    classmap: &mut BTreeMap<String, PathBuf>,
) {
    if !classes_dir.is_dir() {
        return;
    }
    for entry in walker(classes_dir, None) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(dir = %classes_dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(classname) = class_file_stem(path, extension) else {
            continue;
        };
        let Some(namespace) = relative_segments(classes_dir, path) else {
            continue;
        };

        if namespace.is_empty() {
            // Legacy long frankenstyle class name.
            classmap.insert(format!("{component}_{classname}"), path.to_path_buf());
        }
        let mut qualified = String::from(component);
        for segment in &namespace {
            qualified.push('\\');
            qualified.push_str(segment);
        }
        qualified.push('\\');
        qualified.push_str(classname);
        classmap.insert(qualified, path.to_path_buf());
    }
}

/// Collect PSR-0 classes below `basedir`: `Vendor/Sub/Name.php` becomes
/// `Vendor_Sub_Name`.
pub fn scan_psr_classes(basedir: &Path, extension: &str, psrmap: &mut BTreeMap<String, PathBuf>) {
    if !basedir.is_dir() {
        return;
    }
    for entry in walker(basedir, None) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(dir = %basedir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        let Some(classname) = class_file_stem(path, extension) else {
            continue;
        };
        let Some(mut segments) = relative_segments(basedir, path) else {
            continue;
        };
        segments.push(classname);
        psrmap.insert(segments.join("_"), path.to_path_buf());
    }
}

/// File stem when the file carries the class extension.
fn class_file_stem<'p>(path: &'p Path, extension: &str) -> Option<&'p str> {
    if path.extension()?.to_str()? != extension {
        return None;
    }
    path.file_stem()?.to_str()
}

/// Directory names between `base` and the parent of `path`.
fn relative_segments<'p>(base: &Path, path: &'p Path) -> Option<Vec<&'p str>> {
    let relative = path.strip_prefix(base).ok()?;
    let parent = relative.parent()?;
    parent
        .components()
        .map(|component| component.as_os_str().to_str())
        .collect()
}
