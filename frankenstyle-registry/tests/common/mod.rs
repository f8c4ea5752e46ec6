//! Shared fixture: a small site tree with plugins, subplugins, classes and
//! manifests in the layouts the registry understands.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use frankenstyle_core::ComponentConfig;
use frankenstyle_registry::HostRuntime;
use tempfile::TempDir;

pub const CORE_VERSION: f64 = 2015111600.0;

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

pub fn mkdir(root: &Path, rel: &str) {
    fs::create_dir_all(root.join(rel)).unwrap();
}

pub fn set_core_version(root: &Path, version: &str) {
    write(
        root,
        "version.php",
        &format!("<?php\ndefined('MOODLE_INTERNAL') || die();\n$version  = {version};   // YYYYMMDD = weekly release date\n$release  = '3.0';\n"),
    );
}

pub fn plugin_version(root: &Path, rel: &str, var: &str, version: &str) {
    write(
        root,
        &format!("{rel}/version.php"),
        &format!("<?php\n${var}->version   = {version};\n${var}->requires  = 2015111000;\n"),
    );
}

/// Build the fixture site.
pub fn site() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    set_core_version(root, "2015111600.00");

    // Core classes, renames and a PSR-0 library.
    write(root, "lib/classes/task/manager.php", "<?php\nnamespace core\\task;\nclass manager {}\n");
    write(
        root,
        "lib/db/renamedclasses.php",
        "<?php\n$renamedclasses = array(\n    'core\\task\\old_manager' => 'core\\task\\manager',\n);\n",
    );
    write(root, "lib/horde/framework/Horde/Imap/Client.php", "<?php\nclass Horde_Imap_Client {}\n");

    // Modules.
    plugin_version(root, "mod/forum", "plugin", "2015111600");
    write(root, "mod/forum/lib.php", "<?php\n");
    write(root, "mod/forum/classes/post.php", "<?php\nnamespace mod_forum;\nclass post {}\n");
    write(
        root,
        "mod/forum/classes/event/created.php",
        "<?php\nnamespace mod_forum\\event;\nclass created {}\n",
    );

    plugin_version(root, "mod/assign", "module", "2015111601");
    write(root, "mod/assign/lib.php", "<?php\n");
    write(root, "mod/assign/settings.php", "<?php\n");
    write(
        root,
        "mod/assign/db/subplugins.php",
        "<?php\n$subplugins = array(\n    'assignsubmission' => 'mod/assign/submission',\n    'assignfeedback' => 'mod/assign/feedback',\n);\n",
    );
    plugin_version(root, "mod/assign/submission/file", "plugin", "2015111602");
    mkdir(root, "mod/assign/submission/onlinetext");
    mkdir(root, "mod/assign/feedback/comments");

    // Never plugins: ignored, subsystem name, underscore in a module name.
    mkdir(root, "mod/tests");
    mkdir(root, "mod/calendar");
    mkdir(root, "mod/forum_plus");

    // Blocks with a legacy class file.
    write(
        root,
        "blocks/html/block_html.php",
        "<?php\nclass block_html extends block_base {\n}\n",
    );
    write(root, "blocks/login/block_login.php", "<?php\nclass block_something_else {}\n");

    // Admin tools, auth, themes.
    plugin_version(root, "admin/tool/dataprivacy", "plugin", "2015111603");
    mkdir(root, "auth/db");
    mkdir(root, "auth/manual");
    mkdir(root, "theme/boost");

    // Local plugin with its own subplugin type.
    write(
        root,
        "local/custom/db/subplugins.php",
        "<?php\n$subplugins = ['customrule' => 'local/custom/rules'];\n",
    );
    mkdir(root, "local/custom/rules/basic");

    dir
}

pub fn config(root: &Path) -> ComponentConfig {
    ComponentConfig::for_dirroot(root)
}

pub fn cache_file(root: &Path) -> PathBuf {
    root.join(".cache").join("core_component.json")
}

/// Host runtime that records every hook call.
#[derive(Default)]
pub struct RecordingRuntime {
    pub invalidated: Mutex<Vec<PathBuf>>,
    pub included: Mutex<Vec<PathBuf>>,
}

impl HostRuntime for RecordingRuntime {
    fn invalidate_compiled_cache(&self, path: &Path) {
        self.invalidated.lock().unwrap().push(path.to_path_buf());
    }

    fn include_file(&self, path: &Path) {
        self.included.lock().unwrap().push(path.to_path_buf());
    }
}
