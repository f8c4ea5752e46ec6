//! Compiled-in component tables.
//!
//! Any addition to [`CORE_SUBSYSTEMS`] must be checked against existing add-on
//! modules and subplugin types: a module can never share a subsystem's name.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::types::collections::FxHashSet;

/// Location of a compiled-in directory, relative to the site root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootRelative {
    /// Path below `dirroot`.
    Dirroot(&'static str),
    /// Path below the configured admin directory (`dirroot/<admin>`).
    /// An empty string means the admin directory itself.
    Admin(&'static str),
}

impl RootRelative {
    /// Resolve against the site root and the admin directory name.
    pub fn resolve(&self, dirroot: &Path, admin: &str) -> PathBuf {
        match self {
            Self::Dirroot(rel) => dirroot.join(rel),
            Self::Admin("") => dirroot.join(admin),
            Self::Admin(rel) => dirroot.join(admin).join(rel),
        }
    }
}

/// Core subsystems in table order. `None` marks purely symbolic subsystems.
pub const CORE_SUBSYSTEMS: &[(&str, Option<RootRelative>)] = &[
    ("access", None),
    ("admin", Some(RootRelative::Admin(""))),
    ("auth", Some(RootRelative::Dirroot("auth"))),
    ("availability", Some(RootRelative::Dirroot("availability"))),
    ("backup", Some(RootRelative::Dirroot("backup/util/ui"))),
    ("badges", Some(RootRelative::Dirroot("badges"))),
    ("block", Some(RootRelative::Dirroot("blocks"))),
    ("blog", Some(RootRelative::Dirroot("blog"))),
    ("bulkusers", None),
    ("cache", Some(RootRelative::Dirroot("cache"))),
    ("calendar", Some(RootRelative::Dirroot("calendar"))),
    ("cohort", Some(RootRelative::Dirroot("cohort"))),
    ("comment", Some(RootRelative::Dirroot("comment"))),
    ("completion", Some(RootRelative::Dirroot("completion"))),
    ("countries", None),
    ("course", Some(RootRelative::Dirroot("course"))),
    ("currencies", None),
    ("dbtransfer", None),
    ("debug", None),
    ("editor", Some(RootRelative::Dirroot("lib/editor"))),
    ("edufields", None),
    ("enrol", Some(RootRelative::Dirroot("enrol"))),
    ("error", None),
    ("filepicker", None),
    ("files", Some(RootRelative::Dirroot("files"))),
    ("filters", None),
    ("form", Some(RootRelative::Dirroot("lib/form"))),
    ("grades", Some(RootRelative::Dirroot("grade"))),
    ("grading", Some(RootRelative::Dirroot("grade/grading"))),
    ("group", Some(RootRelative::Dirroot("group"))),
    ("help", None),
    ("hub", None),
    ("imscc", None),
    ("install", None),
    ("iso6392", None),
    ("langconfig", None),
    ("license", None),
    ("mathslib", None),
    ("media", None),
    ("message", Some(RootRelative::Dirroot("message"))),
    ("mimetypes", None),
    ("mnet", Some(RootRelative::Dirroot("mnet"))),
    ("my", Some(RootRelative::Dirroot("my"))),
    ("notes", Some(RootRelative::Dirroot("notes"))),
    ("pagetype", None),
    ("pix", None),
    ("plagiarism", Some(RootRelative::Dirroot("plagiarism"))),
    ("plugin", None),
    ("portfolio", Some(RootRelative::Dirroot("portfolio"))),
    ("publish", Some(RootRelative::Dirroot("course/publish"))),
    ("question", Some(RootRelative::Dirroot("question"))),
    ("rating", Some(RootRelative::Dirroot("rating"))),
    ("register", Some(RootRelative::Admin("registration"))),
    ("repository", Some(RootRelative::Dirroot("repository"))),
    ("rss", Some(RootRelative::Dirroot("rss"))),
    ("role", Some(RootRelative::Admin("roles"))),
    ("search", None),
    ("table", None),
    ("tag", Some(RootRelative::Dirroot("tag"))),
    ("timezones", None),
    ("user", Some(RootRelative::Dirroot("user"))),
    ("userkey", None),
    ("webservice", Some(RootRelative::Dirroot("webservice"))),
];

/// Standard plugin types in table order. `theme` and `local` are added by the
/// builder: theme may be overridden, local always comes last.
pub const STANDARD_PLUGIN_TYPES: &[(&str, RootRelative)] = &[
    ("availability", RootRelative::Dirroot("availability/condition")),
    ("qtype", RootRelative::Dirroot("question/type")),
    ("mod", RootRelative::Dirroot("mod")),
    ("auth", RootRelative::Dirroot("auth")),
    ("calendartype", RootRelative::Dirroot("calendar/type")),
    ("enrol", RootRelative::Dirroot("enrol")),
    ("message", RootRelative::Dirroot("message/output")),
    ("block", RootRelative::Dirroot("blocks")),
    ("filter", RootRelative::Dirroot("filter")),
    ("editor", RootRelative::Dirroot("lib/editor")),
    ("format", RootRelative::Dirroot("course/format")),
    ("profilefield", RootRelative::Dirroot("user/profile/field")),
    ("report", RootRelative::Dirroot("report")),
    // Must be after system reports.
    ("coursereport", RootRelative::Dirroot("course/report")),
    ("gradeexport", RootRelative::Dirroot("grade/export")),
    ("gradeimport", RootRelative::Dirroot("grade/import")),
    ("gradereport", RootRelative::Dirroot("grade/report")),
    ("gradingform", RootRelative::Dirroot("grade/grading/form")),
    ("mnetservice", RootRelative::Dirroot("mnet/service")),
    ("webservice", RootRelative::Dirroot("webservice")),
    ("repository", RootRelative::Dirroot("repository")),
    ("portfolio", RootRelative::Dirroot("portfolio")),
    ("qbehaviour", RootRelative::Dirroot("question/behaviour")),
    ("qformat", RootRelative::Dirroot("question/format")),
    ("plagiarism", RootRelative::Dirroot("plagiarism")),
    ("tool", RootRelative::Admin("tool")),
    ("cachestore", RootRelative::Dirroot("cache/stores")),
    ("cachelock", RootRelative::Dirroot("cache/locks")),
];

/// Standard theme directory below `dirroot`.
pub const THEME_DIR: &str = "theme";

/// Local plugin directory below `dirroot`.
pub const LOCAL_DIR: &str = "local";

/// Plugin types that may declare subplugins, in processing order.
/// `local` must stay last so local subplugins register after local plugins.
pub const SUBPLUGIN_CAPABLE_TYPES: &[&str] = &["mod", "editor", "tool", "local"];

/// Directory names never treated as plugins (watch out for the auth/db exception).
pub const IGNORED_DIRS: &[&str] = &[
    "CVS",
    "_vti_cnf",
    "simpletest",
    "db",
    "yui",
    "tests",
    "classes",
    "fonts",
];

/// Per-plugin files whose presence is precomputed into the filemap.
pub const FILES_TO_MAP: &[&str] = &["lib.php", "settings.php"];

/// PSR-0 vendor roots below `libdir`.
pub const PSR_SYSTEMS: &[(&str, &str)] = &[("Horde", "horde/framework")];

/// Extension of autoloadable class files.
pub const CLASS_FILE_EXTENSION: &str = "php";

/// Site version descriptor below `dirroot`; also the per-plugin descriptor name.
pub const VERSION_FILE: &str = "version.php";

/// Subplugin manifest below a plugin directory.
pub const SUBPLUGINS_MANIFEST: &str = "db/subplugins.php";

/// Class rename manifest below a component directory.
pub const RENAMED_CLASSES_MANIFEST: &str = "db/renamedclasses.php";

/// Default cache artifact name below `cachedir`.
pub const CACHE_FILE_NAME: &str = "core_component.json";

/// Plugin type whose root is compared against `dirroot` to detect a moved tree.
pub const REFERENCE_PLUGIN_TYPE: &str = "mod";

/// Returns true if `name` is one of the compiled-in core subsystems.
pub fn is_core_subsystem(name: &str) -> bool {
    static NAMES: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    NAMES
        .get_or_init(|| CORE_SUBSYSTEMS.iter().map(|(subsystem, _)| *subsystem).collect())
        .contains(name)
}

/// Returns true if `plugintype` may declare subplugins.
pub fn supports_subplugins(plugintype: &str) -> bool {
    SUBPLUGIN_CAPABLE_TYPES.contains(&plugintype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_paths_follow_configured_admin_dir() {
        let root = Path::new("/srv/site");
        assert_eq!(
            RootRelative::Admin("").resolve(root, "siteadmin"),
            PathBuf::from("/srv/site/siteadmin")
        );
        assert_eq!(
            RootRelative::Admin("tool").resolve(root, "admin"),
            PathBuf::from("/srv/site/admin/tool")
        );
        assert_eq!(
            RootRelative::Dirroot("lib/editor").resolve(root, "admin"),
            PathBuf::from("/srv/site/lib/editor")
        );
    }

    #[test]
    fn subsystem_names_are_unique() {
        let mut names: Vec<&str> = CORE_SUBSYSTEMS.iter().map(|(n, _)| *n).collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }

    #[test]
    fn local_is_last_subplugin_type() {
        assert_eq!(SUBPLUGIN_CAPABLE_TYPES.last(), Some(&"local"));
        assert!(!STANDARD_PLUGIN_TYPES.iter().any(|(t, _)| *t == "local"));
        assert!(!STANDARD_PLUGIN_TYPES.iter().any(|(t, _)| *t == "theme"));
    }

    #[test]
    fn subsystem_lookup() {
        assert!(is_core_subsystem("calendar"));
        assert!(is_core_subsystem("access"));
        assert!(!is_core_subsystem("forum"));
        assert!(supports_subplugins("mod"));
        assert!(!supports_subplugins("block"));
    }
}
