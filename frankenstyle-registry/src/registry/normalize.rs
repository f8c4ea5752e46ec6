//! Component name normalisation.
//!
//! Pure functions over the compiled-in subsystem table; they never touch the
//! snapshot and never validate that the plugin exists.

use frankenstyle_core::constants::is_core_subsystem;

/// Split a component name into `(type, plugin)`.
///
/// - `""`, `core` and `moodle` are core itself: `("core", None)`.
/// - A name without `_` is a core subsystem when the table knows it, a
///   module otherwise.
/// - Anything else splits at the first `_`; a `moodle` type becomes `core`.
///   Unknown types are assumed to be subplugin types.
pub fn normalize_component(component: &str) -> (String, Option<String>) {
    if matches!(component, "" | "core" | "moodle") {
        return ("core".to_string(), None);
    }

    match component.split_once('_') {
        None if is_core_subsystem(component) => ("core".to_string(), Some(component.to_string())),
        None => ("mod".to_string(), Some(component.to_string())),
        Some((plugintype, plugin)) => {
            let plugintype = if plugintype == "moodle" { "core" } else { plugintype };
            (plugintype.to_string(), Some(plugin.to_string()))
        }
    }
}

/// Canonical `type_plugin` form, or `core` for core itself.
pub fn normalize_componentname(component: &str) -> String {
    match normalize_component(component) {
        (plugintype, None) => plugintype,
        (plugintype, Some(plugin)) => format!("{plugintype}_{plugin}"),
    }
}
