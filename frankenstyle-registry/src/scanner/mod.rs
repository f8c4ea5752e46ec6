//! Filesystem scanner: plugin directories, class files, PSR-0 libraries.
//!
//! Every function here treats a missing directory as an empty result.

pub mod naming;
pub mod walker;

pub use naming::{is_valid_plugin_name, is_valid_subtype_name};
pub use walker::{plugin_type_roots, scan_classes, scan_plugins, scan_psr_classes, PluginList};
