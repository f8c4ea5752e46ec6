//! All-versions digest.

mod common;

use common::{config, mkdir, plugin_version, set_core_version, site};
use frankenstyle_registry::ComponentRegistry;

#[test]
fn hash_is_stable() {
    let dir = site();
    let registry = ComponentRegistry::new(config(dir.path()));

    let first = registry.get_all_versions_hash().unwrap();
    assert_eq!(first.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(first, registry.get_all_versions_hash().unwrap());

    let other = ComponentRegistry::new(config(dir.path()));
    assert_eq!(first, other.get_all_versions_hash().unwrap());
}

#[test]
fn plugin_version_change_changes_hash() {
    let dir = site();
    let root = dir.path();
    let registry = ComponentRegistry::new(config(root));
    let before = registry.get_all_versions_hash().unwrap();

    plugin_version(root, "mod/forum", "plugin", "2015111700");
    assert_ne!(before, registry.get_all_versions_hash().unwrap());
}

#[test]
fn core_version_change_changes_hash() {
    let dir = site();
    let root = dir.path();
    let registry = ComponentRegistry::new(config(root));
    let before = registry.get_all_versions_hash().unwrap();

    set_core_version(root, "2015111601.00");
    assert_ne!(before, registry.get_all_versions_hash().unwrap());
}

#[test]
fn new_plugins_are_noticed_without_reset() {
    let dir = site();
    let root = dir.path();
    let registry = ComponentRegistry::new(config(root));
    let before = registry.get_all_versions_hash().unwrap();

    mkdir(root, "blocks/calendar_month");
    assert_ne!(before, registry.get_all_versions_hash().unwrap());
    assert!(!registry
        .get_plugin_list("block")
        .unwrap()
        .contains_key("calendar_month"));
}

#[test]
fn disabled_caches_use_snapshot_plugin_lists() {
    let dir = site();
    let root = dir.path();
    let mut cfg = config(root);
    cfg.cache_disable_all = Some(true);
    let registry = ComponentRegistry::new(cfg);
    let before = registry.get_all_versions_hash().unwrap();

    mkdir(root, "blocks/calendar_month");
    assert_eq!(before, registry.get_all_versions_hash().unwrap());

    plugin_version(root, "mod/assign/submission/file", "plugin", "2015111700");
    assert_ne!(before, registry.get_all_versions_hash().unwrap());
}
