//! Plugin and subtype name validation.

use frankenstyle_core::constants::is_core_subsystem;

/// Validates a plugin name for the given plugin type.
///
/// Modules must not share a name with a core subsystem and must not contain
/// underscores, otherwise component normalisation would be ambiguous. Other
/// types accept `[a-z0-9_]` starting with a letter, at least two characters,
/// without `__` and without a trailing underscore.
pub fn is_valid_plugin_name(plugintype: &str, pluginname: &str) -> bool {
    if plugintype == "mod" {
        if is_core_subsystem(pluginname) {
            return false;
        }
        return is_lower_alnum_word(pluginname);
    }

    let bytes = pluginname.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_lowercase() {
        return false;
    }
    if !bytes
        .iter()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'_')
    {
        return false;
    }
    bytes[bytes.len() - 1] != b'_' && !pluginname.contains("__")
}

/// Validates a subplugin type name declared in a subplugin manifest.
pub fn is_valid_subtype_name(subtype: &str) -> bool {
    is_lower_alnum_word(subtype)
}

/// `^[a-z][a-z0-9]*$`
fn is_lower_alnum_word(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
