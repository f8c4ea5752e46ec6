//! Readers for the PHP manifest files a component tree ships.
//!
//! Only the literal forms found in practice are understood:
//! `$version = 2015111600.00;`, `$plugin->version = 2015111600;`, and string
//! maps such as `$subplugins = array('assignsubmission' => 'mod/assign/submission');`
//! (short `[...]` arrays and double quoted strings included). Comments are
//! stripped before matching.

use std::path::Path;
use std::sync::OnceLock;

use frankenstyle_core::errors::{ManifestError, ManifestResult};
use regex::Regex;

fn core_version_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*\$version\s*=\s*([0-9]+(?:\.[0-9]*)?)\s*;").ok())
        .as_ref()
}

fn plugin_version_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$(?:plugin|module)\s*->\s*version\s*=\s*([0-9]+(?:\.[0-9]*)?)\s*;").ok()
    })
    .as_ref()
}

fn string_pair_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?s)(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*=>\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
        )
        .ok()
    })
    .as_ref()
}

fn read(path: &Path) -> ManifestResult<String> {
    std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Site version from the root version descriptor. `Ok(None)` when the file
/// declares no `$version`.
pub fn read_core_version(path: &Path) -> ManifestResult<Option<f64>> {
    let source = strip_comments(&read(path)?);
    Ok(parse_number(core_version_re(), &source))
}

/// Plugin version from a plugin's `version.php`.
pub fn read_plugin_version(path: &Path) -> ManifestResult<Option<f64>> {
    let source = strip_comments(&read(path)?);
    Ok(parse_number(plugin_version_re(), &source))
}

fn parse_number(re: Option<&Regex>, source: &str) -> Option<f64> {
    re?.captures(source)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Ordered `key => value` string pairs assigned to `$variable` in `path`.
///
/// `Ok(None)` when the file does not assign the variable. A present but
/// unterminated array literal is a parse error.
pub fn read_string_map(path: &Path, variable: &str) -> ManifestResult<Option<Vec<(String, String)>>> {
    let source = strip_comments(&read(path)?);
    parse_string_map(&source, variable).map_err(|details| ManifestError::Parse {
        path: path.display().to_string(),
        details,
    })
}

fn parse_string_map(source: &str, variable: &str) -> Result<Option<Vec<(String, String)>>, String> {
    let assignment = Regex::new(&format!(
        r"\${}\s*=\s*(array\s*\(|\[)",
        regex::escape(variable)
    ))
    .map_err(|e| e.to_string())?;
    let Some(caps) = assignment.captures(source) else {
        return Ok(None);
    };
    let Some(opener) = caps.get(1) else {
        return Ok(None);
    };
    let body_start = opener.end();
    let body = literal_body(&source[body_start..])
        .ok_or_else(|| format!("unterminated array assigned to ${variable}"))?;

    let pair_re = string_pair_re().ok_or_else(|| "string pair pattern unavailable".to_string())?;
    let pairs = pair_re
        .captures_iter(body)
        .filter_map(|caps| {
            let key = caps
                .get(1)
                .map(|m| unescape_single(m.as_str()))
                .or_else(|| caps.get(2).map(|m| unescape_double(m.as_str())))?;
            let value = caps
                .get(3)
                .map(|m| unescape_single(m.as_str()))
                .or_else(|| caps.get(4).map(|m| unescape_double(m.as_str())))?;
            Some((key, value))
        })
        .collect();
    Ok(Some(pairs))
}

/// Text up to the bracket closing an array literal whose opener was consumed.
fn literal_body(rest: &str) -> Option<&str> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, c) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&rest[..idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Drop `//`, `#` and `/* */` comments outside string literals.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => {
                quote = Some(c);
                out.push(c);
            }
            '#' => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'/') => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

fn skip_line(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, out: &mut String) {
    for c in chars.by_ref() {
        if c == '\n' {
            out.push('\n');
            break;
        }
    }
}

fn unescape_single(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '\\' || next == '\'' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

fn unescape_double(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                Some(&next @ ('\\' | '"' | '$')) => {
                    out.push(next);
                    chars.next();
                    continue;
                }
                Some('n') => {
                    out.push('\n');
                    chars.next();
                    continue;
                }
                Some('t') => {
                    out.push('\t');
                    chars.next();
                    continue;
                }
                _ => {}
            }
        }
        out.push(c);
    }
    out
}

/// Whether the PHP file at `path` declares class `classname` (no namespace).
/// Unreadable files declare nothing.
pub fn declares_class(path: &Path, classname: &str) -> bool {
    let Ok(raw) = std::fs::read_to_string(path) else {
        return false;
    };
    let source = strip_comments(&raw);
    let pattern = format!(
        r"(?mi)^\s*(?:(?:abstract|final)\s+)*class\s+{}\b",
        regex::escape(classname)
    );
    Regex::new(&pattern).is_ok_and(|re| re.is_match(&source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subplugin_array() {
        let source = r#"<?php
// Subplugin types.
$subplugins = array(
    'assignsubmission' => 'mod/assign/submission', // Submission plugins.
    "assignfeedback" => "mod/assign/feedback",
    # 'ignored' => 'mod/ignored',
);
"#;
        let pairs = parse_string_map(&strip_comments(source), "subplugins")
            .unwrap()
            .unwrap();
        assert_eq!(
            pairs,
            vec![
                ("assignsubmission".to_string(), "mod/assign/submission".to_string()),
                ("assignfeedback".to_string(), "mod/assign/feedback".to_string()),
            ]
        );
    }

    #[test]
    fn parses_short_array_with_namespaces() {
        let source = r"<?php
$renamedclasses = [
    'core\event\old_thing' => 'core\event\new_thing',
    'mod_forum\\legacy' => 'mod_forum\\modern',
];
";
        let pairs = parse_string_map(&strip_comments(source), "renamedclasses")
            .unwrap()
            .unwrap();
        assert_eq!(pairs[0].0, "core\\event\\old_thing");
        assert_eq!(pairs[0].1, "core\\event\\new_thing");
        assert_eq!(pairs[1].0, "mod_forum\\legacy");
        assert_eq!(pairs[1].1, "mod_forum\\modern");
    }

    #[test]
    fn missing_variable_is_none() {
        let source = "<?php\n$other = array('a' => 'b');\n";
        assert_eq!(parse_string_map(source, "subplugins").unwrap(), None);
    }

    #[test]
    fn unterminated_array_is_error() {
        let source = "<?php\n$subplugins = array('a' => 'b'";
        assert!(parse_string_map(source, "subplugins").is_err());
    }

    #[test]
    fn versions() {
        let core = strip_comments("<?php\n// $version = 1;\n$version  = 2015111600.00;   // 20151116 = branching date\n$release = '3.0';\n");
        assert_eq!(parse_number(core_version_re(), &core), Some(2015111600.0));

        let plugin = strip_comments("<?php\n$plugin->version   = 2015111601;\n$plugin->component = 'mod_forum';\n");
        assert_eq!(parse_number(plugin_version_re(), &plugin), Some(2015111601.0));

        let module = strip_comments("<?php\n$module->version = 2014051200.5;\n");
        assert_eq!(parse_number(plugin_version_re(), &module), Some(2014051200.5));

        assert_eq!(parse_number(plugin_version_re(), "<?php\n"), None);
    }

    #[test]
    fn class_declarations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.php");
        std::fs::write(
            &path,
            "<?php\n// class report_log_thing {}\nabstract class report_log_base {}\nclass report_log_thing extends report_log_base {\n}\n",
        )
        .unwrap();
        assert!(declares_class(&path, "report_log_thing"));
        assert!(declares_class(&path, "report_log_base"));
        assert!(!declares_class(&path, "report_log"));
        assert!(!declares_class(&dir.path().join("missing.php"), "report_log_thing"));
    }
}
