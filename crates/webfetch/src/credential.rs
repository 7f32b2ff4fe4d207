//! API key resolution.
//!
//! Keys come from the environment first, then from a `.env` file next to
//! the running executable. The key is resolved once per invocation and is
//! never logged.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Resolve an API key from the environment or a key file.
///
/// The environment variable always wins, even when the key file is also
/// present. When it is unset (or empty), the key file is scanned for a
/// `KEY = value` line; the value is trimmed and loses one layer of
/// surrounding quotes. Returns `None` when neither source yields a value.
pub fn resolve(env_var: &str, key_file: Option<&Path>) -> Option<String> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Some(value);
        }
    }

    key_file.and_then(|path| from_file(path, env_var))
}

/// Path of the `.env` key file expected next to the current executable.
pub fn default_key_file() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|dir| dir.join(".env"))
}

/// Read a key from a `.env`-style file, if the file exists.
fn from_file(path: &Path, key: &str) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_key(&content, key)
}

/// Extract the value for `key` from `KEY = value` file content.
fn parse_key(content: &str, key: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"{}\s*=\s*(.+)", regex::escape(key))).ok()?;
    let captured = pattern.captures(content)?.get(1)?.as_str();
    let value = strip_quotes(captured.trim());

    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Strip one leading and one trailing quote character, independently.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
