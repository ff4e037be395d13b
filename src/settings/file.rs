//! Loading and saving of the line-oriented configuration file format.
//!
//! One entry per key, `BALE_…: optional-quoted-value`. The loader is
//! tolerant: values may be bare, single- or double-quoted, may carry a
//! legacy `!` marker after the colon, and may span multiple lines as long
//! as continuation lines do not themselves start a new key. Missing,
//! empty, unset, or ignored files load as an empty mapping.
//!
//! Saving rewrites the file in full after creating parent directories.
//! There is no locking and no atomic-rename step: two processes writing
//! the same file concurrently can race, which is an accepted limitation.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

/// A line that starts a new entry. The key is greedy up to the last
/// colon-space on the line, matching the historical loader.
static KEY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(BALE_\S+): ?(.*)$").expect("valid key line pattern"));

/// Load a configuration file into an internal-key → raw-string mapping.
///
/// # Errors
///
/// Returns an error only when an existing, non-empty file cannot be read.
pub fn load(path: Option<&Path>, ignored: bool) -> Result<BTreeMap<String, String>> {
    let Some(path) = path else {
        return Ok(BTreeMap::new());
    };
    if ignored {
        trace!(path = %path.display(), "config file ignored");
        return Ok(BTreeMap::new());
    }
    let readable = fs::metadata(path).map_or(false, |meta| meta.is_file() && meta.len() > 0);
    if !readable {
        return Ok(BTreeMap::new());
    }
    let contents = fs::read_to_string(path)?;
    let map = parse(&contents);
    debug!(path = %path.display(), entries = map.len(), "loaded config file");
    Ok(map)
}

/// Serialize a mapping back to the textual format and write it in full.
///
/// # Errors
///
/// Returns an error if parent directories cannot be created or the file
/// cannot be written.
pub fn save(path: &Path, map: &BTreeMap<String, String>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = String::new();
    for (key, value) in map {
        out.push_str(key);
        out.push_str(": \"");
        out.push_str(&escape(value));
        out.push_str("\"\n");
    }
    fs::write(path, out)?;
    debug!(path = %path.display(), entries = map.len(), "wrote config file");
    Ok(())
}

fn parse(contents: &str) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut current: Option<(String, String)> = None;

    for line in contents.lines() {
        if let Some(captures) = KEY_LINE.captures(line) {
            if let Some((key, value)) = current.take() {
                map.insert(key, finalize_value(&value));
            }
            current = Some((captures[1].to_string(), captures[2].to_string()));
        } else if let Some((_, value)) = current.as_mut() {
            // Continuation of a multi-line value.
            value.push('\n');
            value.push_str(line);
        }
    }
    if let Some((key, value)) = current {
        map.insert(key, finalize_value(&value));
    }
    map
}

fn finalize_value(raw: &str) -> String {
    // Legacy serializer emitted "KEY: ! 'value'".
    let raw = raw.strip_prefix('!').map_or(raw, |rest| rest.trim_start());
    if raw.len() >= 2 {
        let bytes = raw.as_bytes();
        let quote = bytes[0];
        if (quote == b'"' || quote == b'\'') && bytes[raw.len() - 1] == quote {
            let inner = &raw[1..raw.len() - 1];
            return if quote == b'"' {
                unescape(inner)
            } else {
                inner.to_string()
            };
        }
    }
    raw.to_string()
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(next) => out.push(next),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
