//! Classification of setting keys and coercion of stored strings.
//!
//! Every raw value in the store is a string. A static table classifies
//! each key as boolean, numeric, array, or plain string; a dotted key not
//! present in the table inherits the class of its parent setting (the
//! leading segment), which supports per-package suffixes like
//! `ignore_messages.<name>`.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Keys coerced to booleans.
const BOOL_KEYS: &[&str] = &[
    "allow_offline_install",
    "auto_clean_without_path",
    "auto_install",
    "cache_all",
    "cache_all_platforms",
    "clean",
    "default_install_uses_path",
    "deployment",
    "disable_checksum_validation",
    "disable_local_branch_check",
    "disable_shared_gems",
    "force",
    "forget_cli_options",
    "frozen",
    "ignore_messages",
    "no_install",
    "no_prune",
    "path.system",
    "plugins",
    "prefer_patch_releases",
    "silence_root_warning",
];

/// Keys coerced to integers.
const NUMBER_KEYS: &[&str] = &["jobs", "redirect", "retry", "ssl_verify_depth", "timeout"];

/// Keys coerced to ordered string sequences.
const ARRAY_KEYS: &[&str] = &["only", "with", "without"];

/// Static classification of a setting key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Bool,
    Number,
    Array,
    String,
}

static CLASS_TABLE: Lazy<HashMap<&'static str, KeyClass>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for key in BOOL_KEYS {
        table.insert(*key, KeyClass::Bool);
    }
    for key in NUMBER_KEYS {
        table.insert(*key, KeyClass::Number);
    }
    for key in ARRAY_KEYS {
        table.insert(*key, KeyClass::Array);
    }
    table
});

/// Classify an exposed key, falling back to its parent setting.
#[must_use]
pub fn classify(exposed_key: &str) -> KeyClass {
    if let Some(class) = CLASS_TABLE.get(exposed_key) {
        return *class;
    }
    let parent = exposed_key.split('.').next().unwrap_or(exposed_key);
    CLASS_TABLE.get(parent).copied().unwrap_or(KeyClass::String)
}

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Number(i64),
    Array(Vec<String>),
    String(String),
}

impl Value {
    /// Encode back to the raw stored string. Empty arrays encode to
    /// absent, which deletes the key on write.
    #[must_use]
    pub fn to_raw(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Number(value) => Some(value.to_string()),
            Self::Array(values) => encode_array(values),
            Self::String(value) => Some(value.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Array(values) => write!(f, "[{}]", values.join(", ")),
            Self::String(value) => write!(f, "{value}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Self::Array(values)
    }
}

impl From<Vec<&str>> for Value {
    fn from(values: Vec<&str>) -> Self {
        Self::Array(values.iter().map(ToString::to_string).collect())
    }
}

/// Decode a raw stored string into the typed value for `exposed_key`.
///
/// Order matters: array keys decode even when absent (to an empty
/// sequence); otherwise an absent raw value stays absent; a literal
/// `"false"` decodes as a boolean for any key.
#[must_use]
pub fn decode(raw: Option<&str>, exposed_key: &str) -> Option<Value> {
    let class = classify(exposed_key);
    if class == KeyClass::Array {
        return Some(Value::Array(decode_array(raw)));
    }
    let raw = raw?;
    if class == KeyClass::Bool || raw == "false" {
        Some(Value::Bool(to_bool(raw)))
    } else if class == KeyClass::Number {
        Some(Value::Number(lenient_int(raw)))
    } else {
        Some(Value::String(raw.to_string()))
    }
}

/// Boolean truthiness: absent, empty, or a case-insensitive match against
/// `false|f|no|n|0` is false; everything else is true.
#[must_use]
pub fn to_bool(raw: &str) -> bool {
    !matches!(
        raw.to_lowercase().as_str(),
        "" | "false" | "f" | "no" | "n" | "0"
    )
}

/// Decode a colon-joined list. Absent or empty input yields an empty
/// sequence.
#[must_use]
pub fn decode_array(raw: Option<&str>) -> Vec<String> {
    match raw {
        None | Some("") => Vec::new(),
        Some(raw) => raw.split(':').map(ToString::to_string).collect(),
    }
}

/// Encode an ordered sequence as a colon-joined string.
///
/// Empty sequences encode to absent rather than an empty string. Literal
/// spaces inside elements are replaced with the join delimiter, so values
/// containing spaces do not round-trip. That matches the historical
/// behavior of the store and is kept deliberately.
#[must_use]
pub fn encode_array(values: &[String]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(values.join(":").replace(' ', ":"))
}

/// Lenient integer parse: an optional sign followed by leading digits;
/// anything else parses as 0.
#[must_use]
pub fn lenient_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let prefix: String = digits.chars().take_while(char::is_ascii_digit).collect();
    prefix.parse::<i64>().map_or(0, |value| sign * value)
}
