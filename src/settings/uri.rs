//! Canonicalization of source URIs used as configuration keys.
//!
//! A URI-valued key may carry an optional leading `<word>.` prefix (the
//! setting family, e.g. `mirror.`) and an optional trailing per-URI option
//! suffix (e.g. `.fallback_timeout`). Both are preserved verbatim around
//! the normalized URI.

use crate::error::{BaleError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Per-URI option names recognized as a key suffix.
pub const PER_URI_OPTIONS: &[&str] = &["fallback_timeout"];

/// Splits `<prefix.>?<uri><.option>?` into its three parts.
static URI_OPTIONS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([a-zA-Z0-9_]+)\.)?(.*?)(?:\.(fallback_timeout))?$")
        .expect("valid uri options pattern")
});

/// Normalize a URI-like configuration key segment.
///
/// Ensures the URI path ends with a trailing slash, so normalization is
/// idempotent. The middle segment must parse as an absolute http(s) URI.
///
/// # Errors
///
/// Returns [`BaleError::InvalidUri`] when the URI is not absolute.
pub fn normalize_uri(uri_like: &str) -> Result<String> {
    let captures = URI_OPTIONS_PATTERN
        .captures(uri_like)
        .ok_or_else(|| BaleError::invalid_uri(uri_like))?;
    let prefix = captures.get(1).map(|m| m.as_str());
    let middle = captures.get(2).map_or("", |m| m.as_str());
    let suffix = captures.get(3).map(|m| m.as_str());

    let mut uri = middle.to_string();
    if !uri.ends_with('/') {
        uri.push('/');
    }
    let parsed = Url::parse(&uri).map_err(|_| BaleError::invalid_uri(middle))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(BaleError::invalid_uri(middle));
    }

    let mut normalized = String::new();
    if let Some(prefix) = prefix {
        normalized.push_str(prefix);
        normalized.push('.');
    }
    normalized.push_str(parsed.as_str());
    if let Some(suffix) = suffix {
        normalized.push('.');
        normalized.push_str(suffix);
    }
    Ok(normalized)
}
