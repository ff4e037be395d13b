//! Bidirectional mapping between exposed (dotted) and internal (prefixed,
//! uppercase) setting keys.
//!
//! Exposed form: `mirror.https://rubygems.org/`
//! Internal form: `BALE_MIRROR__HTTPS://RUBYGEMS__ORG/`
//!
//! The transform replaces every `.` with `__` and uppercases, so it is
//! invertible for keys whose exposed form is lowercase. Keys containing an
//! http(s) URI are passed through [`normalize_uri`] first.

use crate::error::Result;
use crate::settings::uri::normalize_uri;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prefix shared by every internal key and environment override.
pub const ENV_PREFIX: &str = "BALE_";

static URI_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://").expect("valid uri marker pattern"));

fn generic_transform(exposed: &str) -> String {
    format!("{ENV_PREFIX}{}", exposed.replace('.', "__").to_uppercase())
}

/// Convert an exposed key to its internal storage form.
///
/// # Errors
///
/// Returns [`crate::error::BaleError::InvalidUri`] when the key contains a
/// URI marker but the URI does not normalize.
pub fn key_for(exposed: &str) -> Result<String> {
    let key = if URI_MARKER.is_match(exposed) {
        normalize_uri(exposed)?
    } else {
        exposed.to_string()
    };
    Ok(generic_transform(&key))
}

/// Lookup-side variant of [`key_for`]: a key whose URI fails to normalize
/// falls back to the generic transform, so lookups never raise.
#[must_use]
pub fn key_for_lossy(exposed: &str) -> String {
    key_for(exposed).unwrap_or_else(|_| generic_transform(exposed))
}

/// Convert an internal key back to its exposed form.
///
/// Left inverse of [`key_for`] for keys without characters illegal in the
/// exposed form: strip the prefix, restore dots, lowercase.
#[must_use]
pub fn exposed_for(internal: &str) -> String {
    internal
        .strip_prefix(ENV_PREFIX)
        .unwrap_or(internal)
        .replace("__", ".")
        .to_lowercase()
}
