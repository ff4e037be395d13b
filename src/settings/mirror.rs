//! Mirror table derived from `mirror.`-prefixed settings.
//!
//! A key `mirror.<uri>` maps a source URI to a replacement URI; a key
//! `mirror.<uri>.fallback_timeout` attaches a per-URI probe timeout.
//! The table is keyed by the normalized source URI. Scanning follows
//! `all_keys()` order, which is sorted, so duplicate sources resolve
//! deterministically (last key in sort order wins).

use crate::settings::uri::normalize_uri;
use std::collections::BTreeMap;
use std::time::Duration;

/// Probe timeout used when `fallback_timeout` is set to a bare `true`.
const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(100);

/// A configured replacement source for one URI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mirror {
    /// Replacement URI, verbatim as configured.
    pub uri: Option<String>,
    /// Probe timeout before falling back to the original source.
    pub fallback_timeout: Option<Duration>,
}

/// All configured mirrors, keyed by normalized source URI.
#[derive(Debug, Clone, Default)]
pub struct MirrorTable {
    entries: BTreeMap<String, Mirror>,
}

impl MirrorTable {
    /// Record the replacement URI for a source. Sources that fail to
    /// normalize are skipped rather than raised, since the table is built
    /// from lookups.
    pub(crate) fn record_uri(&mut self, source_uri: &str, mirror_uri: &str) {
        if let Ok(key) = normalize_uri(source_uri) {
            self.entries.entry(key).or_default().uri = Some(mirror_uri.to_string());
        }
    }

    /// Record the fallback timeout for a source.
    pub(crate) fn record_fallback_timeout(&mut self, source_uri: &str, value: &str) {
        if let Ok(key) = normalize_uri(source_uri) {
            let timeout = match value {
                "true" => Some(DEFAULT_FALLBACK_TIMEOUT),
                "false" => Some(Duration::ZERO),
                other => Some(Duration::from_secs(
                    u64::try_from(crate::settings::coerce::lenient_int(other)).unwrap_or(0),
                )),
            };
            self.entries.entry(key).or_default().fallback_timeout = timeout;
        }
    }

    /// Look up the mirror entry for a source URI.
    #[must_use]
    pub fn mirror_for(&self, uri: &str) -> Option<&Mirror> {
        let key = normalize_uri(uri).ok()?;
        self.entries.get(&key)
    }

    /// The effective URI for a source: its configured mirror, or the
    /// source itself when no mirror applies.
    #[must_use]
    pub fn uri_for(&self, uri: &str) -> String {
        self.mirror_for(uri)
            .and_then(|mirror| mirror.uri.clone())
            .unwrap_or_else(|| uri.to_string())
    }

    /// Iterate entries in normalized-source order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Mirror)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
