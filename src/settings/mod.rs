//! Layered configuration store for `bale_rust`.
//!
//! Settings resolve across five sources, precedence high→low:
//! 1. Temporary (in-memory, command-scoped)
//! 2. Local (project file, `<root>/config`)
//! 3. Environment (`BALE_*` variables)
//! 4. Global (user file, `~/.config/bale/config` or `BALE_CONFIG`)
//! 5. Defaults (compiled in)
//!
//! The store is constructed from an explicit project root and environment
//! snapshot, so tests never need to mutate the process environment. Only
//! the temporary, local, and global layers are mutable; local and global
//! mutations write through to their backing file when the stored value
//! actually changes.

pub mod coerce;
pub mod file;
pub mod key;
pub mod mirror;
pub mod uri;

pub use coerce::{KeyClass, Value, classify};
pub use key::ENV_PREFIX;
pub use mirror::{Mirror, MirrorTable};

use crate::error::{BaleError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use url::Url;

/// Environment variable that replaces the global file path.
const GLOBAL_PATH_OVERRIDE: &str = "BALE_CONFIG";
/// Environment variable that, when truthy, disables both file layers.
const IGNORE_CONFIG: &str = "BALE_IGNORE_CONFIG";
/// Name of the per-project application directory.
const APP_DIR: &str = ".bale";
/// Filename of both the local and the global configuration file.
const CONFIG_FILE: &str = "config";

/// One precedence-ordered source of configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Temporary,
    Local,
    Env,
    Global,
    Default,
}

impl Layer {
    /// All layers, highest precedence first.
    pub const PRECEDENCE: [Self; 5] = [
        Self::Temporary,
        Self::Local,
        Self::Env,
        Self::Global,
        Self::Default,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Temporary => "temporary",
            Self::Local => "local",
            Self::Env => "env",
            Self::Global => "global",
            Self::Default => "default",
        }
    }
}

/// Install location policy resolved from `path`, `path.system`, and
/// `disable_shared_gems`. The first layer defining any of the three wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPath {
    pub explicit_path: Option<String>,
    pub system_path: bool,
    default_install_uses_path: bool,
}

impl InstallPath {
    #[must_use]
    pub fn use_system_packages(&self) -> bool {
        if self.system_path {
            return true;
        }
        if self.explicit_path.is_some() {
            return false;
        }
        !self.default_install_uses_path
    }

    /// Directory packages install into when not using the system location.
    #[must_use]
    pub fn base_path(&self) -> &str {
        self.explicit_path.as_deref().unwrap_or(APP_DIR)
    }
}

/// The layered configuration store and its public facade.
#[derive(Debug, Clone)]
pub struct Settings {
    root: Option<PathBuf>,
    local_path: Option<PathBuf>,
    global_path: Option<PathBuf>,
    temporary: BTreeMap<String, String>,
    local: BTreeMap<String, String>,
    env: BTreeMap<String, String>,
    global: BTreeMap<String, String>,
    defaults: BTreeMap<String, String>,
}

impl Settings {
    /// Build a store from an explicit project root and environment
    /// snapshot. The local and global files are loaded once, here.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be read.
    pub fn new(root: Option<&Path>, environment: &BTreeMap<String, String>) -> Result<Self> {
        let ignore_config = environment
            .get(IGNORE_CONFIG)
            .is_some_and(|value| coerce::to_bool(value));

        let local_path = root.map(|root| root.join(CONFIG_FILE));
        let global_path = global_config_path(environment);

        let local = file::load(local_path.as_deref(), ignore_config)?;
        let global = file::load(global_path.as_deref(), ignore_config)?;

        let env: BTreeMap<String, String> = environment
            .iter()
            .filter(|(name, _)| name.starts_with(ENV_PREFIX))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        trace!(
            local = local.len(),
            env = env.len(),
            global = global.len(),
            "settings loaded"
        );

        Ok(Self {
            root: root.map(Path::to_path_buf),
            local_path,
            global_path,
            temporary: BTreeMap::new(),
            local,
            env,
            global,
            defaults: default_layer(),
        })
    }

    /// Convenience constructor snapshotting the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file cannot be read.
    pub fn from_process_env(root: Option<&Path>) -> Result<Self> {
        let environment: BTreeMap<String, String> = env::vars().collect();
        Self::new(root, &environment)
    }

    /// The project root this store was built with, if any.
    #[must_use]
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path of the local configuration file, when a project root is known.
    #[must_use]
    pub fn local_config_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Path of the global configuration file, when determinable.
    #[must_use]
    pub fn global_config_path(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    // === Lookup ===

    /// Resolve a key to its typed effective value. The first layer (by
    /// precedence) that defines the key wins; an undefined key resolves
    /// to `None` (or an empty sequence for array keys). Lookup never
    /// fails.
    #[must_use]
    pub fn get(&self, exposed_key: &str) -> Option<Value> {
        let internal = key::key_for_lossy(exposed_key);
        let raw = self.raw_for(&internal);
        coerce::decode(raw, exposed_key)
    }

    fn raw_for(&self, internal: &str) -> Option<&str> {
        Layer::PRECEDENCE
            .iter()
            .find_map(|layer| self.layer_map(*layer).get(internal))
            .map(String::as_str)
    }

    const fn layer_map(&self, layer: Layer) -> &BTreeMap<String, String> {
        match layer {
            Layer::Temporary => &self.temporary,
            Layer::Local => &self.local,
            Layer::Env => &self.env,
            Layer::Global => &self.global,
            Layer::Default => &self.defaults,
        }
    }

    /// Raw values per layer for a key, in precedence order. No coercion.
    #[must_use]
    pub fn locations_for(&self, exposed_key: &str) -> BTreeMap<Layer, String> {
        let internal = key::key_for_lossy(exposed_key);
        Layer::PRECEDENCE
            .iter()
            .filter_map(|layer| {
                self.layer_map(*layer)
                    .get(&internal)
                    .map(|value| (*layer, value.clone()))
            })
            .collect()
    }

    /// Every exposed key present in the temporary, local, or global layer
    /// or as a `BALE_*` environment variable. Sorted.
    #[must_use]
    pub fn all_keys(&self) -> BTreeSet<String> {
        self.temporary
            .keys()
            .chain(self.local.keys())
            .chain(self.env.keys())
            .chain(self.global.keys())
            .map(|internal| key::exposed_for(internal))
            .collect()
    }

    /// The merged view: every key from [`Self::all_keys`] with its
    /// effective typed value.
    #[must_use]
    pub fn all(&self) -> BTreeMap<String, Value> {
        self.all_keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|value| (key, value)))
            .collect()
    }

    // === Mutation ===

    /// Write a key to the project-local file layer. `None` deletes.
    ///
    /// # Errors
    ///
    /// Fails with [`BaleError::ProjectRootMissing`] when no project root
    /// is known, with [`BaleError::InvalidUri`] for a bad URI key, or on
    /// file I/O errors.
    pub fn set_local(&mut self, exposed_key: &str, value: Option<Value>) -> Result<()> {
        if self.local_path.is_none() {
            return Err(BaleError::ProjectRootMissing);
        }
        self.set_key(exposed_key, value, Layer::Local)
    }

    /// Write a key to the user-global file layer. `None` deletes.
    ///
    /// # Errors
    ///
    /// Fails with [`BaleError::InvalidUri`] for a bad URI key or on file
    /// I/O errors.
    pub fn set_global(&mut self, exposed_key: &str, value: Option<Value>) -> Result<()> {
        self.set_key(exposed_key, value, Layer::Global)
    }

    /// Bulk-set the temporary layer, returning the previous raw values
    /// for the same keys so they can be restored.
    ///
    /// # Errors
    ///
    /// Fails with [`BaleError::InvalidUri`] for a bad URI key. Keys are
    /// validated up front, so an error leaves the layer untouched.
    pub fn set_temporary<I>(&mut self, mapping: I) -> Result<BTreeMap<String, Option<String>>>
    where
        I: IntoIterator<Item = (String, Option<Value>)>,
    {
        let entries = mapping
            .into_iter()
            .map(|(exposed_key, value)| Ok((key::key_for(&exposed_key)?, exposed_key, value)))
            .collect::<Result<Vec<_>>>()?;

        let mut previous = BTreeMap::new();
        for (internal, exposed_key, value) in entries {
            previous
                .entry(internal.clone())
                .or_insert_with(|| self.temporary.get(&internal).cloned());
            self.set_key(&exposed_key, value, Layer::Temporary)?;
        }
        Ok(previous)
    }

    /// Run `action` with the temporary layer overridden by `mapping`,
    /// restoring the previous temporary values afterwards, whether the
    /// action returns normally or panics.
    ///
    /// # Errors
    ///
    /// Fails with [`BaleError::InvalidUri`] for a bad URI key in the
    /// mapping; the action then never runs.
    pub fn with_temporary<I, R, F>(&mut self, mapping: I, action: F) -> Result<R>
    where
        I: IntoIterator<Item = (String, Option<Value>)>,
        F: FnOnce(&mut Self) -> R,
    {
        let previous = self.set_temporary(mapping)?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(&mut *self)));
        self.restore_temporary(previous);
        match outcome {
            Ok(result) => Ok(result),
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn restore_temporary(&mut self, previous: BTreeMap<String, Option<String>>) {
        for (internal, raw) in previous {
            match raw {
                Some(raw) => {
                    self.temporary.insert(internal, raw);
                }
                None => {
                    self.temporary.remove(&internal);
                }
            }
        }
    }

    /// Record a per-command option: into the temporary layer when the
    /// `forget_cli_options` setting is truthy, otherwise persisted into
    /// the local file layer.
    ///
    /// # Errors
    ///
    /// Propagates the underlying mutation error.
    pub fn set_command_option(&mut self, exposed_key: &str, value: Option<Value>) -> Result<()> {
        if self.get("forget_cli_options") == Some(Value::Bool(true)) {
            self.set_temporary([(exposed_key.to_string(), value)])?;
            Ok(())
        } else {
            self.set_local(exposed_key, value)
        }
    }

    /// Like [`Self::set_command_option`], but a no-op when the option was
    /// not given on the command line.
    ///
    /// # Errors
    ///
    /// Propagates the underlying mutation error.
    pub fn set_command_option_if_given(
        &mut self,
        exposed_key: &str,
        value: Option<Value>,
    ) -> Result<()> {
        match value {
            None => Ok(()),
            Some(value) => self.set_command_option(exposed_key, Some(value)),
        }
    }

    /// Shared write path: encode, normalize, compare, mutate, persist.
    /// Writing the already-stored value is a no-op with no file write.
    fn set_key(&mut self, exposed_key: &str, value: Option<Value>, layer: Layer) -> Result<()> {
        let raw = value.and_then(|value| value.to_raw());
        let internal = key::key_for(exposed_key)?;

        let map = match layer {
            Layer::Temporary => &mut self.temporary,
            Layer::Local => &mut self.local,
            Layer::Global => &mut self.global,
            Layer::Env | Layer::Default => {
                return Err(BaleError::Config(format!(
                    "layer '{}' is read-only",
                    layer.label()
                )));
            }
        };

        if map.get(&internal).map(String::as_str) == raw.as_deref() {
            trace!(key = %internal, layer = layer.label(), "unchanged, skipping");
            return Ok(());
        }
        match raw {
            Some(raw) => {
                map.insert(internal.clone(), raw);
            }
            None => {
                map.remove(&internal);
            }
        }
        debug!(key = %internal, layer = layer.label(), "setting updated");

        match layer {
            Layer::Local => {
                if let Some(path) = &self.local_path {
                    file::save(path, &self.local)?;
                }
            }
            Layer::Global => {
                if let Some(path) = &self.global_path {
                    file::save(path, &self.global)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // === Facade helpers ===

    /// Credentials configured for a URI: the value stored under the full
    /// URI, else the value stored under its host.
    #[must_use]
    pub fn credentials_for(&self, uri: &str) -> Option<String> {
        if let Some(Value::String(credentials)) = self.get(uri) {
            return Some(credentials);
        }
        let host = Url::parse(uri).ok()?.host_str()?.to_string();
        match self.get(&host) {
            Some(Value::String(credentials)) => Some(credentials),
            _ => None,
        }
    }

    /// Derive the mirror table from every `mirror.`-prefixed key.
    #[must_use]
    pub fn mirrors(&self) -> MirrorTable {
        let mut table = MirrorTable::default();
        for exposed_key in self.all_keys() {
            let Some(rest) = exposed_key.strip_prefix("mirror.") else {
                continue;
            };
            // Raw values, so a fallback_timeout of "false" is not eaten
            // by the literal-false boolean rule.
            let internal = key::key_for_lossy(&exposed_key);
            let Some(value) = self.raw_for(&internal) else {
                continue;
            };
            let value = value.to_string();
            if let Some(source) = rest.strip_suffix(".fallback_timeout") {
                table.record_fallback_timeout(source, &value);
            } else {
                table.record_uri(rest, &value);
            }
        }
        table
    }

    /// The effective source URI once mirrors apply: the configured mirror
    /// for `uri`, or `uri` itself.
    #[must_use]
    pub fn mirror_for(&self, uri: &str) -> String {
        self.mirrors().uri_for(uri)
    }

    /// Per-repository overrides: every `local.<name>` setting, keyed by
    /// name.
    #[must_use]
    pub fn local_overrides(&self) -> BTreeMap<String, String> {
        self.all_keys()
            .into_iter()
            .filter_map(|key| {
                let name = key.strip_prefix("local.")?.to_string();
                match self.get(&key) {
                    Some(Value::String(value)) => Some((name, value)),
                    _ => None,
                }
            })
            .collect()
    }

    /// Human-readable description of where a key is set, one line per
    /// defining layer, highest precedence first.
    #[must_use]
    pub fn pretty_values_for(&self, exposed_key: &str) -> Vec<String> {
        let internal = key::key_for_lossy(exposed_key);
        let mut lines = Vec::new();
        if let Some(value) = self.temporary.get(&internal) {
            lines.push(format!("Set for the current command: {value:?}"));
        }
        if let (Some(value), Some(path)) = (self.local.get(&internal), &self.local_path) {
            lines.push(format!(
                "Set for your local app ({}): {value:?}",
                path.display()
            ));
        }
        if let Some(value) = self.env.get(&internal) {
            lines.push(format!("Set via {internal}: {value:?}"));
        }
        if let (Some(value), Some(path)) = (self.global.get(&internal), &self.global_path) {
            lines.push(format!("Set for the user ({}): {value:?}", path.display()));
        }
        if lines.is_empty() {
            lines.push(format!(
                "You have not configured a value for `{exposed_key}`"
            ));
        }
        lines
    }

    /// Resolve the install location policy. The first layer that defines
    /// any of `path`, `path.system`, or `disable_shared_gems` decides.
    #[must_use]
    pub fn install_path(&self) -> InstallPath {
        let default_install_uses_path =
            self.get("default_install_uses_path") == Some(Value::Bool(true));
        let path_key = key::key_for_lossy("path");
        let system_key = key::key_for_lossy("path.system");
        let shared_key = key::key_for_lossy("disable_shared_gems");

        for layer in Layer::PRECEDENCE {
            let map = self.layer_map(layer);
            let explicit = map.get(&path_key);
            let system = map.get(&system_key);
            let shared = map.get(&shared_key);
            if explicit.is_none() && system.is_none() && shared.is_none() {
                continue;
            }
            let system_path = system.map_or_else(
                || shared.is_some_and(|raw| !coerce::to_bool(raw)),
                |raw| coerce::to_bool(raw),
            );
            return InstallPath {
                explicit_path: explicit.cloned(),
                system_path,
                default_install_uses_path,
            };
        }
        InstallPath {
            explicit_path: None,
            system_path: false,
            default_install_uses_path,
        }
    }

    /// Whether escalating to sudo for installs is acceptable: it is not
    /// once an install path is pinned by the command or the local file.
    #[must_use]
    pub fn allow_sudo(&self) -> bool {
        let path_key = key::key_for_lossy("path");
        !(self.temporary.contains_key(&path_key) || self.local.contains_key(&path_key))
    }

    /// Directory the application caches packages in.
    #[must_use]
    pub fn app_cache_path(&self) -> String {
        match self.get("cache_path") {
            Some(Value::String(path)) => path,
            _ => "vendor/cache".to_string(),
        }
    }
}

/// Compiled-in defaults, the lowest-precedence layer.
fn default_layer() -> BTreeMap<String, String> {
    [("redirect", "5"), ("retry", "3"), ("timeout", "10")]
        .into_iter()
        .map(|(key, value)| (format!("{ENV_PREFIX}{}", key.to_uppercase()), value.to_string()))
        .collect()
}

fn global_config_path(environment: &BTreeMap<String, String>) -> Option<PathBuf> {
    if let Some(path) = environment.get(GLOBAL_PATH_OVERRIDE) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    let home = environment.get("HOME").filter(|home| !home.trim().is_empty())?;
    Some(
        Path::new(home)
            .join(".config")
            .join("bale")
            .join(CONFIG_FILE),
    )
}

/// Discover the active `.bale` directory by walking up from `start` (or
/// the current directory). Returns `None` outside a project.
#[must_use]
pub fn discover_app_dir(start: Option<&Path>) -> Option<PathBuf> {
    let mut current = match start {
        Some(path) => path.to_path_buf(),
        None => env::current_dir().ok()?,
    };
    loop {
        let candidate = current.join(APP_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}
