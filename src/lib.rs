//! `bale_rust`: the layered configuration store used by the `bale`
//! package manager CLI.
//!
//! The core lives in [`settings`]: key normalization, five-layer
//! precedence lookup, type coercion, URI-keyed per-source options, mirror
//! derivation, and file persistence. The `cli` module is a thin consumer
//! of that facade.

pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

pub use error::{BaleError, Result};
pub use settings::{InstallPath, Layer, Mirror, MirrorTable, Settings, Value};
