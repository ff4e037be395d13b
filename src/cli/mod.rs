//! CLI definitions and entry point.

use clap::{Parser, Subcommand};

pub mod commands;

/// Layered configuration store for the bale package manager
#[derive(Parser, Debug)]
#[command(name = "bale", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show every configured key with its effective value
    List,

    /// Show the effective value of one key
    Get {
        /// Setting name (dotted, e.g. timeout or mirror.https://…)
        key: String,
    },

    /// Set a key in the global (default) or local configuration file
    Set {
        /// Setting name
        key: String,

        /// Raw value to store
        value: String,

        /// Write to the project-local file instead of the global one
        #[arg(long, conflicts_with = "global")]
        local: bool,

        /// Write to the user-global file (the default)
        #[arg(long)]
        global: bool,
    },

    /// Remove a key from the local and/or global configuration file
    Unset {
        /// Setting name
        key: String,

        /// Only remove from the project-local file
        #[arg(long, conflicts_with = "global")]
        local: bool,

        /// Only remove from the user-global file
        #[arg(long)]
        global: bool,
    },

    /// Show every layer that defines a key
    Locations {
        /// Setting name
        key: String,
    },

    /// Show the configuration file paths in use
    Path,
}
