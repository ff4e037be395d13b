//! Configuration management command.
//!
//! CLI access to the layered configuration store: show the merged view,
//! get/set/unset individual values, list the layers defining a key, and
//! show the file paths in use.

use crate::cli::ConfigCommands;
use crate::error::Result;
use crate::settings::{self, Settings, Value};
use serde_json::json;
use std::collections::BTreeMap;
use std::env;
use tracing::debug;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if configuration files cannot be read or a mutation
/// fails.
pub fn execute(command: &ConfigCommands, json_mode: bool) -> Result<()> {
    let environment: BTreeMap<String, String> = env::vars().collect();
    let root = settings::discover_app_dir(None);
    debug!(root = ?root, "resolved project root");
    let mut store = Settings::new(root.as_deref(), &environment)?;

    match command {
        ConfigCommands::List => list(&store, json_mode),
        ConfigCommands::Get { key } => get(&store, key, json_mode),
        ConfigCommands::Set {
            key,
            value,
            local,
            global,
        } => set(&mut store, key, value, *local, *global),
        ConfigCommands::Unset { key, local, global } => unset(&mut store, key, *local, *global),
        ConfigCommands::Locations { key } => locations(&store, key, json_mode),
        ConfigCommands::Path => paths(&store, json_mode),
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(value) => json!(value),
        Value::Number(value) => json!(value),
        Value::Array(values) => json!(values),
        Value::String(value) => json!(value),
    }
}

fn list(store: &Settings, json_mode: bool) -> Result<()> {
    let all = store.all();
    if json_mode {
        let object: serde_json::Map<String, serde_json::Value> = all
            .iter()
            .map(|(key, value)| (key.clone(), value_json(value)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
    } else {
        for (key, value) in &all {
            println!("{key}: {value}");
        }
    }
    Ok(())
}

fn get(store: &Settings, key: &str, json_mode: bool) -> Result<()> {
    let value = store.get(key);
    if json_mode {
        let value = value.as_ref().map_or(json!(null), value_json);
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "key": key, "value": value }))?
        );
    } else {
        match value {
            Some(value) => println!("{value}"),
            None => println!("You have not configured a value for `{key}`"),
        }
    }
    Ok(())
}

fn set(store: &mut Settings, key: &str, value: &str, local: bool, global: bool) -> Result<()> {
    let value = Some(Value::from(value));
    // --global is the default scope; clap rejects combining the flags.
    if local && !global {
        store.set_local(key, value)
    } else {
        store.set_global(key, value)
    }
}

fn unset(store: &mut Settings, key: &str, local: bool, global: bool) -> Result<()> {
    // With no scope flag, remove the key everywhere it could be set.
    let both = !local && !global;
    if local || (both && store.local_config_path().is_some()) {
        store.set_local(key, None)?;
    }
    if global || both {
        store.set_global(key, None)?;
    }
    Ok(())
}

fn locations(store: &Settings, key: &str, json_mode: bool) -> Result<()> {
    if json_mode {
        let object: serde_json::Map<String, serde_json::Value> = store
            .locations_for(key)
            .iter()
            .map(|(layer, raw)| (layer.label().to_string(), json!(raw)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
    } else {
        for line in store.pretty_values_for(key) {
            println!("{line}");
        }
    }
    Ok(())
}

fn paths(store: &Settings, json_mode: bool) -> Result<()> {
    let local = store
        .local_config_path()
        .map(|path| path.display().to_string());
    let global = store
        .global_config_path()
        .map(|path| path.display().to_string());
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "local": local, "global": global }))?
        );
    } else {
        println!("local: {}", local.as_deref().unwrap_or("(no project root)"));
        println!("global: {}", global.as_deref().unwrap_or("(unset)"));
    }
    Ok(())
}
