//! End-to-end tests for `bale config` driven through the binary.

mod common;
use common::cli::{BaleWorkspace, run_bale, run_bale_with_env};
use std::fs;

#[test]
fn get_falls_back_to_compiled_default() {
    let workspace = BaleWorkspace::new();
    let run = run_bale(&workspace, ["config", "get", "timeout"]);
    assert!(run.status.success(), "stderr: {}", run.stderr);
    assert_eq!(run.stdout.trim(), "10");
}

#[test]
fn set_global_then_get() {
    let workspace = BaleWorkspace::new();
    let set = run_bale(&workspace, ["config", "set", "timeout", "20"]);
    assert!(set.status.success(), "stderr: {}", set.stderr);
    assert!(workspace.global_config().is_file());

    let get = run_bale(&workspace, ["config", "get", "timeout"]);
    assert_eq!(get.stdout.trim(), "20");
}

#[test]
fn explicit_global_flag_writes_the_global_file() {
    let workspace = BaleWorkspace::new();
    let set = run_bale(&workspace, ["config", "set", "--global", "timeout", "40"]);
    assert!(set.status.success(), "stderr: {}", set.stderr);
    assert!(workspace.global_config().is_file());
    assert!(!workspace.local_config().exists());

    let get = run_bale(&workspace, ["config", "get", "timeout"]);
    assert_eq!(get.stdout.trim(), "40");
}

#[test]
fn local_shadows_global() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "retry", "7"]);
    run_bale(&workspace, ["config", "set", "--local", "retry", "2"]);

    let get = run_bale(&workspace, ["config", "get", "retry"]);
    assert_eq!(get.stdout.trim(), "2");
    assert!(workspace.local_config().is_file());
}

#[test]
fn env_shadows_global_but_not_local() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "jobs", "2"]);

    let get = run_bale_with_env(&workspace, ["config", "get", "jobs"], [("BALE_JOBS", "4")]);
    assert_eq!(get.stdout.trim(), "4");

    run_bale(&workspace, ["config", "set", "--local", "jobs", "8"]);
    let get = run_bale_with_env(&workspace, ["config", "get", "jobs"], [("BALE_JOBS", "4")]);
    assert_eq!(get.stdout.trim(), "8");
}

#[test]
fn unset_restores_default() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "timeout", "20"]);
    let unset = run_bale(&workspace, ["config", "unset", "timeout"]);
    assert!(unset.status.success(), "stderr: {}", unset.stderr);

    let get = run_bale(&workspace, ["config", "get", "timeout"]);
    assert_eq!(get.stdout.trim(), "10");
}

#[test]
fn array_values_roundtrip_through_the_cli() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "with", "development:test"]);

    let get = run_bale(&workspace, ["config", "get", "with"]);
    assert_eq!(get.stdout.trim(), "[development, test]");
}

#[test]
fn list_shows_configured_keys() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "frozen", "true"]);
    run_bale(&workspace, ["config", "set", "--local", "retry", "2"]);

    let list = run_bale(&workspace, ["config", "list"]);
    assert!(list.stdout.contains("frozen: true"), "stdout: {}", list.stdout);
    assert!(list.stdout.contains("retry: 2"), "stdout: {}", list.stdout);
}

#[test]
fn locations_describes_each_layer() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "--local", "frozen", "true"]);

    let locations = run_bale_with_env(
        &workspace,
        ["config", "locations", "frozen"],
        [("BALE_FROZEN", "false")],
    );
    assert!(
        locations.stdout.contains("Set for your local app ("),
        "stdout: {}",
        locations.stdout
    );
    assert!(
        locations.stdout.contains("Set via BALE_FROZEN: \"false\""),
        "stdout: {}",
        locations.stdout
    );

    let unset = run_bale(&workspace, ["config", "locations", "clean"]);
    assert!(
        unset
            .stdout
            .contains("You have not configured a value for `clean`"),
        "stdout: {}",
        unset.stdout
    );
}

#[test]
fn path_reports_config_files() {
    let workspace = BaleWorkspace::new();
    let run = run_bale(&workspace, ["config", "path"]);
    assert!(run.status.success());
    assert!(run.stdout.contains(".bale"), "stdout: {}", run.stdout);
    assert!(run.stdout.contains(".config"), "stdout: {}", run.stdout);
}

#[test]
fn ignore_config_disables_file_layers() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "--local", "frozen", "true"]);

    let get = run_bale_with_env(
        &workspace,
        ["config", "get", "frozen"],
        [("BALE_IGNORE_CONFIG", "1")],
    );
    assert!(
        get.stdout
            .contains("You have not configured a value for `frozen`"),
        "stdout: {}",
        get.stdout
    );
}

#[test]
fn bale_config_env_overrides_global_path() {
    let workspace = BaleWorkspace::new();
    let custom = workspace.root.join("custom-config");
    fs::write(&custom, "BALE_RETRY: \"9\"\n").expect("write custom config");

    let get = run_bale_with_env(
        &workspace,
        ["config", "get", "retry"],
        [("BALE_CONFIG", custom.to_str().expect("utf8 path"))],
    );
    assert_eq!(get.stdout.trim(), "9");
}

#[test]
fn legacy_file_format_is_tolerated() {
    let workspace = BaleWorkspace::new();
    fs::write(
        workspace.local_config(),
        "BALE_TIMEOUT: ! '25'\nBALE_PATH: 'vendor/bale'\n",
    )
    .expect("write legacy config");

    let timeout = run_bale(&workspace, ["config", "get", "timeout"]);
    assert_eq!(timeout.stdout.trim(), "25");
    let path = run_bale(&workspace, ["config", "get", "path"]);
    assert_eq!(path.stdout.trim(), "vendor/bale");
}

#[test]
fn invalid_uri_key_fails_with_message() {
    let workspace = BaleWorkspace::new();
    let run = run_bale(
        &workspace,
        ["config", "set", "mirror.https://", "https://mirror.example"],
    );
    assert!(!run.status.success());
    assert!(
        run.stderr.contains("must be absolute"),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn mirror_roundtrip_through_cli() {
    let workspace = BaleWorkspace::new();
    let set = run_bale(
        &workspace,
        [
            "config",
            "set",
            "mirror.https://rubygems.org",
            "https://mirror.example",
        ],
    );
    assert!(set.status.success(), "stderr: {}", set.stderr);

    let get = run_bale(&workspace, ["config", "get", "mirror.https://rubygems.org"]);
    assert_eq!(get.stdout.trim(), "https://mirror.example");
}

#[test]
fn json_get_shape() {
    let workspace = BaleWorkspace::new();
    run_bale(&workspace, ["config", "set", "frozen", "true"]);

    let get = run_bale(&workspace, ["config", "--json", "get", "frozen"]);
    let parsed: serde_json::Value = serde_json::from_str(&get.stdout).expect("valid json");
    assert_eq!(parsed["key"], "frozen");
    assert_eq!(parsed["value"], true);
}
