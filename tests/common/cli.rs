use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[derive(Debug)]
pub struct BaleRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

/// A throwaway project directory with its own `.bale` app dir and HOME,
/// so runs never touch the real user configuration.
pub struct BaleWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub app_dir: PathBuf,
    pub home: PathBuf,
}

impl BaleWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        let app_dir = root.join(".bale");
        fs::create_dir_all(&app_dir).expect("app dir");
        let home = root.join("home");
        fs::create_dir_all(&home).expect("home dir");
        Self {
            temp_dir,
            root,
            app_dir,
            home,
        }
    }

    /// Path of the project-local configuration file.
    pub fn local_config(&self) -> PathBuf {
        self.app_dir.join("config")
    }

    /// Path of the global configuration file under the workspace HOME.
    pub fn global_config(&self) -> PathBuf {
        self.home.join(".config").join("bale").join("config")
    }
}

pub fn run_bale<I, S>(workspace: &BaleWorkspace, args: I) -> BaleRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_bale_with_env(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
    )
}

pub fn run_bale_with_env<I, S, E, K, V>(workspace: &BaleWorkspace, args: I, env_vars: E) -> BaleRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bale"));
    cmd.current_dir(&workspace.root);
    cmd.env_clear();
    cmd.env("HOME", &workspace.home);
    cmd.env("RUST_BACKTRACE", "1");
    cmd.args(args);
    cmd.envs(env_vars);

    let output = cmd.output().expect("run bale");
    BaleRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
