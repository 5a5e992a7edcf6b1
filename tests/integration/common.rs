//! Shared helpers for driving the binary.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An isolated installer configuration file.
pub struct TestConfig {
    _dir: TempDir,
    path: PathBuf,
}

impl TestConfig {
    /// Defaults only.
    pub fn empty() -> Self {
        Self::with_content("")
    }

    pub fn with_content(content: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("installer.toml");
        std::fs::write(&path, content).unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `adapt-install --dir <app_dir> --config <config>` with a clean environment.
pub fn adapt_install(app_dir: &Path, config: &TestConfig) -> Command {
    let mut cmd = Command::cargo_bin("adapt-install").unwrap();
    cmd.arg("--dir")
        .arg(app_dir)
        .arg("--config")
        .arg(config.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("ADAPT_INSTALLER_CONFIG")
        .env_remove("ADAPT_INSTALLER_USERNAME")
        .env_remove("ADAPT_INSTALLER_TOKEN");
    cmd
}

/// Runs the command, asserts success and parses stdout as JSON.
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}
