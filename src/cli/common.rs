//! Shared state for CLI commands.

use anyhow::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::InstallerConfig;

/// Configuration and target directory every command runs against.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: InstallerConfig,
    /// Application checkout directory (`--dir`).
    pub app_dir: PathBuf,
}

impl CommandContext {
    /// Loads the installer configuration; `config_path` overrides the lookup order.
    pub async fn load(config_path: Option<&str>, app_dir: &Path) -> Result<Self> {
        let config = InstallerConfig::load(config_path).await?;
        Ok(Self::new(config, app_dir))
    }

    pub fn new(config: InstallerConfig, app_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            app_dir: app_dir.into(),
        }
    }

    /// Installed-modules directory of the checkout.
    pub fn modules_path(&self) -> Result<PathBuf> {
        self.config.modules_path(&self.app_dir)
    }
}

/// Prints `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
