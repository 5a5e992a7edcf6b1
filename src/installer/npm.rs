//! Running npm to (re)install the application's modules.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::constants::NPM_INSTALL_TIMEOUT;
use crate::core::InstallerError;
use crate::utils::platform::get_npm_command;

/// Picks `npm ci` when a lockfile pins the tree, `npm install` otherwise.
pub fn install_args(app_dir: &Path) -> &'static [&'static str] {
    if app_dir.join("package-lock.json").exists() {
        &["ci"]
    } else {
        &["install"]
    }
}

/// Installs the application's modules in `app_dir`, streaming npm's output.
pub async fn install_modules(app_dir: &Path) -> Result<()> {
    let args = install_args(app_dir);
    info!("Running npm {} in {}", args.join(" "), app_dir.display());

    let mut cmd = Command::new(get_npm_command());
    cmd.args(args)
        .current_dir(app_dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = match timeout(NPM_INSTALL_TIMEOUT, cmd.status()).await {
        Ok(Ok(status)) => status,
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InstallerError::PrerequisiteNotMet {
                tool: "npm".to_string(),
                required: "*".to_string(),
                found: "not installed".to_string(),
            }
            .into());
        }
        Ok(Err(e)) => return Err(e).context("Failed to run npm"),
        Err(_) => {
            anyhow::bail!(
                "npm {} did not finish within {} seconds",
                args.join(" "),
                NPM_INSTALL_TIMEOUT.as_secs()
            );
        }
    };

    debug!("npm exited with {:?}", status.code());
    if !status.success() {
        anyhow::bail!("npm {} failed with {}", args.join(" "), status);
    }
    Ok(())
}
