//! Platform-specific helpers: executable names and home-relative paths.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Checks if the current platform is Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Gets the home directory path for the current user.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        let platform_help = if is_windows() {
            "On Windows: Check that the USERPROFILE environment variable is set"
        } else {
            "On Unix/Linux: Check that the HOME environment variable is set"
        };
        anyhow::anyhow!("Could not determine home directory.\n\n{platform_help}")
    })
}

/// Name of the git executable.
#[must_use]
pub const fn get_git_command() -> &'static str {
    if is_windows() {
        "git.exe"
    } else {
        "git"
    }
}

/// Name of the npm executable. On Windows npm ships as a batch shim.
#[must_use]
pub const fn get_npm_command() -> &'static str {
    if is_windows() {
        "npm.cmd"
    } else {
        "npm"
    }
}

/// Expands `~/` and `$VAR` references in a path taken from configuration.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is unset or the
/// home directory cannot be determined.
pub fn resolve_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path: {path}"))?;

    Ok(PathBuf::from(expanded.into_owned()))
}
