//! Host prerequisite checks.
//!
//! Each configured tool must be on `PATH` and its `--version` output must
//! satisfy the configured semver range. Version strings are coerced first, so
//! `git version 2.39.3 (Apple Git-146)` reads as `2.39.3` and `v20.11` as
//! `20.11.0`.

use futures::future::join_all;
use regex::Regex;
use semver::{Version, VersionReq};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::debug;

use crate::constants::GIT_QUERY_TIMEOUT;
use crate::core::InstallerError;

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version pattern is valid")
});

/// Outcome of checking one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteReport {
    pub tool: String,
    pub required: String,
    /// Location on `PATH`, if found.
    pub path: Option<PathBuf>,
    /// Installed version, if it could be determined.
    pub found: Option<Version>,
    pub satisfied: bool,
}

impl PrerequisiteReport {
    /// Converts an unsatisfied report into an error.
    pub fn into_result(self) -> Result<Self, InstallerError> {
        if self.satisfied {
            return Ok(self);
        }
        let found = match (&self.path, &self.found) {
            (None, _) => "not installed".to_string(),
            (Some(_), None) => "version unknown".to_string(),
            (Some(_), Some(version)) => format!("found {version}"),
        };
        Err(InstallerError::PrerequisiteNotMet {
            tool: self.tool,
            required: self.required,
            found,
        })
    }
}

/// Extracts the first `major.minor[.patch]` in `output` as a version.
pub fn coerce_version(output: &str) -> Option<Version> {
    let caps = VERSION_PATTERN.captures(output)?;
    let part = |i: usize| caps.get(i).map_or(Ok(0), |m| m.as_str().parse::<u64>());
    Some(Version::new(part(1).ok()?, part(2).ok()?, part(3).ok()?))
}

/// Checks a single tool against `required`.
///
/// # Errors
///
/// Only an unparsable `required` range is an error; a missing or outdated
/// tool is reported through [`PrerequisiteReport::satisfied`].
pub async fn check_tool(tool: &str, required: &str) -> Result<PrerequisiteReport, InstallerError> {
    let requirement = VersionReq::parse(required)?;

    let Ok(path) = which::which(tool) else {
        debug!("{} not found on PATH", tool);
        return Ok(PrerequisiteReport {
            tool: tool.to_string(),
            required: required.to_string(),
            path: None,
            found: None,
            satisfied: false,
        });
    };

    let found = installed_version(&path).await;
    debug!("{} at {} reports {:?}", tool, path.display(), found);

    let satisfied = match &found {
        Some(version) => requirement.matches(version),
        // A wildcard only asks for presence.
        None => requirement == VersionReq::STAR,
    };

    Ok(PrerequisiteReport {
        tool: tool.to_string(),
        required: required.to_string(),
        path: Some(path),
        found,
        satisfied,
    })
}

async fn installed_version(path: &Path) -> Option<Version> {
    let output =
        tokio::time::timeout(GIT_QUERY_TIMEOUT, Command::new(path).arg("--version").output())
            .await
            .ok()?
            .ok()?;
    if !output.status.success() {
        return None;
    }
    coerce_version(&String::from_utf8_lossy(&output.stdout))
}

/// Checks every configured prerequisite concurrently; reports are ordered by tool name.
pub async fn check_all(
    prerequisites: &BTreeMap<String, String>,
) -> Result<Vec<PrerequisiteReport>, InstallerError> {
    join_all(prerequisites.iter().map(|(tool, range)| check_tool(tool, range)))
        .await
        .into_iter()
        .collect()
}
