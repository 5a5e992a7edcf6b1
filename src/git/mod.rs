//! Git operations on the application checkout.
//!
//! The installer shells out to the system `git` binary (through
//! [`command_builder::GitCommand`]) rather than linking a git library, so
//! user-level configuration such as credential helpers and proxies applies.
//!
//! [`GitRepo`] wraps a checkout directory and offers the handful of operations
//! installing and updating need: clone, fetch, checkout and last-commit-date.
//! [`LocalGit`] adapts that last operation to the release selector's
//! [`CommitDateSource`](crate::releases::CommitDateSource) seam.

pub mod command_builder;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::InstallerError;
use crate::releases::CommitDateSource;
use command_builder::GitCommand;

/// A local git checkout.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Clones `url` into `target`, streaming git's progress to the terminal.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        GitCommand::clone(url, target)
            .execute_success()
            .await
            .with_context(|| format!("Failed to clone {url} into {}", target.display()))?;
        Ok(Self::new(target))
    }

    /// Fetches branches and tags from `origin`.
    pub async fn fetch(&self) -> Result<()> {
        GitCommand::fetch()
            .current_dir(&self.path)
            .execute_success()
            .await
            .with_context(|| format!("Failed to fetch in {}", self.path.display()))
    }

    /// Checks out a tag or branch.
    ///
    /// Branches are reset to their `origin` counterpart so an update always
    /// lands on the remote head.
    pub async fn checkout(&self, ref_name: &str) -> Result<()> {
        let remote_ref = format!("origin/{ref_name}");
        let is_remote_branch = GitCommand::verify_ref(&remote_ref)
            .current_dir(&self.path)
            .execute_success()
            .await
            .is_ok();

        let cmd = if is_remote_branch {
            debug!("Checking out branch {} from {}", ref_name, remote_ref);
            GitCommand::checkout_branch(ref_name, &remote_ref)
        } else {
            GitCommand::checkout(&format!("tags/{ref_name}"))
        };

        cmd.current_dir(&self.path)
            .execute_success()
            .await
            .with_context(|| format!("Failed to check out '{ref_name}'"))
    }

    /// Committer date of `HEAD`.
    pub async fn last_commit_date(&self) -> Result<DateTime<Utc>> {
        let output = GitCommand::new()
            .args(["log", "-1", "--format=%cI"])
            .current_dir(&self.path)
            .execute_stdout()
            .await?;

        DateTime::parse_from_rfc3339(&output)
            .map(|date| date.with_timezone(&Utc))
            .with_context(|| format!("Unexpected commit date from git: '{output}'"))
    }
}

/// Checks whether `path` contains a `.git` directory (or gitfile).
#[must_use]
pub fn is_valid_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Returns an error if `git` cannot be executed.
pub async fn ensure_git_available() -> Result<()> {
    GitCommand::new()
        .arg("--version")
        .execute_success()
        .await
        .map_err(|e| match e.downcast::<InstallerError>() {
            Ok(InstallerError::GitNotFound) | Err(_) => InstallerError::GitNotFound.into(),
            Ok(other) => other.into(),
        })
}

/// [`CommitDateSource`] backed by the local git checkout.
///
/// Any failure (not a checkout, git missing, unparsable output) is logged and
/// reported as an unknown date.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGit;

impl CommitDateSource for LocalGit {
    async fn last_commit_date(&self, cwd: &Path) -> Option<DateTime<Utc>> {
        if !is_valid_git_repo(cwd) {
            debug!("{} is not a git checkout; no commit date", cwd.display());
            return None;
        }

        match GitRepo::new(cwd).last_commit_date().await {
            Ok(date) => Some(date),
            Err(e) => {
                warn!("Could not read last commit date in {}: {}", cwd.display(), e);
                None
            }
        }
    }
}
