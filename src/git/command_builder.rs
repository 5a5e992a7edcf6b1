//! Builder for git subprocess invocations.
//!
//! Every git call goes through [`GitCommand`] so that working directory,
//! timeouts, logging and error mapping are handled the same way everywhere.
//!
//! ```rust,no_run
//! use adapt_installer::git::command_builder::GitCommand;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let output = GitCommand::new()
//!     .args(["log", "-1", "--format=%cI"])
//!     .current_dir("/srv/adapt")
//!     .execute()
//!     .await?;
//! println!("last commit: {}", output.stdout.trim());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::constants::{
    GIT_CHECKOUT_TIMEOUT, GIT_CLONE_TIMEOUT, GIT_FETCH_TIMEOUT, GIT_QUERY_TIMEOUT,
};
use crate::core::InstallerError;
use crate::utils::platform::get_git_command;

/// A git command under construction.
#[derive(Debug, Clone)]
pub struct GitCommand {
    args: Vec<String>,

    /// Passed to git as `-C <dir>` rather than changing the process directory.
    current_dir: Option<PathBuf>,

    /// When false, output goes straight to the terminal (used for clone progress).
    capture_output: bool,

    timeout_duration: Option<Duration>,

    /// Operation name used in logs and errors; defaults to the git subcommand.
    context: Option<String>,
}

impl Default for GitCommand {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            current_dir: None,
            capture_output: true,
            timeout_duration: Some(GIT_QUERY_TIMEOUT),
            context: None,
        }
    }
}

/// Captured output of a successful git command.
#[derive(Debug, Clone)]
pub struct GitCommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl GitCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub const fn inherit_stdio(mut self) -> Self {
        self.capture_output = false;
        self
    }

    pub const fn with_timeout(mut self, duration: Option<Duration>) -> Self {
        self.timeout_duration = duration;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Full argument list passed to git, including `-C <dir>`.
    fn command_line(&self) -> Vec<String> {
        let mut line = Vec::with_capacity(self.args.len() + 2);
        if let Some(dir) = &self.current_dir {
            line.push("-C".to_string());
            line.push(dir.display().to_string());
        }
        line.extend(self.args.iter().cloned());
        line
    }

    /// Runs the command, failing if git exits unsuccessfully or times out.
    pub async fn execute(self) -> Result<GitCommandOutput> {
        let line = self.command_line();
        let shown = line.join(" ");
        let operation = self.context.clone().or_else(|| self.args.first().cloned());
        let operation = operation.unwrap_or_else(|| "git".to_string());
        debug!(target: "git", "[{}] git {}", operation, shown);

        let (stdout, stderr) = if self.capture_output {
            (Stdio::piped(), Stdio::piped())
        } else {
            (Stdio::inherit(), Stdio::inherit())
        };
        let mut cmd = Command::new(get_git_command());
        cmd.args(&line)
            .stdout(stdout)
            .stderr(stderr)
            .env("GIT_TERMINAL_PROMPT", "0");

        let spawned = match self.timeout_duration {
            None => cmd.output().await,
            Some(limit) => timeout(limit, cmd.output()).await.map_err(|_| {
                warn!(target: "git", "git {} gave up after {}s", shown, limit.as_secs());
                InstallerError::GitCommand {
                    operation: operation.clone(),
                    stderr: format!("timed out after {}s: git {shown}", limit.as_secs()),
                }
            })?,
        };

        let output = match spawned {
            Ok(output) => output,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InstallerError::GitNotFound.into());
            }
            Err(e) => return Err(e).with_context(|| format!("Could not run git {shown}")),
        };

        let result = GitCommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if output.status.success() {
            return Ok(result);
        }

        debug!(target: "git", "[{}] exited with {:?}: {}", operation, output.status.code(), result.stderr.trim());
        Err(InstallerError::GitCommand {
            operation,
            stderr: result.stderr,
        }
        .into())
    }

    /// Runs the command and returns trimmed stdout.
    pub async fn execute_stdout(self) -> Result<String> {
        Ok(self.execute().await?.stdout.trim().to_string())
    }

    /// Runs the command, discarding its output.
    pub async fn execute_success(self) -> Result<()> {
        self.execute().await.map(|_| ())
    }

    /// `git clone --progress <url> <target>`, streaming progress to the terminal.
    pub fn clone(url: &str, target: impl AsRef<Path>) -> Self {
        Self::new()
            .args(["clone", "--progress", url])
            .arg(target.as_ref().display().to_string())
            .inherit_stdio()
            .with_timeout(Some(GIT_CLONE_TIMEOUT))
            .with_context("clone")
    }

    /// `git fetch --tags --prune origin`.
    pub fn fetch() -> Self {
        Self::new()
            .args(["fetch", "--tags", "--prune", "origin"])
            .with_timeout(Some(GIT_FETCH_TIMEOUT))
            .with_context("fetch")
    }

    /// `git checkout <ref>`.
    pub fn checkout(ref_name: &str) -> Self {
        Self::new().args(["checkout", ref_name]).with_timeout(Some(GIT_CHECKOUT_TIMEOUT))
    }

    /// `git checkout -B <branch> <start>`, resetting a local branch to `start`.
    pub fn checkout_branch(branch: &str, start: &str) -> Self {
        Self::new()
            .args(["checkout", "-B", branch, start])
            .with_timeout(Some(GIT_CHECKOUT_TIMEOUT))
    }

    /// `git rev-parse --verify --quiet <ref>`.
    pub fn verify_ref(ref_name: &str) -> Self {
        Self::new().args(["rev-parse", "--verify", "--quiet", ref_name])
    }
}
