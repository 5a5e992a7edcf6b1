//! Command-line interface for the Adapt installer.
//!
//! Each subcommand lives in its own module with a clap `Args` struct and an
//! `execute` method taking the shared [`CommandContext`].
//!
//! # Commands
//!
//! - `check` - verify host prerequisites (git, node, npm)
//! - `deps` - consolidated third-party dependencies of the installed plugins
//! - `schemas` - configuration schemas shipped by the installed plugins
//! - `releases` - versions the checkout can be upgraded to
//! - `install` - clone and install the application
//! - `update` - move an installation to the newest candidate
//!
//! # Global Options
//!
//! - `--verbose` / `--quiet` - log level (overridden by `RUST_LOG`)
//! - `--config` - installer configuration file
//! - `--dir` - application checkout directory (default: current directory)
//!
//! ```bash
//! adapt-install check
//! adapt-install --dir /srv/adapt deps --json
//! adapt-install releases --branches --prereleases
//! adapt-install --dir /srv/adapt update --yes
//! ```

mod check;
pub mod common;
mod deps;
mod install;
mod releases;
mod schemas;
mod update;


pub use common::CommandContext;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Verbosity selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[must_use]
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn,adapt_installer=info",
            Self::Verbose => "debug",
        }
    }
}

/// Installer and updater for the Adapt authoring tool.
#[derive(Parser, Debug)]
#[command(
    name = "adapt-install",
    about = "Install, update and inspect an Adapt authoring tool installation",
    version,
    author
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the installer configuration file (default: $ADAPT_INSTALLER_CONFIG,
    /// then ~/.adapt/installer.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Application checkout directory
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that required host tools are installed.
    Check(check::CheckCommand),

    /// Show the consolidated dependencies of the installed plugins.
    Deps(deps::DepsCommand),

    /// Show the configuration schemas of the installed plugins.
    Schemas(schemas::SchemasCommand),

    /// List versions available to upgrade to.
    Releases(releases::ReleasesCommand),

    /// Clone the application and install its modules.
    Install(install::InstallCommand),

    /// Update an installation to the newest available version.
    Update(update::UpdateCommand),
}

impl Cli {
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        if self.verbose {
            Verbosity::Verbose
        } else if self.quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    /// Loads the configuration and runs the selected subcommand.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load(self.config.as_deref(), &self.dir).await?;

        match self.command {
            Commands::Check(cmd) => cmd.execute(&ctx).await,
            Commands::Deps(cmd) => cmd.execute(&ctx).await,
            Commands::Schemas(cmd) => cmd.execute(&ctx).await,
            Commands::Releases(cmd) => cmd.execute(&ctx).await,
            Commands::Install(cmd) => cmd.execute(&ctx).await,
            Commands::Update(cmd) => cmd.execute(&ctx).await,
        }
    }
}
