//! Adapt installer
//!
//! Installs and updates an Adapt authoring tool checkout and inspects the
//! framework plugins installed in it.
//!
//! # Architecture Overview
//!
//! The library is organised around three read-only analyses of an installation
//! plus the side-effecting flows built on them:
//!
//! - **Tree scanning** ([`utils::fs::find_files`]) walks the installed-modules
//!   directory, following symlinks, and returns every file whose path ends
//!   with a given suffix.
//! - **Plugin inspection** ([`plugins`]) uses the scanner to find framework
//!   plugins (packages carrying the plugin marker file), collect their
//!   configuration schemas and merge their declared dependencies.
//! - **Release selection** ([`releases`]) ranks the versions on the remote
//!   host against the installed version and the checkout's last commit.
//! - **Install/update** ([`installer`]) clones or fetches with [`git`], checks
//!   out the chosen version and reinstalls modules with npm.
//!
//! # Core Modules
//!
//! - [`cli`] - `adapt-install` subcommands
//! - [`config`] - installer configuration (`~/.adapt/installer.toml`)
//! - [`core`] - error types and user-facing error formatting
//! - [`constants`] - file names, defaults and timeouts
//! - [`prerequisites`] - host tool version checks
//! - [`utils`] - filesystem discovery, JSON loading, platform helpers
//!
//! # Command-Line Usage
//!
//! ```bash
//! # Verify git, node and npm
//! adapt-install check
//!
//! # Inspect an installation
//! adapt-install --dir /srv/adapt deps
//! adapt-install --dir /srv/adapt schemas --json
//!
//! # Install, then later update
//! adapt-install --dir /srv/adapt install
//! adapt-install --dir /srv/adapt releases
//! adapt-install --dir /srv/adapt update --yes
//! ```
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use adapt_installer::plugins::collect_dependencies;
//! use std::path::Path;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let deps = collect_dependencies(Path::new("/srv/adapt/node_modules"), "adapt-authoring.json").await?;
//! for (name, spec) in deps.conflicts() {
//!     println!("{name}: {}", spec.specifiers().join(", "));
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod git;
pub mod installer;
pub mod plugins;
pub mod prerequisites;
pub mod releases;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
