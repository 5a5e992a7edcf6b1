//! Configuration management for the installer.
//!
//! Settings come from a single TOML file, resolved in this order:
//!
//! 1. `--config <path>` on the command line
//! 2. the `ADAPT_INSTALLER_CONFIG` environment variable
//! 3. `~/.adapt/installer.toml` (`%LOCALAPPDATA%\adapt\installer.toml` on Windows)
//!
//! A missing default file is not an error; built-in defaults apply. Every key
//! is optional:
//!
//! ```toml
//! repository = "adapt-security/adapt-authoring"
//! api_url = "https://api.github.com"
//! modules_dir = "node_modules"
//! plugin_marker = "adapt-authoring.json"
//! schema_file = "conf/config.schema.json"
//! request_timeout_secs = 30
//!
//! [prerequisites]
//! git = "*"
//! node = ">=18"
//! npm = ">=8"
//!
//! [credentials]
//! username = "octocat"
//! token = "ghp_xxxxxxxxxxxx"
//! ```
//!
//! Credentials can also be supplied through `ADAPT_INSTALLER_USERNAME` and
//! `ADAPT_INSTALLER_TOKEN`, which take precedence over the file.

mod installer;

pub use installer::{
    CONFIG_ENV_VAR, Credentials, InstallerConfig, TOKEN_ENV_VAR, USERNAME_ENV_VAR,
};
