//! Utility modules shared across the installer.
//!
//! - [`fs`] - recursive discovery and JSON loading
//! - [`platform`] - executable names and path expansion

pub mod fs;
pub mod platform;

pub use fs::{find_files, read_json_file};
pub use platform::{get_git_command, get_home_dir, get_npm_command, is_windows, resolve_path};
