//! File system utilities.
//!
//! - [`discovery`]: concurrent recursive search for files by path suffix
//! - [`formats`]: JSON loading with path-carrying errors

pub mod discovery;
pub mod formats;

pub use discovery::find_files;
pub use formats::{read_json_file, read_text_file};
