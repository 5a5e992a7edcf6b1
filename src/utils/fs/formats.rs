//! JSON loading for package manifests and configuration schemas.
//!
//! Read failures are reported as [`InstallerError::DiscoveryIo`] and parse
//! failures as [`InstallerError::ManifestParse`], both carrying the file path.

use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

use crate::core::InstallerError;

/// Reads a file as UTF-8 text.
pub async fn read_text_file(path: &Path) -> Result<String, InstallerError> {
    fs::read_to_string(path).await.map_err(|e| InstallerError::discovery_io(path, e))
}

/// Reads and deserializes a JSON file.
///
/// # Errors
///
/// - [`InstallerError::DiscoveryIo`] if the file cannot be read
/// - [`InstallerError::ManifestParse`] if the content is not valid JSON for `T`
pub async fn read_json_file<T>(path: &Path) -> Result<T, InstallerError>
where
    T: DeserializeOwned,
{
    let content = read_text_file(path).await?;
    serde_json::from_str(&content).map_err(|e| InstallerError::manifest_parse(path, e))
}
