//! Collection of plugin configuration schemas.
//!
//! Every plugin that accepts configuration ships a JSON schema at a fixed
//! location inside its package (by default `conf/config.schema.json`). The
//! package root is found by walking up as many levels as the schema path has
//! components, so `<pkg>/conf/config.schema.json` pairs with `<pkg>/package.json`.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::PackageManifest;
use crate::constants::SUPER_USER_SCHEMA_KEY;
use crate::core::InstallerError;
use crate::utils::fs::{find_files, read_json_file};

/// A plugin's configuration contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSchemaEntry {
    pub name: String,
    pub description: String,
    pub version: String,
    pub schema: Value,
}

/// Collects the configuration schema of every package under `modules_dir`.
///
/// The result is keyed by package name and always contains the super-user
/// registration entry (see [`super_user_schema`]); a package named after it is
/// ignored. If two packages share a name, the one found later in path order wins.
///
/// # Errors
///
/// Fails on the first unreadable path ([`InstallerError::DiscoveryIo`]) or the
/// first schema or manifest that is not valid JSON ([`InstallerError::ManifestParse`]).
pub async fn collect_schemas(
    modules_dir: &Path,
    schema_file: &str,
) -> Result<BTreeMap<String, ConfigSchemaEntry>, InstallerError> {
    let suffix = Path::new(schema_file);
    let depth = suffix.components().count();
    let schema_paths = find_files(modules_dir, suffix).await?;

    let entries =
        try_join_all(schema_paths.into_iter().map(|path| load_entry(path, depth))).await?;

    let mut schemas = BTreeMap::new();
    for entry in entries {
        schemas.insert(entry.name.clone(), entry);
    }
    if schemas.insert(SUPER_USER_SCHEMA_KEY.to_string(), super_user_schema()).is_some() {
        warn!("Ignoring schema of package named '{}'; the name is reserved", SUPER_USER_SCHEMA_KEY);
    }

    debug!("Collected {} configuration schema(s)", schemas.len());
    Ok(schemas)
}

async fn load_entry(schema_path: PathBuf, depth: usize) -> Result<ConfigSchemaEntry, InstallerError> {
    let package_root = schema_path.ancestors().nth(depth).unwrap_or(&schema_path).to_path_buf();

    let (schema, manifest) = futures::try_join!(
        read_json_file::<Value>(&schema_path),
        PackageManifest::load(&package_root),
    )?;

    debug!("Loaded configuration schema for {}", manifest.name);
    Ok(ConfigSchemaEntry {
        name: manifest.name,
        description: manifest.description,
        version: manifest.version,
        schema,
    })
}

/// Schema for registering the initial super-user account.
///
/// Not owned by any plugin; reported alongside the discovered schemas so the
/// registration prompt can be driven by the same mechanism.
pub fn super_user_schema() -> ConfigSchemaEntry {
    ConfigSchemaEntry {
        name: SUPER_USER_SCHEMA_KEY.to_string(),
        description: "Super user account registration".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "email": {
                    "description": "Email address for the super user account",
                    "type": "string",
                    "format": "email"
                },
                "password": {
                    "description": "Password for the super user account",
                    "type": "string",
                    "format": "password"
                },
                "confirmPassword": {
                    "description": "Confirm the super user password",
                    "type": "string",
                    "format": "password"
                }
            },
            "required": ["email", "password"]
        }),
    }
}
