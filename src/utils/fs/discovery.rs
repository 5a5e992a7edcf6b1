//! Recursive file discovery over installed-module trees.
//!
//! [`find_files`] walks a directory tree and returns every file whose path
//! ends with a given suffix. Matching is component-wise ([`Path::ends_with`]):
//! a suffix of `conf/config.schema.json` matches `<pkg>/conf/config.schema.json`
//! but not `<pkg>/myconf/config.schema.json`.
//!
//! The walk proceeds one depth level at a time. Directories of a level are
//! read concurrently, but never more than [`read_parallelism`] at once, so a
//! `node_modules` with thousands of packages stays within the open-file limit.
//!
//! # Failure policy
//!
//! Fail-fast: the first directory that cannot be read aborts the scan with
//! [`InstallerError::DiscoveryIo`] naming that directory. Dangling symlinks and
//! entries that are neither files nor directories (sockets, fifos) are skipped.
//!
//! # Symlinks
//!
//! Symlinked directories are followed. Every directory is scanned at most once
//! per call, keyed by its resolved location: a link back to an ancestor ends
//! the descent, and a package linked from several places (pnpm stores,
//! workspaces) is reported under the shallowest, then lexicographically first,
//! path that reaches it.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

use crate::constants::{
    FALLBACK_CORE_COUNT, MAX_PARALLEL_DIR_READS, MIN_PARALLELISM, PARALLELISM_CORE_MULTIPLIER,
};
use crate::core::InstallerError;

/// Recursively finds files under `root` whose path ends with `suffix`.
///
/// Returned paths are absolute and sorted, so repeated scans of an unchanged
/// tree yield identical results.
///
/// # Errors
///
/// Returns [`InstallerError::DiscoveryIo`] if `root` (or any directory below it)
/// cannot be read.
///
/// # Examples
///
/// ```rust,no_run
/// use adapt_installer::utils::fs::find_files;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), adapt_installer::core::InstallerError> {
/// let markers = find_files(Path::new("node_modules"), Path::new("adapt-authoring.json")).await?;
/// for marker in markers {
///     println!("plugin at {}", marker.parent().unwrap().display());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn find_files(root: &Path, suffix: &Path) -> Result<Vec<PathBuf>, InstallerError> {
    let canonical_root =
        fs::canonicalize(root).await.map_err(|e| InstallerError::discovery_io(root, e))?;

    debug!("Scanning {} for '{}'", canonical_root.display(), suffix.display());

    let parallelism = read_parallelism();
    let mut visited = HashSet::from([canonical_root.clone()]);
    let mut level = vec![ScanDir {
        path: canonical_root.clone(),
        resolved: canonical_root,
    }];
    let mut matches = Vec::new();

    while !level.is_empty() {
        let listings: Vec<Listing> = stream::iter(level.iter().map(|dir| read_entries(dir, suffix)))
            .buffered(parallelism)
            .try_collect()
            .await?;

        let mut next = Vec::new();
        for listing in listings {
            matches.extend(listing.matches);
            for sub in listing.subdirs {
                if visited.insert(sub.resolved.clone()) {
                    next.push(sub);
                } else {
                    debug!("Already scanned {}, skipping {}", sub.resolved.display(), sub.path.display());
                }
            }
        }
        level = next;
    }

    matches.sort();
    debug!("Found {} match(es) for '{}'", matches.len(), suffix.display());
    Ok(matches)
}

/// How many directories a scan reads at the same time.
pub fn read_parallelism() -> usize {
    let cores = std::thread::available_parallelism().map_or(FALLBACK_CORE_COUNT, |n| n.get());
    (cores * PARALLELISM_CORE_MULTIPLIER).clamp(MIN_PARALLELISM, MAX_PARALLEL_DIR_READS)
}

/// A directory to scan.
struct ScanDir {
    /// Path as reached from the scan root; matches are reported under it.
    path: PathBuf,
    /// Fully resolved location, used to scan each directory once.
    resolved: PathBuf,
}

/// Contents of one directory; `subdirs` is sorted by path.
struct Listing {
    matches: Vec<PathBuf>,
    subdirs: Vec<ScanDir>,
}

/// Reads a single directory. The directory handle is closed before returning.
async fn read_entries(dir: &ScanDir, suffix: &Path) -> Result<Listing, InstallerError> {
    let mut entries =
        fs::read_dir(&dir.path).await.map_err(|e| InstallerError::discovery_io(&dir.path, e))?;

    let mut matches = Vec::new();
    let mut subdirs = Vec::new();

    while let Some(entry) =
        entries.next_entry().await.map_err(|e| InstallerError::discovery_io(&dir.path, e))?
    {
        let path = entry.path();
        let file_type =
            entry.file_type().await.map_err(|e| InstallerError::discovery_io(&path, e))?;

        if file_type.is_symlink() {
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) => {
                    trace!("Skipping dangling symlink {}: {}", path.display(), e);
                    continue;
                }
            };
            if meta.is_dir() {
                let resolved = fs::canonicalize(&path)
                    .await
                    .map_err(|e| InstallerError::discovery_io(&path, e))?;
                subdirs.push(ScanDir { path, resolved });
            } else if meta.is_file() && path.ends_with(suffix) {
                trace!("Matched {}", path.display());
                matches.push(path);
            }
        } else if file_type.is_dir() {
            let resolved = dir.resolved.join(entry.file_name());
            subdirs.push(ScanDir { path, resolved });
        } else if file_type.is_file() && path.ends_with(suffix) {
            trace!("Matched {}", path.display());
            matches.push(path);
        }
    }

    subdirs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(Listing { matches, subdirs })
}
