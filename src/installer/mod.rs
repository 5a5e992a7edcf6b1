//! Installing and updating the application checkout.
//!
//! Both flows share the same shape:
//!
//! ```text
//! git available? ─> checkout present? ─> pick a candidate ─> git checkout ─> npm install
//! ```
//!
//! Picking the candidate is the only part that talks to the remote host, and
//! it goes through [`select_releases`] so install and update rank versions
//! exactly like the `releases` command shows them. [`resolve_install_target`]
//! and [`plan_update`] are split out from the side-effecting flows so they can
//! be exercised without git or npm.

pub mod npm;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::InstallerConfig;
use crate::constants::PACKAGE_MANIFEST_FILE;
use crate::core::InstallerError;
use crate::git::{GitRepo, LocalGit, ensure_git_available, is_valid_git_repo};
use crate::plugins::PackageManifest;
use crate::releases::{
    CommitDateSource, ReleaseCandidate, ReleaseSource, SelectOptions, select_releases,
};

/// Options for [`install`].
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Tag or branch to check out instead of the newest release.
    pub tag: Option<String>,
    pub include_prereleases: bool,
}

/// Options for [`update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub include_branches: bool,
    pub include_prereleases: bool,
    /// Check out and reinstall; otherwise only report the candidate.
    pub apply: bool,
}

/// Result of [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    /// A newer candidate exists but was not applied.
    Available(ReleaseCandidate),
    Updated(ReleaseCandidate),
}

/// Version recorded in the checkout's `package.json`, if there is one.
///
/// A missing manifest means nothing is installed yet; a malformed one is an error.
pub async fn installed_version(app_dir: &Path) -> Result<Option<String>, InstallerError> {
    if !app_dir.join(PACKAGE_MANIFEST_FILE).is_file() {
        return Ok(None);
    }
    let manifest = PackageManifest::load(app_dir).await?;
    Ok(Some(manifest.version).filter(|v| !v.is_empty()))
}

/// Picks what a fresh install checks out: the requested tag, else the newest candidate.
pub async fn resolve_install_target<S, C>(
    source: &S,
    commits: &C,
    app_dir: &Path,
    options: &InstallOptions,
) -> Result<String>
where
    S: ReleaseSource,
    C: CommitDateSource,
{
    if let Some(tag) = &options.tag {
        return Ok(tag.clone());
    }

    let select = SelectOptions {
        cwd: app_dir.to_path_buf(),
        include_prereleases: options.include_prereleases,
        ..SelectOptions::default()
    };
    let candidates = select_releases(source, commits, &select).await?;
    candidates
        .into_iter()
        .next()
        .map(|c| c.tag_name)
        .ok_or_else(|| anyhow::anyhow!("No releases available to install"))
}

/// Picks the candidate an update would move to, if any.
pub async fn plan_update<S, C>(
    source: &S,
    commits: &C,
    app_dir: &Path,
    options: &UpdateOptions,
) -> Result<Option<ReleaseCandidate>>
where
    S: ReleaseSource,
    C: CommitDateSource,
{
    let current_version = installed_version(app_dir).await?;
    if current_version.is_none() {
        warn!("No version found in {}; every release is a candidate", app_dir.display());
    }

    let select = SelectOptions {
        current_version,
        cwd: app_dir.to_path_buf(),
        include_branches: options.include_branches,
        include_prereleases: options.include_prereleases,
        include_drafts: false,
    };
    Ok(select_releases(source, commits, &select).await?.into_iter().next())
}

/// Clones the application into `app_dir` (unless it is already a checkout),
/// checks out the chosen version and installs its modules.
///
/// Returns the tag or branch that was checked out.
pub async fn install<S: ReleaseSource>(
    config: &InstallerConfig,
    source: &S,
    app_dir: &Path,
    options: &InstallOptions,
) -> Result<String> {
    ensure_git_available().await?;

    let existing = is_valid_git_repo(app_dir);
    if !existing && is_non_empty_dir(app_dir).await? {
        return Err(InstallerError::Validation {
            field: "dir".to_string(),
            reason: format!("{} exists, is not empty and is not a checkout", app_dir.display()),
        }
        .into());
    }

    let target = resolve_install_target(source, &LocalGit, app_dir, options).await?;
    info!("Installing {} into {}", target, app_dir.display());

    let repo = if existing {
        info!("{} is already a checkout; fetching instead of cloning", app_dir.display());
        let repo = GitRepo::new(app_dir);
        repo.fetch().await?;
        repo
    } else {
        GitRepo::clone(&config.clone_url(), app_dir).await?
    };

    repo.checkout(&target).await?;
    npm::install_modules(app_dir).await?;
    Ok(target)
}

/// Moves an existing checkout to the newest candidate after its installed version.
pub async fn update<S: ReleaseSource>(
    source: &S,
    app_dir: &Path,
    options: &UpdateOptions,
) -> Result<UpdateOutcome> {
    ensure_git_available().await?;
    if !is_valid_git_repo(app_dir) {
        anyhow::bail!(
            "{} is not an installation; run 'adapt-install install' first",
            app_dir.display()
        );
    }

    let repo = GitRepo::new(app_dir);
    repo.fetch().await?;

    let Some(candidate) = plan_update(source, &LocalGit, app_dir, options).await? else {
        return Ok(UpdateOutcome::UpToDate);
    };
    if !options.apply {
        return Ok(UpdateOutcome::Available(candidate));
    }

    info!("Updating {} to {}", app_dir.display(), candidate.tag_name);
    repo.checkout(&candidate.tag_name).await?;
    npm::install_modules(app_dir).await?;
    Ok(UpdateOutcome::Updated(candidate))
}

async fn is_non_empty_dir(path: &Path) -> Result<bool> {
    match tokio::fs::read_dir(path).await {
        Ok(mut entries) => Ok(entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?
            .is_some()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(InstallerError::discovery_io(path, e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::releases::{RemoteBranch, RemoteRelease};
    use crate::test_utils::PluginTreeBuilder;
    use chrono::{DateTime, TimeZone, Utc};
    use tempfile::TempDir;

    struct StaticReleases(Vec<RemoteRelease>);

    impl ReleaseSource for StaticReleases {
        async fn fetch_releases(&self, _per_page: u32) -> Result<Vec<RemoteRelease>, InstallerError> {
            Ok(self.0.clone())
        }

        async fn fetch_branches(&self) -> Result<Vec<RemoteBranch>, InstallerError> {
            Ok(Vec::new())
        }

        async fn fetch_commit_date(&self, _url: &str) -> Result<DateTime<Utc>, InstallerError> {
            Err(InstallerError::remote(Some(404), "Not Found"))
        }
    }

    struct NoCommits;

    impl CommitDateSource for NoCommits {
        async fn last_commit_date(&self, _cwd: &Path) -> Option<DateTime<Utc>> {
            None
        }
    }

    fn release(tag: &str, day: u32, prerelease: bool) -> RemoteRelease {
        RemoteRelease {
            name: None,
            tag_name: tag.to_string(),
            draft: false,
            prerelease,
            published_at: Some(Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap()),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_installed_version() {
        let temp = TempDir::new().unwrap();
        assert_eq!(installed_version(temp.path()).await.unwrap(), None);

        let tree = PluginTreeBuilder::new().app_version("0.9.2").build();
        assert_eq!(installed_version(tree.app_dir()).await.unwrap().as_deref(), Some("0.9.2"));

        std::fs::write(temp.path().join("package.json"), "{ nope").unwrap();
        assert!(matches!(
            installed_version(temp.path()).await,
            Err(InstallerError::ManifestParse { .. })
        ));
    }

    #[tokio::test]
    async fn test_install_target_prefers_requested_tag() {
        let source = StaticReleases(vec![release("1.0.0", 1, false)]);
        let options = InstallOptions {
            tag: Some("v0.9.0".to_string()),
            ..InstallOptions::default()
        };
        let target =
            resolve_install_target(&source, &NoCommits, Path::new("/missing"), &options).await.unwrap();
        assert_eq!(target, "v0.9.0");
    }

    #[tokio::test]
    async fn test_install_target_is_newest_stable_release() {
        let source = StaticReleases(vec![
            release("1.0.0", 1, false),
            release("1.1.0", 5, false),
            release("1.2.0-rc.1", 9, true),
        ]);
        let target = resolve_install_target(
            &source,
            &NoCommits,
            Path::new("/missing"),
            &InstallOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(target, "1.1.0");

        let options = InstallOptions {
            include_prereleases: true,
            ..InstallOptions::default()
        };
        let target =
            resolve_install_target(&source, &NoCommits, Path::new("/missing"), &options).await.unwrap();
        assert_eq!(target, "1.2.0-rc.1");
    }

    #[tokio::test]
    async fn test_install_target_without_releases_fails() {
        let source = StaticReleases(Vec::new());
        let err = resolve_install_target(
            &source,
            &NoCommits,
            Path::new("/missing"),
            &InstallOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("No releases"));
    }

    #[tokio::test]
    async fn test_plan_update_uses_installed_version() {
        let tree = PluginTreeBuilder::new().app_version("1.1.0").build();
        let source = StaticReleases(vec![release("1.1.0", 5, false), release("1.0.0", 1, false)]);

        let planned =
            plan_update(&source, &NoCommits, tree.app_dir(), &UpdateOptions::default()).await.unwrap();
        assert_eq!(planned, None);

        let source = StaticReleases(vec![release("1.2.0", 8, false), release("1.1.0", 5, false)]);
        let planned =
            plan_update(&source, &NoCommits, tree.app_dir(), &UpdateOptions::default()).await.unwrap();
        assert_eq!(planned.map(|c| c.tag_name).as_deref(), Some("1.2.0"));
    }

    #[tokio::test]
    async fn test_non_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(!is_non_empty_dir(temp.path()).await.unwrap());
        assert!(!is_non_empty_dir(&temp.path().join("absent")).await.unwrap());

        std::fs::write(temp.path().join("file"), "x").unwrap();
        assert!(is_non_empty_dir(temp.path()).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_outside_checkout_fails() {
        let temp = TempDir::new().unwrap();
        let source = StaticReleases(Vec::new());
        let Err(err) = update(&source, temp.path(), &UpdateOptions::default()).await else {
            panic!("update outside a checkout must fail");
        };
        let message = err.to_string();
        assert!(
            message.contains("not an installation") || message.contains("Git is not installed"),
            "unexpected error: {message}"
        );
    }
}
