//! Release selection: which versions of the application can be upgraded to.
//!
//! [`select_releases`] turns the remote host's release (and optionally branch)
//! listings into an ordered list of [`ReleaseCandidate`]s:
//!
//! ```text
//! 1. local commit date  ─┐  (best effort, never fatal)
//! 2. tagged releases    ─┼─> candidates
//! 3. branch heads       ─┘  (with include_branches)
//! 4. annotate names     " (draft)" / " (prerelease)"
//! 5. drop               the current tag, unwanted drafts / prereleases
//! 6. keep               no current version, OR newer semver, OR newer date
//! 7. sort               by date, newest first (stable)
//! ```
//!
//! Step 6 is a disjunction. A candidate whose semantic version is lower than
//! the current one is still kept when it was published after the current
//! checkout's last commit.

pub mod github;

pub use github::{GitHubClient, ReleaseSource, RemoteBranch, RemoteRelease};

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use semver::Version;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::RELEASES_PER_PAGE;
use crate::core::InstallerError;

/// A version of the application that can be fetched from the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCandidate {
    /// Display name, suffixed with `" (draft)"` or `" (prerelease)"` where applicable.
    pub name: String,
    /// Tag to check out; for branches, the branch name.
    pub tag_name: String,
    /// Publish date for releases, head commit author date for branches.
    pub date: DateTime<Utc>,
    pub draft: bool,
    pub prerelease: bool,
    pub branch: bool,
}

impl ReleaseCandidate {
    /// Candidate for a branch whose head commit was authored at `date`.
    pub fn from_branch(name: &str, date: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            tag_name: name.to_string(),
            date,
            draft: false,
            prerelease: false,
            branch: true,
        }
    }

    fn annotate(mut self) -> Self {
        if self.draft {
            self.name.push_str(" (draft)");
        } else if self.prerelease {
            self.name.push_str(" (prerelease)");
        }
        self
    }
}

impl From<RemoteRelease> for ReleaseCandidate {
    fn from(release: RemoteRelease) -> Self {
        let date = release
            .published_at
            .or(release.created_at)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Self {
            name: release.name.filter(|n| !n.is_empty()).unwrap_or_else(|| release.tag_name.clone()),
            tag_name: release.tag_name,
            date,
            draft: release.draft,
            prerelease: release.prerelease,
            branch: false,
        }
    }
}

/// Inputs to [`select_releases`].
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    /// Installed version, compared against candidate tags.
    pub current_version: Option<String>,
    /// Application checkout whose last commit date is used as the date baseline.
    pub cwd: PathBuf,
    pub include_branches: bool,
    pub include_prereleases: bool,
    pub include_drafts: bool,
}

/// Source of the current checkout's most recent commit date.
pub trait CommitDateSource: Send + Sync {
    /// Date of the last commit in `cwd`, or `None` when unknown.
    fn last_commit_date(&self, cwd: &Path) -> impl Future<Output = Option<DateTime<Utc>>> + Send;
}

/// Fetches, filters and orders the upgrade candidates for the application.
///
/// # Errors
///
/// Any failed remote request aborts the selection with
/// [`InstallerError::RemoteRequest`]. A failed commit-date lookup does not.
pub async fn select_releases<S, C>(
    source: &S,
    commits: &C,
    options: &SelectOptions,
) -> Result<Vec<ReleaseCandidate>, InstallerError>
where
    S: ReleaseSource,
    C: CommitDateSource,
{
    let (current_date, releases) = tokio::join!(
        commits.last_commit_date(&options.cwd),
        source.fetch_releases(RELEASES_PER_PAGE)
    );
    debug!("Current checkout date: {:?}", current_date);

    let mut candidates: Vec<ReleaseCandidate> =
        releases?.into_iter().map(ReleaseCandidate::from).collect();

    if options.include_branches {
        candidates.extend(fetch_branch_candidates(source).await?);
    }

    let ranked = rank_candidates(candidates, options, current_date);
    info!("{} release candidate(s) available", ranked.len());
    Ok(ranked)
}

async fn fetch_branch_candidates<S>(source: &S) -> Result<Vec<ReleaseCandidate>, InstallerError>
where
    S: ReleaseSource,
{
    let branches = source.fetch_branches().await?;
    debug!("Resolving head commits of {} branch(es)", branches.len());

    try_join_all(branches.iter().map(|branch| async move {
        let date = source.fetch_commit_date(&branch.commit.url).await?;
        Ok::<_, InstallerError>(ReleaseCandidate::from_branch(&branch.name, date))
    }))
    .await
}

/// Annotates, filters and orders candidates (steps 4–7 of the selection).
///
/// Pure; exposed so the ordering rules can be exercised without a remote host.
pub fn rank_candidates(
    candidates: Vec<ReleaseCandidate>,
    options: &SelectOptions,
    current_date: Option<DateTime<Utc>>,
) -> Vec<ReleaseCandidate> {
    let current = options.current_version.as_deref();
    let current_semver = current.and_then(parse_semver);

    let mut kept: Vec<ReleaseCandidate> = candidates
        .into_iter()
        .map(ReleaseCandidate::annotate)
        .filter(|c| {
            let excluded = current == Some(c.tag_name.as_str())
                || (c.prerelease && !options.include_prereleases)
                || (c.draft && !options.include_drafts);
            if excluded {
                debug!("Excluding {}", c.name);
            }
            !excluded
        })
        .filter(|c| {
            if current.is_none() {
                return true;
            }
            let newer_version = match (&current_semver, parse_semver(&c.tag_name)) {
                (Some(installed), Some(candidate)) => candidate > *installed,
                _ => false,
            };
            let newer_date = current_date.is_some_and(|installed| c.date > installed);
            newer_version || newer_date
        })
        .collect();

    kept.sort_by(|a, b| b.date.cmp(&a.date));
    kept
}

/// Parses a tag as a semantic version, tolerating a leading `v` or `=`.
pub fn parse_semver(tag: &str) -> Option<Version> {
    let trimmed = tag.trim();
    let stripped = trimmed.strip_prefix(['v', '=']).unwrap_or(trimmed);
    Version::parse(stripped).ok()
}
