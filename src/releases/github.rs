//! Remote host client for release and branch listings.
//!
//! [`ReleaseSource`] is the seam the release selector talks to; [`GitHubClient`]
//! is the production implementation against a GitHub-compatible REST API:
//!
//! - `GET {api}/repos/{owner}/{repo}/releases?per_page=N`
//! - `GET {api}/repos/{owner}/{repo}/branches`
//! - `GET {commit url}` for a branch head's author date
//!
//! Transport failures (connection errors, timeouts) are retried with
//! exponential backoff. A non-success status is returned immediately as
//! [`InstallerError::RemoteRequest`] carrying the status code.

use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

use crate::config::{Credentials, InstallerConfig};
use crate::constants::{MAX_BACKOFF_DELAY_MS, REMOTE_RETRY_ATTEMPTS, STARTING_BACKOFF_DELAY_MS};
use crate::core::InstallerError;

/// A tagged release as listed by the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRelease {
    /// Display name; hosts return `null` for releases created without a title.
    #[serde(default)]
    pub name: Option<String>,
    pub tag_name: String,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    /// Unset for drafts, which have not been published.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A branch as listed by the remote host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteBranch {
    pub name: String,
    pub commit: BranchHead,
}

/// Reference to the head commit of a [`RemoteBranch`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BranchHead {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    author: CommitAuthor,
}

#[derive(Debug, Deserialize)]
struct CommitAuthor {
    date: DateTime<Utc>,
}

/// Read-only access to a repository's releases and branches on a remote host.
pub trait ReleaseSource: Send + Sync {
    /// Lists up to `per_page` of the most recent tagged releases, newest first.
    fn fetch_releases(
        &self,
        per_page: u32,
    ) -> impl Future<Output = Result<Vec<RemoteRelease>, InstallerError>> + Send;

    /// Lists the repository's branches.
    fn fetch_branches(
        &self,
    ) -> impl Future<Output = Result<Vec<RemoteBranch>, InstallerError>> + Send;

    /// Resolves the author date of the commit at `commit_url`.
    fn fetch_commit_date(
        &self,
        commit_url: &str,
    ) -> impl Future<Output = Result<DateTime<Utc>, InstallerError>> + Send;
}

/// [`ReleaseSource`] backed by a GitHub-compatible REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    repo_url: String,
    credentials: Option<Credentials>,
}

impl GitHubClient {
    /// Creates a client for `repository` (`owner/name`) under `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Config`] if the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        repository: &str,
        credentials: Option<Credentials>,
        timeout: Duration,
    ) -> Result<Self, InstallerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| InstallerError::Config {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            repo_url: format!("{}/repos/{}", api_url.trim_end_matches('/'), repository),
            credentials,
        })
    }

    /// Creates a client from the installer configuration.
    pub fn from_config(config: &InstallerConfig) -> Result<Self, InstallerError> {
        Self::new(
            &config.api_url,
            &config.repository,
            config.credentials(),
            config.request_timeout(),
        )
    }

    async fn get_json<T>(&self, url: &str) -> Result<T, InstallerError>
    where
        T: DeserializeOwned,
    {
        let retry_strategy = ExponentialBackoff::from_millis(STARTING_BACKOFF_DELAY_MS)
            .factor(2)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(REMOTE_RETRY_ATTEMPTS.saturating_sub(1));

        RetryIf::spawn(retry_strategy, || self.get_json_once(url), is_transport_error).await
    }

    async fn get_json_once<T>(&self, url: &str) -> Result<T, InstallerError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", url);

        let mut request = self.client.get(url).header(ACCEPT, "application/vnd.github+json");
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.token));
        }

        let response = request.send().await.map_err(|e| {
            debug!("Request to {} failed: {}", url, e);
            InstallerError::remote(None, format!("{url}: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(InstallerError::remote(Some(status.as_u16()), format!("{url}: {message}")));
        }

        response.json::<T>().await.map_err(|e| {
            InstallerError::remote(Some(status.as_u16()), format!("Unexpected response from {url}: {e}"))
        })
    }
}

/// Only failures that never produced a response are worth retrying.
fn is_transport_error(error: &InstallerError) -> bool {
    matches!(error, InstallerError::RemoteRequest { status: None, .. })
}

impl ReleaseSource for GitHubClient {
    async fn fetch_releases(&self, per_page: u32) -> Result<Vec<RemoteRelease>, InstallerError> {
        self.get_json(&format!("{}/releases?per_page={per_page}", self.repo_url)).await
    }

    async fn fetch_branches(&self) -> Result<Vec<RemoteBranch>, InstallerError> {
        self.get_json(&format!("{}/branches", self.repo_url)).await
    }

    async fn fetch_commit_date(&self, commit_url: &str) -> Result<DateTime<Utc>, InstallerError> {
        let response: CommitResponse = self.get_json(commit_url).await?;
        Ok(response.commit.author.date)
    }
}
