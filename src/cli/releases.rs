//! `releases`: list the versions the checkout can move to.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use super::common::print_json;
use crate::git::LocalGit;
use crate::installer::installed_version;
use crate::releases::{GitHubClient, ReleaseCandidate, SelectOptions, select_releases};

#[derive(Debug, Args)]
pub struct ReleasesCommand {
    /// Include branch heads as candidates
    #[arg(long)]
    pub branches: bool,

    /// Include prereleases
    #[arg(long)]
    pub prereleases: bool,

    /// Include drafts (requires credentials with push access)
    #[arg(long)]
    pub drafts: bool,

    /// Installed version to compare against (default: version in package.json)
    #[arg(long, value_name = "VERSION")]
    pub current: Option<String>,

    /// Print the candidates as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReleasesCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let current_version = match self.current {
            Some(version) => Some(version),
            None => installed_version(&ctx.app_dir).await?,
        };

        let options = SelectOptions {
            current_version,
            cwd: ctx.app_dir.clone(),
            include_branches: self.branches,
            include_prereleases: self.prereleases,
            include_drafts: self.drafts,
        };
        let client = GitHubClient::from_config(&ctx.config)?;
        let candidates = select_releases(&client, &LocalGit, &options).await?;

        if self.json {
            print_json(&candidates)
        } else {
            display_candidates(&candidates, options.current_version.as_deref());
            Ok(())
        }
    }
}

fn display_candidates(candidates: &[ReleaseCandidate], current: Option<&str>) {
    if candidates.is_empty() {
        println!("{}", "No newer releases available".green());
        return;
    }

    if let Some(current) = current {
        println!("Installed: {}\n", current.bold());
    }
    for candidate in candidates {
        let kind = if candidate.branch { "branch" } else { "release" };
        println!(
            "{:<40} {:<8} {}",
            candidate.name,
            kind.bright_black(),
            candidate.date.format("%Y-%m-%d")
        );
    }
}
