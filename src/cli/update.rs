//! `update`: move an installation to the newest candidate.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::installer::{UpdateOptions, UpdateOutcome, update};
use crate::releases::GitHubClient;

#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Include branch heads as candidates
    #[arg(long)]
    pub branches: bool,

    /// Include prereleases
    #[arg(long)]
    pub prereleases: bool,

    /// Apply the update instead of only reporting it
    #[arg(short, long)]
    pub yes: bool,
}

impl UpdateCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let options = UpdateOptions {
            include_branches: self.branches,
            include_prereleases: self.prereleases,
            apply: self.yes,
        };
        let client = GitHubClient::from_config(&ctx.config)?;

        match update(&client, &ctx.app_dir, &options).await? {
            UpdateOutcome::UpToDate => println!("{}", "Already up to date".green()),
            UpdateOutcome::Available(candidate) => {
                println!("{} {}", "Update available:".bold(), candidate.name);
                println!("Run again with --yes to install it");
            }
            UpdateOutcome::Updated(candidate) => {
                println!("{} {}", "Updated to".green().bold(), candidate.name);
            }
        }
        Ok(())
    }
}
