//! `install`: clone the application and install its modules.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::installer::{InstallOptions, install};
use crate::releases::GitHubClient;

#[derive(Debug, Args)]
pub struct InstallCommand {
    /// Tag or branch to install (default: newest release)
    #[arg(long)]
    pub tag: Option<String>,

    /// Consider prereleases when picking the newest release
    #[arg(long)]
    pub prereleases: bool,
}

impl InstallCommand {
    pub async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let options = InstallOptions {
            tag: self.tag,
            include_prereleases: self.prereleases,
        };
        let client = GitHubClient::from_config(&ctx.config)?;
        let installed = install(&ctx.config, &client, &ctx.app_dir, &options).await?;

        println!("{} {} in {}", "Installed".green().bold(), installed, ctx.app_dir.display());
        Ok(())
    }
}
