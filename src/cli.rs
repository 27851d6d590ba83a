use std::path::Path;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use crate::config::SiteConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render content into the page template once.
    Build(BuildArgs),
    /// Rebuild whenever content files change.
    Watch(WatchArgs),
    /// Serve the public directory over HTTP.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SiteArgs {
    /// Site root containing `content/` and `public/`.
    #[arg(long, default_value = ".")]
    pub root: String,

    /// YAML site config overriding the default layout and sections.
    #[arg(long)]
    pub config: Option<String>,
}

impl SiteArgs {
    pub fn load(&self) -> anyhow::Result<SiteConfig> {
        SiteConfig::load(Path::new(&self.root), self.config.as_deref().map(Path::new))
            .context("load site config")
    }
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Rebuild from `index.backup.html` so consumed placeholders are available again.
    #[arg(long)]
    pub from_backup: bool,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Poll interval for content changes.
    #[arg(long, default_value_t = 500)]
    pub interval_ms: u64,
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Bind address.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (default: `PORT` env, then 3000).
    #[arg(long)]
    pub port: Option<u16>,
}
