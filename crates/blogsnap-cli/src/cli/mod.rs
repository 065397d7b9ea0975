//! CLI for blogsnap.

mod commands;

use anyhow::Result;
use blogsnap_core::config;
use blogsnap_core::extract::ListSelection;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_fetch, run_localize, run_status, FetchArgs, UrlSource};

/// Top-level CLI for blogsnap.
#[derive(Debug, Parser)]
#[command(name = "blogsnap")]
#[command(about = "blogsnap: archive a blog's assets and point its pages at the local copies", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/blogsnap/config.toml (created with defaults if missing).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Scan the HTML corpus, write the asset lists and download every asset not yet fetched.
    Fetch {
        /// Worker threads (default: `threads` from config).
        #[arg(long, value_name = "N")]
        threads: Option<usize>,
        /// Ignore the download ledger and try every URL again (files already on disk are kept).
        #[arg(long)]
        retry: bool,
        /// Only scan and write the asset lists; download nothing.
        #[arg(long, conflicts_with_all = ["css_only", "js_only", "from_lists"])]
        scan_only: bool,
        /// Download only the CSS list written by a previous scan.
        #[arg(long, conflicts_with_all = ["js_only", "from_lists"])]
        css_only: bool,
        /// Download only the JavaScript list written by a previous scan.
        #[arg(long, conflicts_with = "from_lists")]
        js_only: bool,
        /// Download the full list written by a previous scan instead of rescanning.
        #[arg(long)]
        from_lists: bool,
    },

    /// Rewrite the HTML corpus so asset references point at /assets/<host>/<path>.
    Localize {
        /// Output directory (default: `output_dir` from config).
        #[arg(long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show ledger size, list counts and file locations.
    Status,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = match &cli.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        cfg.validate()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                threads,
                retry,
                scan_only,
                css_only,
                js_only,
                from_lists,
            } => {
                let source = if css_only {
                    UrlSource::List(ListSelection::CssOnly)
                } else if js_only {
                    UrlSource::List(ListSelection::JsOnly)
                } else if from_lists {
                    UrlSource::List(ListSelection::All)
                } else {
                    UrlSource::Scan
                };
                let args = FetchArgs {
                    threads: threads.unwrap_or(cfg.threads),
                    retry,
                    scan_only,
                    source,
                };
                run_fetch(&cfg, args).await?
            }
            CliCommand::Localize { output } => run_localize(&cfg, output).await?,
            CliCommand::Status => run_status(&cfg, cli.config.as_deref()).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
