//! `blogsnap fetch` – scan the corpus, write asset lists, download assets.

use anyhow::{Context, Result};
use blogsnap_core::config::BlogsnapConfig;
use blogsnap_core::dispatcher::{DispatchProgress, DispatchSummary, Dispatcher};
use blogsnap_core::extract::{scan_corpus, AssetLists, ListSelection};
use blogsnap_core::fetcher::Fetcher;
use blogsnap_core::ledger::{self, Ledger};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Where the URL set for a fetch run comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlSource {
    /// Walk `html_dir` and rewrite the list files.
    Scan,
    /// Read a list file written by an earlier scan.
    List(ListSelection),
}

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub threads: usize,
    pub retry: bool,
    pub scan_only: bool,
    pub source: UrlSource,
}

const PROGRESS_INTERVAL_MS: u64 = 500;

pub async fn run_fetch(cfg: &BlogsnapConfig, args: FetchArgs) -> Result<()> {
    let normalizer = cfg.normalizer()?;

    let urls: Vec<String> = match args.source {
        UrlSource::Scan => {
            let html_dir = cfg.html_dir.clone();
            let scan = tokio::task::spawn_blocking(move || scan_corpus(&html_dir))
                .await
                .context("scan task join")??;
            println!("Scanned {} HTML file(s) in {}", scan.html_files, cfg.html_dir.display());
            print_list_counts(&scan.lists);
            scan.lists
                .write(&cfg.assets_dir, &normalizer)
                .context("write asset lists")?;
            println!("Asset lists written to {}", cfg.assets_dir.display());
            if args.scan_only {
                return Ok(());
            }
            scan.lists.all.into_iter().collect()
        }
        UrlSource::List(selection) => {
            let (path, urls) = selection.load(&cfg.assets_dir)?;
            println!("Loaded {} URL(s) from {}", urls.len(), path.display());
            urls.into_iter().collect()
        }
    };

    let ledger_path = ledger::ledger_path(&cfg.assets_dir);
    let snapshot: HashSet<String> = if args.retry {
        tracing::info!("retry mode: ignoring ledger contents");
        HashSet::new()
    } else {
        ledger::load(&ledger_path)?
    };
    let ledger = Arc::new(Ledger::open(&ledger_path)?);
    let fetcher = Fetcher::new(normalizer, cfg.assets_dir.clone(), ledger, cfg.fetch_options());

    let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<DispatchProgress>(64);
    let progress_handle = tokio::spawn(async move {
        let mut last_print = Instant::now();
        while let Some(p) = progress_rx.recv().await {
            let now = Instant::now();
            if now.duration_since(last_print).as_millis() as u64 >= PROGRESS_INTERVAL_MS
                || p.done >= p.total
            {
                println!(
                    "  {} / {} ({:.1}%)  failed {}",
                    p.done,
                    p.total,
                    p.fraction() * 100.0,
                    p.failed
                );
                last_print = now;
            }
        }
    });

    let dispatcher = Dispatcher::new(fetcher).with_progress(progress_tx);
    let threads = args.threads;
    let summary = tokio::task::spawn_blocking(move || dispatcher.run(urls, &snapshot, threads))
        .await
        .context("fetch task join")?;
    let _ = progress_handle.await;

    print_summary(&summary);
    Ok(())
}

fn print_list_counts(lists: &AssetLists) {
    println!(
        "Found {} unique asset(s): {} css, {} js, {} images",
        lists.all.len(),
        lists.css.len(),
        lists.js.len(),
        lists.images.len()
    );
    let with_query = lists.with_query().count();
    if with_query > 0 {
        println!("  {} with a query string (stored with a _NNNN suffix)", with_query);
    }
}

fn print_summary(summary: &DispatchSummary) {
    for (url, message) in &summary.failures {
        println!("  failed {}: {}", url, message);
    }
    println!(
        "Done: {} found, {} already downloaded, {} newly downloaded, {} already on disk, {} failed",
        summary.found,
        summary.already_downloaded,
        summary.downloaded,
        summary.on_disk,
        summary.failed
    );
}
