//! `blogsnap localize` – rewrite the corpus to reference local assets.

use anyhow::{Context, Result};
use blogsnap_core::config::BlogsnapConfig;
use blogsnap_core::extract::{read_list, ALL_ASSETS_FILE};
use blogsnap_core::rewrite::{localize_corpus, UrlMapping};
use std::path::PathBuf;

pub async fn run_localize(cfg: &BlogsnapConfig, output: Option<PathBuf>) -> Result<()> {
    let normalizer = cfg.normalizer()?;
    let rules = cfg.rule_set()?;
    let urls = read_list(&cfg.assets_dir.join(ALL_ASSETS_FILE))?;
    let mapping = UrlMapping::build(&urls, &normalizer);
    tracing::info!(urls = urls.len(), keys = mapping.len(), rules = rules.len(), "built url mapping");

    let html_dir = cfg.html_dir.clone();
    let output_dir = output.unwrap_or_else(|| cfg.output_dir.clone());
    let out = output_dir.clone();
    let summary = tokio::task::spawn_blocking(move || localize_corpus(&html_dir, &out, &mapping, &rules))
        .await
        .context("localize task join")??;

    println!(
        "Localized {} page(s) into {}: {} changed, {} URL substitution(s), {} rule substitution(s)",
        summary.files,
        output_dir.display(),
        summary.files_changed,
        summary.substitutions,
        summary.rule_substitutions
    );
    Ok(())
}
