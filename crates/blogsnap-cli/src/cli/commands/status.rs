//! `blogsnap status` – ledger size, list counts and file locations.

use anyhow::Result;
use blogsnap_core::config::{self, BlogsnapConfig};
use blogsnap_core::extract::{read_list, ALL_ASSETS_FILE, CSS_FILES_FILE, IMAGE_FILES_FILE, JS_FILES_FILE};
use blogsnap_core::ledger;
use blogsnap_core::logging;
use std::path::Path;

pub async fn run_status(cfg: &BlogsnapConfig, config_override: Option<&Path>) -> Result<()> {
    let config_path = match config_override {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("{:<16} {}", "config", config_path.display());
    if let Ok(log) = logging::log_path() {
        println!("{:<16} {}", "log", log.display());
    }
    println!("{:<16} {}", "origin", cfg.origin);
    println!("{:<16} {}", "assets", cfg.assets_dir.display());

    let recorded = ledger::load(&ledger::ledger_path(&cfg.assets_dir))?;
    println!("{:<16} {}", "downloaded", recorded.len());

    for name in [ALL_ASSETS_FILE, CSS_FILES_FILE, JS_FILES_FILE, IMAGE_FILES_FILE] {
        let count = read_list(&cfg.assets_dir.join(name))
            .map(|urls| urls.len().to_string())
            .unwrap_or_else(|_| "-".to_string());
        println!("{:<16} {}", name, count);
    }
    Ok(())
}
