//! Scanning a directory of crawled HTML pages.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{extract_assets, AssetLists};
use crate::error::ArchiveError;

/// Result of scanning an HTML corpus.
#[derive(Debug, Clone, Default)]
pub struct CorpusScan {
    /// Number of `.html` files read.
    pub html_files: usize,
    pub lists: AssetLists,
}

/// All `*.html` files under `dir`, recursively, in sorted order.
///
/// Fails with [`ArchiveError::MissingInput`] if `dir` is not a directory.
pub fn html_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ArchiveError::MissingInput {
            what: "HTML corpus directory",
            path: dir.to_path_buf(),
        }
        .into());
    }
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::warn!("skipping unreadable corpus entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
        .collect();
    files.sort();
    Ok(files)
}

/// Extracts css/js/image URLs from every page under `dir`.
///
/// Pages are decoded lossily; a page that cannot be read at all is an error.
pub fn scan_corpus(dir: &Path) -> Result<CorpusScan> {
    let files = html_files(dir)?;
    let mut lists = AssetLists::default();
    for file in &files {
        let bytes = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
        let html = String::from_utf8_lossy(&bytes);
        for url in extract_assets(&html) {
            lists.insert(url);
        }
    }
    tracing::debug!(files = files.len(), urls = lists.all.len(), "corpus scanned");
    Ok(CorpusScan {
        html_files: files.len(),
        lists,
    })
}
