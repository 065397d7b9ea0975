//! Whole-corpus localization: rewrite every page into a separate output tree.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use super::{rewrite, RuleSet, UrlMapping};
use crate::error::ArchiveError;
use crate::extract::html_files;

/// Counts for one localization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizeSummary {
    pub files: usize,
    /// Pages whose output differs from the input.
    pub files_changed: usize,
    /// URL mapping substitutions.
    pub substitutions: usize,
    /// Config rule substitutions.
    pub rule_substitutions: usize,
}

/// Rewrites every `*.html` under `html_dir` into `output_dir`, keeping relative paths.
///
/// The input tree is never written to; `output_dir` must differ from `html_dir`.
/// Pages are read as lossy UTF-8.
pub fn localize_corpus(
    html_dir: &Path,
    output_dir: &Path,
    mapping: &UrlMapping,
    rules: &RuleSet,
) -> Result<LocalizeSummary> {
    if !html_dir.is_dir() {
        return Err(ArchiveError::MissingInput {
            what: "HTML corpus directory",
            path: html_dir.to_path_buf(),
        }
        .into());
    }
    if same_dir(html_dir, output_dir) {
        bail!(
            "output directory {} is the input directory",
            output_dir.display()
        );
    }

    let mut summary = LocalizeSummary::default();
    for page in html_files(html_dir)? {
        let rel = page
            .strip_prefix(html_dir)
            .with_context(|| format!("{} outside {}", page.display(), html_dir.display()))?;
        let out_path = output_dir.join(rel);
        let bytes = fs::read(&page).with_context(|| format!("read {}", page.display()))?;
        let html = String::from_utf8_lossy(&bytes);

        let (mapped, n) = rewrite(&html, mapping);
        let (fixed, m) = rules.apply(&mapped);

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&out_path, fixed.as_bytes())
            .with_context(|| format!("write {}", out_path.display()))?;

        summary.files += 1;
        summary.substitutions += n;
        summary.rule_substitutions += m;
        if fixed != html {
            summary.files_changed += 1;
        }
        tracing::debug!(page = %rel.display(), urls = n, rules = m, "localized");
    }
    tracing::info!(
        files = summary.files,
        changed = summary.files_changed,
        substitutions = summary.substitutions,
        "localization finished"
    );
    Ok(summary)
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
