//! Resumable single-asset fetcher.
//!
//! A URL counts as done when its normalized form is in the ledger snapshot or
//! its local file already exists. Otherwise it is fetched into `<target>.part`
//! and renamed on HTTP 200. Only confirmed successes are recorded.

mod http;

use crate::error::FetchError;
use crate::ledger::Ledger;
use crate::storage::{ensure_parent, PartFile};
use crate::url_model::{local_path, Normalizer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Desktop browser User-Agent; some hosts refuse the libcurl default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Per-request settings.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// How a single fetch ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// Normalized URL was in the ledger snapshot; nothing touched.
    AlreadyRecorded,
    /// Target file existed; recorded without a request.
    AlreadyOnDisk { path: PathBuf },
    /// Fetched with HTTP 200 and stored.
    Downloaded { path: PathBuf, bytes: u64 },
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, FetchOutcome::Failed(_))
    }
}

/// Fetches assets into `assets_root`, recording successes in a shared ledger.
#[derive(Debug, Clone)]
pub struct Fetcher {
    normalizer: Normalizer,
    assets_root: PathBuf,
    ledger: Arc<Ledger>,
    options: FetchOptions,
}

impl Fetcher {
    pub fn new(
        normalizer: Normalizer,
        assets_root: impl Into<PathBuf>,
        ledger: Arc<Ledger>,
        options: FetchOptions,
    ) -> Self {
        Self {
            normalizer,
            assets_root: assets_root.into(),
            ledger,
            options,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }

    /// True when the asset is present locally after the call.
    pub fn fetch(&self, url: &str, snapshot: &HashSet<String>) -> bool {
        self.fetch_outcome(url, snapshot).is_success()
    }

    /// Fetches `url` unless already done. Failures are logged and returned, never raised.
    pub fn fetch_outcome(&self, url: &str, snapshot: &HashSet<String>) -> FetchOutcome {
        let normalized = self.normalizer.for_fetch(url);
        if snapshot.contains(&normalized) {
            return FetchOutcome::AlreadyRecorded;
        }
        let outcome = match self.store(&normalized) {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Failed(e),
        };
        match &outcome {
            FetchOutcome::Failed(e) => {
                tracing::warn!(url = %normalized, kind = e.kind(), "fetch failed: {}", e)
            }
            FetchOutcome::Downloaded { path, bytes } => {
                tracing::debug!(url = %normalized, path = %path.display(), bytes, "downloaded")
            }
            _ => {}
        }
        outcome
    }

    fn store(&self, normalized: &str) -> Result<FetchOutcome, FetchError> {
        let target = local_path(&self.assets_root, normalized).ok_or_else(|| FetchError::InvalidUrl {
            url: normalized.to_string(),
        })?;
        ensure_parent(&target).map_err(|source| FetchError::Storage {
            path: target.clone(),
            source,
        })?;

        if target.is_file() {
            self.record(normalized);
            return Ok(FetchOutcome::AlreadyOnDisk { path: target });
        }

        let mut part = PartFile::create(&target).map_err(|source| FetchError::Storage {
            path: crate::storage::temp_path(&target),
            source,
        })?;
        let response = match http::get(normalized, &self.options.user_agent, self.options.timeout, &mut part) {
            Ok(r) => r,
            Err(e) => {
                part.discard();
                return Err(e);
            }
        };
        if response.code != 200 {
            part.discard();
            return Err(FetchError::HttpStatus {
                url: normalized.to_string(),
                code: response.code,
            });
        }

        let bytes = part.written();
        let path = part.finalize().map_err(|source| FetchError::Storage {
            path: target.clone(),
            source,
        })?;
        self.record(normalized);
        if let Some(final_url) = http::redirected(normalized, response.effective_url.as_deref()) {
            self.record(&final_url);
        }
        Ok(FetchOutcome::Downloaded { path, bytes })
    }

    fn record(&self, url: &str) {
        if let Err(e) = self.ledger.record(url) {
            tracing::warn!(url, "ledger append failed: {}", e);
        }
    }
}
