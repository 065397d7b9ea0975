//! URL modeling: normalization, asset classification and local path derivation.
//!
//! Two normalization modes exist because call sites disagree on what to do
//! with bare (scheme-less, not root-relative) strings:
//! - [`NormalizeMode::Fetch`] assumes `https://` so the string can be requested.
//! - [`NormalizeMode::Lookup`] leaves it alone so it can still match a key.

mod classify;
mod path;
mod sanitize;

use anyhow::{bail, Result};

pub use classify::{extension, has_listed_extension, is_asset, AssetKind, ASSET_EXTENSIONS, LISTED_EXTENSIONS};
pub use path::{asset_serving_path, local_path, query_digest};
pub use sanitize::{percent_decode, sanitize_segment};

/// What to do with a URL that is neither absolute, protocol-relative nor root-relative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Prefix `https://` (used by the fetcher and the ledger).
    Fetch,
    /// Leave unchanged (used by list files, URL mapping and the rewriter).
    Lookup,
}

/// Canonicalizes raw URL spellings against a fixed site origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalizer {
    origin: String,
}

impl Normalizer {
    /// `origin` must be absolute (`http://` or `https://`); a trailing `/` is dropped.
    pub fn new(origin: &str) -> Result<Self> {
        let origin = origin.trim().trim_end_matches('/');
        if !is_absolute(origin) {
            bail!("origin must start with http:// or https://, got {:?}", origin);
        }
        Ok(Self {
            origin: origin.to_string(),
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Normalizes `url`. Pure and idempotent in both modes.
    ///
    /// - `//cdn.example.com/a.png` → `https://cdn.example.com/a.png`
    /// - `/img/x.gif` → `<origin>/img/x.gif`
    /// - `http://...` / `https://...` → unchanged
    pub fn normalize(&self, url: &str, mode: NormalizeMode) -> String {
        if url.starts_with("//") {
            format!("https:{}", url)
        } else if url.starts_with('/') {
            format!("{}{}", self.origin, url)
        } else if is_absolute(url) {
            url.to_string()
        } else {
            match mode {
                NormalizeMode::Fetch => format!("https://{}", url),
                NormalizeMode::Lookup => url.to_string(),
            }
        }
    }

    /// Shorthand for `normalize(url, NormalizeMode::Fetch)`.
    pub fn for_fetch(&self, url: &str) -> String {
        self.normalize(url, NormalizeMode::Fetch)
    }

    /// Shorthand for `normalize(url, NormalizeMode::Lookup)`.
    pub fn for_lookup(&self, url: &str) -> String {
        self.normalize(url, NormalizeMode::Lookup)
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
