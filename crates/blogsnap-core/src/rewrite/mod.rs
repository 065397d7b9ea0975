//! Rewriting asset references in HTML to their local serving paths.
//!
//! The same per-context patterns used for extraction drive the rewrite, and
//! only the captured value is replaced, so attribute names, spacing and quote
//! style survive untouched.

mod localize;
mod rules;

use regex::Captures;
use std::collections::HashMap;

use crate::extract::{is_excluded, value_of, UrlContext};
use crate::url_model::{asset_serving_path, is_asset, Normalizer};

pub use localize::{localize_corpus, LocalizeSummary};
pub use rules::{RewriteRule, RuleSet};

/// Table from every known URL spelling to its `/assets/<host>/<path>[?query]` path.
#[derive(Debug, Clone)]
pub struct UrlMapping {
    normalizer: Normalizer,
    entries: HashMap<String, String>,
}

impl UrlMapping {
    /// Keys both the raw and the lookup-normalized spelling of each URL.
    /// URLs that are still not absolute after normalization are skipped.
    pub fn build<I, S>(urls: I, normalizer: &Normalizer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for url in urls {
            let url = url.as_ref().trim();
            if url.is_empty() {
                continue;
            }
            let normalized = normalizer.for_lookup(url);
            let Some(local) = asset_serving_path(&normalized) else {
                tracing::debug!(url, "skipping unmappable url");
                continue;
            };
            entries.insert(url.to_string(), local.clone());
            entries.insert(normalized, local);
        }
        Self {
            normalizer: normalizer.clone(),
            entries,
        }
    }

    /// Local path for `raw`, trying the raw spelling first, then its normalized form.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.entries
            .get(raw)
            .or_else(|| self.entries.get(&self.normalizer.for_lookup(raw)))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replaces every mapped URL in `html`. Returns the new text and the substitution count.
///
/// `href` values are only rewritten when they look like assets; links to
/// other pages stay pointed at the live site.
pub fn rewrite(html: &str, mapping: &UrlMapping) -> (String, usize) {
    let mut current = html.to_string();
    let mut count = 0;
    for ctx in UrlContext::ALL {
        let replaced = ctx
            .pattern()
            .replace_all(&current, |caps: &Captures| {
                let whole = &caps[0];
                match replacement_for(ctx, caps, mapping) {
                    Some((start, end, target)) => {
                        count += 1;
                        format!("{}{}{}", &whole[..start], target, &whole[end..])
                    }
                    None => whole.to_string(),
                }
            })
            .into_owned();
        current = replaced;
    }
    (current, count)
}

/// Value span (relative to the whole match) and its mapped target.
fn replacement_for<'m>(
    ctx: UrlContext,
    caps: &Captures,
    mapping: &'m UrlMapping,
) -> Option<(usize, usize, &'m str)> {
    let whole = caps.get(0)?;
    let value = value_of(caps)?;
    let untrimmed = value.as_str();
    let raw = untrimmed.trim();
    if is_excluded(raw) {
        return None;
    }
    if ctx == UrlContext::Href && !is_asset(raw) && !is_asset(&mapping.normalizer.for_lookup(raw)) {
        return None;
    }
    let target = mapping.lookup(raw)?;
    // Surrounding whitespace inside the quotes stays in place.
    let start = value.start() - whole.start() + (untrimmed.len() - untrimmed.trim_start().len());
    Some((start, start + raw.len(), target))
}
