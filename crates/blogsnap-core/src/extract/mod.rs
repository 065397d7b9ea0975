//! URL extraction from raw HTML text.
//!
//! Each [`UrlContext`] is one independent rule with its own precompiled
//! pattern. Scanning is textual, not a parse: irregular markup just yields
//! fewer candidates, never an error. The rewriter reuses the same rules so
//! that whatever is found can also be replaced.

mod corpus;
mod lists;

use regex::{Captures, Match, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::url_model::has_listed_extension;

pub use corpus::{html_files, scan_corpus, CorpusScan};
pub use lists::{
    read_list, AssetLists, ListSelection, ALL_ASSETS_FILE, CSS_FILES_FILE, IMAGE_FILES_FILE, JS_FILES_FILE,
};

/// Value prefixes that never denote a resource.
const EXCLUDED_PREFIXES: &[&str] = &["#", "javascript:", "mailto:"];

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("href"));
static SRC_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("src"));
static BACKGROUND_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("background"));
static CONTENT_RE: LazyLock<Regex> = LazyLock::new(|| attr_regex("content"));
static CSS_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^"'()\s]+))\s*\)"#).expect("css url regex")
});

fn attr_regex(name: &str) -> Regex {
    Regex::new(&format!(r#"(?i:{})\s*=\s*(?:"([^"]*)"|'([^']*)')"#, name)).expect("attribute regex")
}

/// Where in the markup a URL was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlContext {
    /// `href="..."` / `href='...'`
    Href,
    /// `src="..."` / `src='...'`
    Src,
    /// `background="..."` (legacy table/body attribute)
    Background,
    /// CSS `url(...)`, quoted or bare
    CssUrl,
    /// `content="..."` (meta tags such as `og:image`)
    Content,
}

impl UrlContext {
    pub const ALL: [UrlContext; 5] = [
        UrlContext::Href,
        UrlContext::Src,
        UrlContext::Background,
        UrlContext::CssUrl,
        UrlContext::Content,
    ];

    pub(crate) fn pattern(self) -> &'static Regex {
        match self {
            UrlContext::Href => &HREF_RE,
            UrlContext::Src => &SRC_RE,
            UrlContext::Background => &BACKGROUND_RE,
            UrlContext::CssUrl => &CSS_URL_RE,
            UrlContext::Content => &CONTENT_RE,
        }
    }

    /// Every raw value this rule matches in `html`, exclusions not applied.
    pub fn values(self, html: &str) -> impl Iterator<Item = &str> {
        self.pattern()
            .captures_iter(html)
            .filter_map(|caps| value_of(&caps).map(|m| m.as_str()))
    }
}

/// The captured value: whichever alternative (double, single, bare) matched.
pub(crate) fn value_of<'h>(caps: &Captures<'h>) -> Option<Match<'h>> {
    caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))
}

/// True for empty values and fragment, `javascript:` or `mailto:` links.
pub fn is_excluded(value: &str) -> bool {
    value.is_empty() || EXCLUDED_PREFIXES.iter().any(|p| value.starts_with(p))
}

/// All candidate URLs in `html` across every context, trimmed and deduplicated.
pub fn extract(html: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    for ctx in UrlContext::ALL {
        for value in ctx.values(html) {
            let value = value.trim();
            if !is_excluded(value) {
                out.insert(value.to_string());
            }
        }
    }
    out
}

/// Like [`extract`], keeping only css/js/image URLs (a trailing `?query` is allowed).
pub fn extract_assets(html: &str) -> HashSet<String> {
    extract(html)
        .into_iter()
        .filter(|u| has_listed_extension(u))
        .collect()
}
