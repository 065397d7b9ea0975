//! Local storage path and serving path derivation from normalized URLs.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::sanitize::{percent_decode, sanitize_segment};

/// Stable 4-digit decimal digest of a query string (0..=9999).
///
/// First 8 bytes of SHA-256 as a big-endian `u64`, modulo 10000. Identical
/// across runs and platforms, so a query-bearing URL always maps to the same file.
pub fn query_digest(query: &str) -> u16 {
    let digest = Sha256::digest(query.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(head) % 10_000) as u16
}

/// Derives where a normalized URL is stored under `assets_root`.
///
/// Layout is `<root>/<host[:port]>/<path>`:
/// - an empty path or one ending in `/` gets `index.html`;
/// - a query inserts `_NNNN` (see [`query_digest`]) before the extension;
/// - a final name without extension gets `.html`.
///
/// Returns `None` when `url` does not parse or has no host.
pub fn local_path(assets_root: &Path, url: &str) -> Option<PathBuf> {
    let parsed = url::Url::parse(url).ok()?;
    let domain = domain_of(&parsed)?;

    let mut rel = parsed.path().trim_start_matches('/').to_string();
    if rel.is_empty() || rel.ends_with('/') {
        rel.push_str("index.html");
    }
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        let (stem, ext) = split_ext(&rel);
        rel = format!("{}_{:04}{}", stem, query_digest(query), ext);
    }
    if split_ext(&rel).1.is_empty() {
        rel.push_str(".html");
    }

    let mut out = assets_root.join(sanitize_segment(&domain));
    for segment in rel.split('/') {
        let clean = sanitize_segment(&percent_decode(segment));
        if clean.is_empty() || clean == "." || clean == ".." {
            continue;
        }
        out.push(clean);
    }
    Some(out)
}

/// Path under which the local server exposes a URL: `/assets/<host>/<path>[?query]`.
///
/// `None` when `url` is not absolute.
pub fn asset_serving_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let domain = domain_of(&parsed)?;
    let mut out = format!("/assets/{}{}", domain, parsed.path());
    if let Some(query) = parsed.query().filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    Some(out)
}

fn domain_of(parsed: &url::Url) -> Option<String> {
    let host = parsed.host_str().filter(|h| !h.is_empty())?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Splits `path` into (stem, extension-with-dot), looking only at the last component.
fn split_ext(path: &str) -> (&str, &str) {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &path[name_start..];
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(i) => path.split_at(name_start + leading_dots + i),
        None => (path, ""),
    }
}
