//! Asset classification by filename extension.

/// Extensions that make a URL a downloadable asset.
pub const ASSET_EXTENSIONS: &[&str] = &[
    "css", "js", "jpg", "jpeg", "png", "gif", "svg", "ico", "woff", "woff2", "ttf", "eot", "mp4",
    "webm", "mp3", "wav",
];

/// Narrower set used when scanning a corpus for asset lists.
pub const LISTED_EXTENSIONS: &[&str] = &["css", "js", "jpg", "jpeg", "png", "gif", "svg"];

/// Coarse category of an asset, used to split the list files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Css,
    Js,
    Image,
    Other,
}

impl AssetKind {
    /// Classifies `url`; `None` when it is not an asset at all.
    pub fn of(url: &str) -> Option<AssetKind> {
        let ext = extension(url)?;
        let kind = match ext.as_str() {
            "css" => AssetKind::Css,
            "js" => AssetKind::Js,
            "jpg" | "jpeg" | "png" | "gif" | "svg" => AssetKind::Image,
            e if ASSET_EXTENSIONS.contains(&e) => AssetKind::Other,
            _ => return None,
        };
        Some(kind)
    }
}

/// Lowercased extension of the last path component, query string removed.
///
/// Leading dots do not start an extension (`/.htaccess` has none), matching
/// the usual `splitext` convention.
pub fn extension(url: &str) -> Option<String> {
    let without_query = url.split('?').next().unwrap_or(url);
    let name = without_query.rsplit('/').next().unwrap_or(without_query);
    let name = name.trim_start_matches('.');
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// True iff the lowercased extension is in [`ASSET_EXTENSIONS`].
pub fn is_asset(url: &str) -> bool {
    extension(url).is_some_and(|e| ASSET_EXTENSIONS.contains(&e.as_str()))
}

/// True iff the lowercased extension is in [`LISTED_EXTENSIONS`].
pub fn has_listed_extension(url: &str) -> bool {
    extension(url).is_some_and(|e| LISTED_EXTENSIONS.contains(&e.as_str()))
}
