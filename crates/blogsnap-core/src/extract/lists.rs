//! Category list files under the asset root.
//!
//! One URL per line, UTF-8, sorted. Raw spellings go to `*_files.txt` /
//! `all_assets.txt`; lookup-normalized copies go to the `normalized_*` twins.

use anyhow::{Context, Result};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArchiveError;
use crate::url_model::{AssetKind, Normalizer};

pub const CSS_FILES_FILE: &str = "css_files.txt";
pub const JS_FILES_FILE: &str = "js_files.txt";
pub const IMAGE_FILES_FILE: &str = "image_files.txt";
pub const ALL_ASSETS_FILE: &str = "all_assets.txt";
const NORMALIZED_PREFIX: &str = "normalized_";

/// Discovered asset URLs split by kind. `all` is the union.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetLists {
    pub css: BTreeSet<String>,
    pub js: BTreeSet<String>,
    pub images: BTreeSet<String>,
    pub all: BTreeSet<String>,
}

impl AssetLists {
    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lists = Self::default();
        for url in urls {
            lists.insert(url);
        }
        lists
    }

    /// Adds `url` to `all` and to its category list, if any.
    pub fn insert(&mut self, url: impl Into<String>) {
        let url = url.into();
        match AssetKind::of(&url) {
            Some(AssetKind::Css) => {
                self.css.insert(url.clone());
            }
            Some(AssetKind::Js) => {
                self.js.insert(url.clone());
            }
            Some(AssetKind::Image) => {
                self.images.insert(url.clone());
            }
            Some(AssetKind::Other) | None => {}
        }
        self.all.insert(url);
    }

    /// URLs with a query string, per kind; reported because they get digest suffixes on disk.
    pub fn with_query(&self) -> impl Iterator<Item = &String> {
        self.all.iter().filter(|u| u.contains('?'))
    }

    /// Writes the four raw lists and their `normalized_*` twins into `assets_dir`.
    pub fn write(&self, assets_dir: &Path, normalizer: &Normalizer) -> Result<()> {
        fs::create_dir_all(assets_dir)
            .with_context(|| format!("create {}", assets_dir.display()))?;
        let sets = [
            (CSS_FILES_FILE, &self.css),
            (JS_FILES_FILE, &self.js),
            (IMAGE_FILES_FILE, &self.images),
            (ALL_ASSETS_FILE, &self.all),
        ];
        for (name, set) in sets {
            write_list(&assets_dir.join(name), set.iter())?;
            let normalized: BTreeSet<String> = set.iter().map(|u| normalizer.for_lookup(u)).collect();
            write_list(
                &assets_dir.join(format!("{}{}", NORMALIZED_PREFIX, name)),
                normalized.iter(),
            )?;
        }
        Ok(())
    }
}

fn write_list<'a>(path: &Path, urls: impl Iterator<Item = &'a String>) -> Result<()> {
    let mut body = String::new();
    for url in urls {
        body.push_str(url);
        body.push('\n');
    }
    fs::write(path, body).with_context(|| format!("write {}", path.display()))
}

/// Which precomputed list feeds a fetch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSelection {
    All,
    CssOnly,
    JsOnly,
}

impl ListSelection {
    fn file_name(self) -> &'static str {
        match self {
            ListSelection::All => ALL_ASSETS_FILE,
            ListSelection::CssOnly => CSS_FILES_FILE,
            ListSelection::JsOnly => JS_FILES_FILE,
        }
    }

    /// Loads the selected list, preferring the `normalized_*` file and falling
    /// back to the raw one. Returns the file actually read.
    pub fn load(self, assets_dir: &Path) -> Result<(PathBuf, HashSet<String>)> {
        let raw = assets_dir.join(self.file_name());
        let normalized = assets_dir.join(format!("{}{}", NORMALIZED_PREFIX, self.file_name()));
        let path = if normalized.is_file() { normalized } else { raw };
        let urls = read_list(&path)?;
        Ok((path, urls))
    }
}

/// Reads a list file: trimmed lines, blanks skipped.
///
/// Fails with [`ArchiveError::MissingInput`] if the file does not exist.
pub fn read_list(path: &Path) -> Result<HashSet<String>> {
    if !path.is_file() {
        return Err(ArchiveError::MissingInput {
            what: "asset list",
            path: path.to_path_buf(),
        }
        .into());
    }
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new("https://blog.example.com").unwrap()
    }

    #[test]
    fn categorizes_on_insert() {
        let lists = AssetLists::from_urls(["/a.css", "/b.js?v=1", "/c.PNG", "/d.ico"]);
        assert_eq!(lists.css.len(), 1);
        assert_eq!(lists.js.len(), 1);
        assert_eq!(lists.images.len(), 1);
        assert_eq!(lists.all.len(), 4);
        assert_eq!(lists.with_query().count(), 1);
    }

    #[test]
    fn write_then_load_prefers_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let lists = AssetLists::from_urls(["/css/a.css", "//cdn.example.com/b.js", "img/c.gif"]);
        lists.write(dir.path(), &normalizer()).unwrap();

        let raw = fs::read_to_string(dir.path().join(ALL_ASSETS_FILE)).unwrap();
        assert_eq!(raw, "//cdn.example.com/b.js\n/css/a.css\nimg/c.gif\n");

        let (path, urls) = ListSelection::All.load(dir.path()).unwrap();
        assert!(path.ends_with("normalized_all_assets.txt"));
        assert!(urls.contains("https://blog.example.com/css/a.css"));
        assert!(urls.contains("https://cdn.example.com/b.js"));
        // Lookup mode leaves bare spellings alone.
        assert!(urls.contains("img/c.gif"));

        let (_, css) = ListSelection::CssOnly.load(dir.path()).unwrap();
        assert_eq!(css.len(), 1);
    }

    #[test]
    fn load_falls_back_to_raw() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(JS_FILES_FILE), "/js/a.js\n\n  /js/b.js  \n").unwrap();
        let (path, urls) = ListSelection::JsOnly.load(dir.path()).unwrap();
        assert!(path.ends_with(JS_FILES_FILE));
        assert_eq!(urls.len(), 2);
        assert!(urls.contains("/js/b.js"));
    }

    #[test]
    fn missing_list_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = ListSelection::CssOnly.load(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::MissingInput { .. })
        ));
    }
}
