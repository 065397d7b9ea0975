//! Append-only record of fetched URLs (`<assets>/downloaded_urls.txt`).
//!
//! The file is read once per run into a snapshot; workers append through a
//! single lock-guarded handle, one `write_all` per line. Entries are never
//! rewritten or deduplicated on disk.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const LEDGER_FILE: &str = "downloaded_urls.txt";

/// Ledger location inside an asset root.
pub fn ledger_path(assets_dir: &Path) -> PathBuf {
    assets_dir.join(LEDGER_FILE)
}

/// Reads every recorded URL. A missing file yields an empty set.
pub fn load(path: &Path) -> Result<HashSet<String>> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e).with_context(|| format!("read ledger {}", path.display())),
    };
    Ok(data
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Shared append handle. Safe to use from many worker threads.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    file: Mutex<File>,
}

impl Ledger {
    /// Opens (creating if needed) the ledger file in append mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open ledger {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `url` as one line.
    pub fn record(&self, url: &str) -> io::Result<()> {
        let line = format!("{}\n", url);
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "ledger lock poisoned"))?;
        file.write_all(line.as_bytes())
    }

    /// Reloads the on-disk contents (used by `status` and tests).
    pub fn entries(&self) -> Result<HashSet<String>> {
        load(&self.path)
    }
}
