//! Asset file lifecycle.
//!
//! Bodies stream into `<target>.part`; the rename to the final name happens
//! only once the response is known good, so a target file that exists is
//! always complete.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before the final rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.png` -> `a.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Creates every missing parent of `path`. Tolerates other workers creating the same dirs.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => match fs::create_dir_all(parent) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && parent.is_dir() => Ok(()),
            Err(e) => Err(e),
        },
        _ => Ok(()),
    }
}

/// Sequential writer for one in-flight asset body.
#[derive(Debug)]
pub struct PartFile {
    file: File,
    temp_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl PartFile {
    /// Creates (truncating) the temp file for `final_path`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = temp_path(final_path);
        let file = File::create(&temp_path)?;
        Ok(Self {
            file,
            temp_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flushes and renames the temp file onto the final path.
    pub fn finalize(self) -> io::Result<PathBuf> {
        self.file.sync_all()?;
        drop(self.file);
        fs::rename(&self.temp_path, &self.final_path)?;
        Ok(self.final_path)
    }

    /// Drops the temp file. Errors are ignored; a leftover `.part` is overwritten next run.
    pub fn discard(self) {
        drop(self.file);
        let _ = fs::remove_file(&self.temp_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("a.png"));
        assert_eq!(p.to_string_lossy(), "a.png.part");
        let p2 = temp_path(Path::new("/tmp/x/index.html"));
        assert_eq!(p2.to_string_lossy(), "/tmp/x/index.html.part");
    }

    #[test]
    fn finalize_renames() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cdn.example.com").join("a.css");
        ensure_parent(&target).unwrap();
        ensure_parent(&target).unwrap();
        let mut part = PartFile::create(&target).unwrap();
        part.write_chunk(b"body{").unwrap();
        part.write_chunk(b"}").unwrap();
        assert_eq!(part.written(), 6);
        let tp = part.temp_path().to_path_buf();
        assert!(tp.exists());
        part.finalize().unwrap();
        assert!(!tp.exists());
        assert_eq!(fs::read_to_string(&target).unwrap(), "body{}");
    }

    #[test]
    fn discard_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("b.js");
        let mut part = PartFile::create(&target).unwrap();
        part.write_chunk(b"partial").unwrap();
        part.discard();
        assert!(!target.exists());
        assert!(!temp_path(&target).exists());
    }
}
