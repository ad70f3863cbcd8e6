//! Header File Enumerator
//!
//! Walks root directories and yields every header file beneath them.

use iocscan_core::{Error, Result, ScanConfig};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Recursive header enumerator over a set of roots
#[derive(Debug, Clone)]
pub struct HeaderEnumerator {
    roots: Vec<PathBuf>,
    suffix: String,
}

impl HeaderEnumerator {
    pub fn new(roots: Vec<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            roots,
            suffix: suffix.into(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.roots.clone(), config.header_suffix.clone())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Lazily yield header paths, root by root, depth first.
    ///
    /// Within a directory, files come before subdirectories, each group in
    /// file name order. Directory symlinks are not followed. Any walk failure, including a missing
    /// root, is yielded as an `Err`.
    pub fn iter(&self) -> impl Iterator<Item = Result<PathBuf>> + '_ {
        self.roots.iter().flat_map(move |root| {
            WalkDir::new(root)
                .sort_by(|a, b| {
                    let (a_dir, b_dir) = (a.file_type().is_dir(), b.file_type().is_dir());
                    a_dir.cmp(&b_dir).then_with(|| a.file_name().cmp(b.file_name()))
                })
                .into_iter()
                .filter_map(move |entry| match entry {
                    Ok(entry) if self.is_header(&entry) => Some(Ok(entry.into_path())),
                    Ok(_) => None,
                    Err(err) => Some(Err(walk_error(root, err))),
                })
        })
    }

    fn is_header(&self, entry: &DirEntry) -> bool {
        let file_type = entry.file_type();
        let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
        is_file && entry.file_name().to_string_lossy().ends_with(self.suffix.as_str())
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = match err.io_error() {
        Some(io) => io.to_string(),
        None => err.to_string(),
    };
    Error::Walk { path, message }
}
