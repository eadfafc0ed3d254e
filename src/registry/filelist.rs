//! On-disk file-list cache.
//!
//! Walking a large webroot dominates startup on cold runs; the enumerated
//! listing is persisted as JSON (`recache.filelist`) and reused until the
//! caller asks for a refresh.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One enumerated file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileListEntry {
    /// Logical path relative to the webroot
    pub path: String,
    /// Size in bytes at enumeration time
    pub size: u64,
    /// Modification time, seconds since the epoch
    pub mtime: i64,
}

/// Load a cached file list.
pub fn load_filelist(path: &Path) -> Result<Vec<FileListEntry>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read file list {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse file list {}", path.display()))
}

/// Persist the enumerated file list.
pub fn save_filelist(path: &Path, entries: &[FileListEntry]) -> Result<()> {
    let text = serde_json::to_string(entries)?;
    fs::write(path, text)
        .with_context(|| format!("failed to write file list {}", path.display()))
}
