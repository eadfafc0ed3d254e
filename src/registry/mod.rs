//! Asset registry: logical path → asset mapping.
//!
//! The registry is built once by the enumerator and read-only afterwards.
//! Every asset is reachable under both `p/q` and `/p/q`; insertion is
//! first-wins so duplicate logical paths keep the earliest registration.

mod enumerate;
mod filelist;

pub use enumerate::{build_registry, walk_webroot};
pub use filelist::{FileListEntry, load_filelist, save_filelist};

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Extensions treated as rewritable text.
const TEXTUAL_EXTENSIONS: &[&str] = &["js", "mjs", "html", "css", "dae", "json"];

/// Textual files at or above this size are treated as opaque.
const TEXTUAL_SIZE_LIMIT: u64 = 5 * 1024 * 1024;

/// A registered file.
#[derive(Debug, Clone)]
pub struct Asset {
    /// Original on-disk path (absolute or webroot-joined)
    pub disk_path: PathBuf,
    /// Logical path: webroot-relative, forward slashes, no leading slash
    pub logical: String,
    /// Logical path without the extension
    pub base: String,
    /// Extension with leading dot, empty when the file has none
    pub ext: String,
    /// File size in bytes
    pub size: u64,
    /// Whether the rewrite engine descends into this file
    pub is_textual: bool,
}

impl Asset {
    /// Build an asset from its logical path and on-disk location.
    pub fn new(logical: String, disk_path: PathBuf, size: u64) -> Self {
        let (base, ext) = split_extension(&logical);
        let is_textual = classify_textual(&ext, size);
        Self {
            disk_path,
            logical,
            base,
            ext,
            size,
            is_textual,
        }
    }

    /// Logical directory of this asset (`""` for webroot-level files).
    pub fn logical_dir(&self) -> &str {
        match self.logical.rfind('/') {
            Some(idx) => &self.logical[..idx],
            None => "",
        }
    }
}

/// Split a logical path into (base, extension-with-dot).
fn split_extension(logical: &str) -> (String, String) {
    let file_start = logical.rfind('/').map_or(0, |idx| idx + 1);
    match logical[file_start..].rfind('.') {
        // A leading dot names a hidden file, not an extension
        Some(0) | None => (logical.to_string(), String::new()),
        Some(dot) => {
            let split = file_start + dot;
            (logical[..split].to_string(), logical[split..].to_string())
        }
    }
}

/// Textual iff the extension is recognized and the file is small enough.
fn classify_textual(ext: &str, size: u64) -> bool {
    let bare = ext.strip_prefix('.').unwrap_or(ext);
    size < TEXTUAL_SIZE_LIMIT && TEXTUAL_EXTENSIONS.contains(&bare)
}

// ============================================================================
// Registry
// ============================================================================

/// Mapping from logical path to registered asset.
#[derive(Debug, Default)]
pub struct FileRegistry {
    assets: Vec<Asset>,
    index: FxHashMap<String, usize>,
    /// Directory → immediate child directory names, for resolver fallbacks.
    children: FxHashMap<String, BTreeSet<String>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an asset under both `p/q` and `/p/q`. First-wins.
    pub fn register(&mut self, asset: Asset) {
        self.record_directories(&asset.logical);

        let idx = self.assets.len();
        let slashed = format!("/{}", asset.logical);
        let plain = asset.logical.clone();
        self.assets.push(asset);

        self.index.entry(plain).or_insert(idx);
        self.index.entry(slashed).or_insert(idx);
    }

    /// Look up an asset by logical path (with or without leading slash).
    #[inline]
    pub fn lookup(&self, path: &str) -> Option<&Asset> {
        self.index.get(path).map(|&idx| &self.assets[idx])
    }

    /// Immediate child directory names of a logical directory, sorted.
    pub fn children_of<'s>(&'s self, dir: &str) -> impl Iterator<Item = &'s str> + 's {
        let key = dir.trim_matches('/');
        self.children
            .get(key)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Number of registered assets.
    #[inline]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Record every directory segment of a logical path into the child map.
    fn record_directories(&mut self, logical: &str) {
        let Some(dir_end) = logical.rfind('/') else {
            return;
        };

        let mut parent = String::new();
        for segment in logical[..dir_end].split('/') {
            if segment.is_empty() {
                continue;
            }
            self.children
                .entry(parent.clone())
                .or_default()
                .insert(segment.to_string());
            if !parent.is_empty() {
                parent.push('/');
            }
            parent.push_str(segment);
        }
    }
}
