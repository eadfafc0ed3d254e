//! Ignore-list loader.
//!
//! `recache.ignore` is a JSON object mapping candidate strings to `true`.
//! Candidates present here are suppressed by the scanner before resolution,
//! so they are neither rewritten nor reported as missing.

use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fs;
use std::path::Path;

/// Set of candidate strings the scanner must suppress.
#[derive(Debug, Default)]
pub struct IgnoreSet {
    entries: FxHashSet<String>,
}

impl IgnoreSet {
    /// Load from a JSON file; a missing file yields an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read ignore list {}", path.display()))?;
        let map: FxHashMap<String, bool> = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse ignore list {}", path.display()))?;

        let entries = map
            .into_iter()
            .filter_map(|(candidate, enabled)| enabled.then_some(candidate))
            .collect();
        Ok(Self { entries })
    }

    /// Whether a candidate is suppressed.
    #[inline]
    pub fn contains(&self, candidate: &str) -> bool {
        self.entries.contains(candidate)
    }

    /// Number of suppressed candidates.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
