//! Not-found report.
//!
//! Every candidate that resolved to no registered asset ends up in
//! `recache.notfound`, a JSON object of candidate → true. The file is
//! written on every run so a clean run leaves an empty map behind instead
//! of a stale one.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Write the not-found map as JSON.
pub fn write_notfound(path: &Path, not_found: &BTreeMap<String, bool>) -> Result<()> {
    let text = serde_json::to_string_pretty(not_found)?;
    fs::write(path, text)
        .with_context(|| format!("failed to write report {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_report_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recache.notfound");

        let mut not_found = BTreeMap::new();
        not_found.insert("/missing/thing.js".to_string(), true);
        not_found.insert("/also/gone.css".to_string(), true);

        write_notfound(&path, &not_found).unwrap();

        let loaded: BTreeMap<String, bool> =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, not_found);
    }

    #[test]
    fn test_empty_report_is_empty_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recache.notfound");

        write_notfound(&path, &BTreeMap::new()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
