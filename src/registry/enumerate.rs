//! Webroot enumeration.
//!
//! Walks the webroot and produces the file list the registry is built from.
//! The output directory, hidden entries, and recache control files are
//! excluded so a run never re-ingests its own output.

use std::path::Path;
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::config::{Config, FILELIST_FILE, IGNORE_FILE, NOTFOUND_FILE};
use crate::debug;

use super::{Asset, FileListEntry, FileRegistry};

/// Enumerate the webroot into a file list, skipping the output tree.
pub fn walk_webroot(config: &Config) -> Vec<FileListEntry> {
    let webroot = &config.webroot;
    let mut entries = Vec::new();

    let walker = WalkDir::new(webroot)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || (!is_hidden(entry.file_name().to_str().unwrap_or_default())
                    && entry.path() != config.out_dir)
        });

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(logical) = logical_path(entry.path(), webroot) else {
            continue;
        };
        if is_control_file(&logical) {
            continue;
        }
        let Ok(meta) = entry.metadata() else {
            debug!("scan"; "unreadable metadata for {}", entry.path().display());
            continue;
        };
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_secs() as i64);

        entries.push(FileListEntry {
            path: logical,
            size: meta.len(),
            mtime,
        });
    }

    entries
}

/// Build the registry from a file list.
pub fn build_registry(config: &Config, entries: &[FileListEntry]) -> FileRegistry {
    let mut registry = FileRegistry::new();
    for entry in entries {
        let disk_path = config.webroot.join(&entry.path);
        registry.register(Asset::new(entry.path.clone(), disk_path, entry.size));
    }
    registry
}

/// Webroot-relative logical path with forward slashes.
fn logical_path(path: &Path, webroot: &Path) -> Option<String> {
    let rel = path.strip_prefix(webroot).ok()?;
    let mut logical = String::new();
    for component in rel.components() {
        if !logical.is_empty() {
            logical.push('/');
        }
        logical.push_str(component.as_os_str().to_str()?);
    }
    (!logical.is_empty()).then_some(logical)
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name.len() > 1
}

/// The files recache itself reads and writes in the webroot.
fn is_control_file(logical: &str) -> bool {
    matches!(logical, FILELIST_FILE | IGNORE_FILE | NOTFOUND_FILE) || logical == "recache.toml"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> Config {
        Config::load(&Cli::parse_from(["recache", root.to_str().unwrap()])).unwrap()
    }

    #[test]
    fn test_walk_assigns_logical_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("games/app")).unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("games/app/main.js"), "console.log(1);").unwrap();

        let config = config_for(dir.path());
        let entries = walk_webroot(&config);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, vec!["games/app/main.js", "index.html"]);
    }

    #[test]
    fn test_walk_skips_output_dir_and_control_files() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("cache")).unwrap();
        fs::write(dir.path().join("cache/stale.js"), "old").unwrap();
        fs::write(dir.path().join("recache.ignore"), "{}").unwrap();
        fs::write(dir.path().join("recache.notfound"), "{}").unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();

        let config = config_for(dir.path());
        let entries = walk_webroot(&config);
        let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, vec!["app.js"]);
    }

    #[test]
    fn test_walk_skips_hidden_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
        fs::write(dir.path().join("a.css"), "body {}").unwrap();

        let config = config_for(dir.path());
        let entries = walk_webroot(&config);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "a.css");
    }

    #[test]
    fn test_build_registry_from_entries() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();

        let config = config_for(dir.path());
        let entries = walk_webroot(&config);
        let registry = build_registry(&config, &entries);

        let asset = registry.lookup("/style.css").unwrap();
        assert_eq!(asset.disk_path, dir.path().join("style.css"));
        assert!(asset.is_textual);
    }
}
