//! Run configuration for `recache.toml` plus CLI overrides.
//!
//! The config file is optional; every field has a workload default. CLI
//! options always win over file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Default entry files when neither the CLI nor the config supplies any.
pub const DEFAULT_ENTRIES: &[&str] = &["index.html", "tester.html"];

/// Name of the not-found report written at end of run.
pub const NOTFOUND_FILE: &str = "recache.notfound";

/// Name of the ignore-list file looked up in the webroot.
pub const IGNORE_FILE: &str = "recache.ignore";

/// Name of the file-list cache in the webroot.
pub const FILELIST_FILE: &str = "recache.filelist";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing recache.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Webroot being processed (internal use only)
    #[serde(skip)]
    pub webroot: PathBuf,

    /// Output cache directory (internal use only)
    #[serde(skip)]
    pub out_dir: PathBuf,

    /// Entry files kept under their original names, in processing order
    #[serde(default)]
    pub entries: Vec<String>,

    /// Informational logging
    #[serde(default)]
    pub verbose: bool,

    /// Cycle-detection logging
    #[serde(default)]
    pub loops: bool,

    /// Pinned timestamp comment text; None means "now" at startup
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Path-resolution fallback tables
    #[serde(default)]
    pub resolver: ResolverConfig,
}

/// Resolver fallback configuration.
///
/// The prefix table is workload-specific; the defaults reproduce the
/// shipped asset layout so output names stay stable across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Fixed prefixes probed in order for bare candidates
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,

    /// Root whose immediate child directories are probed as a last resort
    #[serde(default = "default_shared_root")]
    pub shared_root: String,
}

fn default_prefixes() -> Vec<String> {
    [
        "/games/sharedAssets-3js/",
        "/games/sharedAssets-3js/particles/",
        "/games/sharedAssets-3js/particles/particles128/",
        "/games/",
        "/games/libs-3js/thrax/",
        "/games/libs-3js/examples/js/",
        "/games/libs-3js/thrax/three86/",
        "/assets/",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

fn default_shared_root() -> String {
    "/games/sharedAssets-3js".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
            shared_root: default_shared_root(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webroot: PathBuf::new(),
            out_dir: PathBuf::new(),
            entries: Vec::new(),
            verbose: false,
            loops: false,
            timestamp: None,
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// Reads `recache.toml` from the webroot when present, then applies CLI
    /// overrides and fills remaining defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli.webroot.join(&cli.config);
        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };

        config.webroot = cli.webroot.clone();
        config.out_dir = cli
            .out
            .clone()
            .unwrap_or_else(|| cli.webroot.join("cache"));
        config.apply_cli(cli);

        if config.entries.is_empty() {
            config.entries = DEFAULT_ENTRIES.iter().map(ToString::to_string).collect();
        }

        Ok(config)
    }

    /// Parse a config file.
    fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// CLI options win over file values.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(entries) = &cli.entries {
            self.entries = entries.clone();
        }
        if let Some(ts) = &cli.timestamp {
            self.timestamp = Some(ts.clone());
        }
        self.verbose |= cli.verbose;
        self.loops |= cli.loops;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli_for(root: &Path, extra: &[&str]) -> Cli {
        let mut args = vec!["recache", root.to_str().unwrap()];
        args.extend_from_slice(extra);
        Cli::parse_from(args)
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&cli_for(dir.path(), &[])).unwrap();

        assert_eq!(config.entries, vec!["index.html", "tester.html"]);
        assert_eq!(config.out_dir, dir.path().join("cache"));
        assert_eq!(config.resolver.prefixes.len(), 8);
        assert_eq!(config.resolver.prefixes[0], "/games/sharedAssets-3js/");
        assert!(!config.verbose);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("recache.toml"),
            r#"
entries = ["main.html"]
loops = true

[resolver]
prefixes = ["/static/"]
shared_root = "/static/shared"
"#,
        )
        .unwrap();

        let config = Config::load(&cli_for(dir.path(), &[])).unwrap();
        assert_eq!(config.entries, vec!["main.html"]);
        assert!(config.loops);
        assert_eq!(config.resolver.prefixes, vec!["/static/"]);
        assert_eq!(config.resolver.shared_root, "/static/shared");
    }

    #[test]
    fn test_cli_wins_over_config_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("recache.toml"), "entries = [\"a.html\"]\n").unwrap();

        let config =
            Config::load(&cli_for(dir.path(), &["--entries", "b.html", "--timestamp", "T0"]))
                .unwrap();
        assert_eq!(config.entries, vec!["b.html"]);
        assert_eq!(config.timestamp.as_deref(), Some("T0"));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("recache.toml"), "entries = 5\n").unwrap();
        assert!(Config::load(&cli_for(dir.path(), &[])).is_err());
    }
}
