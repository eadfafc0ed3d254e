//! Dependency orchestrator.
//!
//! Owns the processing state for one run and exposes a single operation,
//! [`Engine::process`]. The recursion stack doubles as the dependency DFS
//! stack: cycle detection is a membership check against `in_progress`, and a
//! file discovered mid-cycle is queued for one deferred re-run once the
//! ancestor it waits on has been emitted.
//!
//! # Cycle semantics
//!
//! When `a` and `b` reference each other, the first pass hashes `b` under the
//! assumption that `a`'s output name derives from `a`'s original bytes. Once
//! `a` is final, `b` is reprocessed: its content then carries `a`'s real
//! hashed name, but its own output name keeps the hash computed in the first
//! pass. The fix-point is deliberately broken; the alternative never
//! terminates.

use anyhow::{Result, bail};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::emit::{self, EmitOutcome};
use crate::ignore::IgnoreSet;
use crate::registry::{Asset, FileRegistry};
use crate::{debug, log};

use super::hash::{joined_hash, short_hash};
use super::rewrite;

/// Result of asking the orchestrator to process an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Emitted, or already emitted; the output-name hash is available
    Done,
    /// The asset is on the recursion stack; caller must defer
    Pending,
    /// Refused: entry points are only reachable as traversal roots
    Entry,
}

/// Per-run mutable state, owned by the engine.
#[derive(Debug, Default)]
pub(super) struct ProcessingState {
    /// Logical paths currently on the recursion stack
    pub(super) in_progress: FxHashSet<String>,
    /// Logical paths fully emitted with a final hash
    pub(super) done: FxHashSet<String>,
    /// Hash of original on-disk bytes, memoized
    pub(super) plain_hash: FxHashMap<String, String>,
    /// Hash of rewritten output computed under a cycle-break assumption
    pub(super) special_hash: FxHashMap<String, String>,
    /// Final hash embedded in the output filename
    pub(super) merkle_hash: FxHashMap<String, String>,
    /// Where each done asset was emitted
    pub(super) output_path: FxHashMap<String, PathBuf>,
    /// Dependents to reprocess once the keyed asset completes
    pub(super) pending: FxHashMap<String, Vec<String>>,
    /// Every asset present in some `pending` queue
    pub(super) inv_pending: FxHashSet<String>,
    /// Candidates that resolved to nothing (sorted for the report)
    pub(super) not_found: BTreeMap<String, bool>,
}

/// The dependency-resolution and hashing engine for one run.
pub struct Engine<'a> {
    pub(super) registry: &'a FileRegistry,
    pub(super) config: &'a Config,
    pub(super) ignore: &'a IgnoreSet,
    pub(super) state: ProcessingState,
    /// Canonical logical paths of the entry set
    entry_set: FxHashSet<String>,
    /// Timestamp comment text, fixed for the whole run
    timestamp: String,
}

impl<'a> Engine<'a> {
    pub fn new(registry: &'a FileRegistry, config: &'a Config, ignore: &'a IgnoreSet) -> Self {
        let entry_set = config
            .entries
            .iter()
            .filter_map(|entry| registry.lookup(entry))
            .map(|asset| asset.logical.clone())
            .collect();

        let timestamp = config.timestamp.clone().unwrap_or_else(|| {
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
        });

        Self {
            registry,
            config,
            ignore,
            state: ProcessingState::default(),
            entry_set,
            timestamp,
        }
    }

    /// Process every entry in order.
    pub fn run(&mut self) -> Result<()> {
        let config = self.config;
        let registry = self.registry;
        for entry in &config.entries {
            let Some(asset) = registry.lookup(entry) else {
                log!("error"; "entry {} is not a registered file", entry);
                continue;
            };
            debug!("entry"; "processing {}", asset.logical);
            self.process(asset)?;
            debug_assert!(self.state.in_progress.is_empty());
        }
        Ok(())
    }

    /// Process one asset: emit it (and its transitive dependencies) into the
    /// cache, or report why not.
    pub fn process(&mut self, asset: &Asset) -> Result<Outcome> {
        self.process_inner(asset, false)
    }

    /// Number of assets emitted so far.
    pub fn done_count(&self) -> usize {
        self.state.done.len()
    }

    /// Unresolved candidates, sorted.
    pub fn not_found(&self) -> &BTreeMap<String, bool> {
        &self.state.not_found
    }

    // ------------------------------------------------------------------------
    // Core recursion
    // ------------------------------------------------------------------------

    pub(super) fn process_inner(&mut self, asset: &Asset, pending_ok: bool) -> Result<Outcome> {
        let logical = asset.logical.as_str();

        // Entry points are reachable only as roots of the traversal
        if !self.state.in_progress.is_empty() && self.entry_set.contains(logical) {
            return Ok(Outcome::Entry);
        }

        // Cycle: hand the caller the plain hash as a placeholder
        if self.state.in_progress.contains(logical) {
            if self.config.loops {
                log!("loops"; "cycle detected at {}", logical);
            }
            if !self.state.plain_hash.contains_key(logical) {
                match fs::read(&asset.disk_path) {
                    Ok(bytes) => {
                        self.state
                            .plain_hash
                            .insert(logical.to_string(), short_hash(&bytes));
                    }
                    Err(err) => {
                        log!("error"; "failed to read {}: {}", asset.disk_path.display(), err);
                    }
                }
            }
            return Ok(Outcome::Pending);
        }

        if self.state.done.contains(logical) {
            return Ok(Outcome::Done);
        }

        self.state.in_progress.insert(logical.to_string());

        if asset.is_textual {
            self.process_textual(asset, pending_ok)
        } else {
            self.process_opaque(asset)
        }
    }

    /// Scan, rewrite, hash, and emit a textual asset.
    fn process_textual(&mut self, asset: &Asset, pending_ok: bool) -> Result<Outcome> {
        let text = match fs::read_to_string(&asset.disk_path) {
            Ok(text) => text,
            Err(err) => {
                log!("error"; "failed to read {}: {}", asset.disk_path.display(), err);
                self.state.in_progress.remove(asset.logical.as_str());
                return Ok(Outcome::Done);
            }
        };

        let mut lines = Vec::new();
        if let Some(comment) = timestamp_comment(asset, &text, &self.timestamp) {
            lines.push(comment);
        }

        let mut come_back_later = false;
        for line in text.split('\n') {
            let rewritten = rewrite::rewrite_line(self, asset, line)?;
            come_back_later |= rewritten.reprocess;
            lines.push(rewritten.text);
        }

        if come_back_later {
            if pending_ok {
                bail!(
                    "unresolvable cycle: {} deferred again during its re-run",
                    asset.logical
                );
            }
            self.state
                .special_hash
                .insert(asset.logical.clone(), joined_hash(&lines));
            self.state.in_progress.remove(asset.logical.as_str());
            debug!("defer"; "{} waits for an in-progress dependency", asset.logical);
            return Ok(Outcome::Done);
        }

        // A deferred re-run keeps the output name computed in its first pass
        let hash = self
            .state
            .special_hash
            .get(asset.logical.as_str())
            .cloned()
            .unwrap_or_else(|| joined_hash(&lines));
        let out = lines.join("\n");
        self.state
            .merkle_hash
            .insert(asset.logical.clone(), hash.clone());

        let dst = self.output_path_for(asset, &hash);
        match emit::write_text(&dst, out.as_bytes()) {
            Ok(EmitOutcome::Written) => debug!("emit"; "wrote {}", dst.display()),
            Ok(EmitOutcome::Skipped) => debug!("emit"; "kept {}", dst.display()),
            Err(err) => log!("error"; "emit failed for {}: {:#}", asset.logical, err),
        }
        self.state.output_path.insert(asset.logical.clone(), dst);

        self.complete(&asset.logical)
    }

    /// Hash an opaque asset's bytes and copy it into the cache.
    fn process_opaque(&mut self, asset: &Asset) -> Result<Outcome> {
        let logical = asset.logical.as_str();

        if !self.state.plain_hash.contains_key(logical) {
            match fs::read(&asset.disk_path) {
                Ok(bytes) => {
                    self.state
                        .plain_hash
                        .insert(logical.to_string(), short_hash(&bytes));
                }
                Err(err) => {
                    log!("error"; "failed to read {}: {}", asset.disk_path.display(), err);
                    self.state.in_progress.remove(logical);
                    return Ok(Outcome::Done);
                }
            }
        }

        let hash = self.state.plain_hash[logical].clone();
        self.state
            .merkle_hash
            .insert(logical.to_string(), hash.clone());

        let dst = self.output_path_for(asset, &hash);
        match emit::copy_binary(&asset.disk_path, &dst) {
            Ok(EmitOutcome::Written) => debug!("emit"; "copied {}", dst.display()),
            Ok(EmitOutcome::Skipped) => debug!("emit"; "kept {}", dst.display()),
            Err(err) => log!("error"; "emit failed for {}: {:#}", asset.logical, err),
        }
        self.state.output_path.insert(logical.to_string(), dst);

        self.complete(&asset.logical)
    }

    /// Mark done and reprocess everything that deferred on this asset.
    fn complete(&mut self, logical: &str) -> Result<Outcome> {
        debug_assert!(
            self.state.output_path.contains_key(logical),
            "completed {logical} without an output path"
        );
        self.state.in_progress.remove(logical);
        self.state.done.insert(logical.to_string());

        let registry = self.registry;
        let deferred = self.state.pending.remove(logical).unwrap_or_default();
        for dependent in deferred {
            self.state.in_progress.remove(dependent.as_str());
            self.state.inv_pending.remove(dependent.as_str());
            self.state.done.remove(dependent.as_str());

            if self.config.loops {
                log!("loops"; "reprocessing {} now that {} is final", dependent, logical);
            }
            let Some(asset) = registry.lookup(&dependent) else {
                continue;
            };
            self.process_inner(asset, true)?;
        }

        Ok(Outcome::Done)
    }

    // ------------------------------------------------------------------------
    // Support for the rewrite stage
    // ------------------------------------------------------------------------

    /// The hash that names (or will name) the target's output file.
    pub(super) fn output_hash(&self, logical: &str) -> Option<&str> {
        self.state
            .merkle_hash
            .get(logical)
            .or_else(|| self.state.special_hash.get(logical))
            .map(String::as_str)
    }

    /// Plain hash placeholder for a dependency still on the stack.
    pub(super) fn placeholder_hash(&self, logical: &str) -> Option<&str> {
        self.state.plain_hash.get(logical).map(String::as_str)
    }

    /// Queue `dependent` for one re-run after `target` completes.
    pub(super) fn enqueue_pending(&mut self, target: &str, dependent: &str) {
        if self.state.inv_pending.insert(dependent.to_string()) {
            self.state
                .pending
                .entry(target.to_string())
                .or_default()
                .push(dependent.to_string());
        }
    }

    /// Record an unresolved candidate for the end-of-run report.
    pub(super) fn record_not_found(&mut self, candidate: &str) {
        debug!("resolve"; "no asset found for {}", candidate);
        self.state.not_found.insert(candidate.to_string(), true);
    }

    /// Where this asset lands in the cache.
    fn output_path_for(&self, asset: &Asset, hash: &str) -> PathBuf {
        let rel = if self.entry_set.contains(asset.logical.as_str()) {
            format!("{}{}", asset.base, asset.ext)
        } else {
            format!("{}_{}__{}", asset.base, hash, asset.ext)
        };
        self.config.out_dir.join(rel.trim_start_matches('/'))
    }
}

/// The prepended comment line, when the format admits one.
fn timestamp_comment(asset: &Asset, text: &str, timestamp: &str) -> Option<String> {
    match asset.ext.as_str() {
        ".html" | ".css" => Some(format!("<!-- Updated: {timestamp} -->")),
        ".js" | ".mjs" => {
            let first = text.split('\n').next().unwrap_or_default();
            (!first.starts_with('{')).then(|| format!("// Updated: {timestamp}"))
        }
        _ => None,
    }
}
