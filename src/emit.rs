//! Atomic file emission into the output cache.
//!
//! Both operations stage a temporary sibling (suffixed with the process id,
//! so it lands on the same filesystem) and rename it into place. A
//! destination that already exists as a regular file is skipped; output
//! names embed content hashes, so an existing file is already correct.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// What an emit operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// File written or copied into place
    Written,
    /// Destination already existed as a regular file
    Skipped,
}

/// Write rewritten text to the cache atomically.
pub fn write_text(dst: &Path, bytes: &[u8]) -> Result<EmitOutcome> {
    if dst.is_file() {
        return Ok(EmitOutcome::Skipped);
    }
    stage(dst, |tmp| {
        fs::write(tmp, bytes).with_context(|| format!("failed to write {}", tmp.display()))
    })
}

/// Copy an opaque file to the cache atomically.
pub fn copy_binary(src: &Path, dst: &Path) -> Result<EmitOutcome> {
    if dst.is_file() {
        return Ok(EmitOutcome::Skipped);
    }
    stage(dst, |tmp| {
        fs::copy(src, tmp)
            .map(|_| ())
            .with_context(|| format!("failed to copy {} to {}", src.display(), tmp.display()))
    })
}

/// Create parents, run `fill` on the temp sibling, swap it into place.
fn stage(dst: &Path, fill: impl FnOnce(&Path) -> Result<()>) -> Result<EmitOutcome> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = temp_sibling(dst);
    if let Err(err) = fill(&tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }

    // The target may linger from an earlier interrupted run
    let _ = fs::remove_file(dst);
    if let Err(err) = fs::rename(&tmp, dst) {
        let _ = fs::remove_file(&tmp);
        return Err(err).with_context(|| format!("failed to move into {}", dst.display()));
    }
    Ok(EmitOutcome::Written)
}

/// Temp path next to the destination, suffixed with the process id.
fn temp_sibling(dst: &Path) -> PathBuf {
    let name = dst
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dst.with_file_name(format!("{name}.{}", std::process::id()))
}
