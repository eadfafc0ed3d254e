//! Path resolution: textual candidate → registered asset.
//!
//! Pure lookups against the registry, probed in a fixed order: the candidate
//! as written, relative to the referrer's directory, under the configured
//! prefix table, and finally under each immediate child of the shared-assets
//! root. The first hit wins.

use crate::config::ResolverConfig;
use crate::registry::{Asset, FileRegistry};

/// Result of resolving one candidate.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// The candidate names this asset
    Resolved(&'r Asset),
    /// The candidate resolved to the referrer itself; suppressed
    SelfReference,
    /// No registered asset matches
    Unresolved,
}

/// Resolve a candidate from the given referrer.
pub fn resolve<'r>(
    registry: &'r FileRegistry,
    config: &ResolverConfig,
    referrer: &Asset,
    candidate: &str,
) -> Resolution<'r> {
    match first_hit(registry, config, referrer, candidate) {
        Some(asset) if asset.logical == referrer.logical => Resolution::SelfReference,
        Some(asset) => Resolution::Resolved(asset),
        None => Resolution::Unresolved,
    }
}

fn first_hit<'r>(
    registry: &'r FileRegistry,
    config: &ResolverConfig,
    referrer: &Asset,
    candidate: &str,
) -> Option<&'r Asset> {
    // 1. As written
    if let Some(asset) = registry.lookup(candidate) {
        return Some(asset);
    }

    // 2. Against the referrer's logical directory
    let joined = join_relative(referrer.logical_dir(), candidate);
    if let Some(asset) = registry.lookup(&joined) {
        return Some(asset);
    }

    // 3. Under each configured prefix, in order
    for prefix in &config.prefixes {
        if let Some(asset) = registry.lookup(&format!("{prefix}{candidate}")) {
            return Some(asset);
        }
    }

    // 4. Under each immediate child of the shared-assets root
    let shared = &config.shared_root;
    for child in registry.children_of(shared) {
        if let Some(asset) = registry.lookup(&format!("{shared}/{child}/{candidate}")) {
            return Some(asset);
        }
    }

    None
}

/// Join a candidate onto a logical directory, popping one segment per
/// leading `../` and swallowing `./`.
fn join_relative(dir: &str, candidate: &str) -> String {
    let mut segments: Vec<&str> = if dir.is_empty() {
        Vec::new()
    } else {
        dir.split('/').collect()
    };

    let mut rest = candidate;
    loop {
        if let Some(stripped) = rest.strip_prefix("./") {
            rest = stripped;
        } else if let Some(stripped) = rest.strip_prefix("../") {
            segments.pop();
            rest = stripped;
        } else {
            break;
        }
    }

    if segments.is_empty() {
        rest.to_string()
    } else {
        format!("{}/{}", segments.join("/"), rest)
    }
}
