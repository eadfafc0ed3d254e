//! Reference rewriting for one line of text.
//!
//! Each scanned candidate is resolved, its target is processed, and the
//! matched span is replaced with the target's hashed output path. Spans are
//! substituted left to right with a running offset so later spans stay
//! valid after earlier replacements change the line length.

use anyhow::Result;

use crate::registry::Asset;

use super::orchestrator::{Engine, Outcome};
use super::resolver::{Resolution, resolve};
use super::scanner::{ScanLine, scan_line};

/// One rewritten line, plus whether the file must be reprocessed later.
pub(super) struct RewrittenLine {
    pub text: String,
    pub reprocess: bool,
}

/// Rewrite every resolvable reference in a line.
pub(super) fn rewrite_line(
    engine: &mut Engine<'_>,
    referrer: &Asset,
    line: &str,
) -> Result<RewrittenLine> {
    let candidates = match scan_line(line, engine.ignore) {
        ScanLine::Comment => {
            return Ok(RewrittenLine {
                text: line.to_string(),
                reprocess: false,
            });
        }
        ScanLine::SourceMap => {
            return Ok(RewrittenLine {
                text: String::new(),
                reprocess: false,
            });
        }
        ScanLine::Candidates(candidates) => candidates,
    };

    let registry = engine.registry;
    let resolver_config = &engine.config.resolver;

    let mut text = line.to_string();
    let mut offset = 0isize;
    let mut reprocess = false;

    for candidate in candidates {
        let target = match resolve(registry, resolver_config, referrer, &candidate.text) {
            Resolution::Resolved(asset) => asset,
            Resolution::SelfReference => continue,
            Resolution::Unresolved => {
                if candidate.text.contains('/') {
                    engine.record_not_found(&candidate.text);
                }
                continue;
            }
        };

        let replacement = match engine.process_inner(target, false)? {
            // Entries keep their stable URL
            Outcome::Entry => Some(absolute(&target.logical)),
            Outcome::Done => engine
                .output_hash(&target.logical)
                .map(|hash| hashed_ref(target, hash)),
            Outcome::Pending => {
                // Placeholder now; this file re-runs once the target is final
                reprocess = true;
                engine.enqueue_pending(&target.logical, &referrer.logical);
                engine
                    .placeholder_hash(&target.logical)
                    .map(|hash| hashed_ref(target, hash))
            }
        };

        let Some(replacement) = replacement else {
            // No hash to substitute: the span stays as written
            continue;
        };

        let start = (candidate.span.start as isize + offset) as usize;
        let end = (candidate.span.end as isize + offset) as usize;
        text.replace_range(start..end, &replacement);
        offset += replacement.len() as isize - candidate.span.len() as isize;
    }

    Ok(RewrittenLine { text, reprocess })
}

/// `/base_{hash}__.{ext}`, absolute.
fn hashed_ref(target: &Asset, hash: &str) -> String {
    let slash = if target.logical.starts_with('/') { "" } else { "/" };
    format!("{slash}{}_{}__{}", target.base, hash, target.ext)
}

/// The target's original path, made absolute if it is not already.
fn absolute(logical: &str) -> String {
    if logical.starts_with('/') {
        logical.to_string()
    } else {
        format!("/{logical}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn asset(logical: &str) -> Asset {
        Asset::new(logical.to_string(), PathBuf::from(logical), 10)
    }

    #[test]
    fn test_hashed_ref_shape() {
        assert_eq!(
            hashed_ref(&asset("games/app.js"), "abc123"),
            "/games/app_abc123__.js"
        );
        assert_eq!(hashed_ref(&asset("style.css"), "d41d8c"), "/style_d41d8c__.css");
    }

    #[test]
    fn test_absolute() {
        assert_eq!(absolute("index.html"), "/index.html");
        assert_eq!(absolute("/index.html"), "/index.html");
    }
}
