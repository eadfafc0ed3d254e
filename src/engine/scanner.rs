//! Reference scanner: quoted path candidates in a line of text.
//!
//! The scanner is purely textual. It recognizes path-shaped literals inside
//! quotes, including loader tags (`async:`, `module:`, `css:`) and template
//! interpolation heads, and reports each candidate with its byte span so the
//! rewrite stage can substitute in place.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::ignore::IgnoreSet;

/// Quoted path literal: opening quote, optional loader tags, optional
/// `${…}` head, optional `= ` marker (which disqualifies the match), the
/// path itself, then a closing quote or a backslash.
static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"['"`]"#,
        r"(?:async:)?(?:module:)?(?:async:)?(?:css:)?",
        r"(?:\$\{[^}]*\})?",
        r"(= )?",
        r"([A-Za-z0-9/._@% ()+,=\-]+\.[A-Za-z0-9_ ()\-]+)",
        r#"(?:['"`]|\\)"#,
    ))
    .expect("invalid reference regex")
});

/// A candidate reference found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The captured path text
    pub text: String,
    /// Byte span of the path within the line
    pub span: Range<usize>,
}

/// Scanner verdict for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanLine {
    /// Single-line comment: emitted verbatim, never scanned
    Comment,
    /// Source-map pointer: the line is dropped from output
    SourceMap,
    /// Ordinary line with its candidates in match order
    Candidates(Vec<Candidate>),
}

/// Scan one line for path candidates.
pub fn scan_line(line: &str, ignore: &IgnoreSet) -> ScanLine {
    // Checked before the comment rule: source-map pointers are comments too
    if line.contains("sourceMappingURL=") {
        return ScanLine::SourceMap;
    }
    if line.trim_start().starts_with("//") {
        return ScanLine::Comment;
    }

    let mut candidates = Vec::new();
    for caps in REFERENCE.captures_iter(line) {
        // `= ` before the path means an assignment, not a reference
        if caps.get(1).is_some() {
            continue;
        }
        let path = caps.get(2).expect("path group always present");
        let text = path.as_str();

        if text.starts_with("//") || text.starts_with("http://") || text.starts_with("https://") {
            continue;
        }
        if ignore.contains(text) {
            continue;
        }

        candidates.push(Candidate {
            text: text.to_string(),
            span: path.range(),
        });
    }

    ScanLine::Candidates(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(line: &str) -> ScanLine {
        scan_line(line, &IgnoreSet::default())
    }

    fn texts(line: &str) -> Vec<String> {
        match scan(line) {
            ScanLine::Candidates(c) => c.into_iter().map(|c| c.text).collect(),
            other => panic!("expected candidates, got {other:?}"),
        }
    }

    #[test]
    fn test_comment_line_skipped() {
        assert_eq!(scan("// import '/a.js'"), ScanLine::Comment);
        assert_eq!(scan("   // indented comment"), ScanLine::Comment);
    }

    #[test]
    fn test_source_map_line_dropped() {
        assert_eq!(scan("//# sourceMappingURL=app.js.map"), ScanLine::SourceMap);
        assert_eq!(
            scan("var x = 1; /*# sourceMappingURL=app.js.map */"),
            ScanLine::SourceMap
        );
    }

    #[test]
    fn test_simple_double_quoted_reference() {
        assert_eq!(
            texts(r#"<script src="/games/app.js"></script>"#),
            vec!["/games/app.js"]
        );
    }

    #[test]
    fn test_single_quoted_and_backtick() {
        assert_eq!(texts("import '/a.js';"), vec!["/a.js"]);
        assert_eq!(texts("load(`models/ship.dae`);"), vec!["models/ship.dae"]);
    }

    #[test]
    fn test_loader_tags_stripped() {
        assert_eq!(texts("load('async:module:foo/bar.js')"), vec!["foo/bar.js"]);
        assert_eq!(texts("load('css:theme.css')"), vec!["theme.css"]);
    }

    #[test]
    fn test_interpolation_head_skipped() {
        assert_eq!(texts("fetch(`${base}/data/level.json`)"), vec!["/data/level.json"]);
    }

    #[test]
    fn test_assignment_marker_discards() {
        assert_eq!(texts(r#"attr("= foo/bar.js")"#), Vec::<String>::new());
    }

    #[test]
    fn test_scheme_prefixes_discarded() {
        assert_eq!(texts(r#"a("http://x.com/a.js")"#), Vec::<String>::new());
        assert_eq!(texts(r#"a("https://x.com/a.js")"#), Vec::<String>::new());
        assert_eq!(texts(r#"a("//cdn.example/a.js")"#), Vec::<String>::new());
    }

    #[test]
    fn test_ignore_set_suppresses() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("recache.ignore");
        std::fs::write(&path, r#"{"/debug.js": true}"#).unwrap();
        let ignore = IgnoreSet::load(&path).unwrap();

        let result = scan_line(r#"import "/debug.js";"#, &ignore);
        assert_eq!(result, ScanLine::Candidates(vec![]));
    }

    #[test]
    fn test_multiple_candidates_ordered_with_spans() {
        let line = r#"<link href="a.css"><script src="b.js">"#;
        let ScanLine::Candidates(candidates) = scan(line) else {
            panic!("expected candidates");
        };
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].text, "a.css");
        assert_eq!(candidates[1].text, "b.js");
        assert_eq!(&line[candidates[0].span.clone()], "a.css");
        assert_eq!(&line[candidates[1].span.clone()], "b.js");
    }

    #[test]
    fn test_no_extension_no_match() {
        assert_eq!(texts(r#"push("/games/route")"#), Vec::<String>::new());
    }

    #[test]
    fn test_backslash_closes_candidate() {
        assert_eq!(texts(r#"s = "a/b.js\n";"#), vec!["a/b.js"]);
    }

    #[test]
    fn test_path_with_spaces_and_specials() {
        assert_eq!(
            texts(r#"load("models/big ship (v2).dae")"#),
            vec!["models/big ship (v2).dae"]
        );
    }
}
