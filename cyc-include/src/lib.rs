//! # cyc-include
//!
//! Recursive `@include` expansion, run on raw text before parsing.
//!
//! The scanner looks for unescaped `@include` markers, reads the key
//! between one of the six delimiter pairs, asks the caller-supplied
//! [`Resolver`] for the substitution, splices it in, and resumes the
//! scan from the same offset. Resolved text may therefore itself contain
//! further `@include` directives, which are expanded before the scan
//! moves on. Inclusions are resolved strictly one at a time, in text
//! order, never concurrently.
//!
//! Escaping follows the parser's digraph convention: `@@` is a literal
//! `@`, so a run of `@` of even length in front of `include` is escaped
//! text (`@@include` does not fire) while an odd-length run ends with a
//! live marker (`@@@include` fires).
//!
//! There is no depth limit and no cycle detection: a key whose
//! substitution includes itself will not terminate. That is the caller's
//! responsibility, deliberately, rather than a guessed-at guard here.
//!
//! Resolution is asynchronous so keys can come from the file system, a
//! database, or anything else; the includer itself is runtime-agnostic.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;

const MARKER: &str = "@include";

/// The six delimiter pairs a key can be wrapped in.
static KEY_PAIR: Lazy<HashMap<char, char>> = Lazy::new(|| {
    HashMap::from([
        ('"', '"'),
        ('\'', '\''),
        ('<', '>'),
        ('(', ')'),
        ('[', ']'),
        ('{', '}'),
    ])
});

/// Failure reported by a [`Resolver`] for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError(pub String);

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ResolveError {}

/// Errors raised during include expansion. A failure aborts the whole
/// run; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeError {
    /// The character after `@include` is not an opening delimiter.
    MissingQuote { offset: usize },
    /// The opening delimiter's closer never arrives.
    MissingClose { close: char, offset: usize },
    /// The resolver failed for a key.
    Resolution { key: String, reason: String },
}

impl fmt::Display for IncludeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncludeError::MissingQuote { offset } => {
                write!(f, "Missing quote after @include at offset {}", offset)
            }
            IncludeError::MissingClose { close, offset } => {
                write!(f, "Missing {} after @include at offset {}", close, offset)
            }
            IncludeError::Resolution { key, reason } => {
                write!(f, "Could not include \"{}\": {}", key, reason)
            }
        }
    }
}

impl std::error::Error for IncludeError {}

/// Maps an include key to its substitution text. The opening delimiter
/// is passed along so a resolver can treat `"file"` differently from
/// `<system>` if it wants to.
pub trait Resolver {
    fn resolve(
        &mut self,
        key: &str,
        open: char,
    ) -> impl Future<Output = Result<String, ResolveError>>;
}

/// A resolver backed by a fixed key-to-text map. Handy for tests and
/// for self-contained documents.
#[derive(Debug, Default, Clone)]
pub struct MapResolver {
    entries: HashMap<String, String>,
}

impl MapResolver {
    pub fn new() -> Self {
        MapResolver::default()
    }

    pub fn with(mut self, key: &str, text: &str) -> Self {
        self.entries.insert(key.to_string(), text.to_string());
        self
    }
}

impl Resolver for MapResolver {
    async fn resolve(&mut self, key: &str, _open: char) -> Result<String, ResolveError> {
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| ResolveError(format!("no entry for key \"{}\"", key)))
    }
}

/// True when the marker starting at `head` is live: the `@` run it ends
/// is of odd length. An even run is pairs of escaped `@` signs.
fn marker_is_live(text: &str, head: usize) -> bool {
    let mut ats = 1; // the marker's own @
    for c in text[..head].chars().rev() {
        if c != '@' {
            break;
        }
        ats += 1;
    }
    ats % 2 == 1
}

/// Expand every unescaped `@include` in `text`, recursively, resolving
/// keys through `resolver`. Each inclusion is fully expanded (nested
/// inclusions included) before the scan continues past it.
pub async fn include<R: Resolver>(
    mut text: String,
    resolver: &mut R,
) -> Result<String, IncludeError> {
    // head never moves backwards; material before it is known clean.
    let mut head = 0;
    loop {
        let found = match text[head..].find(MARKER) {
            Some(offset) => head + offset,
            None => return Ok(text),
        };
        if !marker_is_live(&text, found) {
            head = found + MARKER.len();
            continue;
        }
        head = found;

        // Skip one optional space between the marker and the key.
        let mut middle = head + MARKER.len();
        if text[middle..].starts_with(' ') {
            middle += 1;
        }

        let open = match text[middle..].chars().next() {
            Some(c) => c,
            None => return Err(IncludeError::MissingQuote { offset: middle }),
        };
        let close = match KEY_PAIR.get(&open) {
            Some(c) => *c,
            None => return Err(IncludeError::MissingQuote { offset: middle }),
        };

        // The openers are all ASCII, so the key starts one byte in.
        let key_start = middle + 1;
        let tail = match text[key_start..].find(close) {
            Some(offset) => key_start + offset,
            None => {
                return Err(IncludeError::MissingClose {
                    close,
                    offset: middle,
                })
            }
        };
        let key = text[key_start..tail].to_string();

        let data = resolver
            .resolve(&key, open)
            .await
            .map_err(|e| IncludeError::Resolution {
                key: key.clone(),
                reason: e.0,
            })?;

        // Splice and rescan from the same offset, so the substitution's
        // own @include directives are expanded too.
        text.replace_range(head..tail + 1, &data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn expand(text: &str, resolver: &mut MapResolver) -> Result<String, IncludeError> {
        include(text.to_string(), resolver).await
    }

    #[tokio::test]
    async fn test_no_includes_is_identity() {
        let mut r = MapResolver::new();
        assert_eq!(expand("plain text", &mut r).await.unwrap(), "plain text");
    }

    #[tokio::test]
    async fn test_basic_splice() {
        let mut r = MapResolver::new().with("a", "SPLICED");
        assert_eq!(
            expand("before @include \"a\" after", &mut r).await.unwrap(),
            "before SPLICED after"
        );
    }

    #[tokio::test]
    async fn test_no_space_and_every_pair() {
        let mut r = MapResolver::new().with("k", "X");
        for text in [
            "@include\"k\"",
            "@include'k'",
            "@include<k>",
            "@include(k)",
            "@include[k]",
            "@include{k}",
        ] {
            assert_eq!(expand(text, &mut r).await.unwrap(), "X", "for {}", text);
        }
    }

    #[tokio::test]
    async fn test_nested_include_resolves_before_completion() {
        let mut r = MapResolver::new()
            .with("a", "[@include \"b\"]")
            .with("b", "inner");
        assert_eq!(expand("@include \"a\"", &mut r).await.unwrap(), "[inner]");
    }

    #[tokio::test]
    async fn test_multiple_includes_in_order() {
        let mut r = MapResolver::new().with("a", "1").with("b", "2");
        assert_eq!(
            expand("@include \"a\" and @include \"b\"", &mut r)
                .await
                .unwrap(),
            "1 and 2"
        );
    }

    #[tokio::test]
    async fn test_escaped_marker_does_not_fire() {
        let mut r = MapResolver::new().with("a", "X");
        assert_eq!(
            expand("@@include \"a\"", &mut r).await.unwrap(),
            "@@include \"a\""
        );
    }

    #[tokio::test]
    async fn test_doubly_escaped_marker_fires() {
        let mut r = MapResolver::new().with("a", "X");
        assert_eq!(expand("@@@include \"a\"", &mut r).await.unwrap(), "@@X");
    }

    #[tokio::test]
    async fn test_missing_quote() {
        let mut r = MapResolver::new();
        let err = expand("@include a", &mut r).await.unwrap_err();
        assert!(matches!(err, IncludeError::MissingQuote { .. }));
    }

    #[tokio::test]
    async fn test_missing_close() {
        let mut r = MapResolver::new();
        let err = expand("@include \"a", &mut r).await.unwrap_err();
        assert_eq!(
            err,
            IncludeError::MissingClose {
                close: '"',
                offset: 9
            }
        );
    }

    #[tokio::test]
    async fn test_resolver_failure_reports_the_key() {
        let mut r = MapResolver::new();
        let err = expand("@include \"ghost\"", &mut r).await.unwrap_err();
        match err {
            IncludeError::Resolution { key, .. } => assert_eq!(key, "ghost"),
            other => panic!("expected resolution failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_substitution_text_is_rescanned_in_place() {
        // "a" produces text whose include sits before more literal text;
        // the nested expansion lands exactly where the marker was.
        let mut r = MapResolver::new()
            .with("a", "@include \"b\" tail")
            .with("b", "HEAD");
        assert_eq!(
            expand("pre @include \"a\" post", &mut r).await.unwrap(),
            "pre HEAD tail post"
        );
    }

    #[tokio::test]
    async fn test_empty_key_is_passed_through_to_resolver() {
        let mut r = MapResolver::new().with("", "E");
        assert_eq!(expand("@include \"\"", &mut r).await.unwrap(), "E");
    }
}
