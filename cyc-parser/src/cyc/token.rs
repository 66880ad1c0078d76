//! Token types and the character classes that drive the tokenizer.
//!
//! Class membership is kept as data rather than scattered conditionals:
//! the digraph-eligible punctuation, the delimiter set, and the
//! opener-to-closer pairing each live in one table here.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Punctuation that forms a digraph token when preceded by `@`.
/// `@@` is the self-escape for a literal `@`; the other digraphs are
/// directive tokens whose meaning is up to the rule module.
pub const DIGRAPH_CHARS: &str = "!#$%&*+,-./:;=?@\\^_`|~";

/// Characters that always tokenize as a single [`Token::Delimiter`].
pub const DELIMITER_CHARS: &str = "()[]{}<>'\"`";

/// Opener-to-closer table for tag delimiters. The quotes and `@` pair
/// with themselves; an `@` closer means a zero-content marker.
pub static PAIR: Lazy<HashMap<char, char>> = Lazy::new(|| {
    HashMap::from([
        ('(', ')'),
        ('[', ']'),
        ('{', '}'),
        ('<', '>'),
        ('\'', '\''),
        ('"', '"'),
        ('`', '`'),
        ('@', '@'),
    ])
});

/// Look up the closing character for an opening delimiter.
pub fn closer_for(open: char) -> Option<char> {
    PAIR.get(&open).copied()
}

/// One lexical token. Every character of a line belongs to exactly one
/// token; there is no failure mode in tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    /// A maximal run of characters containing no `@` and no delimiter.
    Text(String),
    /// A single character from [`DELIMITER_CHARS`].
    Delimiter(char),
    /// A lone `@`, starting a tag.
    At,
    /// `@` followed by one character from [`DIGRAPH_CHARS`].
    Digraph(char),
}

impl Token {
    /// The exact source text of the token. Concatenating the lexemes of a
    /// line's tokens reproduces the line.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Text(text) => text.clone(),
            Token::Delimiter(c) => c.to_string(),
            Token::At => "@".to_string(),
            Token::Digraph(c) => format!("@{}", c),
        }
    }
}
