//! Tokenization of cyc source text.
//!
//! The text is first split into physical lines (LF, CR and CRLF all
//! terminate a line), then each line is scanned independently with an
//! explicit character-class scanner. Scan priority per position:
//!
//!     1. `@` + digraph punctuation  →  Digraph
//!     2. lone `@`                   →  At
//!     3. a delimiter character      →  Delimiter
//!     4. anything else extends the current Text run
//!
//! A blank line yields an empty token sequence. Tokenization is total and
//! lossless: every character is classified, and joining the lexemes of a
//! line's tokens gives the line back.

use crate::cyc::token::{Token, DELIMITER_CHARS, DIGRAPH_CHARS};

/// Split text into lines on `\n`, `\r` or `\r\n`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(&text[start..]);
    lines
}

/// Tokenize one line.
pub fn tokenize_line(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut i = 0;

    let mut flush = |run: &mut String, tokens: &mut Vec<Token>| {
        if !run.is_empty() {
            tokens.push(Token::Text(std::mem::take(run)));
        }
    };

    while i < chars.len() {
        let c = chars[i];
        if c == '@' {
            flush(&mut run, &mut tokens);
            if i + 1 < chars.len() && DIGRAPH_CHARS.contains(chars[i + 1]) {
                tokens.push(Token::Digraph(chars[i + 1]));
                i += 2;
            } else {
                tokens.push(Token::At);
                i += 1;
            }
        } else if DELIMITER_CHARS.contains(c) {
            flush(&mut run, &mut tokens);
            tokens.push(Token::Delimiter(c));
            i += 1;
        } else {
            run.push(c);
            i += 1;
        }
    }
    flush(&mut run, &mut tokens);
    tokens
}

/// Tokenize a whole text into one token sequence per line.
pub fn tokenize(text: &str) -> Vec<Vec<Token>> {
    split_lines(text).into_iter().map(tokenize_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_lf_cr_crlf() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\rb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn test_plain_text_is_one_run() {
        assert_eq!(
            tokenize_line("hello world"),
            vec![Token::Text("hello world".into())]
        );
    }

    #[test]
    fn test_blank_line_is_empty() {
        assert_eq!(tokenize_line(""), Vec::<Token>::new());
    }

    #[test]
    fn test_delimiters_break_runs() {
        assert_eq!(
            tokenize_line("a(b)c"),
            vec![
                Token::Text("a".into()),
                Token::Delimiter('('),
                Token::Text("b".into()),
                Token::Delimiter(')'),
                Token::Text("c".into()),
            ]
        );
    }

    #[test]
    fn test_at_digraphs() {
        assert_eq!(
            tokenize_line("@@x@!@"),
            vec![
                Token::Digraph('@'),
                Token::Text("x".into()),
                Token::Digraph('!'),
                Token::At,
            ]
        );
    }

    #[test]
    fn test_lone_at_before_name() {
        assert_eq!(
            tokenize_line("@b(x)"),
            vec![
                Token::At,
                Token::Text("b".into()),
                Token::Delimiter('('),
                Token::Text("x".into()),
                Token::Delimiter(')'),
            ]
        );
    }

    #[test]
    fn test_backtick_is_a_delimiter() {
        assert_eq!(
            tokenize_line("a`b`"),
            vec![
                Token::Text("a".into()),
                Token::Delimiter('`'),
                Token::Text("b".into()),
                Token::Delimiter('`'),
            ]
        );
    }
}
