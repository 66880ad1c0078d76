//! The structure parser: a stack machine over the token stream.
//!
//! The parser consumes one token at a time. A lone `@` reads a tag name
//! and an opening delimiter, saves the current form on the stack together
//! with the expected closer, and starts a new form. When the closer
//! arrives the finished form is deposited into its parent, with special
//! handling for `@begin(...)` and `@end(...)` section brackets. Line
//! boundaries synthesize a paragraph-break signal; end of input demands
//! an empty stack.
//!
//! The stack is explicit and heap-allocated, so nesting depth is bounded
//! by memory, not the call stack. Frames are typed: a `Delimited` frame
//! waits for a closing character, a `Section` frame waits for a matching
//! `@end`.

use crate::cyc::ast::{Form, Item};
use crate::cyc::lexing::tokenize;
use crate::cyc::rules::TagTable;
use crate::cyc::token::{closer_for, Token};
use std::collections::VecDeque;
use std::fmt;

/// Errors raised by the structure parser. All are fatal: the first error
/// aborts the parse, there is no recovery mode and no partial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// `@name` is neither `begin`, `end`, nor a declared tag.
    UnknownName(String),
    /// The token after a tag name is not an opening delimiter.
    BadOpener { name: String, token: String },
    /// End of input while a delimited construct is open.
    UnterminatedDelimiter { closer: char, name: String },
    /// End of input while a `@begin` section is open.
    UnterminatedSection { name: String },
    /// A `@begin(...)` body that is not exactly one text item.
    BadBegin,
    /// `@begin(name)` naming something that is not a tag.
    BadBeginName(String),
    /// An `@end(...)` body that is not exactly one text item.
    BadEnd,
    /// `@end(found)` while the open section is named `open`.
    EndMismatch { open: String, found: String },
    /// `@end(found)` inside a delimited construct that must be closed by
    /// `closer` first.
    EndAcrossDelimiter {
        closer: char,
        open: String,
        found: String,
    },
    /// `@end(...)` with no section open at all.
    UnexpectedEnd(String),
    /// A leveled `@begin` while nested inside another construct.
    MisplacedBegin(String),
    /// A leveled tag closed while nested inside another construct.
    MisplacedLevel(String),
    /// A directive token inside a form that has no rule record.
    UnrecognizedDirective { token: String, context: String },
    /// Input ends in the middle of reading a tag.
    UnexpectedEndOfInput,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnknownName(name) => write!(f, "Not a name: @{}", name),
            ParseError::BadOpener { name, token } => {
                write!(f, "Bad opener @{} {}", name, token)
            }
            ParseError::UnterminatedDelimiter { closer, name } => {
                write!(f, "Missing {} to close @{}", closer, name)
            }
            ParseError::UnterminatedSection { name } => {
                write!(f, "Missing @end({})", name)
            }
            ParseError::BadBegin => write!(f, "Bad @begin body"),
            ParseError::BadBeginName(name) => write!(f, "Bad @begin({})", name),
            ParseError::BadEnd => write!(f, "Bad @end body"),
            ParseError::EndMismatch { open, found } => {
                write!(
                    f,
                    "Expected @end({}) and instead saw @end({})",
                    open, found
                )
            }
            ParseError::EndAcrossDelimiter {
                closer,
                open,
                found,
            } => {
                write!(
                    f,
                    "Expected {} to close @{} and instead saw @end({})",
                    closer, open, found
                )
            }
            ParseError::UnexpectedEnd(name) => write!(f, "Unexpected @end({})", name),
            ParseError::MisplacedBegin(name) => write!(f, "Misplaced @begin({})", name),
            ParseError::MisplacedLevel(name) => write!(f, "Misplaced @{}", name),
            ParseError::UnrecognizedDirective { token, context } => {
                write!(f, "Unrecognized {} in @{}", token, context)
            }
            ParseError::UnexpectedEndOfInput => {
                write!(f, "Unexpected end of input after @")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse a cyc text into its top-level form.
pub fn parse(text: &str, tags: &dyn TagTable) -> Result<Form, ParseError> {
    Parser::new(text, tags).run()
}

/// The token stream seen by the parser: real tokens, a paragraph-break
/// signal between lines, and an end-of-input sentinel.
#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Token(Token),
    Break,
    End,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Token(token) => token.lexeme(),
            Tok::Break => "end of line".to_string(),
            Tok::End => "end of input".to_string(),
        }
    }
}

enum Frame {
    /// Parent saved while a delimited `@name(...)` group is open.
    Delimited { parent: Form, closer: char },
    /// Parent saved while a `@begin` section is open.
    Section { parent: Form },
}

struct Parser<'t> {
    tags: &'t dyn TagTable,
    toks: VecDeque<Tok>,
    stack: Vec<Frame>,
    current: Form,
}

impl<'t> Parser<'t> {
    fn new(text: &str, tags: &'t dyn TagTable) -> Self {
        let lines = tokenize(text);
        let last = lines.len() - 1;
        let mut toks = VecDeque::new();
        for (i, line) in lines.into_iter().enumerate() {
            toks.extend(line.into_iter().map(Tok::Token));
            if i != last {
                toks.push_back(Tok::Break);
            }
        }
        toks.push_back(Tok::End);
        Parser {
            tags,
            toks,
            stack: Vec::new(),
            current: Form::open(""),
        }
    }

    fn next(&mut self) -> Tok {
        self.toks.pop_front().unwrap_or(Tok::End)
    }

    fn run(mut self) -> Result<Form, ParseError> {
        loop {
            let tok = self.next();
            match tok {
                Tok::End => {
                    return match self.stack.last() {
                        Some(Frame::Delimited { closer, .. }) => {
                            Err(ParseError::UnterminatedDelimiter {
                                closer: *closer,
                                name: self.current.name.clone(),
                            })
                        }
                        Some(Frame::Section { .. }) => Err(ParseError::UnterminatedSection {
                            name: self.current.name.clone(),
                        }),
                        None => Ok(self.current),
                    };
                }
                Tok::Break => self.current.break_line(),
                Tok::Token(Token::Digraph('@')) => {
                    self.current.deposit(Item::Text("@".to_string()));
                }
                Tok::Token(Token::At) => self.open_tag()?,
                Tok::Token(Token::Delimiter(c)) if self.closes_top(c) => {
                    self.close_delimited()?;
                }
                Tok::Token(Token::Digraph(c)) => {
                    // In-band directive, legal only inside a ruled form.
                    if self.tags.is_tag(&self.current.name) {
                        self.current.deposit(Item::Directive(format!("@{}", c)));
                    } else {
                        return Err(ParseError::UnrecognizedDirective {
                            token: format!("@{}", c),
                            context: self.current.name.clone(),
                        });
                    }
                }
                Tok::Token(Token::Delimiter(c)) => {
                    // A delimiter that closes nothing is plain text.
                    self.current.deposit(Item::Text(c.to_string()));
                }
                Tok::Token(Token::Text(text)) => {
                    self.current.deposit(Item::Text(text));
                }
            }
        }
    }

    fn closes_top(&self, c: char) -> bool {
        matches!(self.stack.last(), Some(Frame::Delimited { closer, .. }) if *closer == c)
    }

    /// `@` seen: read the tag name and the opening delimiter, then either
    /// deposit a zero-content marker (for the self-paired `@` opener) or
    /// push the current form and start a new one.
    fn open_tag(&mut self) -> Result<(), ParseError> {
        let name = match self.next() {
            Tok::Token(token) => token.lexeme().trim().to_string(),
            Tok::Break => String::new(),
            Tok::End => return Err(ParseError::UnexpectedEndOfInput),
        };
        if name != "begin" && name != "end" && !self.tags.is_tag(&name) {
            return Err(ParseError::UnknownName(name));
        }
        let opener = self.next();
        let open = match &opener {
            Tok::Token(Token::Delimiter(c)) => Some(*c),
            Tok::Token(Token::At) => Some('@'),
            _ => None,
        };
        let closer = match open.and_then(closer_for) {
            Some(c) => c,
            None => {
                return Err(ParseError::BadOpener {
                    name,
                    token: opener.describe(),
                })
            }
        };
        if closer == '@' {
            self.current.deposit(Item::Form(Form::marker(name)));
        } else {
            let parent = std::mem::replace(&mut self.current, Form::open(name));
            self.stack.push(Frame::Delimited { parent, closer });
        }
        Ok(())
    }

    /// The top frame's closer arrived: pop it and dispatch on the name of
    /// the form that just finished.
    fn close_delimited(&mut self) -> Result<(), ParseError> {
        let parent = match self.stack.pop() {
            Some(Frame::Delimited { parent, .. }) => parent,
            _ => unreachable!("close_delimited called without a delimited frame"),
        };
        let closed = std::mem::replace(&mut self.current, parent);
        match closed.name.as_str() {
            "begin" => self.begin_section(closed),
            "end" => self.end_section(closed),
            _ => {
                let name = closed.name.clone();
                let closed = self.tags.reparse(closed);
                self.current.deposit(Item::Form(closed));
                if !self.stack.is_empty() && self.tags.level(&name).is_some() {
                    return Err(ParseError::MisplacedLevel(name));
                }
                Ok(())
            }
        }
    }

    /// `@begin(name)` closed: the begin form is replaced with a fresh
    /// section form of the target name; the parent stays on the stack
    /// until the matching `@end`.
    fn begin_section(&mut self, begin: Form) -> Result<(), ParseError> {
        let name = begin
            .single_text()
            .ok_or(ParseError::BadBegin)?
            .trim()
            .to_string();
        if !self.tags.is_tag(&name) {
            return Err(ParseError::BadBeginName(name));
        }
        // Leveled sections may only begin at the outermost nesting.
        if !self.stack.is_empty() && self.tags.level(&name).is_some() {
            return Err(ParseError::MisplacedBegin(name));
        }
        let parent = std::mem::replace(&mut self.current, Form::open(name));
        self.stack.push(Frame::Section { parent });
        Ok(())
    }

    /// `@end(name)` closed: the current form must be the section of that
    /// name, opened by `@begin`. On match it is reparsed and deposited
    /// into the restored parent.
    fn end_section(&mut self, end: Form) -> Result<(), ParseError> {
        let name = end
            .single_text()
            .ok_or(ParseError::BadEnd)?
            .trim()
            .to_string();
        match self.stack.last() {
            Some(Frame::Section { .. }) => {
                if self.current.name != name {
                    return Err(ParseError::EndMismatch {
                        open: self.current.name.clone(),
                        found: name,
                    });
                }
                let parent = match self.stack.pop() {
                    Some(Frame::Section { parent }) => parent,
                    _ => unreachable!(),
                };
                let section = std::mem::replace(&mut self.current, parent);
                let section = self.tags.reparse(section);
                self.current.deposit(Item::Form(section));
                Ok(())
            }
            Some(Frame::Delimited { closer, .. }) => Err(ParseError::EndAcrossDelimiter {
                closer: *closer,
                open: self.current.name.clone(),
                found: name,
            }),
            None => Err(ParseError::UnexpectedEnd(name)),
        }
    }
}
