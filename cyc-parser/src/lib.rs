//! # cyc-parser
//!
//! A parser for the cyc markup format.
//!
//! Cyc is a small tag language: `@name(...)` opens a construct with any of
//! the paired delimiters, `@begin(name)`/`@end(name)` bracket long sections,
//! and `@@` escapes a literal `@`. The parser turns a cyc text into a tree
//! of [Forms](cyc::ast::Form) which a rendering engine walks afterwards.
//!
//! The parser knows nothing about output formats. The only thing it asks of
//! a rule module is the [TagTable](cyc::rules::TagTable) slice of the
//! contract: whether a name is a known tag, whether the tag is leveled, and
//! how to restructure a form when it closes.

pub mod cyc;
