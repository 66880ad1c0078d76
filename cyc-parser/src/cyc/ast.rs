//! The Form tree produced by the structure parser.
//!
//! A [`Form`] is a named node holding lines; a [`Line`] is a sequence of
//! [`Item`]s; an item is text, a nested form, or an in-band directive
//! token. The tree is strictly owned top-down: no sharing, no cycles.
//!
//! Forms carry a [`NodeId`] so a rule module can attach per-node state
//! that survives across rendering passes (the HTML module's link registry
//! does exactly that). The id is identity only; structural equality
//! ignores it.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of a [`Form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One element of a [`Line`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    /// A run of plain text.
    Text(String),
    /// A nested form.
    Form(Form),
    /// A directive token such as `"@|"`, resolved later against the
    /// enclosing tag's rule.
    Directive(String),
}

/// An ordered sequence of items.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    pub items: Vec<Item>,
}

impl Line {
    /// Append an item, coalescing adjacent text. A line never holds two
    /// consecutive text items; the parser and rule parse hooks both rely
    /// on pushing through here to keep that invariant.
    pub fn push(&mut self, item: Item) {
        if let Item::Text(ref text) = item {
            if let Some(Item::Text(last)) = self.items.last_mut() {
                last.push_str(text);
                return;
            }
        }
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A named node of the parse tree. The empty name is the implicit top
/// level, which doubles as the anonymous paragraph context.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    pub id: NodeId,
    pub name: String,
    pub lines: Vec<Line>,
}

impl Form {
    /// A freshly opened form, with one empty line ready for deposits.
    pub fn open(name: impl Into<String>) -> Self {
        Form {
            id: NodeId::next(),
            name: name.into(),
            lines: vec![Line::default()],
        }
    }

    /// The zero-content marker deposited by `@name@`.
    pub fn marker(name: impl Into<String>) -> Self {
        Form {
            id: NodeId::next(),
            name: name.into(),
            lines: Vec::new(),
        }
    }

    /// Deposit an item at the end of the last line.
    pub fn deposit(&mut self, item: Item) {
        match self.lines.last_mut() {
            Some(line) => line.push(item),
            None => {
                let mut line = Line::default();
                line.push(item);
                self.lines.push(line);
            }
        }
    }

    /// Start a new line (a paragraph-break signal inside the anonymous
    /// context).
    pub fn break_line(&mut self) {
        self.lines.push(Line::default());
    }

    /// The form's content if it is exactly one line holding exactly one
    /// text item. Used to validate `@begin(...)`/`@end(...)` bodies.
    pub fn single_text(&self) -> Option<&str> {
        if self.lines.len() != 1 {
            return None;
        }
        match self.lines[0].items.as_slice() {
            [Item::Text(text)] => Some(text),
            _ => None,
        }
    }
}

// Structural equality; node identity is deliberately ignored.
impl PartialEq for Form {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.lines == other.lines
    }
}
