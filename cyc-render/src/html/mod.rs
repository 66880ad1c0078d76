//! The single-file HTML rule module.
//!
//! Three passes: `link` records each section's link key, `name` registers
//! link keys against their display text (and captures the document
//! title), `gen` emits the HTML body. The finalizer wraps the `gen`
//! product in a complete document shell.
//!
//! Cross-pass state lives in one [`State`] per rule table: the link
//! registry maps lowercased keys to display text, and per-node link keys
//! are stored against [`NodeId`]s so the `gen` pass can anchor headings
//! recorded two passes earlier. One `rules()` call serves one document
//! compilation; build a fresh table per document.

use crate::rules::{CloseHook, Product, Rule, Rules, Transform};
use cyc_parser::cyc::ast::{Form, Item, Line, NodeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub const PASS_LINK: &str = "link";
pub const PASS_NAME: &str = "name";
pub const PASS_GEN: &str = "gen";

#[derive(Default)]
struct State {
    title: String,
    /// Link key per node, recorded in the link pass.
    links: HashMap<NodeId, String>,
    /// Lowercased link key to display text, recorded in the name pass.
    registry: HashMap<String, String>,
}

type Shared = Rc<RefCell<State>>;

/// Escape the characters HTML cares about.
pub fn entityify(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_special(c: char) -> bool {
    matches!(c, '!'..='@' | '['..='^' | '`' | '{'..='~')
}

/// Lowercase the text and replace ASCII specials and digits with their
/// hex char codes, making link keys safe as anchors, filenames and urls.
pub fn special_encode(text: &str) -> String {
    let mut out = String::new();
    for c in text.to_lowercase().chars() {
        if is_special(c) {
            out.push_str(&format!("{:X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// A link-pass transform that records the trimmed text as this node's
/// link key.
fn stuff_link(state: &Shared) -> Transform {
    let state = Rc::clone(state);
    Transform::apply(move |text, form| {
        let text = text.trim().to_string();
        state.borrow_mut().links.insert(form.id, text.clone());
        text
    })
}

/// A name-pass transform that registers this node's link key against its
/// display text.
fn stuff_name(state: &Shared) -> Transform {
    let state = Rc::clone(state);
    Transform::apply(move |text, form| {
        let mut state = state.borrow_mut();
        let key = state.links.get(&form.id).map(|k| k.to_lowercase());
        if let Some(key) = key {
            state.registry.insert(key, text.clone());
        }
        text
    })
}

/// A gen-pass transform wrapping the text in a heading anchored at the
/// node's link key. No recorded key, no id attribute.
fn wrap(state: &Shared, tag: &'static str) -> Transform {
    let state = Rc::clone(state);
    Transform::apply(move |text, form| {
        match state.borrow().links.get(&form.id) {
            Some(key) => format!("\n<{0} id=\"{1}\">{2}</{0}>", tag, special_encode(key), text),
            None => format!("\n<{0}>{1}</{0}>", tag, text),
        }
    })
}

/// A leveled sectioning rule: link key from its own text, registered
/// display name, heading output.
fn section_rule(state: &Shared, level: i64, tag: &'static str) -> Rule {
    Rule::new()
        .level(level)
        .on(PASS_LINK, stuff_link(state))
        .on(PASS_NAME, stuff_name(state))
        .on(PASS_GEN, wrap(state, tag))
}

/// An inline rule that wraps the same markup in both visible passes.
fn inline(prefix: &str, suffix: &str) -> Rule {
    Rule::new()
        .on(PASS_NAME, Transform::wrap(prefix, suffix))
        .on(PASS_GEN, Transform::wrap(prefix, suffix))
}

/// Restructure a table form on close: `@_` starts a row, `@|` starts a
/// cell, a leading `@!` turns the current cell into a header cell.
/// Directive tokens never survive into the restructured form.
fn restructure_table(form: Form) -> Form {
    let name = form.name.clone();
    let mut rows: Vec<Form> = Vec::new();
    let mut cells: Vec<Form> = Vec::new();
    let mut cell = Form::open("-td");

    let finish_cell = |cells: &mut Vec<Form>, cell: &mut Form| {
        cells.push(std::mem::replace(cell, Form::open("-td")));
    };
    fn finish_row(rows: &mut Vec<Form>, cells: Vec<Form>) {
        let mut row = Form::open("-tr");
        for cell in cells {
            row.deposit(Item::Form(cell));
        }
        rows.push(row);
    }

    for line in form.lines {
        for item in line.items {
            match item {
                Item::Directive(ref token) if token == "@!" => {
                    cell.name = "-th".to_string();
                }
                Item::Directive(ref token) if token == "@|" => {
                    finish_cell(&mut cells, &mut cell);
                }
                Item::Directive(ref token) if token == "@_" => {
                    finish_cell(&mut cells, &mut cell);
                    finish_row(&mut rows, std::mem::take(&mut cells));
                }
                other => cell.deposit(other),
            }
        }
    }
    cells.push(cell);
    finish_row(&mut rows, cells);

    let mut table = Form::open(name);
    for row in rows {
        table.deposit(Item::Form(row));
    }
    table
}

/// Merge every line of a form into one space-separated line, so content
/// can be written across source lines but rendered as a single run.
fn merge_lines(form: Form) -> Form {
    let mut merged = Form::open(form.name.clone());
    for (i, line) in form.lines.into_iter().enumerate() {
        if i > 0 {
            merged.deposit(Item::Text(" ".to_string()));
        }
        for item in line.items {
            merged.deposit(item);
        }
    }
    merged
}

/// A rule whose visible output is dropped in every pass.
fn silent() -> Rule {
    Rule::new()
        .on(PASS_LINK, Transform::literal(""))
        .on(PASS_NAME, Transform::literal(""))
        .on(PASS_GEN, Transform::literal(""))
}

/// Build the HTML rule table. The returned table owns the compilation's
/// link registry; use one table per document.
pub fn rules() -> Rules {
    let state: Shared = Rc::new(RefCell::new(State::default()));
    let finalizer_state = Rc::clone(&state);

    let link_gen = {
        let state = Rc::clone(&state);
        Transform::apply(move |_text, form: &Form| {
            let state = state.borrow();
            let key = state.links.get(&form.id).cloned().unwrap_or_default();
            match state.registry.get(&key.to_lowercase()) {
                Some(display) => {
                    format!("<a href=\"#{}\">{}</a>", special_encode(&key), display)
                }
                None => format!("{} <strong>MISSING LINK</strong>", key),
            }
        })
    };

    let slink_gen = {
        let state = Rc::clone(&state);
        Transform::apply(move |text, _form: &Form| {
            if state.borrow().registry.contains_key(&text.to_lowercase()) {
                format!("<a href=\"#{}\">{}</a>", special_encode(&text), text)
            } else {
                format!("{} <strong>MISSING LINK</strong>", text)
            }
        })
    };

    let book_name = {
        let state = Rc::clone(&state);
        Transform::apply(move |text, _form: &Form| {
            state.borrow_mut().title = text;
            String::new()
        })
    };

    Rules::new(&[PASS_LINK, PASS_NAME, PASS_GEN])
        .encoder(PASS_NAME, entityify)
        .encoder(PASS_GEN, entityify)
        .rule(
            "",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("\n<p>", "</p>")),
        )
        .rule(
            "book",
            Rule::new()
                .level(1)
                .on(PASS_NAME, book_name)
                .on(PASS_GEN, wrap(&state, "h1")),
        )
        .rule("chapter", section_rule(&state, 2, "h1"))
        .rule("appendix", section_rule(&state, 2, "h1"))
        .rule("specimen", section_rule(&state, 3, "h2"))
        .rule("article", section_rule(&state, 4, "h3"))
        .rule(
            "section",
            Rule::new()
                .level(5)
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, wrap(&state, "h4")),
        )
        .rule(
            "aka",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::wrap("<dfn>", "</dfn>"))
                .on(PASS_GEN, Transform::wrap("<dfn>", "</dfn>")),
        )
        .rule("b", Rule::new().on(PASS_GEN, Transform::wrap("<b>", "</b>")))
        .rule("i", Rule::new().on(PASS_GEN, Transform::wrap("<i>", "</i>")))
        .rule("sub", inline("<sub>", "</sub>"))
        .rule("super", inline("<sup>", "</sup>"))
        .rule("t", inline("<tt>", "</tt>"))
        .rule("comment", silent())
        .rule(
            "link",
            Rule::new()
                .on(PASS_LINK, stuff_link(&state))
                .on(PASS_GEN, link_gen),
        )
        .rule("slink", Rule::new().on(PASS_GEN, slink_gen))
        .rule(
            "url",
            Rule::new().on(
                PASS_GEN,
                Transform::apply(|text, _| format!("<a href=\"{0}\">{0}</a>", text)),
            ),
        )
        .rule(
            "list",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(
                    PASS_GEN,
                    Transform::apply(|text, _| {
                        let items = text.split('\n').collect::<Vec<_>>().join("</li><li>");
                        format!("<ul><li>{}</li></ul>", items)
                    }),
                ),
        )
        .rule(
            "program",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("\n<pre>", "</pre>")),
        )
        .rule(
            "together",
            Rule::new().parse_hook(merge_lines),
        )
        .rule(
            "table",
            Rule::new()
                .parse_hook(restructure_table)
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("<table><tbody>", "</tbody></table>")),
        )
        .rule(
            "-tr",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("<tr>", "</tr>")),
        )
        .rule(
            "-td",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("<td>", "</td>")),
        )
        .rule(
            "-th",
            Rule::new()
                .on(PASS_LINK, Transform::literal(""))
                .on(PASS_NAME, Transform::literal(""))
                .on(PASS_GEN, Transform::wrap("<th>", "</th>")),
        )
        .finalizer(move |product: &Product| {
            let title = entityify(&finalizer_state.borrow().title);
            let body = product.get(PASS_GEN).map(String::as_str).unwrap_or("");
            format!(
                "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
                 <link rel=\"stylesheet\" href=\"cyc.css\" type=\"text/css\">\
                 <title>{}</title></head><body>{}</body></html>",
                title, body
            )
        })
}
