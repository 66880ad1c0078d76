//! # cyc-render
//!
//! The rendering half of the cyc compiler: a rule module declares passes,
//! per-tag transforms and sectioning levels; the engine walks the parsed
//! [Form](cyc_parser::cyc::ast::Form) tree once per pass and accumulates
//! text, grouping anonymous content into paragraphs and closing leveled
//! sections through the course stack. The shipped [html] module renders a
//! single HTML document the way an encyclopedia or book wants it.

pub mod engine;
pub mod error;
pub mod html;
pub mod rules;

pub use engine::{render, Artifact};
pub use error::{CompileError, RenderError};
pub use rules::{CloseHook, Product, Rule, Rules, Transform};

use cyc_parser::cyc::parsing::parse;

/// Parse and render in one step: includer-expanded text in, finished
/// artifact out.
pub fn compile(text: &str, rules: &Rules) -> Result<Artifact, CompileError> {
    let form = parse(text, rules)?;
    let product = render(&form, rules)?;
    Ok(rules.finish(product))
}
