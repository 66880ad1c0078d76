//! The multi-pass transform engine.
//!
//! For each declared pass the engine walks the form tree from the top,
//! with fresh state: a text accumulator per form, and one course stack
//! per pass run. The course stack holds the currently open leveled
//! sections as (name, level) pairs, levels strictly increasing from
//! bottom to top; opening a level pops and close-hooks every entry at
//! that level or deeper, which is how a new chapter implicitly ends the
//! previous chapter and its sections.
//!
//! Inside the anonymous context, accumulated text is flushed through the
//! anonymous rule on every blank line (a paragraph) and before any
//! leveled child, whose output bypasses paragraph buffering entirely.

use crate::error::RenderError;
use crate::rules::{CloseHook, Product, Rules};
use cyc_parser::cyc::ast::{Form, Item};

/// The outcome of a full render: a single document when the rule module
/// declares a finalizer, the raw product map otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    Document(String),
    Passes(Product),
}

impl Artifact {
    /// The document text, or `None` when the rule module declares no
    /// finalizer and the artifact is the raw pass map.
    pub fn into_document(self) -> Option<String> {
        match self {
            Artifact::Document(text) => Some(text),
            Artifact::Passes(_) => None,
        }
    }
}

/// Render the tree once per declared pass. The product map has one entry
/// per pass, in the rule module's declared order.
pub fn render(form: &Form, rules: &Rules) -> Result<Product, RenderError> {
    let mut product = Product::new();
    for pass in rules.passes() {
        let mut run = PassRun {
            rules,
            pass,
            course: Vec::new(),
        };
        let output = run.process(form, 0)?;
        product.insert(pass.clone(), output);
    }
    Ok(product)
}

/// State for one pass over the tree. Discarded when the pass ends.
struct PassRun<'r> {
    rules: &'r Rules,
    pass: &'r str,
    course: Vec<(String, i64)>,
}

impl<'r> PassRun<'r> {
    /// Run the named rule's transform for this pass on accumulated text.
    /// Trailing line separators are trimmed first; an absent transform is
    /// a pass-through.
    fn apply(&self, name: &str, mut text: String, form: &Form) -> String {
        while text.ends_with('\n') {
            text.pop();
        }
        match self.rules.get(name).and_then(|r| r.transforms.get(self.pass)) {
            Some(transform) => transform.run(text, form),
            None => text,
        }
    }

    /// Close out every open course entry at `level` or deeper, running
    /// each entry's close hook for this pass.
    fn uncourse(&mut self, level: i64) -> String {
        let mut result = String::new();
        while let Some((name, open)) = self.course.pop() {
            if open < level {
                self.course.push((name, open));
                break;
            }
            if let Some(hook) = self.rules.get(&name).and_then(|r| r.closes.get(self.pass)) {
                result = match hook {
                    CloseHook::Literal(text) => text.clone(),
                    CloseHook::Run(f) => f(result),
                };
            }
        }
        result
    }

    fn process(&mut self, form: &Form, depth: usize) -> Result<String, RenderError> {
        let name = form.name.as_str();
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| RenderError::UnknownRule(name.to_string()))?;
        let level = rule.declared_level();

        let mut para_result = String::new();
        let mut result = String::new();

        // Entering a leveled section closes every section at this level
        // or deeper before it opens.
        if let Some(level) = level {
            let closed = self.uncourse(level);
            para_result.push_str(&closed);
            self.course.push((name.to_string(), level));
        }

        for line in &form.lines {
            if line.is_empty() {
                // Paragraph boundary: flush the anonymous buffer.
                if name.is_empty() && !result.is_empty() {
                    let text = std::mem::take(&mut result);
                    para_result.push_str(&self.apply("", text, form));
                }
            } else {
                for item in &line.items {
                    match item {
                        Item::Text(text) => {
                            result.push_str(&self.rules.encode(self.pass, text));
                        }
                        Item::Directive(token) => {
                            let handler = self
                                .rules
                                .get(name)
                                .and_then(|r| r.directives.get(token))
                                .ok_or_else(|| RenderError::UnrecognizedDirective {
                                    token: token.clone(),
                                    context: name.to_string(),
                                })?;
                            result = handler(std::mem::take(&mut result));
                        }
                        Item::Form(child) => {
                            let child_rule = self
                                .rules
                                .get(&child.name)
                                .ok_or_else(|| RenderError::UnknownRule(child.name.clone()))?;
                            if name.is_empty() && child_rule.declared_level().is_some() {
                                // A leveled child is its own top-level unit:
                                // flush the pending paragraph and keep the
                                // child's output out of the paragraph buffer.
                                if !result.is_empty() {
                                    let text = std::mem::take(&mut result);
                                    para_result.push_str(&self.apply("", text, form));
                                }
                                let rendered = self.process(child, depth + 1)?;
                                para_result.push_str(&rendered);
                            } else {
                                let rendered = self.process(child, depth + 1)?;
                                result.push_str(&rendered);
                            }
                        }
                    }
                }
            }
            if !result.is_empty() {
                result.push('\n');
            }
        }

        let mut output = para_result;
        output.push_str(&self.apply(name, result, form));

        // Leaving the outermost form flushes every still-open section.
        if depth == 0 {
            let closed = self.uncourse(0);
            output.push_str(&closed);
        }
        Ok(output)
    }
}
