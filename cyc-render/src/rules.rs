//! Rule tables: the full rule-module contract consumed by the engine.
//!
//! A [`Rules`] value declares the ordered passes, a per-pass text encoder
//! (entity escaping for HTML), one [`Rule`] record per tag name including
//! the anonymous `""` paragraph record, and an optional finalizer that
//! folds the per-pass product map into a single document.
//!
//! Rule modules that need state across passes (a link registry, a title)
//! capture an `Rc<RefCell<..>>` context in their transform closures. The
//! context is created per rule-table construction, so it is scoped to one
//! compilation and never process-wide.

use cyc_parser::cyc::ast::Form;
use cyc_parser::cyc::rules::TagTable;
use std::collections::{BTreeMap, HashMap};

/// Per-pass output map, keyed by pass name.
pub type Product = BTreeMap<String, String>;

pub type TextEncoder = Box<dyn Fn(&str) -> String>;
pub type TransformFn = Box<dyn Fn(String, &Form) -> String>;
pub type CloseFn = Box<dyn Fn(String) -> String>;
pub type DirectiveFn = Box<dyn Fn(String) -> String>;
pub type ParseHook = Box<dyn Fn(Form) -> Form>;
pub type FinalizeFn = Box<dyn Fn(&Product) -> String>;

/// What a rule does with a tag's accumulated text in one pass.
pub enum Transform {
    /// Keep the text as it is (same as declaring nothing).
    Passthrough,
    /// Replace the text with a fixed string.
    Literal(String),
    /// Put a prefix and a suffix around the text.
    Wrap(String, String),
    /// Compute the replacement from the text and the form node.
    Apply(TransformFn),
}

impl Transform {
    pub fn literal(text: impl Into<String>) -> Self {
        Transform::Literal(text.into())
    }

    pub fn wrap(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Transform::Wrap(prefix.into(), suffix.into())
    }

    pub fn apply(f: impl Fn(String, &Form) -> String + 'static) -> Self {
        Transform::Apply(Box::new(f))
    }

    pub(crate) fn run(&self, text: String, form: &Form) -> String {
        match self {
            Transform::Passthrough => text,
            Transform::Literal(replacement) => replacement.clone(),
            Transform::Wrap(prefix, suffix) => format!("{}{}{}", prefix, text, suffix),
            Transform::Apply(f) => f(text, form),
        }
    }
}

/// What happens to a leveled section's pending text when the course
/// stack implicitly closes it.
pub enum CloseHook {
    Literal(String),
    Run(CloseFn),
}

/// The per-tag rule record.
#[derive(Default)]
pub struct Rule {
    pub(crate) level: Option<i64>,
    pub(crate) parse: Option<ParseHook>,
    pub(crate) transforms: HashMap<String, Transform>,
    pub(crate) closes: HashMap<String, CloseHook>,
    pub(crate) directives: HashMap<String, DirectiveFn>,
}

impl Rule {
    pub fn new() -> Self {
        Rule::default()
    }

    /// Declare a sectioning level. Lower numbers are outer sections.
    pub fn level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    /// Set the transform for one pass.
    pub fn on(mut self, pass: &str, transform: Transform) -> Self {
        self.transforms.insert(pass.to_string(), transform);
        self
    }

    /// Set the implicit-close hook for one pass.
    pub fn on_close(mut self, pass: &str, hook: CloseHook) -> Self {
        self.closes.insert(pass.to_string(), hook);
        self
    }

    /// Restructure the form once when it closes during parsing.
    pub fn parse_hook(mut self, f: impl Fn(Form) -> Form + 'static) -> Self {
        self.parse = Some(Box::new(f));
        self
    }

    /// Handle a directive token appearing inside this tag. The handler
    /// receives and returns the pass accumulator.
    pub fn directive(mut self, token: &str, f: impl Fn(String) -> String + 'static) -> Self {
        self.directives.insert(token.to_string(), Box::new(f));
        self
    }

    pub fn declared_level(&self) -> Option<i64> {
        self.level
    }
}

/// A complete rule module.
#[derive(Default)]
pub struct Rules {
    passes: Vec<String>,
    encoders: HashMap<String, TextEncoder>,
    rules: HashMap<String, Rule>,
    finalize: Option<FinalizeFn>,
}

impl Rules {
    /// A rule table running the given passes in order.
    pub fn new(passes: &[&str]) -> Self {
        Rules {
            passes: passes.iter().map(|p| (*p).to_string()).collect(),
            ..Rules::default()
        }
    }

    /// The text-encoding rule for one pass (absent means identity).
    pub fn encoder(mut self, pass: &str, f: impl Fn(&str) -> String + 'static) -> Self {
        self.encoders.insert(pass.to_string(), Box::new(f));
        self
    }

    /// Add a tag rule. The empty name is the anonymous paragraph rule.
    pub fn rule(mut self, name: &str, rule: Rule) -> Self {
        self.rules.insert(name.to_string(), rule);
        self
    }

    /// Fold the finished product map into a single document.
    pub fn finalizer(mut self, f: impl Fn(&Product) -> String + 'static) -> Self {
        self.finalize = Some(Box::new(f));
        self
    }

    pub fn passes(&self) -> &[String] {
        &self.passes
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Run a pass's text encoder, identity when none is declared.
    pub fn encode(&self, pass: &str, text: &str) -> String {
        match self.encoders.get(pass) {
            Some(f) => f(text),
            None => text.to_string(),
        }
    }

    /// Apply the finalizer if there is one.
    pub fn finish(&self, product: Product) -> crate::engine::Artifact {
        match &self.finalize {
            Some(f) => crate::engine::Artifact::Document(f(&product)),
            None => crate::engine::Artifact::Passes(product),
        }
    }
}

impl TagTable for Rules {
    fn is_tag(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    fn level(&self, name: &str) -> Option<i64> {
        self.rules.get(name).and_then(|r| r.level)
    }

    fn reparse(&self, form: Form) -> Form {
        match self.rules.get(&form.name).and_then(|r| r.parse.as_ref()) {
            Some(hook) => hook(form),
            None => form,
        }
    }
}
