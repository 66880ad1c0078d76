//! Error types for rendering and the combined compile pipeline.

use cyc_parser::cyc::parsing::ParseError;
use std::fmt;

/// Errors raised by the transform engine. Fatal: the first error aborts
/// the whole render, no partial product is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A form in the tree has no rule record.
    UnknownRule(String),
    /// A directive token with no handler on the enclosing tag's rule.
    UnrecognizedDirective { token: String, context: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::UnknownRule(name) => write!(f, "No rule for @{}", name),
            RenderError::UnrecognizedDirective { token, context } => {
                write!(f, "Unrecognized {} in @{}", token, context)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Either stage of the parse-then-render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    Parse(ParseError),
    Render(RenderError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => write!(f, "{}", e),
            CompileError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Parse(e) => Some(e),
            CompileError::Render(e) => Some(e),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<RenderError> for CompileError {
    fn from(e: RenderError) -> Self {
        CompileError::Render(e)
    }
}
