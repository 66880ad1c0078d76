//! The parser-facing slice of the rule-module contract.
//!
//! The structure parser never sees transforms, passes, or output formats.
//! All it needs from a rule module is answered here: is a name a known
//! tag, does the tag declare a sectioning level, and how should a form be
//! restructured the moment it closes.

use crate::cyc::ast::Form;

/// What the parser asks of a rule module.
pub trait TagTable {
    /// True if `name` has a rule record. The empty name (the anonymous
    /// paragraph context) counts as a tag.
    fn is_tag(&self, name: &str) -> bool;

    /// The tag's declared sectioning level, if any. Leveled tags are only
    /// legal at the outermost nesting.
    fn level(&self, name: &str) -> Option<i64>;

    /// Restructure a form as it closes, before it is deposited into its
    /// parent. Invoked exactly once per form. The default is identity.
    fn reparse(&self, form: Form) -> Form {
        form
    }
}
