//! Test support: a minimal tag table.
//!
//! Parser tests need a [`TagTable`] without dragging in a rendering rule
//! module. `TestTags` declares tag names and optional levels and nothing
//! else.

use crate::cyc::rules::TagTable;
use std::collections::HashMap;

/// A tag table for tests: names in, optional levels, identity reparse.
#[derive(Debug, Default)]
pub struct TestTags {
    levels: HashMap<String, Option<i64>>,
}

impl TestTags {
    /// A table declaring the given tag names, none of them leveled.
    pub fn new(names: &[&str]) -> Self {
        let mut levels = HashMap::new();
        for name in names {
            levels.insert((*name).to_string(), None);
        }
        TestTags { levels }
    }

    /// Add a leveled tag.
    pub fn with_level(mut self, name: &str, level: i64) -> Self {
        self.levels.insert(name.to_string(), Some(level));
        self
    }
}

impl TagTable for TestTags {
    fn is_tag(&self, name: &str) -> bool {
        name.is_empty() || self.levels.contains_key(name)
    }

    fn level(&self, name: &str) -> Option<i64> {
        self.levels.get(name).copied().flatten()
    }
}
