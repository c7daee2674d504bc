//! The direct dependency record produced by the scanner for a single
//! file, and its JSON shape in `umakeCache.json`.

use crate::ordered::OrderedSet;
use serde::{Deserialize, Serialize};

/// `#include` targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Headers {
    pub library: OrderedSet,
    pub local: OrderedSet,
}

/// `import`/`export import` targets.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Modules {
    pub module: OrderedSet,
    pub library: OrderedSet,
    pub local: OrderedSet,
}

/// Companion source files inferred by the Extension Mapper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sources {
    pub sources: OrderedSet,
}

/// Everything the scanner learns about one file, normative per the
/// `umakeCache.json` schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectDependencyRecord {
    pub time: f64,
    pub headers: Headers,
    pub modules: Modules,
    pub provide: Option<String>,
    pub implement: Option<String>,
    pub sources: Sources,
}

impl DirectDependencyRecord {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            headers: Headers::default(),
            modules: Modules::default(),
            provide: None,
            implement: None,
            sources: Sources::default(),
        }
    }

    /// The module name this file declares (provides or implements),
    /// if any.
    pub fn own_primary_name(&self) -> Option<&str> {
        self.provide.as_deref().or(self.implement.as_deref())
    }
}

/// Returns `true` for C++ identifier characters: the `\w` class used
/// throughout the distilled grammar (ASCII letters, digits, `_`).
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Truncates `name` at its last `:`, yielding the primary module name
/// a partition (or the primary itself) belongs to.
pub fn primary_of(name: &str) -> &str {
    match name.rfind(':') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_of_strips_last_partition_segment() {
        assert_eq!(primary_of("a"), "a");
        assert_eq!(primary_of("a:p"), "a");
        assert_eq!(primary_of("a:p:q"), "a:p");
    }

    #[test]
    fn record_roundtrips_through_json_with_normative_field_names() {
        let mut record = DirectDependencyRecord::new(12.0);
        record.headers.library.insert("vector");
        record.modules.module.insert("std.core");
        record.provide = Some("a".into());
        record.sources.sources.insert("src/a.cpp");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["time"], 12.0);
        assert_eq!(json["headers"]["library"][0], "vector");
        assert_eq!(json["modules"]["module"][0], "std.core");
        assert_eq!(json["provide"], "a");
        assert!(json["implement"].is_null());
        assert_eq!(json["sources"]["sources"][0], "src/a.cpp");

        let back: DirectDependencyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
