//! Label extraction
//!
//! Assigns sequence numbers to label definitions of one prefix group.

use indexmap::IndexMap;
use serde::Serialize;

use super::scanner::{MarkerKind, MarkerScanner};

/// A set of label prefixes sharing one numbering sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixGroup {
    pub name: &'static str,
    pub prefixes: &'static [&'static str],
    /// Text placed before the number at substitution time (`"Figure "`)
    pub caption: Option<&'static str>,
}

impl PrefixGroup {
    pub const EQUATIONS: PrefixGroup = PrefixGroup {
        name: "equations",
        prefixes: &["eq:", "eqn:"],
        caption: None,
    };

    pub const FIGURES: PrefixGroup = PrefixGroup {
        name: "figures",
        prefixes: &["fig:"],
        caption: Some("Figure "),
    };

    pub const TABLES: PrefixGroup = PrefixGroup {
        name: "tables",
        prefixes: &["tab:"],
        caption: Some("Table "),
    };

    /// Whether `id` belongs to this group (a prefix followed by at least one character).
    pub fn matches(&self, id: &str) -> bool {
        self.prefixes
            .iter()
            .any(|prefix| id.len() > prefix.len() && id.starts_with(prefix))
    }
}

/// Label identifier to sequence number, in first-occurrence order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LabelTable {
    numbers: IndexMap<String, usize>,
    #[serde(skip)]
    redefined: Vec<String>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `text` for label definitions of `group`.
    ///
    /// Prefixes are scanned one after another over the whole text, each in
    /// document order, with one counter shared by the group: with prefixes
    /// `eq:` and `eqn:`, every `eq:` label is numbered before any `eqn:` label.
    pub fn extract(text: &str, group: &PrefixGroup) -> Self {
        let mut table = LabelTable::new();

        for prefix in group.prefixes {
            let mut cursor = 0;
            for marker in MarkerScanner::new(text) {
                if marker.span.start < cursor || marker.kind != MarkerKind::Label {
                    continue;
                }
                if marker.id.len() <= prefix.len() || !marker.id.starts_with(prefix) {
                    continue;
                }
                cursor = marker.span.end;
                table.define(marker.id);
            }
        }

        table
    }

    /// Assign the next number to `id` unless it already has one.
    ///
    /// Returns the number `id` resolves to.
    pub fn define(&mut self, id: &str) -> usize {
        if let Some(&n) = self.numbers.get(id) {
            if !self.redefined.iter().any(|seen| seen == id) {
                self.redefined.push(id.to_string());
            }
            return n;
        }
        let n = self.numbers.len() + 1;
        self.numbers.insert(id.to_string(), n);
        n
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.numbers.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Entries in numbering order
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.numbers.iter().map(|(id, n)| (id.as_str(), *n))
    }

    /// Identifiers that were defined more than once
    pub fn redefinitions(&self) -> &[String] {
        &self.redefined
    }
}
