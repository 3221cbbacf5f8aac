//! Reference substitution
//!
//! Replaces label definitions and references of known identifiers with
//! their numbers in one linear scan. Unknown identifiers stay literal.

use super::labels::LabelTable;
use super::scanner::{rewrite_markers, MarkerKind};

/// How a resolved number is written back into the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rendering<'a> {
    pub caption: Option<&'a str>,
}

impl<'a> Rendering<'a> {
    pub fn new(caption: Option<&'a str>) -> Self {
        Self { caption }
    }

    /// `\label{id}` becomes `(n)`, or `{caption}{n}` when a caption is set.
    pub fn definition(&self, n: usize) -> String {
        match self.caption {
            Some(caption) => format!("{}{}", caption, n),
            None => format!("({})", n),
        }
    }

    /// `\ref{id}` is always the bare number.
    pub fn reference(&self, n: usize) -> String {
        n.to_string()
    }

    /// `\eqref{id}` is always parenthesized.
    pub fn equation_reference(&self, n: usize) -> String {
        format!("({})", n)
    }

    pub fn render(&self, kind: MarkerKind, n: usize) -> String {
        match kind {
            MarkerKind::Label => self.definition(n),
            MarkerKind::Ref => self.reference(n),
            MarkerKind::EqRef => self.equation_reference(n),
        }
    }
}

/// Substitute every marker whose identifier is in `table`.
///
/// The match is purely textual: markers inside comments, verbatim blocks or
/// any other environment are rewritten too.
pub fn substitute_references(text: &str, table: &LabelTable, caption: Option<&str>) -> String {
    if table.is_empty() {
        return text.to_string();
    }
    let rendering = Rendering::new(caption);
    rewrite_markers(text, |marker| {
        table
            .get(marker.id)
            .map(|n| rendering.render(marker.kind, n))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::preprocess::labels::PrefixGroup;

    fn table(ids: &[&str]) -> LabelTable {
        let mut table = LabelTable::new();
        for id in ids {
            table.define(id);
        }
        table
    }

    #[test]
    fn test_default_rendering() {
        let text = r"\label{eq:a} then \ref{eq:a} then \eqref{eq:a}";
        let out = substitute_references(text, &table(&["eq:a"]), None);
        assert_eq!(out, "(1) then 1 then (1)");
    }

    #[test]
    fn test_caption_rendering() {
        let text = r"\label{fig:x} see Fig.~\ref{fig:x} and \eqref{fig:x}";
        let out = substitute_references(text, &table(&["fig:x"]), Some("Figure "));
        assert_eq!(out, "Figure 1 see Fig.~1 and (1)");
    }

    #[test]
    fn test_unknown_identifiers_untouched() {
        let text = r"\ref{sec:intro} \label{eq:missing} \ref{eq:a}";
        let out = substitute_references(text, &table(&["eq:a"]), None);
        assert_eq!(out, r"\ref{sec:intro} \label{eq:missing} 1");
    }

    #[test]
    fn test_rewrites_inside_comments() {
        let text = "% see \\ref{eq:a}\nx";
        let out = substitute_references(text, &table(&["eq:a"]), None);
        assert_eq!(out, "% see 1\nx");
    }

    #[test]
    fn test_idempotent_once_resolved() {
        let ids = table(&["eq:a", "eq:b"]);
        let once = substitute_references(r"\label{eq:a} \eqref{eq:b} \ref{x}", &ids, None);
        let twice = substitute_references(&once, &ids, None);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_uses_extracted_numbers() {
        let text = r"\label{eq:z} \label{eq:y} \ref{eq:y}";
        let ids = LabelTable::extract(text, &PrefixGroup::EQUATIONS);
        assert_eq!(substitute_references(text, &ids, None), "(1) (2) 2");
    }
}
