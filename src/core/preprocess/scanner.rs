//! Cross-reference marker lexer
//!
//! Recognises the three marker forms the preprocessor rewrites:
//! - `\label{ID}` - label definition
//! - `\ref{ID}` - plain reference
//! - `\eqref{ID}` - equation reference
//!
//! Markers are matched literally, leading backslash included. `ID` is one or
//! more characters up to the first closing brace and may span lines; no
//! brace balancing is attempted.
//!
//! The scanner reports a candidate at *every* backslash that starts a marker,
//! so candidates may overlap (`\label{a \label{b}` yields both). Consumers
//! skip candidates that start before the end of the last one they accepted,
//! which gives leftmost, non-overlapping matching.

use std::ops::Range;

/// Kind of cross-reference marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Label,
    Ref,
    EqRef,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 3] = [MarkerKind::Label, MarkerKind::Ref, MarkerKind::EqRef];

    /// The literal text that opens this marker, e.g. `\label{`
    pub fn opener(&self) -> &'static str {
        match self {
            MarkerKind::Label => "\\label{",
            MarkerKind::Ref => "\\ref{",
            MarkerKind::EqRef => "\\eqref{",
        }
    }

    /// Render the full marker for an identifier
    pub fn render(&self, id: &str) -> String {
        format!("{}{}}}", self.opener(), id)
    }
}

/// A marker found in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker<'a> {
    pub kind: MarkerKind,
    pub id: &'a str,
    /// Byte range of the whole marker, braces included
    pub span: Range<usize>,
}

/// Try to read a marker starting exactly at byte offset `pos`.
pub fn marker_at(source: &str, pos: usize) -> Option<Marker<'_>> {
    let rest = source.get(pos..)?;
    if !rest.starts_with('\\') {
        return None;
    }

    let kind = MarkerKind::ALL
        .into_iter()
        .find(|kind| rest.starts_with(kind.opener()))?;

    let id_start = pos + kind.opener().len();
    let close = source[id_start..].find('}')?;
    if close == 0 {
        return None;
    }

    let id_end = id_start + close;
    Some(Marker {
        kind,
        id: &source[id_start..id_end],
        span: pos..id_end + 1,
    })
}

/// Iterator over every marker candidate in left-to-right order
pub struct MarkerScanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> MarkerScanner<'a> {
    pub fn new(source: &'a str) -> Self {
        MarkerScanner { source, pos: 0 }
    }
}

impl<'a> Iterator for MarkerScanner<'a> {
    type Item = Marker<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.source.len() {
            let offset = self.source[self.pos..].find('\\')?;
            let at = self.pos + offset;
            // Resume right after the backslash so nested candidates are seen
            self.pos = at + 1;
            if let Some(marker) = marker_at(self.source, at) {
                return Some(marker);
            }
        }
        None
    }
}

/// Rewrite markers in one pass.
///
/// `replace` is asked about each candidate that does not overlap an earlier
/// replacement; returning `None` leaves the candidate as literal text and
/// lets scanning continue inside it.
pub fn rewrite_markers<F>(source: &str, mut replace: F) -> String
where
    F: FnMut(&Marker<'_>) -> Option<String>,
{
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for marker in MarkerScanner::new(source) {
        if marker.span.start < cursor {
            continue;
        }
        if let Some(replacement) = replace(&marker) {
            out.push_str(&source[cursor..marker.span.start]);
            out.push_str(&replacement);
            cursor = marker.span.end;
        }
    }

    out.push_str(&source[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(source: &str) -> Vec<(MarkerKind, &str)> {
        MarkerScanner::new(source).map(|m| (m.kind, m.id)).collect()
    }

    #[test]
    fn test_scans_all_kinds() {
        let source = r"see \ref{eq:a} and \eqref{eq:b}, defined by \label{fig:c}";
        assert_eq!(
            ids(source),
            vec![
                (MarkerKind::Ref, "eq:a"),
                (MarkerKind::EqRef, "eq:b"),
                (MarkerKind::Label, "fig:c"),
            ]
        );
    }

    #[test]
    fn test_span_covers_marker() {
        let source = r"x \label{eq:a} y";
        let marker = marker_at(source, 2).unwrap();
        assert_eq!(&source[marker.span.clone()], r"\label{eq:a}");
    }

    #[test]
    fn test_rejects_empty_and_unclosed() {
        assert!(ids(r"\label{}").is_empty());
        assert!(ids(r"\label{eq:a").is_empty());
        assert!(ids(r"\labelx{eq:a}").is_empty());
        assert!(ids(r"\autoref{eq:a} \pageref{eq:a}").is_empty());
    }

    #[test]
    fn test_identifier_may_span_lines() {
        assert_eq!(ids("\\label{eq:\nsplit}"), vec![(MarkerKind::Label, "eq:\nsplit")]);
    }

    #[test]
    fn test_overlapping_candidates() {
        assert_eq!(
            ids(r"\label{a \label{eq:b}"),
            vec![(MarkerKind::Label, "a \\label{eq:b"), (MarkerKind::Label, "eq:b")]
        );
    }

    #[test]
    fn test_escaped_backslash_still_matches() {
        assert_eq!(ids(r"\\ref{eq:a}"), vec![(MarkerKind::Ref, "eq:a")]);
    }

    #[test]
    fn test_rewrite_skips_rejected_candidates() {
        let out = rewrite_markers(r"\label{a \label{eq:b} \ref{eq:b}", |m| {
            (m.id == "eq:b").then(|| "(1)".to_string())
        });
        assert_eq!(out, r"\label{a (1) (1)");
    }

    #[test]
    fn test_rewrite_handles_multibyte_text() {
        let out = rewrite_markers("α \\ref{x} β", |m| Some(format!("<{}>", m.id)));
        assert_eq!(out, "α <x> β");
    }
}
