//! Literal substitution stage
//!
//! Neutralises commands the converter cannot parse by rewriting exact
//! substrings. Keys are applied one after another, each over the whole text;
//! a key's own replacement is never rescanned for that key.

use phf::phf_ordered_map;
use serde::{Deserialize, Serialize};

/// Built-in substitutions, applied in this order before any user-supplied ones.
pub static BUILTIN_SUBSTITUTIONS: phf::OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    "\\some_command_that_needs_to_be_commented_out" => "%\\some_command_that_needs_to_be_commented_out",
};

/// A user-supplied literal substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub search: String,
    pub replace: String,
}

impl Substitution {
    pub fn new(search: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            replace: replace.into(),
        }
    }

    /// Parse a `SEARCH=REPLACE` pair (split at the first `=`).
    pub fn parse_pair(pair: &str) -> Option<Self> {
        let (search, replace) = pair.split_once('=')?;
        if search.is_empty() {
            return None;
        }
        Some(Self::new(search, replace))
    }
}

/// Replace every non-overlapping occurrence of `search`, left to right.
///
/// An empty `search` matches nothing.
pub fn replace_literal(text: &str, search: &str, replace: &str) -> String {
    if search.is_empty() {
        return text.to_string();
    }
    text.replace(search, replace)
}

/// Apply the built-in table, then `extra` in order.
pub fn apply_substitutions(text: &str, extra: &[Substitution]) -> String {
    let builtin = BUILTIN_SUBSTITUTIONS
        .entries()
        .map(|(search, replace)| (*search, *replace));
    let user = extra
        .iter()
        .map(|sub| (sub.search.as_str(), sub.replace.as_str()));

    builtin
        .chain(user)
        .fold(text.to_string(), |acc, (search, replace)| {
            replace_literal(&acc, search, replace)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CMD: &str = "\\some_command_that_needs_to_be_commented_out";

    #[test]
    fn test_builtin_comments_out_command() {
        let out = apply_substitutions(&format!("a {CMD} b\n{CMD}"), &[]);
        assert_eq!(out, format!("a %{CMD} b\n%{CMD}"));
    }

    #[test]
    fn test_builtin_is_not_rescanned() {
        let out = apply_substitutions(CMD, &[]);
        assert_eq!(out, format!("%{CMD}"));
    }

    #[test]
    fn test_no_match_is_noop() {
        let text = "\\section{Intro} plain text";
        assert_eq!(apply_substitutions(text, &[]), text);
    }

    #[test]
    fn test_user_substitutions_run_in_order() {
        let subs = vec![Substitution::new("a", "b"), Substitution::new("b", "c")];
        assert_eq!(apply_substitutions("ab", &subs), "cc");
    }

    #[test]
    fn test_non_overlapping_left_to_right() {
        assert_eq!(replace_literal("aaa", "aa", "X"), "Xa");
    }

    #[test]
    fn test_empty_search_ignored() {
        assert_eq!(replace_literal("abc", "", "X"), "abc");
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            Substitution::parse_pair("\\algname=\\textbf"),
            Some(Substitution::new("\\algname", "\\textbf"))
        );
        assert_eq!(
            Substitution::parse_pair("a=b=c"),
            Some(Substitution::new("a", "b=c"))
        );
        assert_eq!(Substitution::parse_pair("=x"), None);
        assert_eq!(Substitution::parse_pair("novalue"), None);
    }
}
