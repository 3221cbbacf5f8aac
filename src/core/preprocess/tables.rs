//! Table clean-up stage
//!
//! Layout commands that only confuse the converter inside tables are removed
//! and `\captionof{table}` is turned into a plain `\caption`. Off by default.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref VSPACE: Regex = Regex::new(r"\\vspace\{.*?\}").unwrap();
    static ref HFILL: Regex = Regex::new(r"\\hfill").unwrap();
    static ref CAPTIONOF_TABLE: Regex = Regex::new(r"(?s)\\captionof\{table\}\{(.*?)\}").unwrap();
    static ref MINIPAGE: Regex =
        Regex::new(r"(?s)\\begin\{minipage\}.*?\} (.*?) \\end\{minipage\}").unwrap();
}

/// Strip table layout noise.
pub fn clean_tables(text: &str) -> String {
    let out = VSPACE.replace_all(text, "");
    let out = HFILL.replace_all(&out, "\n\n");
    let out = CAPTIONOF_TABLE.replace_all(&out, "\\caption{$1}");
    let out = MINIPAGE.replace_all(&out, "$1");
    out.into_owned()
}
