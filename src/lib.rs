//! tex2docx - LaTeX preprocessing for Word conversion
//!
//! Converting LaTeX to `.docx` loses automatic numbering: labels, references
//! and equation numbers do not survive. This crate rewrites the LaTeX source
//! beforehand so that they do:
//!
//! - `\label{eq:..}`, `\ref{eq:..}` and `\eqref{eq:..}` become `(n)`, `n`, `(n)`
//! - numbered `equation` environments are wrapped in a two-column tabular
//!   with the number right-aligned
//! - figure and table labels become `Figure n` / `Table n`
//!
//! The converter itself (pandoc) and the document preview are external.
//! [`session::ConversionSession`] ties the preprocessor to any
//! [`session::DocumentConverter`].
//!
//! # Example
//!
//! ```
//! let out = tex2docx::process(r"\label{eq:a} see \eqref{eq:a}");
//! assert_eq!(out, "(1) see (1)");
//! ```

pub mod core;
pub mod session;
pub mod utils;
pub mod wasm;

pub use crate::core::preprocess::{
    LabelTable, PrefixGroup, PreprocessOptions, PreprocessOutput, Preprocessor, Substitution,
    UnterminatedPolicy,
};
pub use session::{
    ConversionDirective, ConversionSession, DocumentConverter, DocxArtifact, DownloadProgress,
    SessionStatus, DEFAULT_FILE_NAME, DOCX_MIME,
};
pub use utils::error::{ConversionError, ConversionResult, PreprocessWarning, WarningKind};

#[cfg(not(target_arch = "wasm32"))]
pub use session::PandocCommand;

/// Preprocess LaTeX source with the fixed default policy.
///
/// Pure and deterministic: the same input always yields the same output.
pub fn process(source: &str) -> String {
    Preprocessor::default().run(source).content
}

/// Preprocess with explicit options, keeping label tables and warnings.
pub fn process_with_options(source: &str, options: &PreprocessOptions) -> PreprocessOutput {
    Preprocessor::new(options.clone()).run(source)
}
