//! Core transforms
//!
//! - `preprocess`: LaTeX → LaTeX rewriting ahead of Word conversion

pub mod preprocess;
