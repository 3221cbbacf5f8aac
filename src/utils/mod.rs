//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types
//! - Preprocessing warnings

pub mod error;

// Re-export commonly used items
pub use error::{
    ConversionError, ConversionResult, DiagnosticSeverity, PreprocessWarning, WarningKind,
};
