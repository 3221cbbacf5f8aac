//! Error handling for tex2docx
//!
//! The preprocessing core is total and never fails; errors only come from
//! the boundaries around it (engine loading, the external converter,
//! configuration files and I/O). Non-fatal findings of the core are reported
//! as [`PreprocessWarning`] values next to the output.

use std::fmt;

use serde::Serialize;

/// Conversion error type
#[derive(Debug, Clone)]
pub enum ConversionError {
    /// Invalid input (e.g. empty source)
    InvalidInput { message: String },
    /// The conversion engine could not be fetched or started
    EngineUnavailable { message: String },
    /// The converter ran but failed or produced no document
    ConverterFailed {
        message: String,
        status: Option<i32>,
    },
    /// Malformed configuration
    Config { message: String },
    /// IO error (for file operations)
    IoError { message: String },
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            ConversionError::EngineUnavailable { message } => {
                write!(f, "Conversion engine unavailable: {}", message)
            }
            ConversionError::ConverterFailed { message, status } => {
                if let Some(code) = status {
                    write!(f, "Converter failed (exit status {}): {}", code, message)
                } else {
                    write!(f, "Converter failed: {}", message)
                }
            }
            ConversionError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
            ConversionError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<std::io::Error> for ConversionError {
    fn from(err: std::io::Error) -> Self {
        ConversionError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

// Convenience constructors for errors
impl ConversionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConversionError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        ConversionError::EngineUnavailable {
            message: message.into(),
        }
    }

    pub fn converter(message: impl Into<String>) -> Self {
        ConversionError::ConverterFailed {
            message: message.into(),
            status: None,
        }
    }

    pub fn converter_with_status(message: impl Into<String>, status: i32) -> Self {
        ConversionError::ConverterFailed {
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        ConversionError::Config {
            message: message.into(),
        }
    }
}

// =============================================================================
// Preprocessing warnings
// =============================================================================

/// Severity level for diagnostics (determines coloring and strict mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// Content was lost from the output (red)
    Error,
    /// Output is probably not what the author meant (yellow)
    Warning,
    /// Informational (cyan)
    Info,
}

/// Kind of warning generated during preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WarningKind {
    /// An equation environment was opened but never closed
    UnterminatedEnvironment,
    /// An equation end marker appeared outside any environment
    StrayEnvironmentEnd,
    /// Start and end marker on one line, closed on that line
    OneLineEnvironment,
    /// The same label identifier was defined more than once
    DuplicateLabel,
    /// A reference marker survived preprocessing and reaches the converter
    UnresolvedReference,
}

impl WarningKind {
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            WarningKind::UnterminatedEnvironment => DiagnosticSeverity::Error,
            WarningKind::StrayEnvironmentEnd | WarningKind::OneLineEnvironment => {
                DiagnosticSeverity::Info
            }
            WarningKind::DuplicateLabel | WarningKind::UnresolvedReference => {
                DiagnosticSeverity::Warning
            }
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::UnterminatedEnvironment => write!(f, "unterminated environment"),
            WarningKind::StrayEnvironmentEnd => write!(f, "stray environment end"),
            WarningKind::OneLineEnvironment => write!(f, "one-line environment"),
            WarningKind::DuplicateLabel => write!(f, "duplicate label"),
            WarningKind::UnresolvedReference => write!(f, "unresolved reference"),
        }
    }
}

/// A non-fatal finding of the preprocessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessWarning {
    pub kind: WarningKind,
    pub message: String,
    /// 1-based line in the text the stage was looking at
    pub line: Option<usize>,
}

impl PreprocessWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn severity(&self) -> DiagnosticSeverity {
        self.kind.severity()
    }

    /// Get ANSI color code for this warning's severity.
    pub fn color_code(&self) -> &'static str {
        match self.severity() {
            DiagnosticSeverity::Error => "\x1b[31m",   // red
            DiagnosticSeverity::Warning => "\x1b[33m", // yellow
            DiagnosticSeverity::Info => "\x1b[36m",    // cyan
        }
    }
}

impl fmt::Display for PreprocessWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(l) = self.line {
            write!(f, "[{}] line {}: {}", self.kind, l, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converter_error_display() {
        let err = ConversionError::converter_with_status("unknown reader", 21);
        let msg = err.to_string();
        assert!(msg.contains("exit status 21"));
        assert!(msg.contains("unknown reader"));

        let err = ConversionError::converter("no output");
        assert_eq!(err.to_string(), "Converter failed: no output");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.tex");
        let err: ConversionError = io.into();
        assert!(matches!(err, ConversionError::IoError { .. }));
        assert!(err.to_string().contains("missing.tex"));
    }

    #[test]
    fn test_warning_display() {
        let warning =
            PreprocessWarning::new(WarningKind::UnterminatedEnvironment, "3 lines dropped")
                .at_line(7);
        assert_eq!(
            warning.to_string(),
            "[unterminated environment] line 7: 3 lines dropped"
        );
        assert_eq!(warning.severity(), DiagnosticSeverity::Error);
    }

    #[test]
    fn test_warning_without_line() {
        let warning = PreprocessWarning::new(WarningKind::DuplicateLabel, "eq:a");
        assert_eq!(warning.to_string(), "[duplicate label] eq:a");
        assert_eq!(warning.color_code(), "\x1b[33m");
    }
}
