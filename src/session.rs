//! Conversion session
//!
//! Everything around the preprocessor: the current source text, the engine
//! and conversion status shown to the user, and the last document produced.
//! The converter itself is an external collaborator behind
//! [`DocumentConverter`].

use std::fmt;

use serde::Serialize;

use crate::core::preprocess::{PreprocessOptions, Preprocessor};
use crate::utils::error::{ConversionError, ConversionResult, PreprocessWarning};

/// MIME type of the produced document
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// File name offered when saving the produced document
pub const DEFAULT_FILE_NAME: &str = "document.docx";

/// Source/target format pair handed to the converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionDirective {
    pub from: String,
    pub to: String,
    /// Produce a standalone document
    pub standalone: bool,
}

impl Default for ConversionDirective {
    fn default() -> Self {
        Self {
            from: "latex".to_string(),
            to: "docx".to_string(),
            standalone: true,
        }
    }
}

impl ConversionDirective {
    /// Command-line form, e.g. `-s -f latex -t docx`
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.standalone {
            args.push("-s".to_string());
        }
        args.extend([
            "-f".to_string(),
            self.from.clone(),
            "-t".to_string(),
            self.to.clone(),
        ]);
        args
    }
}

/// A LaTeX → document converter
pub trait DocumentConverter {
    /// Convert `source`, returning the binary document.
    fn convert(&self, source: &str, directive: &ConversionDirective) -> ConversionResult<Vec<u8>>;
}

impl<F> DocumentConverter for F
where
    F: Fn(&str, &ConversionDirective) -> ConversionResult<Vec<u8>>,
{
    fn convert(&self, source: &str, directive: &ConversionDirective) -> ConversionResult<Vec<u8>> {
        self(source, directive)
    }
}

/// Runs an external converter command through the shell.
///
/// The source is written to the command's stdin and the document is read
/// from its stdout.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct PandocCommand {
    pub command: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl PandocCommand {
    pub const ENV_VAR: &'static str = "TEX2DOCX_PANDOC";

    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// `TEX2DOCX_PANDOC` if set, otherwise `pandoc` from `PATH`.
    pub fn from_env() -> Self {
        Self::new(std::env::var(Self::ENV_VAR).unwrap_or_else(|_| "pandoc".to_string()))
    }

    fn command_line(&self, directive: &ConversionDirective) -> String {
        format!("{} {} -o -", self.command, directive.to_args().join(" "))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DocumentConverter for PandocCommand {
    fn convert(&self, source: &str, directive: &ConversionDirective) -> ConversionResult<Vec<u8>> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(self.command_line(directive))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ConversionError::engine(format!("{}: {}", self.command, e)))?;

        // A converter that exits early closes the pipe; its stderr explains why.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(source.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(match output.status.code() {
                Some(code) => ConversionError::converter_with_status(stderr, code),
                None => ConversionError::converter(stderr),
            });
        }
        written?;

        Ok(output.stdout)
    }
}

/// A produced document ready for preview or download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime: &'static str,
}

impl DocxArtifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: DEFAULT_FILE_NAME.to_string(),
            mime: DOCX_MIME,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Engine download progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub received: u64,
    /// Content length, when the server sent one
    pub total: Option<u64>,
}

impl DownloadProgress {
    pub fn new(received: u64, total: Option<u64>) -> Self {
        Self { received, total }
    }

    /// Rounded percentage, `None` when the total is unknown or zero.
    pub fn percent(&self) -> Option<u8> {
        let total = self.total.filter(|&t| t > 0)?;
        let percent = (self.received as f64 / total as f64 * 100.0).round();
        Some(percent.clamp(0.0, 100.0) as u8)
    }

    pub fn advance(&mut self, chunk: u64) {
        self.received = self.received.saturating_add(chunk);
    }
}

/// What the user sees
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    LoadingEngine { percent: Option<u8> },
    Ready,
    FileLoaded { name: String },
    Converting,
    Done,
    Failed { message: String },
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::LoadingEngine { percent: Some(p) } => {
                write!(f, "Loading conversion engine... {}%", p)
            }
            SessionStatus::LoadingEngine { percent: None } => {
                write!(f, "Loading conversion engine...")
            }
            SessionStatus::Ready => write!(f, "Engine ready"),
            SessionStatus::FileLoaded { name } => write!(f, "File \"{}\" loaded", name),
            SessionStatus::Converting => write!(f, "Converting..."),
            SessionStatus::Done => write!(f, "Done"),
            SessionStatus::Failed { message } => write!(f, "Error: {}", message),
        }
    }
}

/// One user's conversion state, passed explicitly instead of living in globals
pub struct ConversionSession<C: DocumentConverter> {
    converter: C,
    directive: ConversionDirective,
    preprocessor: Preprocessor,
    source: String,
    artifact: Option<DocxArtifact>,
    warnings: Vec<PreprocessWarning>,
    status: SessionStatus,
}

impl<C: DocumentConverter> ConversionSession<C> {
    pub fn new(converter: C) -> Self {
        Self::with_options(converter, PreprocessOptions::default())
    }

    pub fn with_options(converter: C, options: PreprocessOptions) -> Self {
        Self {
            converter,
            directive: ConversionDirective::default(),
            preprocessor: Preprocessor::new(options),
            source: String::new(),
            artifact: None,
            warnings: Vec::new(),
            status: SessionStatus::LoadingEngine { percent: None },
        }
    }

    pub fn engine_progress(&mut self, progress: DownloadProgress) {
        self.status = SessionStatus::LoadingEngine {
            percent: progress.percent(),
        };
    }

    pub fn engine_ready(&mut self) {
        self.status = SessionStatus::Ready;
    }

    pub fn engine_failed(&mut self, err: &ConversionError) {
        self.status = SessionStatus::Failed {
            message: err.to_string(),
        };
    }

    pub fn set_source(&mut self, text: impl Into<String>) {
        self.source = text.into();
    }

    /// Replace the source with an uploaded file's text.
    pub fn load_file(&mut self, name: &str, text: impl Into<String>) {
        self.source = text.into();
        self.status = SessionStatus::FileLoaded {
            name: name.to_string(),
        };
    }

    /// Preprocess and convert the current source.
    ///
    /// An empty (all-whitespace) source is rejected without touching the
    /// status. On failure the previous artifact is kept.
    pub fn convert(&mut self) -> ConversionResult<&DocxArtifact> {
        let source = self.source.trim();
        if source.is_empty() {
            return Err(ConversionError::invalid("source is empty"));
        }

        self.status = SessionStatus::Converting;
        let prepared = self.preprocessor.run(source);
        self.warnings = prepared.warnings;

        let result = self
            .converter
            .convert(&prepared.content, &self.directive)
            .and_then(|bytes| {
                if bytes.is_empty() {
                    Err(ConversionError::converter("converter returned no document"))
                } else {
                    Ok(bytes)
                }
            });

        match result {
            Ok(bytes) => {
                self.status = SessionStatus::Done;
                Ok(&*self.artifact.insert(DocxArtifact::new(bytes)))
            }
            Err(err) => {
                self.status = SessionStatus::Failed {
                    message: err.to_string(),
                };
                Err(err)
            }
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn artifact(&self) -> Option<&DocxArtifact> {
        self.artifact.as_ref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    /// Warnings from the last conversion
    pub fn warnings(&self) -> &[PreprocessWarning] {
        &self.warnings
    }
}
