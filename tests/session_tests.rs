//! Conversion session tests with an in-memory converter

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use tex2docx::{
    ConversionDirective, ConversionError, ConversionResult, ConversionSession, DocumentConverter,
    DownloadProgress, SessionStatus, DOCX_MIME,
};

type Calls = Rc<RefCell<Vec<(String, Vec<String>)>>>;
type Reply = Rc<RefCell<ConversionResult<Vec<u8>>>>;

/// Records what it was asked to convert and returns a canned result
struct RecordingConverter {
    seen: Calls,
    reply: Reply,
}

impl RecordingConverter {
    fn ok(bytes: &[u8]) -> Self {
        Self {
            seen: Calls::default(),
            reply: Rc::new(RefCell::new(Ok(bytes.to_vec()))),
        }
    }

    fn calls(&self) -> Calls {
        Rc::clone(&self.seen)
    }

    /// Handle for changing the reply after the converter moved into a session
    fn reply(&self) -> Reply {
        Rc::clone(&self.reply)
    }
}

impl DocumentConverter for RecordingConverter {
    fn convert(&self, source: &str, directive: &ConversionDirective) -> ConversionResult<Vec<u8>> {
        self.seen
            .borrow_mut()
            .push((source.to_string(), directive.to_args()));
        self.reply.borrow().clone()
    }
}

#[test]
fn test_convert_passes_preprocessed_source() {
    let mut session = ConversionSession::new(RecordingConverter::ok(b"PK"));
    session.engine_ready();
    session.set_source("  \\label{fig:a} see \\ref{fig:a}\n");

    let artifact = session.convert().unwrap();
    assert_eq!(artifact.bytes, b"PK".to_vec());
    assert_eq!(artifact.file_name, "document.docx");
    assert_eq!(artifact.mime, DOCX_MIME);
    assert_eq!(session.status(), &SessionStatus::Done);
    assert_eq!(session.artifact().map(|a| a.len()), Some(2));
}

#[test]
fn test_converter_sees_trimmed_processed_text() {
    let converter = RecordingConverter::ok(b"doc");
    let calls = converter.calls();
    let mut session = ConversionSession::new(converter);
    session.set_source("\n\\label{eq:a} \\eqref{eq:a}\n");
    session.convert().unwrap();

    let seen = calls.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "(1) (1)");
    assert_eq!(seen[0].1, vec!["-s", "-f", "latex", "-t", "docx"]);
}

#[test]
fn test_empty_source_rejected_without_status_change() {
    let converter = RecordingConverter::ok(b"doc");
    let calls = converter.calls();
    let mut session = ConversionSession::new(converter);
    session.engine_ready();
    session.set_source("   \n\t");

    let err = session.convert().unwrap_err();
    assert!(matches!(err, ConversionError::InvalidInput { .. }));
    assert_eq!(session.status(), &SessionStatus::Ready);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_failure_keeps_previous_artifact() {
    let converter = RecordingConverter::ok(b"first");
    let reply = converter.reply();
    let mut session = ConversionSession::new(converter);
    session.set_source("x");
    session.convert().unwrap();

    *reply.borrow_mut() = Err(ConversionError::converter("bad latex"));
    let err = session.convert().unwrap_err();
    assert_eq!(err.to_string(), "Converter failed: bad latex");
    assert_eq!(
        session.status(),
        &SessionStatus::Failed {
            message: "Converter failed: bad latex".to_string()
        }
    );
    assert_eq!(
        session.artifact().map(|a| a.bytes.clone()),
        Some(b"first".to_vec())
    );

    *reply.borrow_mut() = Ok(b"second".to_vec());
    session.convert().unwrap();
    assert_eq!(session.status(), &SessionStatus::Done);
    assert_eq!(
        session.artifact().map(|a| a.bytes.clone()),
        Some(b"second".to_vec())
    );
}

#[test]
fn test_failure_without_previous_artifact() {
    let converter = RecordingConverter::ok(b"doc");
    *converter.reply().borrow_mut() = Err(ConversionError::converter("bad latex"));
    let mut session = ConversionSession::new(converter);
    session.set_source("x");

    assert!(session.convert().is_err());
    assert!(session.artifact().is_none());
}

#[test]
fn test_empty_payload_is_failure() {
    let mut session = ConversionSession::new(RecordingConverter::ok(b""));
    session.set_source("x");
    assert!(session.convert().is_err());
    assert!(matches!(session.status(), SessionStatus::Failed { .. }));
}

#[test]
fn test_closure_converter_and_warnings() {
    let converter =
        |source: &str, _: &ConversionDirective| -> ConversionResult<Vec<u8>> {
            Ok(source.as_bytes().to_vec())
        };
    let mut session = ConversionSession::new(converter);
    session.load_file("paper.tex", "\\ref{eq:missing}");
    assert_eq!(
        session.status(),
        &SessionStatus::FileLoaded {
            name: "paper.tex".to_string()
        }
    );
    assert_eq!(session.source(), "\\ref{eq:missing}");

    let bytes = session.convert().unwrap().bytes.clone();
    assert_eq!(bytes, b"\\ref{eq:missing}".to_vec());
    assert_eq!(session.warnings().len(), 1);
}

#[test]
fn test_engine_lifecycle() {
    let mut session = ConversionSession::new(RecordingConverter::ok(b"doc"));
    assert_eq!(
        session.status(),
        &SessionStatus::LoadingEngine { percent: None }
    );

    session.engine_progress(DownloadProgress::new(512, Some(2048)));
    assert_eq!(
        session.status(),
        &SessionStatus::LoadingEngine { percent: Some(25) }
    );

    session.engine_failed(&ConversionError::engine("404 Not Found"));
    assert_eq!(
        session.status().to_string(),
        "Error: Conversion engine unavailable: 404 Not Found"
    );
}
