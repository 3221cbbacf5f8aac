//! WASM bindings for tex2docx
//!
//! This module provides JavaScript-accessible functions for the browser
//! front end. The page runs the converter and the preview itself; it calls
//! in here to prepare the LaTeX and for the fixed artifact metadata.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

/// Preprocessing options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct PreprocessConvertOptions {
    /// Extra `{search, replace}` literal substitutions
    #[serde(default)]
    pub substitutions: Vec<crate::Substitution>,
    /// Center the equation body in its cell
    #[serde(default = "default_true")]
    pub center_equations: bool,
    /// Keep the lines of a never-closed equation environment
    #[serde(default)]
    pub keep_unterminated: bool,
    /// Strip `\vspace`, `\hfill`, minipages and `\captionof{table}`
    #[serde(default)]
    pub clean_tables: bool,
    /// Close an equation environment opened and closed on one line
    #[serde(default)]
    pub one_line_equations: bool,
}

#[cfg(feature = "wasm")]
impl From<PreprocessConvertOptions> for crate::PreprocessOptions {
    fn from(opts: PreprocessConvertOptions) -> Self {
        crate::PreprocessOptions {
            substitutions: opts.substitutions,
            center_equations: opts.center_equations,
            unterminated: if opts.keep_unterminated {
                crate::UnterminatedPolicy::Flush
            } else {
                crate::UnterminatedPolicy::Drop
            },
            clean_tables: opts.clean_tables,
            one_line_equations: opts.one_line_equations,
        }
    }
}

#[cfg(feature = "wasm")]
fn default_true() -> bool {
    true
}

/// Preprocessing result with additional metadata
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct ConvertResult {
    /// The preprocessed LaTeX
    pub output: String,
    /// Whether preprocessing was successful
    pub success: bool,
    /// Error message if preprocessing failed
    pub error: Option<String>,
    /// Warnings during preprocessing
    pub warnings: Vec<String>,
}

/// Safely serialize a value to JsValue, returning an error object on failure.
#[cfg(feature = "wasm")]
fn to_js_value<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or_else(|e| {
        let error_obj = ConvertResult {
            output: String::new(),
            success: false,
            error: Some(format!("Serialization error: {}", e)),
            warnings: vec![],
        };
        serde_wasm_bindgen::to_value(&error_obj).unwrap_or(JsValue::NULL)
    })
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Preprocess LaTeX with the default policy
///
/// # Arguments
/// * `input` - Full LaTeX document
///
/// # Returns
/// LaTeX ready for the converter
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "preprocessLatex")]
pub fn preprocess_latex_wasm(input: &str) -> String {
    crate::process(input)
}

/// Preprocess LaTeX with options
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "preprocessLatexWithOptions")]
pub fn preprocess_latex_with_options_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: PreprocessConvertOptions =
        serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let options: crate::PreprocessOptions = opts.into();

    let result = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        crate::process_with_options(input, &options)
    })) {
        Ok(prepared) => ConvertResult {
            output: prepared.content,
            success: true,
            error: None,
            warnings: prepared.warnings.iter().map(|w| w.to_string()).collect(),
        },
        Err(e) => {
            let error_msg = if let Some(s) = e.downcast_ref::<&str>() {
                format!("Preprocessing failed: {}", s)
            } else if let Some(s) = e.downcast_ref::<String>() {
                format!("Preprocessing failed: {}", s)
            } else {
                "Preprocessing failed: unknown error (check browser console for details)"
                    .to_string()
            };
            ConvertResult {
                output: String::new(),
                success: false,
                error: Some(error_msg),
                warnings: vec![],
            }
        }
    };

    to_js_value(&result)
}

/// Arguments for the converter, e.g. `["-s", "-f", "latex", "-t", "docx"]`
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "converterArgs")]
pub fn converter_args_wasm() -> Vec<String> {
    crate::ConversionDirective::default().to_args()
}

/// MIME type for the downloadable document
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "docxMimeType")]
pub fn docx_mime_type() -> String {
    crate::DOCX_MIME.to_string()
}

/// Default file name for the downloadable document
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "defaultDocxFileName")]
pub fn default_docx_file_name() -> String {
    crate::DEFAULT_FILE_NAME.to_string()
}

/// Engine download percentage, `undefined` when the total size is unknown
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "downloadPercent")]
pub fn download_percent(received: f64, total: f64) -> Option<u8> {
    let total = (total.is_finite() && total > 0.0).then_some(total as u64);
    crate::DownloadProgress::new(received.max(0.0) as u64, total).percent()
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
