//! LaTeX preprocessing for Word conversion
//!
//! The converter drops LaTeX's automatic numbering, so cross references are
//! resolved to literal numbers before the source is handed over. Stages run
//! strictly in sequence, each on the previous stage's output:
//!
//! 1. literal substitution (neutralise commands the converter cannot parse)
//! 2. optional table clean-up
//! 3. equation labels: extract, substitute as `(n)`, tabularize
//! 4. figure labels: extract from the current text, substitute as `Figure n`
//! 5. table labels: extract from the current text, substitute as `Table n`
//!
//! Figure and table labels are extracted from text already rewritten by the
//! equation stage, not from the input as given.

pub mod equations;
pub mod labels;
pub mod literal;
pub mod refs;
pub mod scanner;
pub mod tables;

use serde::{Deserialize, Serialize};

use crate::utils::error::{PreprocessWarning, WarningKind};

pub use equations::{tabularize_equations, EquationLayout, UnterminatedPolicy};
pub use labels::{LabelTable, PrefixGroup};
pub use literal::{apply_substitutions, Substitution};
pub use refs::{substitute_references, Rendering};
pub use scanner::{Marker, MarkerKind, MarkerScanner};

/// Preprocessing options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Extra literal substitutions, applied after the built-in ones
    pub substitutions: Vec<Substitution>,
    /// Center the equation body inside its table cell
    pub center_equations: bool,
    /// Fate of equation environments that are never closed
    pub unterminated: UnterminatedPolicy,
    /// Run the table clean-up stage
    pub clean_tables: bool,
    /// Treat `\begin{equation} ... \end{equation}` on a single line as a
    /// complete environment instead of an opening one
    pub one_line_equations: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            substitutions: Vec::new(),
            center_equations: true,
            unterminated: UnterminatedPolicy::Drop,
            clean_tables: false,
            one_line_equations: false,
        }
    }
}

impl PreprocessOptions {
    pub fn equation_layout(&self) -> EquationLayout {
        EquationLayout {
            center: self.center_equations,
            unterminated: self.unterminated,
            one_line: self.one_line_equations,
        }
    }
}

#[cfg(feature = "config-file")]
impl PreprocessOptions {
    /// Parse options from TOML; missing keys take their defaults.
    ///
    /// ```toml
    /// center_equations = false
    /// unterminated = "flush"
    ///
    /// [[substitutions]]
    /// search = "\\algname"
    /// replace = "\\textbf"
    /// ```
    pub fn from_toml_str(source: &str) -> crate::ConversionResult<Self> {
        toml::from_str(source).map_err(|e| crate::ConversionError::config(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> crate::ConversionResult<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}

/// Preprocessed text plus what was resolved along the way
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreprocessOutput {
    pub content: String,
    pub equations: LabelTable,
    pub figures: LabelTable,
    pub tables: LabelTable,
    pub warnings: Vec<PreprocessWarning>,
}

impl PreprocessOutput {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// The preprocessing pipeline
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, source: &str) -> PreprocessOutput {
        let mut warnings = Vec::new();

        let mut text = apply_substitutions(source, &self.options.substitutions);
        if self.options.clean_tables {
            text = tables::clean_tables(&text);
        }

        let equations = LabelTable::extract(&text, &PrefixGroup::EQUATIONS);
        report_redefinitions(&equations, &mut warnings);
        text = substitute_references(&text, &equations, PrefixGroup::EQUATIONS.caption);
        let (tabularized, layout_warnings) =
            tabularize_equations(&text, &equations, &self.options.equation_layout());
        text = tabularized;
        warnings.extend(layout_warnings);

        let figures = LabelTable::extract(&text, &PrefixGroup::FIGURES);
        report_redefinitions(&figures, &mut warnings);
        text = substitute_references(&text, &figures, PrefixGroup::FIGURES.caption);

        let tables = LabelTable::extract(&text, &PrefixGroup::TABLES);
        report_redefinitions(&tables, &mut warnings);
        text = substitute_references(&text, &tables, PrefixGroup::TABLES.caption);

        report_unresolved(&text, &mut warnings);

        PreprocessOutput {
            content: text,
            equations,
            figures,
            tables,
            warnings,
        }
    }
}

fn report_redefinitions(table: &LabelTable, warnings: &mut Vec<PreprocessWarning>) {
    for id in table.redefinitions() {
        let n = table.get(id).unwrap_or_default();
        warnings.push(PreprocessWarning::new(
            WarningKind::DuplicateLabel,
            format!("label '{}' is defined more than once; keeping number {}", id, n),
        ));
    }
}

/// Flag markers of a numbered group that are still literal after the pipeline.
fn report_unresolved(text: &str, warnings: &mut Vec<PreprocessWarning>) {
    let groups = [PrefixGroup::EQUATIONS, PrefixGroup::FIGURES, PrefixGroup::TABLES];
    let mut cursor = 0;
    let mut line = 1;
    let mut counted = 0;
    for marker in MarkerScanner::new(text) {
        if marker.span.start < cursor {
            continue;
        }
        if !groups.iter().any(|group| group.matches(marker.id)) {
            continue;
        }
        cursor = marker.span.end;
        line += text[counted..marker.span.start].matches('\n').count();
        counted = marker.span.start;
        warnings.push(
            PreprocessWarning::new(
                WarningKind::UnresolvedReference,
                format!(
                    "{} is left unresolved",
                    marker.kind.render(marker.id)
                ),
            )
            .at_line(line),
        );
    }
}
