//! Equation tabularization
//!
//! Word has no notion of an equation number living outside the equation, so
//! a numbered `equation` environment is wrapped in a two-column tabular: the
//! body on the left, the number right-aligned on the right.
//!
//! Runs after reference substitution, when `\label{eq:..}` has already been
//! replaced by `(n)`. The number is found by searching the block for any `(n)`
//! known to the label table, in numbering order; the first hit wins. This is
//! a textual match, so an unrelated `(2)` inside an equation can be taken for
//! a number.

use serde::{Deserialize, Serialize};

use super::labels::LabelTable;
use crate::utils::error::{PreprocessWarning, WarningKind};

pub const EQUATION_BEGIN: &str = "\\begin{equation}";
pub const EQUATION_END: &str = "\\end{equation}";

/// 92% of the line for the body, 7% right-aligned for the number, no outer padding.
pub const TABULAR_OPEN: &str =
    "\\begin{tabular}{@{} p{0.92\\linewidth} >{\\raggedleft\\arraybackslash}p{0.07\\linewidth} @{}}";
pub const TABULAR_CLOSE: &str = "\\end{tabular}";

/// What happens to an equation environment that is never closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnterminatedPolicy {
    /// Drop the buffered lines from the output
    #[default]
    Drop,
    /// Emit the buffered lines unchanged
    Flush,
}

/// Layout options for wrapped equations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquationLayout {
    /// Wrap the body in `{\centering ...}`
    pub center: bool,
    pub unterminated: UnterminatedPolicy,
    /// Close an environment whose end marker follows the start marker on
    /// the same line
    pub one_line: bool,
}

impl Default for EquationLayout {
    fn default() -> Self {
        Self {
            center: true,
            unterminated: UnterminatedPolicy::Drop,
            one_line: false,
        }
    }
}

/// Wrap numbered equation environments; everything else passes through.
///
/// Environments do not nest: a start marker inside an open environment
/// abandons the lines buffered so far. The start marker is checked first, so
/// a line holding both markers only opens an environment, which then runs to
/// the next line with an end marker. With [`EquationLayout::one_line`] such a
/// line is a complete environment on its own.
pub fn tabularize_equations(
    text: &str,
    table: &LabelTable,
    layout: &EquationLayout,
) -> (String, Vec<PreprocessWarning>) {
    let mut output: Vec<String> = Vec::new();
    let mut warnings = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut block_start = 0;
    let mut inside = false;

    for (idx, line) in text.split('\n').enumerate() {
        let line_no = idx + 1;

        if let Some(begin) = line.find(EQUATION_BEGIN) {
            if inside {
                abandon_block(&mut output, &mut block, block_start, layout, &mut warnings);
            }
            if layout.one_line && line[begin + EQUATION_BEGIN.len()..].contains(EQUATION_END) {
                inside = false;
                warnings.push(
                    PreprocessWarning::new(
                        WarningKind::OneLineEnvironment,
                        "equation environment opened and closed on one line",
                    )
                    .at_line(line_no),
                );
                output.push(wrap_block(line, table, layout));
            } else {
                inside = true;
                block_start = line_no;
                block.push(line);
            }
        } else if line.contains(EQUATION_END) {
            if inside {
                inside = false;
                block.push(line);
                output.push(wrap_block(&block.join("\n"), table, layout));
                block.clear();
            } else {
                warnings.push(
                    PreprocessWarning::new(
                        WarningKind::StrayEnvironmentEnd,
                        "equation end marker outside any equation environment",
                    )
                    .at_line(line_no),
                );
                output.push(line.to_string());
            }
        } else if inside {
            block.push(line);
        } else {
            output.push(line.to_string());
        }
    }

    if inside {
        abandon_block(&mut output, &mut block, block_start, layout, &mut warnings);
    }

    (output.join("\n"), warnings)
}

fn abandon_block(
    output: &mut Vec<String>,
    block: &mut Vec<&str>,
    start: usize,
    layout: &EquationLayout,
    warnings: &mut Vec<PreprocessWarning>,
) {
    let count = block.len();
    let fate = match layout.unterminated {
        UnterminatedPolicy::Drop => "dropped",
        UnterminatedPolicy::Flush => {
            output.extend(block.iter().map(|line| line.to_string()));
            "kept verbatim"
        }
    };
    warnings.push(
        PreprocessWarning::new(
            WarningKind::UnterminatedEnvironment,
            format!(
                "equation environment is never closed; {} line(s) {}",
                count, fate
            ),
        )
        .at_line(start),
    );
    block.clear();
}

/// Wrap one complete environment if it carries a known number.
fn wrap_block(block: &str, table: &LabelTable, layout: &EquationLayout) -> String {
    let found = table
        .iter()
        .map(|(_, n)| format!("({})", n))
        .find(|number| block.contains(number.as_str()));

    let Some(number) = found else {
        return block.to_string();
    };

    let body = block.replacen(number.as_str(), "", 1);
    let cell = if layout.center {
        format!("{{\\centering {}}}", body)
    } else {
        format!("{{{}}}", body)
    };

    format!(
        "{}\n{} & {} \\\\\n{}",
        TABULAR_OPEN, cell, number, TABULAR_CLOSE
    )
}
