//! Report rendering for the gate CLI.
//!
//! The pipeline produces a structured [`ValidationReport`]; this module
//! turns it into the line-oriented text the CLI prints and the report
//! block appended to `--output` files. Rendering is pure so it can be
//! tested without touching process streams.

use crate::diagnostic::ValidationReport;
use camino::Utf8Path;

/// Render each finding as one display line, in pipeline order.
#[must_use]
pub fn diagnostic_lines(report: &ValidationReport) -> Vec<String> {
    report
        .diagnostics()
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// The final pass/fail line for a run.
///
/// # Examples
///
/// ```
/// use addon_gate::diagnostic::{PipelineStage, ValidationReport};
/// use addon_gate::output::verdict_line;
///
/// let report = ValidationReport::new(PipelineStage::CrossChecked, Vec::new());
/// assert_eq!(
///     verdict_line(&report),
///     "Validation passed after cross-checked: 0 errors, 0 warnings"
/// );
/// ```
#[must_use]
pub fn verdict_line(report: &ValidationReport) -> String {
    let verdict = if report.is_valid() { "passed" } else { "failed" };
    format!(
        "Validation {verdict} after {}: {}, {}",
        report.stage(),
        counted(report.error_count(), "error"),
        counted(report.warning_count(), "warning"),
    )
}

/// Format the report block appended to `--output` files.
///
/// Names the metadata file so appended blocks from successive runs stay
/// attributable, then lists the findings indented under it.
#[must_use]
pub fn render_report(metadata_path: &Utf8Path, report: &ValidationReport) -> String {
    let mut lines = vec![format!("{metadata_path}:")];
    for line in diagnostic_lines(report) {
        lines.push(format!("  {line}"));
    }
    lines.push(format!("  {}", verdict_line(report)));
    lines.push(String::new());
    lines.join("\n")
}

fn counted(count: usize, noun: &str) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{plural}")
}
