//! Validation diagnostics and the report produced by a pipeline run.
//!
//! Expected submission defects are data, not errors: each finding is a
//! [`Diagnostic`] tagged with a severity and a stable code, and a run
//! always yields a [`ValidationReport`]. Validity is computed from the
//! collected diagnostics, so a report can never claim to be valid while
//! carrying an error-severity finding.

use serde::Serialize;
use std::fmt;

/// How severe a diagnostic is.
///
/// Only [`Severity::Error`] findings make a submission invalid; warnings
/// are surfaced but never flip the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The submission must be rejected.
    Error,
    /// Worth surfacing, but not grounds for rejection.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable machine-readable categories for validation findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticCode {
    /// The metadata violated the submission schema.
    SchemaViolation,
    /// The metadata could not be read as a typed record.
    MalformedMetadata,
    /// The download URL does not look like a package URL.
    UrlFormat,
    /// The package could not be downloaded.
    DownloadFailure,
    /// The downloaded bytes do not match the declared checksum.
    ChecksumMismatch,
    /// The package carries no readable descriptor.
    ManifestNotFound,
    /// The package descriptor is present but malformed.
    ManifestInvalid,
    /// The submission identifier differs from the manifest name.
    AddonIdMismatch,
    /// The submission identifier is not a well-formed add-on id.
    AddonIdFormat,
    /// The metadata file does not live in the identifier's directory.
    SubmissionPathMismatch,
    /// The metadata filename does not match the version number.
    SubmissionFilenameMismatch,
    /// The display name differs from the manifest summary.
    DisplayNameMismatch,
    /// The description differs from the manifest description.
    DescriptionMismatch,
    /// The changelog differs from the manifest changelog.
    ChangelogMismatch,
    /// The homepage differs from the manifest url.
    HomepageMismatch,
    /// The version name differs from the manifest version.
    VersionNameMismatch,
    /// The numeric reading of the version name differs from the version number.
    VersionNameInconsistent,
    /// The declared minimum differs from the manifest minimum.
    MinVersionMismatch,
    /// The declared last tested version differs from the manifest one.
    LastTestedMismatch,
    /// The declared minimum exceeds the last tested version.
    VersionRangeInvalid,
    /// A declared API version lies outside the known range.
    UnknownApiVersion,
    /// A stable submission declares an API version that is not stable yet.
    ApiVersionNotStable,
}

impl DiagnosticCode {
    /// Return the code as its stable string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::SchemaViolation => "SchemaViolation",
            DiagnosticCode::MalformedMetadata => "MalformedMetadata",
            DiagnosticCode::UrlFormat => "UrlFormat",
            DiagnosticCode::DownloadFailure => "DownloadFailure",
            DiagnosticCode::ChecksumMismatch => "ChecksumMismatch",
            DiagnosticCode::ManifestNotFound => "ManifestNotFound",
            DiagnosticCode::ManifestInvalid => "ManifestInvalid",
            DiagnosticCode::AddonIdMismatch => "AddonIdMismatch",
            DiagnosticCode::AddonIdFormat => "AddonIdFormat",
            DiagnosticCode::SubmissionPathMismatch => "SubmissionPathMismatch",
            DiagnosticCode::SubmissionFilenameMismatch => "SubmissionFilenameMismatch",
            DiagnosticCode::DisplayNameMismatch => "DisplayNameMismatch",
            DiagnosticCode::DescriptionMismatch => "DescriptionMismatch",
            DiagnosticCode::ChangelogMismatch => "ChangelogMismatch",
            DiagnosticCode::HomepageMismatch => "HomepageMismatch",
            DiagnosticCode::VersionNameMismatch => "VersionNameMismatch",
            DiagnosticCode::VersionNameInconsistent => "VersionNameInconsistent",
            DiagnosticCode::MinVersionMismatch => "MinVersionMismatch",
            DiagnosticCode::LastTestedMismatch => "LastTestedMismatch",
            DiagnosticCode::VersionRangeInvalid => "VersionRangeInvalid",
            DiagnosticCode::UnknownApiVersion => "UnknownApiVersion",
            DiagnosticCode::ApiVersionNotStable => "ApiVersionNotStable",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single validation finding.
///
/// # Examples
///
/// ```
/// use addon_gate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
///
/// let finding = Diagnostic::error(DiagnosticCode::ChecksumMismatch, "digest differs")
///     .at("/sha256");
/// assert_eq!(finding.severity, Severity::Error);
/// assert_eq!(finding.to_string(), "error [ChecksumMismatch] digest differs (at /sha256)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Whether the finding rejects the submission or merely warns.
    pub severity: Severity,
    /// Stable category for scripting and tests.
    pub code: DiagnosticCode,
    /// Human-readable explanation.
    pub message: String,
    /// JSON-pointer-style location within the metadata, where applicable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl Diagnostic {
    /// Build an error-severity diagnostic.
    #[must_use]
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message)
    }

    /// Build a warning-severity diagnostic.
    #[must_use]
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message)
    }

    /// Build a diagnostic with an explicit severity.
    ///
    /// Used where the severity is policy, not a property of the check.
    #[must_use]
    pub fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Attach a location within the metadata document.
    #[must_use]
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.severity, self.code, self.message)?;
        if let Some(path) = &self.path {
            write!(f, " (at {path})")?;
        }
        Ok(())
    }
}

/// Pipeline stages in execution order.
///
/// A report records the furthest stage that completed, so callers can
/// tell a rejection discovered early from one discovered after download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineStage {
    /// Nothing has completed yet.
    Start,
    /// Schema validation and record-level checks completed.
    SchemaChecked,
    /// The package bytes were fetched.
    Fetched,
    /// The content hash was verified against the declared checksum.
    HashChecked,
    /// The manifest cross-checks completed.
    CrossChecked,
}

impl PipelineStage {
    /// Return the stage in its serialized kebab-case form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStage::Start => "start",
            PipelineStage::SchemaChecked => "schema-checked",
            PipelineStage::Fetched => "fetched",
            PipelineStage::HashChecked => "hash-checked",
            PipelineStage::CrossChecked => "cross-checked",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of one validation run.
///
/// Immutable once built; validity is derived from the diagnostics rather
/// than stored, so it cannot drift out of step with them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    stage: PipelineStage,
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Build a report from the furthest completed stage and its findings.
    #[must_use]
    pub fn new(stage: PipelineStage, diagnostics: Vec<Diagnostic>) -> Self {
        Self { stage, diagnostics }
    }

    /// The furthest stage the run completed.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// All findings in the order they were collected.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Whether the submission passed.
    ///
    /// True exactly when no error-severity diagnostic was collected;
    /// warnings never affect the verdict.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Number of error-severity findings.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity findings.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_report_is_valid() {
        let report = ValidationReport::new(PipelineStage::CrossChecked, Vec::new());
        assert!(report.is_valid());
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.warning_count(), 0);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let report = ValidationReport::new(
            PipelineStage::CrossChecked,
            vec![Diagnostic::warning(
                DiagnosticCode::HomepageMismatch,
                "homepage differs",
            )],
        );
        assert!(report.is_valid());
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn a_single_error_invalidates() {
        let report = ValidationReport::new(
            PipelineStage::HashChecked,
            vec![
                Diagnostic::warning(DiagnosticCode::HomepageMismatch, "homepage differs"),
                Diagnostic::error(DiagnosticCode::ChecksumMismatch, "digest differs"),
            ],
        );
        assert!(!report.is_valid());
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
    }

    #[test]
    fn stages_order_matches_execution() {
        assert!(PipelineStage::Start < PipelineStage::SchemaChecked);
        assert!(PipelineStage::SchemaChecked < PipelineStage::Fetched);
        assert!(PipelineStage::Fetched < PipelineStage::HashChecked);
        assert!(PipelineStage::HashChecked < PipelineStage::CrossChecked);
    }

    #[rstest]
    #[case::with_path(Some("/URL"), "error [UrlFormat] bad url (at /URL)")]
    #[case::without_path(None, "error [UrlFormat] bad url")]
    fn diagnostic_display_includes_optional_path(
        #[case] path: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut diagnostic = Diagnostic::error(DiagnosticCode::UrlFormat, "bad url");
        if let Some(p) = path {
            diagnostic = diagnostic.at(p);
        }
        assert_eq!(diagnostic.to_string(), expected);
    }

    #[test]
    fn report_serializes_for_scripting() {
        let report = ValidationReport::new(
            PipelineStage::SchemaChecked,
            vec![Diagnostic::error(DiagnosticCode::SchemaViolation, "missing field").at("/sha256")],
        );
        let json = serde_json::to_value(&report).expect("serializable");
        assert_eq!(json["stage"], "schema-checked");
        assert_eq!(json["diagnostics"][0]["severity"], "error");
        assert_eq!(json["diagnostics"][0]["code"], "SchemaViolation");
        assert_eq!(json["diagnostics"][0]["path"], "/sha256");
    }

    #[test]
    fn code_display_matches_as_str() {
        assert_eq!(
            DiagnosticCode::UnknownApiVersion.to_string(),
            DiagnosticCode::UnknownApiVersion.as_str()
        );
    }
}
