//! Submission validation orchestrator.
//!
//! Composes the schema check, package fetch, hash verification, and
//! manifest cross-checks into one pass over a submission. The pipeline
//! accumulates diagnostics instead of failing fast: every check that is
//! still meaningful after an earlier failure runs, so a single run
//! reports everything a submitter must fix. Only environmental
//! failures — unreadable reference files, an unusable schema — abort
//! the run with a [`GateError`].

use camino::{Utf8Path, Utf8PathBuf};
use serde_json::Value;
use std::time::Duration;

use crate::api_versions::ApiVersions;
use crate::checksum::{self, ChecksumOutcome};
use crate::crosscheck::{self, CrossCheckPolicy};
use crate::diagnostic::{Diagnostic, DiagnosticCode, PipelineStage, ValidationReport};
use crate::error::GateError;
use crate::fetch::{self, PackageFetcher};
use crate::package::{self, PackageError};
use crate::schema::{SchemaValidator, SchemaViolation};
use crate::submission::SubmissionRecord;

/// Where the submission schema comes from.
#[derive(Debug, Clone, Default)]
pub enum SchemaSource {
    /// The schema document compiled into the binary.
    #[default]
    Bundled,
    /// A schema document loaded from disk.
    Path(Utf8PathBuf),
}

/// Configuration for a validation run.
///
/// Everything the original scripts kept as module globals lives here so
/// each run is explicit about its inputs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Schema document to validate against.
    pub schema: SchemaSource,
    /// Severity policy for the non-authoritative cross-checks.
    pub policy: CrossCheckPolicy,
    /// Network timeout for the package download.
    pub timeout: Duration,
    /// Cap on downloaded package size, in bytes.
    pub max_package_size: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema: SchemaSource::default(),
            policy: CrossCheckPolicy::default(),
            timeout: fetch::DOWNLOAD_TIMEOUT,
            max_package_size: fetch::MAX_PACKAGE_SIZE,
        }
    }
}

/// The validation orchestrator.
///
/// Holds the compiled schema and the injected fetcher; carries no
/// per-run state, so one pipeline may serve many submissions and
/// identical inputs always produce identical reports.
pub struct ValidationPipeline<'a> {
    schema: SchemaValidator,
    policy: CrossCheckPolicy,
    fetcher: &'a dyn PackageFetcher,
}

impl<'a> ValidationPipeline<'a> {
    /// Build a pipeline from configuration and a fetcher.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::Schema`] when the configured schema document
    /// cannot be loaded or compiled.
    pub fn new(config: &PipelineConfig, fetcher: &'a dyn PackageFetcher) -> Result<Self, GateError> {
        let schema = match &config.schema {
            SchemaSource::Bundled => SchemaValidator::bundled()?,
            SchemaSource::Path(path) => SchemaValidator::from_path(path)?,
        };
        Ok(Self {
            schema,
            policy: config.policy,
            fetcher,
        })
    }

    /// Validate one submission end to end.
    ///
    /// The report's stage records the furthest stage that completed;
    /// its diagnostics carry everything found along the way. The report
    /// is valid only when no Error-severity diagnostic is present.
    ///
    /// # Errors
    ///
    /// Returns [`GateError`] when the metadata file cannot be read or
    /// the API versions reference is unusable. Defects in the
    /// submission itself never produce an `Err`.
    pub fn run(
        &self,
        metadata_path: &Utf8Path,
        api_versions_path: &Utf8Path,
    ) -> Result<ValidationReport, GateError> {
        // Step 1: Load the reference data and the submitted metadata.
        let api = ApiVersions::load(api_versions_path)?;
        let text = std::fs::read_to_string(metadata_path).map_err(|source| {
            GateError::MetadataRead {
                path: metadata_path.to_owned(),
                source,
            }
        })?;

        let mut diagnostics = Vec::new();
        let value: Value = match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(error) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::MalformedMetadata,
                    format!("metadata is not valid JSON: {error}"),
                ));
                return Ok(ValidationReport::new(PipelineStage::Start, diagnostics));
            }
        };

        // Step 2: Schema validation, one diagnostic per violation.
        let violations = self.schema.validate(&value);
        let url_shape_rejected = violations
            .iter()
            .any(|violation| violation.instance_path == "/URL");
        diagnostics.extend(violations.iter().map(schema_diagnostic));
        log::debug!("schema check found {} violation(s)", violations.len());

        // Step 3: The typed record. Downstream checks consume only the
        // typed form, so a record that does not deserialize ends the run.
        let record = match SubmissionRecord::from_value(value) {
            Ok(record) => record,
            Err(error) => {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::MalformedMetadata,
                    format!("metadata does not form a submission record: {error}"),
                ));
                return Ok(ValidationReport::new(
                    PipelineStage::SchemaChecked,
                    diagnostics,
                ));
            }
        };

        // Step 4: Legacy submissions are schema-checked only.
        if record.is_legacy() {
            log::debug!("legacy submission {}; package checks skipped", record.addon_id);
            return Ok(ValidationReport::new(
                PipelineStage::SchemaChecked,
                diagnostics,
            ));
        }

        // Step 5: Record-only checks run regardless of fetch outcome.
        diagnostics.extend(crosscheck::check_submission(&record, metadata_path, &api));

        // Step 6: Fetch gate. A URL that failed validation is never
        // fetched; when a custom schema carries no URL pattern, the
        // built-in shape test keeps the gate closed and says so.
        if url_shape_rejected {
            log::debug!("skipping fetch; declared URL failed schema validation");
            return Ok(ValidationReport::new(
                PipelineStage::SchemaChecked,
                diagnostics,
            ));
        }
        if !has_package_url_shape(&record.url) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UrlFormat,
                    format!(
                        "URL {:?} must be https and end in .nvda-addon",
                        record.url
                    ),
                )
                .at("/URL"),
            );
            return Ok(ValidationReport::new(
                PipelineStage::SchemaChecked,
                diagnostics,
            ));
        }

        // Step 7: Fetch the package bytes.
        let bytes = match self.fetcher.fetch(&record.url) {
            Ok(bytes) => bytes,
            Err(error) => {
                diagnostics
                    .push(Diagnostic::error(DiagnosticCode::DownloadFailure, error.to_string()).at("/URL"));
                return Ok(ValidationReport::new(
                    PipelineStage::SchemaChecked,
                    diagnostics,
                ));
            }
        };
        log::debug!("fetched {} byte package", bytes.len());

        // Step 8: Verify the declared digest. A mismatch is always an
        // error but the manifest checks below are still meaningful, so
        // the run continues.
        if let ChecksumOutcome::Mismatch { actual } = checksum::verify(&bytes, &record.sha256) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::ChecksumMismatch,
                    format!(
                        "package sha256 {actual} does not match the declared {}",
                        record.sha256
                    ),
                )
                .at("/sha256"),
            );
        }

        // Step 9: Extract the manifest.
        let package = match package::inspect_bytes(&bytes) {
            Ok(package) => package,
            Err(error) => {
                diagnostics.push(manifest_failure(&error));
                return Ok(ValidationReport::new(
                    PipelineStage::HashChecked,
                    diagnostics,
                ));
            }
        };

        // Step 10: Manifest cross-checks.
        diagnostics.extend(crosscheck::cross_check(
            &record,
            &package.manifest,
            &self.policy,
        ));
        Ok(ValidationReport::new(
            PipelineStage::CrossChecked,
            diagnostics,
        ))
    }
}

/// The URL shape the bundled schema enforces, re-tested directly so a
/// custom schema without the pattern cannot open the fetch gate.
fn has_package_url_shape(url: &str) -> bool {
    url.starts_with("https://") && url.ends_with(".nvda-addon")
}

/// Map a schema violation to a diagnostic, keeping the instance path
/// when the violation points below the document root.
fn schema_diagnostic(violation: &SchemaViolation) -> Diagnostic {
    let diagnostic = Diagnostic::error(DiagnosticCode::SchemaViolation, violation.message.clone());
    if violation.instance_path.is_empty() {
        diagnostic
    } else {
        diagnostic.at(violation.instance_path.clone())
    }
}

/// Map a package failure to its diagnostic: a descriptor that parsed
/// wrongly is distinct from one that could not be found at all.
fn manifest_failure(error: &PackageError) -> Diagnostic {
    let code = match error {
        PackageError::Manifest(_) => DiagnosticCode::ManifestInvalid,
        _ => DiagnosticCode::ManifestNotFound,
    };
    Diagnostic::error(code, error.to_string())
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
