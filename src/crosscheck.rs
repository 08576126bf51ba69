//! Submission cross-checks.
//!
//! Two independent check groups: record-only checks that need nothing
//! but the typed record, the metadata path, and the API versions
//! reference; and manifest cross-checks comparing the record against
//! the descriptor extracted from the package. Every applicable check
//! reports, so one run yields the full list of disagreements.

use crate::api_versions::ApiVersions;
use crate::diagnostic::{Diagnostic, DiagnosticCode, Severity};
use crate::manifest::PackageManifest;
use crate::submission::{Channel, SubmissionRecord};
use crate::version::CanonicalVersion;
use camino::Utf8Path;

/// Severity assignments for the non-authoritative field comparisons.
///
/// The package manifest is authoritative for identity and version
/// fields; homepage and changelog live closer to release notes, so
/// their mismatch severity is policy rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossCheckPolicy {
    /// Severity when the homepage disagrees with the manifest url.
    pub homepage_mismatch: Severity,
    /// Severity when the changelog disagrees with the manifest one.
    pub changelog_mismatch: Severity,
}

impl Default for CrossCheckPolicy {
    fn default() -> Self {
        Self {
            homepage_mismatch: Severity::Warning,
            changelog_mismatch: Severity::Warning,
        }
    }
}

/// Run the checks that need only the typed record.
///
/// These run whenever deserialization succeeded, regardless of whether
/// the package could be fetched.
#[must_use]
pub fn check_submission(
    record: &SubmissionRecord,
    metadata_path: &Utf8Path,
    api: &ApiVersions,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    check_addon_id_format(record, &mut diagnostics);
    check_layout(record, metadata_path, &mut diagnostics);
    check_version_range(record, &mut diagnostics);
    check_api_versions(record, api, &mut diagnostics);
    check_version_name_consistency(record, &mut diagnostics);
    diagnostics
}

/// Compare the record against the manifest extracted from the package.
#[must_use]
pub fn cross_check(
    record: &SubmissionRecord,
    manifest: &PackageManifest,
    policy: &CrossCheckPolicy,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if record.addon_id != manifest.name {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::AddonIdMismatch,
                format!(
                    "addonId {:?} does not match the manifest name {:?}",
                    record.addon_id, manifest.name
                ),
            )
            .at("/addonId"),
        );
    }
    if record.display_name != manifest.summary {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::DisplayNameMismatch,
                format!(
                    "displayName {:?} does not match the manifest summary {:?}",
                    record.display_name, manifest.summary
                ),
            )
            .at("/displayName"),
        );
    }
    if manifest.description.as_deref() != Some(record.description.as_str()) {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::DescriptionMismatch,
                "description does not match the manifest description",
            )
            .at("/description"),
        );
    }
    if record.changelog != manifest.changelog {
        diagnostics.push(
            Diagnostic::with_severity(
                policy.changelog_mismatch,
                DiagnosticCode::ChangelogMismatch,
                "changelog does not match the manifest changelog",
            )
            .at("/changelog"),
        );
    }
    if record.homepage != manifest.url {
        diagnostics.push(
            Diagnostic::with_severity(
                policy.homepage_mismatch,
                DiagnosticCode::HomepageMismatch,
                format!(
                    "homepage {} does not match the manifest url {}",
                    describe(record.homepage.as_deref()),
                    describe(manifest.url.as_deref())
                ),
            )
            .at("/homepage"),
        );
    }
    if record.version_name != manifest.version {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::VersionNameMismatch,
                format!(
                    "addonVersionName {:?} does not match the manifest version {:?}",
                    record.version_name, manifest.version
                ),
            )
            .at("/addonVersionName"),
        );
    }
    if record.min_nvda_version != manifest.minimum_nvda_version {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::MinVersionMismatch,
                format!(
                    "minNVDAVersion {} does not match the manifest minimumNVDAVersion {}",
                    record.min_nvda_version, manifest.minimum_nvda_version
                ),
            )
            .at("/minNVDAVersion"),
        );
    }
    if record.last_tested_version != manifest.last_tested_nvda_version {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::LastTestedMismatch,
                format!(
                    "lastTestedVersion {} does not match the manifest lastTestedNVDAVersion {}",
                    record.last_tested_version, manifest.last_tested_nvda_version
                ),
            )
            .at("/lastTestedVersion"),
        );
    }
    diagnostics
}

/// Identifier shape: a letter first, letters/digits/`-`/`_` in the
/// middle, a letter or digit last. Two characters minimum.
fn valid_addon_id(id: &str) -> bool {
    let [first, middle @ .., last] = id.as_bytes() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && last.is_ascii_alphanumeric()
        && middle
            .iter()
            .all(|byte| byte.is_ascii_alphanumeric() || *byte == b'-' || *byte == b'_')
}

fn check_addon_id_format(record: &SubmissionRecord, diagnostics: &mut Vec<Diagnostic>) {
    if !valid_addon_id(&record.addon_id) {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::AddonIdFormat,
                format!(
                    "addonId {:?} must start with a letter, contain only letters, digits, \
                     '-' or '_', and end with a letter or digit",
                    record.addon_id
                ),
            )
            .at("/addonId"),
        );
    }
}

/// The metadata file must live at `<addonId>/<major.minor.patch>.json`.
fn check_layout(
    record: &SubmissionRecord,
    metadata_path: &Utf8Path,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let parent = metadata_path.parent().and_then(Utf8Path::file_name);
    if parent != Some(record.addon_id.as_str()) {
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::SubmissionPathMismatch,
            format!(
                "metadata file must live in a directory named {:?}, found {}",
                record.addon_id,
                describe(parent)
            ),
        ));
    }
    let expected_stem = record.version_number.to_string();
    let stem = metadata_path.file_stem();
    if stem != Some(expected_stem.as_str()) {
        diagnostics.push(Diagnostic::error(
            DiagnosticCode::SubmissionFilenameMismatch,
            format!(
                "metadata file must be named {expected_stem}.json, found {}",
                describe(stem)
            ),
        ));
    }
}

fn check_version_range(record: &SubmissionRecord, diagnostics: &mut Vec<Diagnostic>) {
    if record.min_nvda_version > record.last_tested_version {
        diagnostics.push(
            Diagnostic::error(
                DiagnosticCode::VersionRangeInvalid,
                format!(
                    "minNVDAVersion {} exceeds lastTestedVersion {}",
                    record.min_nvda_version, record.last_tested_version
                ),
            )
            .at("/minNVDAVersion"),
        );
    }
}

fn check_api_versions(
    record: &SubmissionRecord,
    api: &ApiVersions,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let declared = [
        ("minNVDAVersion", record.min_nvda_version),
        ("lastTestedVersion", record.last_tested_version),
    ];
    for (field, version) in declared {
        if !api.in_known_range(version) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::UnknownApiVersion,
                    format!(
                        "{field} {version} is outside the known API range {} to {}",
                        api.oldest(),
                        api.newest()
                    ),
                )
                .at(format!("/{field}")),
            );
        }
        if record.channel == Channel::Stable && !is_stable(api, version) {
            diagnostics.push(
                Diagnostic::error(
                    DiagnosticCode::ApiVersionNotStable,
                    format!(
                        "{field} {version} is not yet a stable API version; \
                         stable channel submissions may not target it"
                    ),
                )
                .at(format!("/{field}")),
            );
        }
    }
}

fn is_stable(api: &ApiVersions, version: CanonicalVersion) -> bool {
    !api.is_experimental(version)
        && api
            .stable_ceiling()
            .is_some_and(|ceiling| version <= ceiling)
}

fn check_version_name_consistency(record: &SubmissionRecord, diagnostics: &mut Vec<Diagnostic>) {
    if CanonicalVersion::parse_lenient(&record.version_name) != Some(record.version_number) {
        diagnostics.push(
            Diagnostic::warning(
                DiagnosticCode::VersionNameInconsistent,
                format!(
                    "addonVersionName {:?} does not read as version {}",
                    record.version_name, record.version_number
                ),
            )
            .at("/addonVersionName"),
        );
    }
}

fn describe(value: Option<&str>) -> String {
    value.map_or_else(|| "absent".to_owned(), |found| format!("{found:?}"))
}

#[cfg(test)]
#[path = "crosscheck_tests.rs"]
mod tests;
