//! Submission metadata generation from a packaged add-on.
//!
//! The `create` subcommand is the authoring companion to validation: it
//! reads a local package, lifts the manifest fields into a
//! [`SubmissionRecord`], computes the package digest, and writes the
//! record under the store layout `<dir>/<addonId>/<version>.json`. A
//! record produced here from an intact package passes the gate.

use crate::checksum::digest_file;
use crate::error::{GateError, Result};
use crate::package::{InspectedPackage, inspect_file};
use crate::submission::{Channel, SubmissionRecord, Translation};
use crate::version::CanonicalVersion;
use camino::{Utf8Path, Utf8PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Inputs for assembling a submission record.
///
/// Everything the manifest cannot supply arrives here: the hosting and
/// licensing facts live with the publisher, not inside the package.
#[derive(Debug, Clone)]
pub struct CreateRequest<'a> {
    /// Local path of the packaged add-on.
    pub package: &'a Utf8Path,
    /// Root of the submission metadata tree.
    pub dir: &'a Utf8Path,
    /// Release channel the submission targets.
    pub channel: Channel,
    /// Person or organisation publishing the release.
    pub publisher: &'a str,
    /// Location of the source code.
    pub source_url: &'a str,
    /// Download location the store will publish.
    pub url: &'a str,
    /// Licence name for the release.
    pub license: &'a str,
    /// Location of the full licence text, when one exists.
    pub license_url: Option<&'a str>,
}

/// Assemble a submission record from a local package and write it.
///
/// Returns the path of the written metadata file,
/// `<dir>/<addonId>/<major.minor.patch>.json`. Optional fields with no
/// value are omitted from the JSON rather than written as nulls.
///
/// # Errors
///
/// Returns [`GateError`] when the package cannot be read or inspected,
/// its manifest version has no numeric form to name the file with, or
/// the metadata file cannot be written.
pub fn create_submission(request: &CreateRequest<'_>) -> Result<Utf8PathBuf> {
    let package = inspect_file(request.package)?;
    let digest = digest_file(request.package.as_std_path()).map_err(|source| {
        GateError::FileRead {
            path: request.package.to_owned(),
            source,
        }
    })?;

    let version_number = CanonicalVersion::parse_lenient(&package.manifest.version).ok_or_else(
        || GateError::VersionUnparsable {
            version: package.manifest.version.clone(),
        },
    )?;

    let record = build_record(request, &package, digest.into_inner(), version_number);

    let addon_dir = request.dir.join(&record.addon_id);
    std::fs::create_dir_all(&addon_dir).map_err(|source| GateError::WriteFailed {
        path: addon_dir.clone(),
        source,
    })?;

    let path = addon_dir.join(format!("{version_number}.json"));
    let mut text = serde_json::to_string_pretty(&record)?;
    text.push('\n');
    std::fs::write(&path, text).map_err(|source| GateError::WriteFailed {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote submission metadata for {} to {path}", record.addon_id);
    Ok(path)
}

fn build_record(
    request: &CreateRequest<'_>,
    package: &InspectedPackage,
    sha256: String,
    version_number: CanonicalVersion,
) -> SubmissionRecord {
    let manifest = &package.manifest;
    SubmissionRecord {
        addon_id: manifest.name.clone(),
        display_name: manifest.summary.clone(),
        url: request.url.to_owned(),
        description: manifest.description.clone().unwrap_or_default(),
        sha256,
        version_name: manifest.version.clone(),
        version_number,
        min_nvda_version: manifest.minimum_nvda_version,
        last_tested_version: manifest.last_tested_nvda_version,
        channel: request.channel,
        publisher: request.publisher.to_owned(),
        source_url: request.source_url.to_owned(),
        license: request.license.to_owned(),
        license_url: request.license_url.map(str::to_owned),
        homepage: manifest.url.clone(),
        changelog: manifest.changelog.clone(),
        legacy: None,
        review_url: None,
        vt_scan_url: None,
        submission_time: unix_millis_now(),
        translations: lift_translations(package),
    }
}

fn lift_translations(package: &InspectedPackage) -> Vec<Translation> {
    package
        .translations
        .iter()
        .map(|(language, localized)| Translation {
            language: language.clone(),
            display_name: localized.summary.clone(),
            description: localized.description.clone(),
        })
        .collect()
}

/// Milliseconds since the Unix epoch, or `None` if the clock is unusable.
fn unix_millis_now() -> Option<u64> {
    let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
    u64::try_from(elapsed.as_millis()).ok()
}
