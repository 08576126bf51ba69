//! Deterministic fixtures shared across the validation test suites.
//!
//! The fixtures model one coherent release: the submission record, the
//! packaged manifest, the package bytes, and the API versions reference
//! all agree with each other, so a test can mutate a single field and
//! expect exactly one disagreement.

use crate::api_versions::{ApiVersionEntry, ApiVersions};
use crate::checksum::digest_bytes;
use crate::submission::SubmissionRecord;
use serde_json::{Value, json};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// The manifest embedded in [`sample_package_bytes`].
///
/// Field values line up with [`sample_submission`] so the pair passes
/// every cross-check.
pub fn sample_manifest_ini() -> String {
    concat!(
        "# Release descriptor for the sample add-on.\n",
        "name = clipContentsDesigner\n",
        "summary = \"Clip Contents Designer\"\n",
        "description = \"\"\"Lets you build clipboard text.\"\"\"\n",
        "author = \"A. Developer <dev@example.com>\"\n",
        "version = 13.0\n",
        "url = https://example.com/clipContentsDesigner\n",
        "minimumNVDAVersion = 2022.1\n",
        "lastTestedNVDAVersion = 2023.1\n",
    )
    .to_owned()
}

/// Build an archive holding the given `(entry name, content)` pairs.
///
/// Entry timestamps are pinned so identical inputs always produce
/// byte-identical archives, keeping digest fixtures stable.
pub fn package_with_entries(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());
    for (name, content) in entries {
        writer.start_file(*name, options).expect("start archive entry");
        writer
            .write_all(content.as_bytes())
            .expect("write archive entry");
    }
    writer.finish().expect("finish archive").into_inner()
}

/// A well-formed add-on package containing [`sample_manifest_ini`].
pub fn sample_package_bytes() -> Vec<u8> {
    let manifest = sample_manifest_ini();
    package_with_entries(&[("manifest.ini", manifest.as_str())])
}

/// Hex-encode the SHA-256 digest of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    digest_bytes(bytes).into_inner()
}

/// A complete submission document that conforms to the bundled schema.
///
/// The declared checksum is computed from [`sample_package_bytes`], and
/// the declared versions sit inside [`sample_api_versions`].
pub fn sample_submission() -> Value {
    json!({
        "addonId": "clipContentsDesigner",
        "displayName": "Clip Contents Designer",
        "URL": "https://example.com/addons/clipContentsDesigner-13.0.nvda-addon",
        "description": "Lets you build clipboard text.",
        "sha256": sha256_hex(&sample_package_bytes()),
        "homepage": "https://example.com/clipContentsDesigner",
        "addonVersionName": "13.0",
        "addonVersionNumber": {"major": 13, "minor": 0, "patch": 0},
        "minNVDAVersion": {"major": 2022, "minor": 1, "patch": 0},
        "lastTestedVersion": {"major": 2023, "minor": 1, "patch": 0},
        "channel": "stable",
        "publisher": "A. Developer",
        "sourceURL": "https://example.com/clipContentsDesigner/source",
        "license": "GPL v2",
        "licenseURL": "https://www.gnu.org/licenses/old-licenses/gpl-2.0.html",
    })
}

/// The typed form of [`sample_submission`].
pub fn sample_record() -> SubmissionRecord {
    SubmissionRecord::from_value(sample_submission()).expect("sample submission deserializes")
}

/// The API versions reference as published, in wire form.
///
/// Lists three stable versions and one experimental one, deliberately
/// out of order to exercise sorting on load.
pub fn api_versions_json() -> &'static str {
    r#"[
    {"description": "2023.1", "apiVer": {"major": 2023, "minor": 1, "patch": 0}},
    {"description": "2019.3", "apiVer": {"major": 2019, "minor": 3, "patch": 0}},
    {"description": "2022.1", "apiVer": {"major": 2022, "minor": 1, "patch": 0}},
    {
        "description": "2023.2",
        "apiVer": {"major": 2023, "minor": 2, "patch": 0},
        "experimental": true
    }
]"#
}

/// The typed form of [`api_versions_json`].
pub fn sample_api_versions() -> ApiVersions {
    let entries: Vec<ApiVersionEntry> =
        serde_json::from_str(api_versions_json()).expect("reference fixture parses");
    ApiVersions::from_entries(entries).expect("reference fixture is non-empty")
}
