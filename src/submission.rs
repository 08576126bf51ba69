//! The typed submission metadata record.
//!
//! After schema validation the raw JSON is deserialized exactly once
//! into [`SubmissionRecord`]; every later stage consumes the typed
//! record, never the untyped document. Field names follow the wire
//! format, so serializing a record reproduces a conforming document.

use crate::version::CanonicalVersion;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Release channel a submission targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// General availability.
    Stable,
    /// Pre-release for wider testing.
    Beta,
    /// Development snapshots.
    Dev,
}

impl Channel {
    /// Return the channel in its wire form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Beta => "beta",
            Channel::Dev => "dev",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error raised when text does not name a release channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown channel {0:?}, expected stable, beta, or dev")]
pub struct UnknownChannel(pub String);

impl std::str::FromStr for Channel {
    type Err = UnknownChannel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stable" => Ok(Channel::Stable),
            "beta" => Ok(Channel::Beta),
            "dev" => Ok(Channel::Dev),
            other => Err(UnknownChannel(other.to_owned())),
        }
    }
}

/// A localized display name and description from the packaged manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Language code the translation applies to.
    pub language: String,
    /// Localized display name.
    #[serde(rename = "displayName")]
    pub display_name: String,
    /// Localized description.
    pub description: String,
}

/// One submitted add-on release, as reviewed by the gate.
///
/// The declared `sha256` stays a plain string here: its shape is the
/// schema's business and its truth is established only by hash
/// verification against the downloaded bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Stable identifier, matching the manifest name.
    #[serde(rename = "addonId")]
    pub addon_id: String,

    /// Name shown to users, matching the manifest summary.
    #[serde(rename = "displayName")]
    pub display_name: String,

    /// Download location of the packaged add-on.
    #[serde(rename = "URL")]
    pub url: String,

    /// Long-form description, matching the manifest description.
    pub description: String,

    /// Declared hex-encoded SHA-256 digest of the package.
    pub sha256: String,

    /// Human-facing version string, matching the manifest version.
    #[serde(rename = "addonVersionName")]
    pub version_name: String,

    /// Canonical ordered form of the release version.
    #[serde(rename = "addonVersionNumber")]
    pub version_number: CanonicalVersion,

    /// Oldest API version the release supports.
    #[serde(rename = "minNVDAVersion")]
    pub min_nvda_version: CanonicalVersion,

    /// Newest API version the release was tested against.
    #[serde(rename = "lastTestedVersion")]
    pub last_tested_version: CanonicalVersion,

    /// Release channel the submission targets.
    pub channel: Channel,

    /// Person or organisation publishing the release.
    pub publisher: String,

    /// Location of the source code.
    #[serde(rename = "sourceURL")]
    pub source_url: String,

    /// Licence name for the release.
    pub license: String,

    /// Location of the full licence text.
    #[serde(rename = "licenseURL", skip_serializing_if = "Option::is_none", default)]
    pub license_url: Option<String>,

    /// Project homepage, matching the manifest url.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub homepage: Option<String>,

    /// Release notes, matching the manifest changelog.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub changelog: Option<String>,

    /// Marks a pre-gate submission kept for older clients.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub legacy: Option<bool>,

    /// Discussion thread for the review; recorded, not checked.
    #[serde(rename = "reviewUrl", skip_serializing_if = "Option::is_none", default)]
    pub review_url: Option<String>,

    /// Malware scan results for the package; recorded, not checked.
    #[serde(rename = "vtScanUrl", skip_serializing_if = "Option::is_none", default)]
    pub vt_scan_url: Option<String>,

    /// Submission timestamp in milliseconds since the Unix epoch.
    #[serde(
        rename = "submissionTime",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub submission_time: Option<u64>,

    /// Localized display names and descriptions.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub translations: Vec<Translation>,
}

impl SubmissionRecord {
    /// Deserialize a record from a parsed metadata document.
    ///
    /// # Errors
    ///
    /// Returns the underlying serde error when the document cannot be
    /// read as a record, for example when a version object carries a
    /// negative component or a required field is missing.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether this is a legacy submission checked for schema conformance only.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.legacy.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_submission;
    use rstest::rstest;

    #[test]
    fn parses_a_complete_submission() {
        let record = SubmissionRecord::from_value(sample_submission()).expect("valid record");
        assert_eq!(record.addon_id, "clipContentsDesigner");
        assert_eq!(record.channel, Channel::Stable);
        assert_eq!(record.version_number, CanonicalVersion::new(13, 0, 0));
        assert_eq!(record.min_nvda_version, CanonicalVersion::new(2022, 1, 0));
        assert!(!record.is_legacy());
        assert!(record.homepage.is_some());
    }

    #[test]
    fn rejects_a_missing_required_field() {
        let mut value = sample_submission();
        value
            .as_object_mut()
            .expect("submission is an object")
            .remove("publisher");
        assert!(SubmissionRecord::from_value(value).is_err());
    }

    #[test]
    fn rejects_an_unknown_channel() {
        let mut value = sample_submission();
        value["channel"] = serde_json::json!("nightly");
        assert!(SubmissionRecord::from_value(value).is_err());
    }

    #[test]
    fn rejects_negative_version_components() {
        let mut value = sample_submission();
        value["minNVDAVersion"] = serde_json::json!({"major": 2022, "minor": -1, "patch": 0});
        assert!(SubmissionRecord::from_value(value).is_err());
    }

    #[test]
    fn legacy_flag_defaults_to_absent() {
        let record = SubmissionRecord::from_value(sample_submission()).expect("valid record");
        assert_eq!(record.legacy, None);

        let mut value = sample_submission();
        value["legacy"] = serde_json::json!(true);
        let legacy = SubmissionRecord::from_value(value).expect("valid record");
        assert!(legacy.is_legacy());
    }

    #[test]
    fn serializing_omits_absent_optional_fields() {
        let mut record = SubmissionRecord::from_value(sample_submission()).expect("valid record");
        record.homepage = None;
        record.changelog = None;
        record.translations.clear();
        let value = serde_json::to_value(&record).expect("serializable");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("homepage"));
        assert!(!object.contains_key("changelog"));
        assert!(!object.contains_key("translations"));
        assert!(!object.contains_key("legacy"));
    }

    #[test]
    fn serialized_records_round_trip() {
        let record = SubmissionRecord::from_value(sample_submission()).expect("valid record");
        let value = serde_json::to_value(&record).expect("serializable");
        let reparsed = SubmissionRecord::from_value(value).expect("round trips");
        assert_eq!(record, reparsed);
    }

    #[rstest]
    #[case::stable("stable", Channel::Stable)]
    #[case::beta("beta", Channel::Beta)]
    #[case::dev("dev", Channel::Dev)]
    fn channel_parses_wire_names(#[case] text: &str, #[case] expected: Channel) {
        let parsed: Channel = text.parse().expect("known channel");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.as_str(), text);
    }

    #[test]
    fn channel_rejects_unknown_names() {
        let result: Result<Channel, _> = "nightly".parse();
        assert!(result.is_err());
    }

    #[test]
    fn translations_deserialize_with_wire_names() {
        let mut value = sample_submission();
        value["translations"] = serde_json::json!([
            {"language": "fr", "displayName": "Concepteur", "description": "Description"}
        ]);
        let record = SubmissionRecord::from_value(value).expect("valid record");
        assert_eq!(record.translations.len(), 1);
        assert_eq!(record.translations[0].language, "fr");
        assert_eq!(record.translations[0].display_name, "Concepteur");
    }
}
