//! Known API versions reference.
//!
//! The store publishes the set of host API versions add-ons may target as
//! a JSON array of entries with an `apiVer` triple and an optional
//! `experimental` flag. The reference is loaded read-only per run and
//! answers range and stability queries for the cross-checks.

use crate::version::CanonicalVersion;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading the API versions reference.
#[derive(Debug, Error)]
pub enum ApiVersionsError {
    /// The reference file could not be read.
    #[error("could not read API versions file {path}: {source}")]
    Read {
        /// The file that failed to read.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The reference file was not the expected JSON shape.
    #[error("API versions file {path} is not a valid reference: {source}")]
    Json {
        /// The file that failed to parse.
        path: Utf8PathBuf,
        /// The underlying parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// The reference listed no versions at all.
    #[error("API versions reference lists no versions")]
    Empty,
}

/// One published API version.
///
/// Unknown keys in the reference file (descriptions, compatibility
/// spans) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ApiVersionEntry {
    /// The published version triple.
    #[serde(rename = "apiVer")]
    pub api_ver: CanonicalVersion,
    /// Whether the version is still experimental (pre-release).
    #[serde(default)]
    pub experimental: bool,
}

/// The sorted, non-empty set of known API versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersions {
    entries: Vec<ApiVersionEntry>,
}

impl ApiVersions {
    /// Load the reference from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ApiVersionsError`] when the file cannot be read, is not
    /// a JSON array of version entries, or lists no versions.
    pub fn load(path: &Utf8Path) -> Result<Self, ApiVersionsError> {
        let text = std::fs::read_to_string(path).map_err(|source| ApiVersionsError::Read {
            path: path.to_owned(),
            source,
        })?;
        let entries: Vec<ApiVersionEntry> =
            serde_json::from_str(&text).map_err(|source| ApiVersionsError::Json {
                path: path.to_owned(),
                source,
            })?;
        Self::from_entries(entries)
    }

    /// Build the reference from already-parsed entries.
    ///
    /// Entries are sorted by version; input order does not matter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiVersionsError::Empty`] when `entries` is empty.
    pub fn from_entries(mut entries: Vec<ApiVersionEntry>) -> Result<Self, ApiVersionsError> {
        if entries.is_empty() {
            return Err(ApiVersionsError::Empty);
        }
        entries.sort_by_key(|entry| entry.api_ver);
        Ok(Self { entries })
    }

    /// The oldest known API version.
    #[must_use]
    pub fn oldest(&self) -> CanonicalVersion {
        self.entries
            .first()
            .map_or(CanonicalVersion::ZERO, |entry| entry.api_ver)
    }

    /// The newest known API version.
    #[must_use]
    pub fn newest(&self) -> CanonicalVersion {
        self.entries
            .last()
            .map_or(CanonicalVersion::ZERO, |entry| entry.api_ver)
    }

    /// Whether `version` falls within `[oldest, newest]` inclusive.
    ///
    /// The query is a range check, not membership: a version between two
    /// published entries still counts as known.
    #[must_use]
    pub fn in_known_range(&self, version: CanonicalVersion) -> bool {
        (self.oldest()..=self.newest()).contains(&version)
    }

    /// The newest non-experimental API version, if any exists.
    #[must_use]
    pub fn stable_ceiling(&self) -> Option<CanonicalVersion> {
        self.entries
            .iter()
            .rev()
            .find(|entry| !entry.experimental)
            .map(|entry| entry.api_ver)
    }

    /// Whether `version` exactly matches an experimental entry.
    #[must_use]
    pub fn is_experimental(&self, version: CanonicalVersion) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.experimental && entry.api_ver == version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entry(major: u32, minor: u32, experimental: bool) -> ApiVersionEntry {
        ApiVersionEntry {
            api_ver: CanonicalVersion::new(major, minor, 0),
            experimental,
        }
    }

    fn reference() -> ApiVersions {
        ApiVersions::from_entries(vec![
            entry(2023, 1, true),
            entry(2019, 3, false),
            entry(2022, 1, false),
        ])
        .expect("non-empty reference")
    }

    #[test]
    fn entries_are_sorted_on_construction() {
        let api = reference();
        assert_eq!(api.oldest(), CanonicalVersion::new(2019, 3, 0));
        assert_eq!(api.newest(), CanonicalVersion::new(2023, 1, 0));
    }

    #[rstest]
    #[case::below_oldest(CanonicalVersion::new(2019, 2, 0), false)]
    #[case::oldest(CanonicalVersion::new(2019, 3, 0), true)]
    #[case::between_entries(CanonicalVersion::new(2021, 1, 0), true)]
    #[case::newest(CanonicalVersion::new(2023, 1, 0), true)]
    #[case::above_newest(CanonicalVersion::new(2023, 2, 0), false)]
    fn known_range_is_inclusive(#[case] version: CanonicalVersion, #[case] expected: bool) {
        assert_eq!(reference().in_known_range(version), expected);
    }

    #[test]
    fn stable_ceiling_skips_experimental_entries() {
        let api = reference();
        assert_eq!(api.stable_ceiling(), Some(CanonicalVersion::new(2022, 1, 0)));
    }

    #[test]
    fn stable_ceiling_is_absent_when_everything_is_experimental() {
        let api = ApiVersions::from_entries(vec![entry(2023, 1, true)]).expect("non-empty");
        assert_eq!(api.stable_ceiling(), None);
    }

    #[rstest]
    #[case::flagged_entry(CanonicalVersion::new(2023, 1, 0), true)]
    #[case::stable_entry(CanonicalVersion::new(2022, 1, 0), false)]
    #[case::unlisted(CanonicalVersion::new(2023, 1, 1), false)]
    fn experimental_requires_an_exact_match(
        #[case] version: CanonicalVersion,
        #[case] expected: bool,
    ) {
        assert_eq!(reference().is_experimental(version), expected);
    }

    #[test]
    fn an_empty_reference_is_rejected() {
        let result = ApiVersions::from_entries(Vec::new());
        assert!(matches!(result, Err(ApiVersionsError::Empty)));
    }

    #[test]
    fn loads_a_reference_file_with_extra_keys() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nvdaAPIVersions.json");
        std::fs::write(
            &path,
            concat!(
                "[",
                r#"{"description": "2023.1", "apiVer": {"major": 2023, "minor": 1, "patch": 0},"#,
                r#" "backCompatTo": {"major": 2022, "minor": 4, "patch": 0}},"#,
                r#"{"description": "2022.1", "apiVer": {"major": 2022, "minor": 1, "patch": 0},"#,
                r#" "backCompatTo": {"major": 2021, "minor": 1, "patch": 0}}"#,
                "]",
            ),
        )
        .expect("write reference");
        let utf8 = Utf8Path::from_path(&path).expect("utf8 path");
        let api = ApiVersions::load(utf8).expect("valid reference");
        assert_eq!(api.newest(), CanonicalVersion::new(2023, 1, 0));
        assert!(!api.is_experimental(CanonicalVersion::new(2023, 1, 0)));
    }

    #[test]
    fn an_empty_reference_file_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "[]").expect("write reference");
        let utf8 = Utf8Path::from_path(&path).expect("utf8 path");
        let result = ApiVersions::load(utf8);
        assert!(matches!(result, Err(ApiVersionsError::Empty)));
    }

    #[test]
    fn a_missing_reference_file_is_reported() {
        let result = ApiVersions::load(Utf8Path::new("/nonexistent/apiVersions.json"));
        assert!(matches!(result, Err(ApiVersionsError::Read { .. })));
    }

    #[test]
    fn a_malformed_reference_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{\"not\": \"an array\"}").expect("write reference");
        let utf8 = Utf8Path::from_path(&path).expect("utf8 path");
        let result = ApiVersions::load(utf8);
        assert!(matches!(result, Err(ApiVersionsError::Json { .. })));
    }
}
