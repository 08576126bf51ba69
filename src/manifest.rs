//! Package manifest parsing.
//!
//! An add-on package embeds a `manifest.ini` descriptor of `key = value`
//! lines with optional single, double, or triple quoting; triple-quoted
//! values may span lines. The parser accepts exactly that format, fills
//! the documented defaults, and validates the declared API version range
//! at parse time so downstream checks always see a coherent manifest.

use crate::version::{CanonicalVersion, MalformedVersion};
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while parsing a package manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// A line was not a comment, a blank, or a `key = value` pair.
    #[error("manifest line {line}: expected `key = value`, got {content:?}")]
    InvalidLine {
        /// One-based line number.
        line: usize,
        /// The offending line content.
        content: String,
    },

    /// The same key appeared twice.
    #[error("manifest line {line}: duplicate key {key:?}")]
    DuplicateKey {
        /// One-based line number of the second occurrence.
        line: usize,
        /// The repeated key.
        key: String,
    },

    /// A triple-quoted value was never closed.
    #[error("manifest value for {key:?} is missing its closing triple quote")]
    UnterminatedValue {
        /// The key whose value ran off the end of the file.
        key: String,
    },

    /// A required key was absent.
    #[error("manifest is missing required key {key:?}")]
    MissingKey {
        /// The absent key.
        key: &'static str,
    },

    /// A declared API version did not parse.
    #[error("manifest {key} is invalid: {source}")]
    InvalidVersion {
        /// The key carrying the bad value.
        key: &'static str,
        /// The underlying parse failure.
        #[source]
        source: MalformedVersion,
    },

    /// The declared minimum API version exceeds the last tested one.
    #[error("manifest minimum API version {minimum} exceeds last tested {last_tested}")]
    BackwardsRange {
        /// Declared minimum API version.
        minimum: CanonicalVersion,
        /// Declared last tested API version.
        last_tested: CanonicalVersion,
    },
}

/// The descriptor embedded in an add-on package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    /// Stable add-on identifier.
    pub name: String,
    /// Name shown to users.
    pub summary: String,
    /// Long-form description, when declared.
    pub description: Option<String>,
    /// Author contact line.
    pub author: String,
    /// Human-facing version string.
    pub version: String,
    /// Oldest supported API version; `0.0.0` when undeclared.
    pub minimum_nvda_version: CanonicalVersion,
    /// Newest tested API version; `0.0.0` when undeclared.
    pub last_tested_nvda_version: CanonicalVersion,
    /// Project homepage, when declared.
    pub url: Option<String>,
    /// Release notes, when declared.
    pub changelog: Option<String>,
}

/// The subset of a localized manifest used for store translations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedManifest {
    /// Localized display name.
    pub summary: String,
    /// Localized description.
    pub description: String,
}

/// Parse the main package manifest.
///
/// # Errors
///
/// Returns [`ManifestError`] when the text is not well-formed manifest
/// syntax, a required key (`name`, `summary`, `author`, `version`) is
/// missing, a declared API version does not parse, or the declared
/// range runs backwards.
///
/// # Examples
///
/// ```
/// use addon_gate::manifest::parse_manifest;
///
/// let manifest = parse_manifest(concat!(
///     "name = clipContentsDesigner\n",
///     "summary = \"Clip Contents Designer\"\n",
///     "author = \"A. Developer\"\n",
///     "version = 13.0\n",
///     "minimumNVDAVersion = 2022.1\n",
///     "lastTestedNVDAVersion = 2023.1\n",
/// )).expect("valid manifest");
/// assert_eq!(manifest.name, "clipContentsDesigner");
/// assert_eq!(manifest.summary, "Clip Contents Designer");
/// ```
pub fn parse_manifest(text: &str) -> Result<PackageManifest, ManifestError> {
    let mut fields = parse_fields(text)?;
    let minimum = api_version(&mut fields, "minimumNVDAVersion")?;
    let last_tested = api_version(&mut fields, "lastTestedNVDAVersion")?;
    if minimum > last_tested {
        return Err(ManifestError::BackwardsRange {
            minimum,
            last_tested,
        });
    }
    Ok(PackageManifest {
        name: take_required(&mut fields, "name")?,
        summary: take_required(&mut fields, "summary")?,
        description: take_optional(&mut fields, "description"),
        author: take_required(&mut fields, "author")?,
        version: take_required(&mut fields, "version")?,
        minimum_nvda_version: minimum,
        last_tested_nvda_version: last_tested,
        url: take_optional(&mut fields, "url"),
        changelog: take_optional(&mut fields, "changelog"),
    })
}

/// Parse a `locale/<lang>/manifest.ini` translation manifest.
///
/// # Errors
///
/// Returns [`ManifestError`] when the text is not well-formed manifest
/// syntax or either translated field is absent.
pub fn parse_localized(text: &str) -> Result<LocalizedManifest, ManifestError> {
    let mut fields = parse_fields(text)?;
    let summary =
        take_optional(&mut fields, "summary").ok_or(ManifestError::MissingKey { key: "summary" })?;
    let description = take_optional(&mut fields, "description")
        .ok_or(ManifestError::MissingKey { key: "description" })?;
    Ok(LocalizedManifest {
        summary,
        description,
    })
}

/// Collect `key = value` pairs, handling quoting and comments.
fn parse_fields(text: &str) -> Result<HashMap<String, String>, ManifestError> {
    let mut fields = HashMap::new();
    let mut lines = text.lines().enumerate();
    while let Some((index, line)) = lines.next() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((raw_key, raw_value)) = trimmed.split_once('=') else {
            return Err(ManifestError::InvalidLine {
                line: line_no,
                content: trimmed.to_owned(),
            });
        };
        let key = raw_key.trim();
        if key.is_empty() {
            return Err(ManifestError::InvalidLine {
                line: line_no,
                content: trimmed.to_owned(),
            });
        }
        if fields.contains_key(key) {
            return Err(ManifestError::DuplicateKey {
                line: line_no,
                key: key.to_owned(),
            });
        }
        let value = parse_value(raw_value.trim(), &mut lines, key)?;
        fields.insert(key.to_owned(), value);
    }
    Ok(fields)
}

/// Parse one value, consuming continuation lines for open triple quotes.
fn parse_value(
    raw: &str,
    lines: &mut std::iter::Enumerate<std::str::Lines<'_>>,
    key: &str,
) -> Result<String, ManifestError> {
    let Some(opened) = raw.strip_prefix("\"\"\"") else {
        return Ok(strip_quotes(raw).to_owned());
    };
    // A closing quote on the opening line needs at least `""""""`;
    // anything shorter leaves the value open.
    if opened.len() >= 3 {
        if let Some(inner) = opened.strip_suffix("\"\"\"") {
            return Ok(inner.to_owned());
        }
    }
    let mut parts = vec![opened.to_owned()];
    for (_, line) in lines.by_ref() {
        if let Some(stripped) = line.trim_end().strip_suffix("\"\"\"") {
            parts.push(stripped.to_owned());
            return Ok(parts.join("\n"));
        }
        parts.push(line.to_owned());
    }
    Err(ManifestError::UnterminatedValue {
        key: key.to_owned(),
    })
}

/// Strip one layer of matching single or double quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Remove a required key or report it missing.
fn take_required(
    fields: &mut HashMap<String, String>,
    key: &'static str,
) -> Result<String, ManifestError> {
    fields
        .remove(key)
        .ok_or(ManifestError::MissingKey { key })
}

/// Remove an optional key.
///
/// Manifests written by older tooling serialize absent optional values
/// as the literal string `None`; treat those, and empty values, as
/// absent.
fn take_optional(fields: &mut HashMap<String, String>, key: &str) -> Option<String> {
    fields
        .remove(key)
        .filter(|value| !value.is_empty() && value != "None")
}

/// Remove an optional API version key, defaulting to `0.0.0`.
fn api_version(
    fields: &mut HashMap<String, String>,
    key: &'static str,
) -> Result<CanonicalVersion, ManifestError> {
    let value = take_optional(fields, key);
    CanonicalVersion::from_api_str(value.as_deref())
        .map_err(|source| ManifestError::InvalidVersion { key, source })
}
