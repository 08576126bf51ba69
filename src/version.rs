//! Canonical version triples for submission and API version ordering.
//!
//! A [`CanonicalVersion`] is an immutable `major.minor.patch` triple with
//! a lexicographic total order. Two parsers cover the formats in play:
//! a strict dotted form for manifest and reference data, and a lenient
//! form for human-facing version names that merely happen to be numeric.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error raised when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed version {value:?}: {reason}")]
pub struct MalformedVersion {
    /// The rejected input.
    pub value: String,
    /// Why the input was rejected.
    pub reason: String,
}

/// An ordered `major.minor.patch` version triple.
///
/// The derived ordering compares major, then minor, then patch, which is
/// the canonical total order for API and add-on versions. Serde maps the
/// triple to and from `{"major": M, "minor": m, "patch": p}` objects with
/// all three fields required; negative components are rejected by the
/// unsigned representation.
///
/// # Examples
///
/// ```
/// use addon_gate::version::CanonicalVersion;
///
/// let older = CanonicalVersion::new(2023, 1, 0);
/// let newer = CanonicalVersion::new(2024, 1, 0);
/// assert!(older < newer);
/// assert_eq!(newer.to_string(), "2024.1.0");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CanonicalVersion {
    /// Major component.
    pub major: u32,
    /// Minor component.
    pub minor: u32,
    /// Patch component.
    pub patch: u32,
}

impl CanonicalVersion {
    /// The `0.0.0` sentinel used by manifests without version information.
    pub const ZERO: Self = Self {
        major: 0,
        minor: 0,
        patch: 0,
    };

    /// Build a version from its three components.
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse an API version string from a manifest field.
    ///
    /// Absent or empty values default to [`CanonicalVersion::ZERO`],
    /// matching manifests that never declared compatibility information.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedVersion`] when a present value is not two or
    /// three dot-separated unsigned integers.
    pub fn from_api_str(value: Option<&str>) -> Result<Self, MalformedVersion> {
        match value {
            None => Ok(Self::ZERO),
            Some(s) if s.trim().is_empty() => Ok(Self::ZERO),
            Some(s) => s.parse(),
        }
    }

    /// Parse a human version name that happens to be numeric.
    ///
    /// Accepts one to three dot-separated unsigned integers spanning the
    /// whole string (`"13"`, `"13.6"`, `"13.6.1"`); missing components
    /// default to zero. Version names are free text, so any other shape
    /// yields `None` rather than an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use addon_gate::version::CanonicalVersion;
    ///
    /// let parsed = CanonicalVersion::parse_lenient("13.6");
    /// assert_eq!(parsed, Some(CanonicalVersion::new(13, 6, 0)));
    /// assert_eq!(CanonicalVersion::parse_lenient("June release"), None);
    /// ```
    #[must_use]
    pub fn parse_lenient(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        let mut components = [0u32; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse().ok()?;
        }
        Some(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
        })
    }
}

impl std::str::FromStr for CanonicalVersion {
    type Err = MalformedVersion;

    /// Parse a strict dotted version string.
    ///
    /// Exactly two or three dot-separated unsigned integers are accepted
    /// (`"2024.1"`, `"2024.1.0"`); a missing patch component defaults to
    /// zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(MalformedVersion {
                value: s.to_owned(),
                reason: format!("expected 2 or 3 dot-separated parts, got {}", parts.len()),
            });
        }
        let mut components = [0u32; 3];
        for (slot, part) in components.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| MalformedVersion {
                value: s.to_owned(),
                reason: format!("{part:?} is not an unsigned integer"),
            })?;
        }
        Ok(Self {
            major: components[0],
            minor: components[1],
            patch: components[2],
        })
    }
}

impl fmt::Display for CanonicalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
