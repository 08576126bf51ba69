//! SHA-256 digests for package content verification.
//!
//! Computed digests are wrapped in a validated [`Sha256Digest`] newtype
//! that is always lowercase hex. Declared checksums arrive from
//! submissions in mixed case, so comparison is case-insensitive.

use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Expected length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Buffer size for streaming file digests.
const DIGEST_BUFFER_LEN: usize = 8192;

/// Errors raised when constructing a [`Sha256Digest`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// The input was not exactly 64 characters long.
    #[error("expected {DIGEST_HEX_LEN} hex characters, got {actual}")]
    BadLength {
        /// Length of the rejected input.
        actual: usize,
    },

    /// The input contained a non-hexadecimal character.
    #[error("non-hex character {found:?} in digest")]
    NonHex {
        /// The offending character.
        found: char,
    },
}

/// A validated hex-encoded SHA-256 digest, normalized to lowercase.
///
/// # Examples
///
/// ```
/// use addon_gate::checksum::Sha256Digest;
///
/// let digest: Sha256Digest = "A".repeat(64).try_into().unwrap();
/// assert_eq!(digest.as_str(), "a".repeat(64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Return the digest as a lowercase hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Compare this digest against declared checksum text, ignoring case.
    #[must_use]
    pub fn matches(&self, declared: &str) -> bool {
        self.0.eq_ignore_ascii_case(declared)
    }
}

impl TryFrom<&str> for Sha256Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self, DigestError> {
        validate_hex(value)?;
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Sha256Digest {
    type Error = DigestError;

    fn try_from(mut value: String) -> Result<Self, DigestError> {
        validate_hex(&value)?;
        value.make_ascii_lowercase();
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate that `value` is 64 hexadecimal characters.
fn validate_hex(value: &str) -> Result<(), DigestError> {
    if value.len() != DIGEST_HEX_LEN {
        return Err(DigestError::BadLength {
            actual: value.len(),
        });
    }
    if let Some(found) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(DigestError::NonHex { found });
    }
    Ok(())
}

/// Compute the SHA-256 digest of an in-memory byte slice.
#[must_use]
pub fn digest_bytes(bytes: &[u8]) -> Sha256Digest {
    let hex = format!("{:x}", Sha256::digest(bytes));
    // sha2 always produces valid 64-char lowercase hex.
    Sha256Digest::try_from(hex).expect("sha2 produces valid 64-char lowercase hex")
}

/// Compute the SHA-256 digest of a file on disk.
///
/// Reads the file at `path` in chunks and returns the lowercase hex
/// digest as a validated [`Sha256Digest`].
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn digest_file(path: &Path) -> Result<Sha256Digest, std::io::Error> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; DIGEST_BUFFER_LEN];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    let hex = format!("{:x}", hasher.finalize());
    // sha2 always produces valid 64-char lowercase hex.
    Ok(Sha256Digest::try_from(hex).expect("sha2 produces valid 64-char lowercase hex"))
}

/// The outcome of comparing package bytes against a declared checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChecksumOutcome {
    /// The computed digest matches the declared checksum.
    Match,
    /// The computed digest differs from the declared checksum.
    Mismatch {
        /// The digest actually computed from the bytes.
        actual: Sha256Digest,
    },
}

/// Verify package bytes against a declared checksum string.
///
/// The declared value is compared case-insensitively; submissions
/// historically carry uppercase hex.
#[must_use]
pub fn verify(bytes: &[u8], declared: &str) -> ChecksumOutcome {
    let actual = digest_bytes(bytes);
    if actual.matches(declared) {
        ChecksumOutcome::Match
    } else {
        ChecksumOutcome::Mismatch { actual }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// SHA-256 of the ASCII bytes `abc`, a fixed test vector.
    const ABC_DIGEST: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn digest_bytes_matches_known_vector() {
        let digest = digest_bytes(b"abc");
        assert_eq!(digest.as_str(), ABC_DIGEST);
    }

    #[test]
    fn digest_file_matches_digest_bytes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("package.bin");
        std::fs::write(&path, b"abc").expect("write fixture");
        let digest = digest_file(&path).expect("readable file");
        assert_eq!(digest, digest_bytes(b"abc"));
    }

    #[test]
    fn digest_file_reports_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let result = digest_file(&dir.path().join("absent.bin"));
        assert!(result.is_err());
    }

    #[test]
    fn try_from_normalizes_uppercase() {
        let upper = ABC_DIGEST.to_ascii_uppercase();
        let digest = Sha256Digest::try_from(upper.as_str()).expect("valid hex");
        assert_eq!(digest.as_str(), ABC_DIGEST);
    }

    #[rstest]
    #[case::too_short("abcdef")]
    #[case::too_long(&"a".repeat(65))]
    #[case::non_hex(&format!("{}g", "a".repeat(63)))]
    fn try_from_rejects_malformed_text(#[case] input: &str) {
        let result = Sha256Digest::try_from(input);
        assert!(result.is_err());
    }

    #[test]
    fn verify_accepts_matching_checksum() {
        assert_eq!(verify(b"abc", ABC_DIGEST), ChecksumOutcome::Match);
    }

    #[test]
    fn verify_ignores_declared_case() {
        let upper = ABC_DIGEST.to_ascii_uppercase();
        assert_eq!(verify(b"abc", &upper), ChecksumOutcome::Match);
    }

    #[test]
    fn verify_reports_actual_digest_on_mismatch() {
        let declared = "0".repeat(64);
        match verify(b"abc", &declared) {
            ChecksumOutcome::Mismatch { actual } => assert_eq!(actual.as_str(), ABC_DIGEST),
            ChecksumOutcome::Match => panic!("expected mismatch"),
        }
    }

    #[test]
    fn verify_treats_malformed_declared_text_as_mismatch() {
        assert!(matches!(
            verify(b"abc", "not-a-digest"),
            ChecksumOutcome::Mismatch { .. }
        ));
    }

    #[test]
    fn display_shows_full_digest() {
        let digest = digest_bytes(b"abc");
        assert_eq!(format!("{digest}"), ABC_DIGEST);
    }
}
