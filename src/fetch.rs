//! Package retrieval for submitted add-ons.
//!
//! Provides a trait-based abstraction for fetching the submitted
//! `.nvda-addon` package bytes, enabling dependency injection for
//! testing. The HTTP implementation enforces the store's transport
//! rules; the file implementation backs the offline `--package` mode.

use camino::Utf8PathBuf;
use std::io::Read;
use std::time::Duration;

/// Network timeout applied to the whole package download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Default cap on downloaded package size, in bytes.
pub const MAX_PACKAGE_SIZE: u64 = 100 * 1024 * 1024;

/// Trait for fetching the submitted package bytes.
///
/// Abstractions allow tests to exercise the pipeline without network
/// access.
///
/// # Examples
///
/// ```
/// use addon_gate::fetch::{FileFetcher, PackageFetcher};
///
/// let fetcher = FileFetcher::new("local/addon.nvda-addon");
/// // Use fetcher.fetch(declared_url) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait PackageFetcher {
    /// Fetch the package the submission points at.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] when the package cannot be retrieved
    /// in full.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from package retrieval.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The declared URL does not use `https`.
    #[error("refusing to fetch non-https URL {url}")]
    NotHttps {
        /// The refused URL.
        url: String,
    },

    /// The package was not found (HTTP 404).
    #[error("package not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("download failed for {url}: HTTP status {code}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code received.
        code: u16,
    },

    /// The request failed below the HTTP layer.
    #[error("download failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The body exceeded the configured size cap.
    #[error("package at {url} exceeds the {limit} byte limit")]
    TooLarge {
        /// The URL that was requested.
        url: String,
        /// The configured cap in bytes.
        limit: u64,
    },

    /// I/O error reading a local package.
    #[error("I/O error reading package: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-based fetcher using `ureq`.
pub struct HttpFetcher {
    agent: ureq::Agent,
    max_size: u64,
}

impl HttpFetcher {
    /// Build a fetcher with an explicit timeout and size cap.
    #[must_use]
    pub fn new(timeout: Duration, max_size: u64) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            max_size,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DOWNLOAD_TIMEOUT, MAX_PACKAGE_SIZE)
    }
}

impl PackageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        if !url.starts_with("https://") {
            return Err(DownloadError::NotHttps {
                url: url.to_owned(),
            });
        }
        log::debug!("fetching package from {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut body = response.into_body();
        read_capped(body.as_reader(), url, self.max_size)
    }
}

/// File-based fetcher for offline validation.
///
/// Reads a local package path and ignores the declared URL, which still
/// goes through every other check.
pub struct FileFetcher {
    path: Utf8PathBuf,
}

impl FileFetcher {
    /// Build a fetcher that reads `path` instead of downloading.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PackageFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        log::debug!("ignoring {url}; reading package from {path}", path = self.path);
        Ok(std::fs::read(&self.path)?)
    }
}

/// Read a body to completion, refusing bodies past `limit` bytes.
fn read_capped(reader: impl Read, url: &str, limit: u64) -> Result<Vec<u8>, DownloadError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| DownloadError::Transport {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
    if bytes.len() as u64 > limit {
        return Err(DownloadError::TooLarge {
            url: url.to_owned(),
            limit,
        });
    }
    Ok(bytes)
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        ureq::Error::StatusCode(code) => DownloadError::Status {
            url: url.to_owned(),
            code: *code,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn http_fetcher_refuses_plain_http_before_any_io() {
        let fetcher = HttpFetcher::default();
        let result = fetcher.fetch("http://example.com/addon.nvda-addon");
        assert!(matches!(result, Err(DownloadError::NotHttps { .. })));
    }

    #[test]
    fn map_ureq_error_maps_404_to_not_found() {
        let err = ureq::Error::StatusCode(404);
        let mapped = map_ureq_error("https://example.test/addon.nvda-addon", &err);
        assert!(matches!(mapped, DownloadError::NotFound { .. }));
    }

    #[test]
    fn map_ureq_error_maps_other_status_codes() {
        let err = ureq::Error::StatusCode(500);
        let mapped = map_ureq_error("https://example.test/addon.nvda-addon", &err);
        assert!(matches!(mapped, DownloadError::Status { code: 500, .. }));
    }

    #[test]
    fn read_capped_accepts_a_body_at_the_limit() {
        let body = vec![7_u8; 16];
        let bytes = read_capped(Cursor::new(body.clone()), "https://example.test/a", 16)
            .expect("body within limit");
        assert_eq!(bytes, body);
    }

    #[test]
    fn read_capped_rejects_a_body_past_the_limit() {
        let body = vec![7_u8; 17];
        let result = read_capped(Cursor::new(body), "https://example.test/a", 16);
        assert!(matches!(result, Err(DownloadError::TooLarge { limit: 16, .. })));
    }

    #[test]
    fn file_fetcher_reads_the_local_package() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("addon.nvda-addon");
        std::fs::write(&path, b"package bytes").expect("write package");
        let fetcher = FileFetcher::new(path.to_str().expect("utf8 path"));
        let bytes = fetcher
            .fetch("https://example.com/ignored.nvda-addon")
            .expect("readable package");
        assert_eq!(bytes, b"package bytes");
    }

    #[test]
    fn file_fetcher_reports_a_missing_package() {
        let fetcher = FileFetcher::new("/nonexistent/addon.nvda-addon");
        let result = fetcher.fetch("https://example.com/ignored.nvda-addon");
        assert!(matches!(result, Err(DownloadError::Io(_))));
    }
}
