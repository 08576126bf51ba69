//! Error types for the validation gate CLI.
//!
//! These cover environmental failures only — situations where the gate
//! could not do its job at all. A submission that merely fails its
//! checks is not an error here: expected defects surface as diagnostics
//! in the [`ValidationReport`](crate::diagnostic::ValidationReport).

use crate::api_versions::ApiVersionsError;
use crate::package::PackageError;
use crate::schema::SchemaError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that prevent the gate from producing a verdict.
#[derive(Debug, Error)]
pub enum GateError {
    /// The schema document could not be loaded or compiled.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The API versions reference could not be used.
    #[error(transparent)]
    ApiVersions(#[from] ApiVersionsError),

    /// The metadata file itself could not be read.
    #[error("could not read metadata file {path}: {source}")]
    MetadataRead {
        /// Path to the unreadable metadata file.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A local package could not be opened or inspected.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// A local file could not be read.
    #[error("could not read {path}: {source}")]
    FileRead {
        /// Path to the unreadable file.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A packaged manifest version has no canonical numeric form.
    #[error("manifest version {version:?} is not a dotted numeric version")]
    VersionUnparsable {
        /// The free-text version that could not be parsed.
        version: String,
    },

    /// Generated metadata could not be serialized.
    #[error("could not serialize submission metadata: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Failed to write output.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        /// Path that could not be written.
        path: Utf8PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`GateError`].
pub type Result<T> = std::result::Result<T, GateError>;
