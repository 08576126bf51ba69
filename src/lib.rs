//! Add-on store submission gate library.
//!
//! This crate provides the validation applied to add-on store submissions
//! before publication: schema conformance, canonical version ordering,
//! package download, SHA-256 verification, and cross-checking of the
//! submitted metadata against the manifest embedded in the package. It is
//! used by the `addon-gate` CLI binary and can be consumed
//! programmatically, for example to embed the gate in review tooling.
//!
//! # Modules
//!
//! - [`api_versions`] - Known host API versions reference
//! - [`checksum`] - SHA-256 digests and checksum verification
//! - [`cli`] - Command-line argument definitions
//! - [`create`] - Submission metadata generation from a package
//! - [`crosscheck`] - Record-level checks and manifest cross-checks
//! - [`diagnostic`] - Findings, severities, and validation reports
//! - [`error`] - Environmental error types
//! - [`fetch`] - Package download over HTTPS
//! - [`manifest`] - Package manifest parsing
//! - [`output`] - Report rendering for the CLI
//! - [`package`] - Add-on package inspection
//! - [`pipeline`] - Validation run orchestration
//! - [`schema`] - Submission schema validation
//! - [`submission`] - The typed submission metadata record
//! - [`version`] - Canonical version triples with total ordering

pub mod api_versions;
pub mod checksum;
pub mod cli;
pub mod create;
pub mod crosscheck;
pub mod diagnostic;
pub mod error;
pub mod fetch;
pub mod manifest;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod schema;
pub mod submission;
pub mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
