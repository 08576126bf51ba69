//! CLI argument definitions for the submission gate.
//!
//! This module defines the command-line interface using clap. It is
//! separated from the main entrypoint to keep the binary small and
//! focused on orchestration.

use crate::submission::Channel;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};

/// Validate add-on store submissions.
#[derive(Parser, Debug)]
#[command(name = "addon-gate")]
#[command(version, about)]
#[command(long_about = concat!(
    "Validate add-on store submissions.\n\n",
    "A submission is a JSON metadata file describing one add-on release. The ",
    "gate checks it against the store schema, downloads the referenced package, ",
    "verifies the declared SHA-256 digest, and cross-checks the metadata against ",
    "the manifest embedded in the package.\n\n",
    "Every finding is reported; the run does not stop at the first defect. ",
    "Warnings are surfaced but only errors make a submission invalid.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Validate a submission against the published API versions:\n",
    "    $ addon-gate validate addons/clipContentsDesigner/13.0.0.json \\\n",
    "        nvdaAPIVersions.json\n\n",
    "  Validate offline against a local package file:\n",
    "    $ addon-gate validate addons/clipContentsDesigner/13.0.0.json \\\n",
    "        nvdaAPIVersions.json --package clipContentsDesigner-13.0.nvda-addon\n\n",
    "  Print the digest to declare in a submission:\n",
    "    $ addon-gate checksum clipContentsDesigner-13.0.nvda-addon\n\n",
    "  Assemble submission metadata from a packaged add-on:\n",
    "    $ addon-gate create --package clipContentsDesigner-13.0.nvda-addon \\\n",
    "        --dir addons --channel stable --publisher \"A. Developer\" \\\n",
    "        --source-url https://example.com/src --url https://example.com/pkg.nvda-addon \\\n",
    "        --license \"GPL v2\"",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate a submission metadata file.
    Validate(ValidateArgs),

    /// Print the SHA-256 hex digest of a local file.
    Checksum(ChecksumArgs),

    /// Assemble submission metadata from a packaged add-on.
    Create(CreateArgs),
}

/// Arguments for the validate command.
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Path to the submission metadata JSON file.
    #[arg(value_name = "METADATA")]
    pub metadata: Utf8PathBuf,

    /// Path to the published API versions reference.
    #[arg(value_name = "API_VERSIONS")]
    pub api_versions: Utf8PathBuf,

    /// Show what would be validated and exit without checking anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Use this local package file instead of downloading.
    #[arg(long, value_name = "FILE")]
    pub package: Option<Utf8PathBuf>,

    /// Validate against this schema document instead of the bundled one.
    #[arg(long, value_name = "FILE")]
    pub schema: Option<Utf8PathBuf>,

    /// Append a human-readable report of the findings to this file.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Suppress progress output (findings and the verdict still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the checksum command.
#[derive(Parser, Debug, Clone)]
pub struct ChecksumArgs {
    /// File to digest.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,
}

/// Arguments for the create command.
#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Path to the packaged add-on.
    #[arg(long, value_name = "FILE")]
    pub package: Utf8PathBuf,

    /// Root of the submission metadata tree to write into.
    #[arg(long, value_name = "DIR")]
    pub dir: Utf8PathBuf,

    /// Release channel for the submission (stable, beta, or dev).
    #[arg(long, value_name = "CHANNEL")]
    pub channel: Channel,

    /// Person or organisation publishing the release.
    #[arg(long, value_name = "NAME")]
    pub publisher: String,

    /// Location of the source code.
    #[arg(long, value_name = "URL")]
    pub source_url: String,

    /// Download location the store will publish.
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Licence name for the release.
    #[arg(long, value_name = "NAME")]
    pub license: String,

    /// Location of the full licence text.
    #[arg(long, value_name = "URL")]
    pub license_url: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
