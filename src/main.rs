//! Submission gate CLI entrypoint.
//!
//! This binary validates add-on store submissions and provides the
//! companion utilities for preparing them: digest printing and
//! submission metadata generation.

use addon_gate::cli::{ChecksumArgs, Cli, Command, CreateArgs, ValidateArgs};
use addon_gate::create::{CreateRequest, create_submission};
use addon_gate::error::{GateError, Result};
use addon_gate::fetch::{FileFetcher, HttpFetcher, PackageFetcher};
use addon_gate::output::{diagnostic_lines, render_report, verdict_line};
use addon_gate::pipeline::{PipelineConfig, SchemaSource, ValidationPipeline};
use clap::Parser;
use std::io::Write;

/// Exit code for a submission that failed validation.
const EXIT_INVALID: i32 = 1;

/// Exit code for an environmental failure.
const EXIT_ERROR: i32 = 2;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<i32> {
    match &cli.command {
        Command::Validate(args) => run_validate(args, stdout, stderr),
        Command::Checksum(args) => run_checksum(args, stdout),
        Command::Create(args) => run_create(args, stdout),
    }
}

/// Runs the validation pipeline and reports its findings.
fn run_validate(
    args: &ValidateArgs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<i32> {
    if args.dry_run {
        print_dry_run_info(args, stderr);
        return Ok(0);
    }

    let config = pipeline_config_for(args);
    let fetcher: Box<dyn PackageFetcher> = match &args.package {
        Some(path) => Box::new(FileFetcher::new(path.clone())),
        None => Box::new(HttpFetcher::new(config.timeout, config.max_package_size)),
    };

    if !args.quiet {
        write_line(stderr, format!("Validating {}...", args.metadata));
    }

    let pipeline = ValidationPipeline::new(&config, fetcher.as_ref())?;
    let report = pipeline.run(&args.metadata, &args.api_versions)?;

    for line in diagnostic_lines(&report) {
        write_line(stdout, line);
    }
    write_line(stdout, verdict_line(&report));

    if let Some(output) = &args.output {
        if !report.diagnostics().is_empty() {
            append_report_file(output, &render_report(&args.metadata, &report))?;
            if !args.quiet {
                write_line(stderr, format!("Report appended to {output}"));
            }
        }
    }

    Ok(if report.is_valid() { 0 } else { EXIT_INVALID })
}

/// Prints the SHA-256 digest of a local file.
fn run_checksum(args: &ChecksumArgs, stdout: &mut dyn Write) -> Result<i32> {
    let digest = addon_gate::checksum::digest_file(args.file.as_std_path()).map_err(|source| {
        GateError::FileRead {
            path: args.file.clone(),
            source,
        }
    })?;
    write_line(stdout, digest);
    Ok(0)
}

/// Assembles submission metadata from a local package.
fn run_create(args: &CreateArgs, stdout: &mut dyn Write) -> Result<i32> {
    let request = CreateRequest {
        package: &args.package,
        dir: &args.dir,
        channel: args.channel,
        publisher: &args.publisher,
        source_url: &args.source_url,
        url: &args.url,
        license: &args.license,
        license_url: args.license_url.as_deref(),
    };
    let path = create_submission(&request)?;
    write_line(stdout, path);
    Ok(0)
}

/// Shows what a validate run would do without touching anything.
fn print_dry_run_info(args: &ValidateArgs, stderr: &mut dyn Write) {
    write_line(stderr, "Dry run - nothing will be validated");
    write_line(stderr, "");
    write_line(stderr, format!("Metadata: {}", args.metadata));
    write_line(stderr, format!("API versions: {}", args.api_versions));
    match &args.schema {
        Some(path) => write_line(stderr, format!("Schema: {path}")),
        None => write_line(stderr, "Schema: bundled"),
    }
    match &args.package {
        Some(path) => write_line(stderr, format!("Package: local file {path}")),
        None => write_line(stderr, "Package: downloaded from the declared URL"),
    }
}

fn pipeline_config_for(args: &ValidateArgs) -> PipelineConfig {
    PipelineConfig {
        schema: args
            .schema
            .clone()
            .map_or(SchemaSource::Bundled, SchemaSource::Path),
        ..PipelineConfig::default()
    }
}

fn append_report_file(path: &camino::Utf8Path, rendered: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| GateError::WriteFailed {
            path: path.to_owned(),
            source,
        })?;
    file.write_all(rendered.as_bytes())
        .map_err(|source| GateError::WriteFailed {
            path: path.to_owned(),
            source,
        })
}

fn exit_code_for_run_result(result: Result<i32>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(code) => code,
        Err(err) => {
            write_line(stderr, err);
            EXIT_ERROR
        }
    }
}

fn write_line(stream: &mut dyn Write, message: impl std::fmt::Display) {
    if writeln!(stream, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addon_gate::test_utils::{api_versions_json, sample_package_bytes, sample_submission};
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    struct Workspace {
        _dir: TempDir,
        metadata: Utf8PathBuf,
        api: Utf8PathBuf,
        package: Utf8PathBuf,
    }

    fn workspace() -> Workspace {
        let dir = tempfile::tempdir().expect("temp dir");
        let addon_dir = dir.path().join("clipContentsDesigner");
        std::fs::create_dir_all(&addon_dir).expect("create addon dir");
        let metadata = addon_dir.join("13.0.0.json");
        let text =
            serde_json::to_string_pretty(&sample_submission()).expect("metadata serializes");
        std::fs::write(&metadata, text).expect("write metadata");
        let api = dir.path().join("nvdaAPIVersions.json");
        std::fs::write(&api, api_versions_json()).expect("write api reference");
        let package = dir.path().join("sample.nvda-addon");
        std::fs::write(&package, sample_package_bytes()).expect("write package");
        Workspace {
            metadata: Utf8PathBuf::try_from(metadata).expect("UTF-8 path"),
            api: Utf8PathBuf::try_from(api).expect("UTF-8 path"),
            package: Utf8PathBuf::try_from(package).expect("UTF-8 path"),
            _dir: dir,
        }
    }

    fn validate_args(workspace: &Workspace) -> ValidateArgs {
        ValidateArgs {
            metadata: workspace.metadata.clone(),
            api_versions: workspace.api.clone(),
            dry_run: false,
            package: Some(workspace.package.clone()),
            schema: None,
            output: None,
            quiet: true,
        }
    }

    #[test]
    fn exit_code_for_run_result_passes_codes_through() {
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Ok(0), &mut stderr), 0);
        assert_eq!(exit_code_for_run_result(Ok(EXIT_INVALID), &mut stderr), 1);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_two() {
        let err = GateError::FileRead {
            path: Utf8PathBuf::from("missing.nvda-addon"),
            source: std::io::Error::other("no such file"),
        };
        let mut stderr = Vec::new();
        assert_eq!(exit_code_for_run_result(Err(err), &mut stderr), EXIT_ERROR);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("missing.nvda-addon"));
    }

    #[test]
    fn a_valid_offline_submission_exits_zero() {
        let workspace = workspace();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_validate(&validate_args(&workspace), &mut stdout, &mut stderr)
            .expect("run completes");
        assert_eq!(code, 0);
        let text = String::from_utf8(stdout).expect("stdout was not UTF-8");
        assert!(text.contains("Validation passed"), "unexpected: {text}");
    }

    #[test]
    fn an_invalid_submission_exits_one_and_lists_findings() {
        let workspace = workspace();
        let mut metadata = sample_submission();
        metadata["sha256"] = serde_json::json!("0".repeat(64));
        let text = serde_json::to_string_pretty(&metadata).expect("metadata serializes");
        std::fs::write(&workspace.metadata, text).expect("write metadata");

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_validate(&validate_args(&workspace), &mut stdout, &mut stderr)
            .expect("run completes");
        assert_eq!(code, EXIT_INVALID);
        let text = String::from_utf8(stdout).expect("stdout was not UTF-8");
        assert!(text.contains("error [ChecksumMismatch]"), "unexpected: {text}");
        assert!(text.contains("Validation failed"), "unexpected: {text}");
    }

    #[test]
    fn the_output_flag_appends_a_report() {
        let workspace = workspace();
        let mut metadata = sample_submission();
        metadata["sha256"] = serde_json::json!("0".repeat(64));
        let text = serde_json::to_string_pretty(&metadata).expect("metadata serializes");
        std::fs::write(&workspace.metadata, text).expect("write metadata");

        let output = workspace._dir.path().join("report.txt");
        let mut args = validate_args(&workspace);
        args.output = Some(Utf8PathBuf::try_from(output.clone()).expect("UTF-8 path"));

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        run_validate(&args, &mut stdout, &mut stderr).expect("run completes");
        let report = std::fs::read_to_string(&output).expect("report written");
        assert!(report.contains("ChecksumMismatch"), "unexpected: {report}");
    }

    #[test]
    fn dry_run_exits_zero_without_reading_inputs() {
        let args = ValidateArgs {
            metadata: Utf8PathBuf::from("/nonexistent/meta.json"),
            api_versions: Utf8PathBuf::from("/nonexistent/api.json"),
            dry_run: true,
            package: None,
            schema: None,
            output: None,
            quiet: false,
        };
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run_validate(&args, &mut stdout, &mut stderr).expect("dry run completes");
        assert_eq!(code, 0);
        let text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(text.contains("Dry run"));
        assert!(stdout.is_empty());
    }

    #[test]
    fn checksum_prints_the_digest() {
        let workspace = workspace();
        let args = ChecksumArgs {
            file: workspace.package.clone(),
        };
        let mut stdout = Vec::new();
        let code = run_checksum(&args, &mut stdout).expect("checksum completes");
        assert_eq!(code, 0);
        let text = String::from_utf8(stdout).expect("stdout was not UTF-8");
        let digest = addon_gate::test_utils::sha256_hex(&sample_package_bytes());
        assert_eq!(text.trim_end(), digest);
    }

    #[test]
    fn checksum_of_a_missing_file_is_environmental() {
        let args = ChecksumArgs {
            file: Utf8PathBuf::from("/nonexistent/pkg.nvda-addon"),
        };
        let mut stdout = Vec::new();
        let result = run_checksum(&args, &mut stdout);
        assert!(matches!(result, Err(GateError::FileRead { .. })));
    }
}
