//! Submission metadata schema validation.
//!
//! Compiles the bundled draft-07 schema document once and reports
//! violations as structured data with instance paths, so each finding
//! can point at the offending field. Deployments may override the
//! bundled document with a schema file of their own.

use camino::{Utf8Path, Utf8PathBuf};
use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use thiserror::Error;

/// The schema document shipped with the binary.
const BUNDLED_SCHEMA: &str = include_str!("../schemas/submission.schema.json");

/// Name reported for the bundled schema in error messages.
const BUNDLED_SCHEMA_NAME: &str = "bundled submission schema";

/// Errors raised while loading or compiling a schema document.
///
/// These are environmental failures: a gate without a usable schema
/// cannot produce a verdict at all.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The schema file could not be read.
    #[error("cannot read schema {path}: {source}")]
    Read {
        /// Path to the unreadable schema file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The schema document is not valid JSON.
    #[error("schema {name} is not valid JSON: {source}")]
    Json {
        /// Schema name or path for context.
        name: String,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The schema document does not compile.
    #[error("schema {name} does not compile: {reason}")]
    Compile {
        /// Schema name or path for context.
        name: String,
        /// Why compilation failed.
        reason: String,
    },
}

/// A single schema violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// JSON pointer to the violating value in the instance.
    pub instance_path: String,
    /// JSON pointer into the schema that rejected the value.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

/// A compiled submission schema.
///
/// Construction compiles the document; validation afterwards is pure and
/// performs no I/O, so one validator can serve many submissions.
pub struct SchemaValidator {
    validator: Validator,
}

impl SchemaValidator {
    /// Compile the schema document shipped with the binary.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the bundled document fails to parse or
    /// compile, which indicates a packaging defect rather than bad input.
    pub fn bundled() -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(BUNDLED_SCHEMA).map_err(|source| SchemaError::Json {
                name: BUNDLED_SCHEMA_NAME.to_owned(),
                source,
            })?;
        compile(&schema, BUNDLED_SCHEMA_NAME)
    }

    /// Compile a schema document from a file, overriding the bundled one.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the file cannot be read, is not valid
    /// JSON, or does not compile as a schema.
    pub fn from_path(path: &Utf8Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path.to_owned(),
            source,
        })?;
        let schema: Value = serde_json::from_str(&text).map_err(|source| SchemaError::Json {
            name: path.to_string(),
            source,
        })?;
        compile(&schema, path.as_str())
    }

    /// Compile a schema document already held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if the document is not a valid
    /// schema.
    pub fn from_value(schema: &Value) -> Result<Self, SchemaError> {
        compile(schema, "inline schema")
    }

    /// Validate a parsed metadata document.
    ///
    /// Returns every violation rather than stopping at the first, so one
    /// run reports all schema findings at once. An empty result means
    /// the document conforms.
    #[must_use]
    pub fn validate(&self, instance: &Value) -> Vec<SchemaViolation> {
        self.validator
            .iter_errors(instance)
            .map(|e| SchemaViolation {
                instance_path: pointer_for(&e),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect()
    }
}

/// Pointer to the offending value. Missing-property violations point at
/// the absent property rather than the object that lacks it.
fn pointer_for(error: &jsonschema::ValidationError<'_>) -> String {
    let base = error.instance_path.to_string();
    if let ValidationErrorKind::Required { property } = &error.kind {
        if let Some(name) = property.as_str() {
            return format!("{base}/{name}");
        }
    }
    base
}

/// Build a compiled validator for a schema document.
fn compile(schema: &Value, name: &str) -> Result<SchemaValidator, SchemaError> {
    let mut options = jsonschema::options();
    options.with_draft(jsonschema::Draft::Draft7);
    let validator = options.build(schema).map_err(|e| SchemaError::Compile {
        name: name.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(SchemaValidator { validator })
}
