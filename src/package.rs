//! Add-on package inspection.
//!
//! An `.nvda-addon` package is a zip archive with a `manifest.ini` at its
//! root and optional `locale/<language>/manifest.ini` translations.
//! Inspection reads the descriptor and any parseable translations without
//! unpacking the archive to disk.

use crate::manifest::{self, LocalizedManifest, ManifestError, PackageManifest};
use camino::Utf8Path;
use std::io::{Cursor, Read, Seek};
use zip::ZipArchive;
use zip::result::ZipError;

/// Entry name of the package descriptor.
pub const MANIFEST_NAME: &str = "manifest.ini";

/// Errors arising from package inspection.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// The bytes are not a readable zip archive.
    #[error("package is not a readable archive: {0}")]
    Archive(#[from] ZipError),

    /// An archive entry could not be read.
    #[error("package entry could not be read: {0}")]
    Io(#[from] std::io::Error),

    /// The archive has no `manifest.ini` at its root.
    #[error("package does not contain manifest.ini")]
    ManifestMissing,

    /// The `manifest.ini` entry failed to parse.
    #[error("package manifest.ini is invalid: {0}")]
    Manifest(#[from] ManifestError),
}

/// The parsed contents of an add-on package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectedPackage {
    /// The root `manifest.ini` descriptor.
    pub manifest: PackageManifest,
    /// Parseable translations, sorted by language code.
    pub translations: Vec<(String, LocalizedManifest)>,
}

/// Inspect a package held in memory.
///
/// # Errors
///
/// Returns [`PackageError`] when the bytes are not a zip archive, the
/// descriptor is absent, or the descriptor fails to parse. Unparseable
/// translations are logged and skipped rather than failing inspection.
pub fn inspect_bytes(bytes: &[u8]) -> Result<InspectedPackage, PackageError> {
    inspect_archive(ZipArchive::new(Cursor::new(bytes))?)
}

/// Inspect a package on disk.
///
/// # Errors
///
/// Returns [`PackageError`] when the file cannot be opened or its
/// contents fail [`inspect_bytes`]' checks.
pub fn inspect_file(path: &Utf8Path) -> Result<InspectedPackage, PackageError> {
    let file = std::fs::File::open(path)?;
    inspect_archive(ZipArchive::new(file)?)
}

fn inspect_archive<R: Read + Seek>(
    mut archive: ZipArchive<R>,
) -> Result<InspectedPackage, PackageError> {
    let manifest_text =
        read_entry(&mut archive, MANIFEST_NAME)?.ok_or(PackageError::ManifestMissing)?;
    let manifest = manifest::parse_manifest(&manifest_text)?;
    let translations = collect_translations(&mut archive)?;
    Ok(InspectedPackage {
        manifest,
        translations,
    })
}

/// Read one entry as text, or `None` when the entry does not exist.
fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, PackageError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(error) => return Err(error.into()),
    };
    let mut text = String::new();
    entry.read_to_string(&mut text)?;
    Ok(Some(text))
}

/// Collect `locale/<language>/manifest.ini` translations.
///
/// Languages are visited in sorted order so output is deterministic.
/// A translation that fails to parse is skipped with a warning; a bad
/// localization should not block validation of the package itself.
fn collect_translations<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Vec<(String, LocalizedManifest)>, PackageError> {
    let mut languages: Vec<String> = archive
        .file_names()
        .filter_map(|name| localized_language(name).map(str::to_owned))
        .collect();
    languages.sort();

    let mut translations = Vec::new();
    for language in languages {
        let entry_name = format!("locale/{language}/{MANIFEST_NAME}");
        let Some(text) = read_entry(archive, &entry_name)? else {
            continue;
        };
        match manifest::parse_localized(&text) {
            Ok(localized) => translations.push((language, localized)),
            Err(error) => log::warn!("skipping {language} translation: {error}"),
        }
    }
    Ok(translations)
}

/// Extract the language code from a translation manifest entry name.
fn localized_language(name: &str) -> Option<&str> {
    let rest = name.strip_prefix("locale/")?;
    let (language, file) = rest.split_once('/')?;
    (file == MANIFEST_NAME && !language.is_empty()).then_some(language)
}
