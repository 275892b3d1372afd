//! Locating and reading a document together with its coverage records.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A document and its coverage records, read from disk.
#[derive(Debug, Clone)]
pub struct Loaded {
    /// Raw coverage record text.
    pub coverage: String,
    /// Where the coverage records were read from.
    pub coverage_path: PathBuf,
    /// Document text, lossily decoded as UTF-8.
    pub document: String,
    /// Document length in characters, the resolver's bound.
    pub document_length: u64,
}

/// Coverage file location: the document path with `suffix` appended to the
/// file name, e.g. `src/app.lisp` -> `src/app.lisp.cov`.
pub fn coverage_path(document: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(document.as_os_str());
    name.push(suffix);
    return PathBuf::from(name);
}

/// Number of characters in a document.
pub fn document_length(text: &str) -> u64 {
    return text.chars().count().try_into().unwrap_or(u64::MAX);
}

/// Read a document and its coverage records.
///
/// # Errors
///
/// Returns `Error::DocumentNotFound` if the document cannot be read, or
/// `Error::CoverageNotFound` if its coverage file cannot be read.
pub fn load(document: &Path, suffix: &str) -> Result<Loaded, Error> {
    let bytes = std::fs::read(document)
        .map_err(|_err| return Error::DocumentNotFound { path: document.to_path_buf() })?;
    let text = String::from_utf8_lossy(&bytes).into_owned();

    let length = document_length(&text);

    let coverage_path = coverage_path(document, suffix);
    let coverage = read_coverage(document, &coverage_path)?;

    return Ok(Loaded {
        coverage,
        coverage_path,
        document: text,
        document_length: length,
    });
}

/// Read the coverage file, lossily decoding it.
///
/// # Errors
///
/// Returns `Error::CoverageNotFound` on any read failure.
fn read_coverage(document: &Path, coverage_path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(coverage_path).map_err(|err| {
        log::debug!("cannot read {}: {err}", coverage_path.display());
        return Error::CoverageNotFound {
            coverage: coverage_path.to_path_buf(),
            document: document.to_path_buf(),
        };
    })?;
    return Ok(String::from_utf8_lossy(&bytes).into_owned());
}
