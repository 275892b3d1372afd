//! Directory-wide coverage summaries.
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::config::Config;
use crate::discovery;
use crate::error::Error;
use crate::resolver;
use crate::types::CoverageSummary;

/// Summary of one document that has a companion coverage file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Document length in characters.
    pub document_length: u64,
    /// Document path relative to the walked root.
    pub path: PathBuf,
    /// Per-state annotation counts.
    pub summary: CoverageSummary,
}

/// Walk `root` and summarize every document that has coverage records.
/// Applies the config's include/exclude filters to relative paths. Results
/// are sorted by path.
///
/// A document or coverage file that cannot be read is logged as a warning
/// and left out; the rest of the tree is still summarized.
///
/// # Errors
///
/// Returns any error other than an unreadable document or coverage file.
pub fn summarize(root: &Path, config: &Config) -> Result<Vec<FileReport>, Error> {
    let mut reports = Vec::new();

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
    {
        let path = entry.path();
        if path.to_string_lossy().ends_with(config.suffix.as_str()) {
            continue;
        }
        if !discovery::coverage_path(path, &config.suffix).exists() {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }

        let loaded = match discovery::load(path, &config.suffix) {
            Err(Error::CoverageNotFound { coverage, .. }) => {
                log::warn!("skipping {}, cannot read {}", relative.display(), coverage.display());
                continue;
            },
            Err(Error::DocumentNotFound { path }) => {
                log::warn!("skipping {}, cannot read it", path.display());
                continue;
            },
            Err(e) => return Err(e),
            Ok(l) => l,
        };
        let set = resolver::resolve_text(&loaded.coverage, loaded.document_length);
        reports.push(FileReport {
            document_length: loaded.document_length,
            path: relative,
            summary: set.summary(),
        });
    }

    reports.sort_by(|a, b| return a.path.cmp(&b.path));
    log::debug!("summarized {} documents under {}", reports.len(), root.display());
    return Ok(reports);
}
