//! CLI commands for covlay: list, show, states, summary, watch.

use std::fmt::Write as _;
use std::path::Path;
use std::process::ExitCode;

use crate::config::Config;
use crate::diagnostics;
use crate::discovery;
use crate::error::Error;
use crate::overlay::{ApplyOutcome, Overlay};
use crate::render::{Markup, TerminalRenderer};
use crate::report::{self, FileReport};
use crate::resolver;
use crate::types::{ALL_STATES, CoverageSet};

/// Output format for `list` and `summary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// One line per item.
    Text,
}

/// Format a resolved set, one annotation per line.
fn format_annotations_text(set: &CoverageSet) -> String {
    let mut out = String::new();
    for annotation in set {
        let _ = writeln!(
            out,
            "{}..{}\t{}\t{}",
            annotation.range.start,
            annotation.range.end,
            annotation.state.style_token(),
            annotation.state.label(),
        );
    }
    return out;
}

/// Format directory reports, one document per line.
fn format_reports_text(reports: &[FileReport]) -> String {
    let mut out = String::new();
    for report in reports {
        let _ = write!(out, "{}\t{} annotations", report.path.display(), report.summary.total);
        for (state, count) in &report.summary.by_state {
            let _ = write!(out, ", {count} {}", state.label().to_lowercase());
        }
        out.push('\n');
    }
    return out;
}

/// Print the resolved annotation set for a document.
///
/// # Errors
///
/// Returns errors from config loading, reading the document, or JSON output.
pub fn list(file: &Path, format: Format) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let loaded = match discovery::load(file, &config.suffix) {
        Err(e @ Error::CoverageNotFound { .. }) => {
            diagnostics::print_error(&e);
            return Ok(ExitCode::SUCCESS);
        },
        Err(e) => return Err(e),
        Ok(l) => l,
    };

    let set = resolver::resolve_text(&loaded.coverage, loaded.document_length);
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&set)?),
        Format::Text => print!("{}", format_annotations_text(&set)),
    }
    return Ok(ExitCode::SUCCESS);
}

/// The "apply" action for a terminal: print the document with coverage
/// colors (or plain markers) over it.
///
/// # Errors
///
/// Returns errors from config loading, reading the document, or stdout.
pub fn show(file: &Path, plain: bool) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let markup = if plain { Markup::Plain } else { Markup::Ansi };
    let renderer = TerminalRenderer::new(std::io::stdout(), markup, config.composition);
    let mut overlay = Overlay::new(renderer, config);

    if let ApplyOutcome::Missing { coverage } = overlay.apply(file)? {
        diagnostics::print_error(&Error::CoverageNotFound {
            coverage,
            document: file.to_path_buf(),
        });
    }
    return Ok(ExitCode::SUCCESS);
}

/// Print the state table: code, style token, label.
pub fn states() {
    for state in ALL_STATES {
        println!("{:>2}\t{}\t{}", state.code(), state.style_token(), state.label());
    }
    return;
}

/// Summarize every document under `dir` that has coverage records.
///
/// # Errors
///
/// Returns errors from config loading, walking, or JSON output.
pub fn summary(dir: &Path, format: Format) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let reports = report::summarize(dir, &config)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        Format::Text if reports.is_empty() => {
            eprintln!("No documents with {} coverage records under {}", config.suffix, dir.display());
        },
        Format::Text => print!("{}", format_reports_text(&reports)),
    }
    return Ok(ExitCode::SUCCESS);
}

/// Re-apply on every change to the document or its coverage records.
///
/// # Errors
///
/// Returns errors from config loading, the initial apply, or watcher setup.
pub fn watch(file: &Path, plain: bool) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let markup = if plain { Markup::Plain } else { Markup::Ansi };
    let renderer = TerminalRenderer::new(std::io::stdout(), markup, config.composition);
    crate::watch::run(file, config, renderer)?;
    return Ok(ExitCode::SUCCESS);
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::types::{CoverageState, CoverageSummary};

    #[test]
    fn text_listing_has_one_line_per_annotation() {
        let set = resolver::resolve_text("BRANCH:T,10,5\nBRANCH:T,10,5\n", 100);
        assert_eq!(
            format_annotations_text(&set),
            "11..16\tcoverage-executed\tExecuted form\n11..16\tcoverage-executed\tExecuted form\n"
        );
    }

    #[test]
    fn text_report_lists_state_counts() {
        let mut summary = CoverageSummary { total: 3, ..CoverageSummary::default() };
        summary.by_state.insert(CoverageState::Executed, 2);
        summary.by_state.insert(CoverageState::NotExecuted, 1);
        let reports = vec![FileReport {
            document_length: 10,
            path: PathBuf::from("a.lisp"),
            summary,
        }];
        assert_eq!(
            format_reports_text(&reports),
            "a.lisp\t3 annotations, 2 executed form, 1 unexecuted form\n"
        );
    }
}
