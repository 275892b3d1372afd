use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::CoverageNotFound { coverage, document } => format!("\
# Warning: No Coverage Records

`{}` has no coverage records; nothing was applied.

## Fix

Produce records at `{}`, or set `suffix` in `.covlay.toml`
if your instrumentation tool writes them elsewhere.
", document.display(), coverage.display()),

        Error::DocumentNotFound { path } => format!("\
# Error: Document Not Found

`{}` does not exist or cannot be read.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: JSON

{e}
"),

        Error::TomlDe(e) => format!("\
# Error: Invalid Config

`.covlay.toml` could not be parsed:

{e}
"),

        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),
    };
}
