/// Crate-level error types for covlay diagnostics.
use std::path::PathBuf;

/// Errors only come from acquiring resources. Malformed records and
/// out-of-bounds ranges are never errors; the core skips them.
#[allow(clippy::error_impl_error, reason = "crate error type, re-exported as covlay::Error")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The companion coverage record file does not exist or cannot be read.
    #[error("no coverage records for {}: {} not found", document.display(), coverage.display())]
    CoverageNotFound {
        /// Expected location of the coverage file.
        coverage: PathBuf,
        /// Document the coverage file belongs to.
        document: PathBuf,
    },

    /// The document to annotate does not exist or cannot be read.
    #[error("document not found: {}", path.display())]
    DocumentNotFound {
        /// Path to the missing document.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// TOML deserialization of `.covlay.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The filesystem watcher could not be created or attached.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
