//! The host-facing "apply" and "clear" actions.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::discovery;
use crate::error::Error;
use crate::render::Renderer;
use crate::resolver;

/// Result of one apply action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The renderer now shows exactly this many annotations.
    Applied {
        /// Annotations that survived resolution.
        annotations: usize,
    },
    /// No coverage file was found; the renderer was not touched.
    Missing {
        /// Where the coverage file was expected.
        coverage: PathBuf,
    },
}

/// Binds a renderer to the discovery and resolution pipeline.
pub struct Overlay<R> {
    /// Suffix and composition settings.
    config: Config,
    /// The presentation surface.
    renderer: R,
}

impl<R: Renderer> Overlay<R> {
    /// Create an overlay drawing through `renderer`.
    pub fn new(renderer: R, config: Config) -> Self {
        return Self { config, renderer };
    }

    /// Read `document` and its coverage records, resolve them, and replace
    /// whatever the renderer currently shows.
    ///
    /// A missing coverage file is not an error: prior decorations stay as
    /// they are and `ApplyOutcome::Missing` is returned. The set is fully
    /// resolved before the renderer is touched, and the renderer's own
    /// `apply` does the replace, so a failed apply keeps the prior set.
    ///
    /// # Errors
    ///
    /// Returns `Error::DocumentNotFound` if the document cannot be read, or
    /// any error the renderer reports.
    pub fn apply(&mut self, document: &Path) -> Result<ApplyOutcome, Error> {
        let loaded = match discovery::load(document, &self.config.suffix) {
            Err(Error::CoverageNotFound { coverage, .. }) => {
                log::debug!("apply skipped, {} not found", coverage.display());
                return Ok(ApplyOutcome::Missing { coverage });
            },
            Err(e) => return Err(e),
            Ok(l) => l,
        };

        let set = resolver::resolve_text(&loaded.coverage, loaded.document_length);
        self.renderer.apply(&loaded.document, &set)?;

        log::debug!(
            "applied {} annotations from {}",
            set.len(),
            loaded.coverage_path.display()
        );
        return Ok(ApplyOutcome::Applied { annotations: set.len() });
    }

    /// Remove every decoration.
    ///
    /// # Errors
    ///
    /// Returns any error the renderer reports.
    pub fn clear(&mut self) -> Result<(), Error> {
        return self.renderer.clear();
    }

    /// Borrow the renderer.
    pub fn renderer(&self) -> &R {
        return &self.renderer;
    }
}
