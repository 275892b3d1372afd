//! Overlay coverage records onto source documents.
//!
//! The core is two pure steps. [`parser::parse`] turns record text into
//! [`RawRecord`]s, and [`resolver::resolve`] bounds-checks them against a
//! document and tags each surviving range with a [`CoverageState`]. Everything
//! else in the crate (discovery, rendering, reports, watching) is glue around
//! those two functions.

pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod error;
pub mod overlay;
pub mod parser;
pub mod render;
pub mod report;
pub mod resolver;
pub mod types;
pub mod watch;

pub use error::Error;
pub use types::{Annotation, CoverageSet, CoverageState, CoverageSummary, RawRecord};
