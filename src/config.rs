use std::path::Path;

use serde::Deserialize;

use crate::error::Error;

/// Name of the optional config file in the working directory.
pub const CONFIG_FILE: &str = ".covlay.toml";

/// Suffix appended to a document path to find its coverage records.
pub const DEFAULT_SUFFIX: &str = ".cov";

/// Which annotation wins when several cover the same character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Composition {
    /// The earliest annotation in record order is drawn.
    First,
    /// The latest annotation in record order is drawn.
    #[default]
    Last,
}

/// Project configuration loaded from `.covlay.toml`.
/// Include/exclude patterns are path prefixes applied by `summary`.
#[derive(Debug, Clone)]
pub struct Config {
    /// Overlap policy for terminal rendering.
    pub composition: Composition,
    /// Prefixes excluded from directory summaries.
    exclude: Vec<String>,
    /// Prefixes included in directory summaries; empty means everything.
    include: Vec<String>,
    /// Coverage file suffix.
    pub suffix: String,
}

/// Raw TOML structure for `.covlay.toml`.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CovlayTomlConfig {
    /// See `Config::composition`.
    #[serde(default)]
    composition: Composition,
    /// See `Config::exclude`.
    #[serde(default)]
    exclude: Vec<String>,
    /// See `Config::include`.
    #[serde(default)]
    include: Vec<String>,
    /// See `Config::suffix`.
    suffix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            composition: Composition::default(),
            exclude: Vec::new(),
            include: Vec::new(),
            suffix: DEFAULT_SUFFIX.to_string(),
        };
    }
}

impl Config {
    /// Load config from `.covlay.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist. A file that exists but is
    /// malformed is an error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let config = Self::parse(&content)?;
        log::debug!("loaded {} (suffix {:?})", path.display(), config.suffix);
        return Ok(config);
    }

    /// Parse config from TOML content.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: CovlayTomlConfig = toml::from_str(content)?;
        return Ok(Self {
            composition: raw.composition,
            exclude: raw.exclude,
            include: raw.include,
            suffix: raw.suffix.unwrap_or_else(|| DEFAULT_SUFFIX.to_string()),
        });
    }

    /// Check whether a relative path should be considered by `summary`.
    ///
    /// A path is included if no include patterns are set, or if it starts
    /// with at least one include pattern. An included path is then excluded
    /// if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        return !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()));
    }
}
