//! Configuration system for quillq.
//!
//! This module provides the configuration structure for quillq with sensible
//! defaults and support for serialization/deserialization via serde.
//! Configuration is loaded from a TOML file and merged with command-line
//! arguments by the binary. The evaluation engine never reads it; writer
//! settings are handed to the printer explicitly.
//!
//! # Example
//!
//! ```
//! use quillq::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert!(config.document_separators);
//!
//! // Create custom configuration
//! let custom = Config {
//!     indent_size: 4,
//!     ..Config::default()
//! };
//! assert_eq!(custom.log_level, "warn");
//! ```

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the quillq application.
///
/// # Fields
///
/// * `indent_size` - Number of spaces per block indentation level (default: 2)
/// * `document_separators` - Print `---` between results (default: true)
/// * `unwrap_scalars` - Print top-level scalars without quotes (default: true)
/// * `log_level` - Log filter used when `RUST_LOG` is unset (default: "warn")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indentation level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Print `---` between results
    #[serde(default = "default_document_separators")]
    pub document_separators: bool,

    /// Print top-level scalars as bare values
    #[serde(default = "default_unwrap_scalars")]
    pub unwrap_scalars: bool,

    /// Log filter directive, e.g. "warn" or "quillq=debug"
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Returns the default indentation size.
fn default_indent_size() -> usize {
    2
}

fn default_document_separators() -> bool {
    true
}

fn default_unwrap_scalars() -> bool {
    true
}

/// Returns the default log filter.
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    /// Creates a new configuration with default values.
    ///
    /// # Default Values
    ///
    /// * `indent_size`: 2
    /// * `document_separators`: true
    /// * `unwrap_scalars`: true
    /// * `log_level`: "warn"
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            document_separators: default_document_separators(),
            unwrap_scalars: default_unwrap_scalars(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/quillq/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("quillq");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file or an undeterminable home directory gives the
    /// defaults. An unreadable or invalid file is an error, so the caller
    /// can report it once logging is set up.
    pub fn try_load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::try_load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`; a missing file gives the defaults.
    pub fn try_load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Loads configuration from `path`, falling back to defaults on any error.
    pub fn load_from(path: &Path) -> Self {
        Self::try_load_from(path).unwrap_or_default()
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Log filter for a run with `verbosity` `-v` flags.
    ///
    /// Any `-v` raises the configured level to at least `debug`; two or more
    /// raise it to `trace`.
    pub fn log_filter(&self, verbosity: u8) -> String {
        match verbosity {
            0 => self.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
