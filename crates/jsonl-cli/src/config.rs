//! Configuration for the jsonl CLI.
//!
//! Settings come from an optional YAML file with `encode:` and `decode:`
//! sections, then command-line flags are layered on top:
//!
//! ```yaml
//! encode:
//!   ascii_only: true
//!   sort_keys: false
//! decode:
//!   blank_lines: skip
//! ```

use crate::error::{Error, Result};
use jsonl::{BlankLines, DecodeOptions, EncodeOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Encoder and decoder settings used by every command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// How records are written.
    pub encode: EncodeOptions,
    /// How records are read.
    pub decode: DecodeOptions,
}

/// Flag values that override the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// `--ascii`
    pub ascii_only: bool,
    /// `--sort-keys`
    pub sort_keys: bool,
    /// `--skip-blank`
    pub skip_blank: bool,
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] for malformed YAML or unknown keys.
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise, then apply `overrides`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    /// Set flags win; unset flags leave the file's value alone.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.ascii_only {
            self.encode.ascii_only = true;
        }
        if overrides.sort_keys {
            self.encode.sort_keys = true;
        }
        if overrides.skip_blank {
            self.decode.blank_lines = BlankLines::Skip;
        }
        self
    }
}
