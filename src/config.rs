//! Compiler configuration.
//!
//! Configuration is a small JSON document. Every field has a default, so an
//! empty object (`{}`) is a valid configuration.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default pattern marking symbols whose extension the runtime computes.
pub const DEFAULT_EXTERNAL_PATTERN: &str = "^@";

/// Default file extension of exchange record files.
pub const DEFAULT_DATA_EXTENSION: &str = "data";

/// Decides whether a symbol is external: its extension is computed by the
/// runtime and may never be declared in the initial state.
pub trait ExternalSymbols {
    /// True if the extension of `name` is computed by the runtime.
    fn is_external(&self, name: &str) -> bool;
}

impl<F> ExternalSymbols for F
where
    F: Fn(&str) -> bool,
{
    fn is_external(&self, name: &str) -> bool {
        self(name)
    }
}

/// Policy under which no symbol is external.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExternalSymbols;

impl ExternalSymbols for NoExternalSymbols {
    fn is_external(&self, _name: &str) -> bool {
        false
    }
}

/// Name-pattern policy: a symbol is external iff its name matches.
#[derive(Debug, Clone)]
pub struct ExternalPattern {
    regex: Regex,
}

impl ExternalPattern {
    /// Compiles `pattern`.
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl ExternalSymbols for ExternalPattern {
    fn is_external(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Compiler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Regex over symbol names selecting external symbols.
    pub external_pattern: String,
    /// File extension of exchange record files, without the dot.
    pub data_extension: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            external_pattern: DEFAULT_EXTERNAL_PATTERN.to_string(),
            data_extension: DEFAULT_DATA_EXTENSION.to_string(),
        }
    }
}

impl CompilerConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Checks that the pattern compiles and the data extension is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Regex::new(&self.external_pattern)?;

        let ext = self.data_extension.trim();
        if ext.is_empty() {
            return Err(ConfigError::Invalid(
                "data_extension must not be empty".to_string(),
            ));
        }
        if ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "data_extension '{ext}' must be a bare extension"
            )));
        }
        Ok(())
    }

    /// The external symbol policy described by this configuration.
    pub fn external_symbols(&self) -> Result<ExternalPattern, ConfigError> {
        ExternalPattern::new(&self.external_pattern)
    }
}
