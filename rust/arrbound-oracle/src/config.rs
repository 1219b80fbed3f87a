//! Harness configuration from `arrbound.toml`.
//!
//! ```toml
//! [limits]
//! max_length = 2147483591
//! max_bytes = 268435456
//!
//! [run]
//! workers = 4
//! widening = "checked"
//! widths = ["i32", "u64"]
//! elements = ["C", "T:struct<Sc>"]
//! ```
//!
//! Every key is optional. Empty `widths` or `elements` mean all of them.
//! Limits may only tighten the built-in caps: `max_length` is at most
//! 2147483591 and `max_bytes` at most 4 GiB.

use crate::case::OracleSettings;
use crate::reference::ReferenceWidening;
use arrbound_core::alloc::{AllocationLimits, MAX_ARRAY_LENGTH, MAX_BYTES_CEILING};
use arrbound_core::element::{ElementType, ParseElementError};
use arrbound_core::width::{LengthWidth, ParseWidthError};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "arrbound.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Width(#[from] ParseWidthError),
    #[error(transparent)]
    Element(#[from] ParseElementError),
    #[error("invalid limit: {0}")]
    Limit(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub limits: AllocationLimits,
    pub run: RunSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    /// Worker threads; 0 means one per CPU.
    pub workers: usize,
    pub widening: ReferenceWidening,
    pub widths: Vec<String>,
    pub elements: Vec<String>,
}

impl HarnessConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Search `start` and its ancestors for `arrbound.toml`.
    pub fn discover(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Names are checked eagerly so a bad file fails before any case runs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_bytes == 0 {
            return Err(ConfigError::Limit("max_bytes must be positive".to_string()));
        }
        if self.limits.max_bytes > MAX_BYTES_CEILING {
            return Err(ConfigError::Limit(format!(
                "max_bytes {} exceeds {}",
                self.limits.max_bytes, MAX_BYTES_CEILING
            )));
        }
        if self.limits.max_length > MAX_ARRAY_LENGTH {
            return Err(ConfigError::Limit(format!(
                "max_length {} exceeds {}",
                self.limits.max_length, MAX_ARRAY_LENGTH
            )));
        }
        self.widths()?;
        self.elements()?;
        Ok(())
    }

    pub fn widths(&self) -> Result<Vec<LengthWidth>, ConfigError> {
        if self.run.widths.is_empty() {
            return Ok(LengthWidth::ALL.to_vec());
        }
        let widths = self
            .run
            .widths
            .iter()
            .map(|w| w.parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(widths)
    }

    pub fn elements(&self) -> Result<Vec<ElementType>, ConfigError> {
        if self.run.elements.is_empty() {
            return Ok(ElementType::catalog());
        }
        let elements = self
            .run
            .elements
            .iter()
            .map(|e| e.parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(elements)
    }

    pub fn settings(&self) -> OracleSettings {
        OracleSettings {
            limits: self.limits,
            widening: self.run.widening,
        }
    }
}
