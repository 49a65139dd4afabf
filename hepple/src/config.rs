//! Retagger configuration that extends the base `Config` from core.
//!
//! # Example
//!
//! ```rust
//! use libhepple::HeppleConfig;
//!
//! let config = HeppleConfig::default();
//! assert_eq!(config.unknown_word_tag, "nn");
//! ```
use std::path::Path;

use libadorn_core::{Config, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HeppleConfig {
    /// Base configuration fields (delimiter, smoother, separators)
    #[serde(flatten)]
    pub base: Config,

    /// Tag given to words the lexicon knows nothing about.
    pub unknown_word_tag: String,
}

impl Default for HeppleConfig {
    fn default() -> Self {
        Self {
            base: Config::default(),
            unknown_word_tag: "nn".to_string(),
        }
    }
}

impl HeppleConfig {
    pub fn into_base(self) -> Config {
        self.base
    }

    pub fn base(&self) -> &Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Config {
        &mut self.base
    }

    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
