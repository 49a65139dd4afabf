//! Lemmatizer configuration on top of the shared `Config`.
use std::path::Path;

use libadorn_core::{Config, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LemmaConfig {
    #[serde(flatten)]
    pub base: Config,

    /// Rule class tried first for compound spellings such as contractions.
    pub compound_word_class: String,

    /// Lemma class whose words are returned unchanged.
    pub no_lemma_word_class: String,
}

impl Default for LemmaConfig {
    fn default() -> Self {
        Self {
            base: Config::default(),
            compound_word_class: "compound".to_string(),
            no_lemma_word_class: "none".to_string(),
        }
    }
}

impl LemmaConfig {
    pub fn base(&self) -> &Config {
        &self.base
    }

    pub fn lemma_separator(&self) -> &str {
        &self.base.lemma_separator
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_keep_other_defaults() {
        let c = LemmaConfig::from_toml_str("no_lemma_word_class = \"skip\"\nlemma_separator = \"+\"\n")
            .unwrap();
        assert_eq!(c.no_lemma_word_class, "skip");
        assert_eq!(c.compound_word_class, "compound");
        assert_eq!(c.lemma_separator(), "+");
        let back = LemmaConfig::from_toml_str(&c.to_toml_string().unwrap()).unwrap();
        assert_eq!(back, c);
    }
}
