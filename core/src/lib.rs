//! libadorn-core
//!
//! Tag-set and lexicon services, tag transition counts and contextual
//! smoothing shared by the retagger (`libhepple`) and the lemmatizer
//! (`liblemma`).
//!
//! Public API:
//! - `PartOfSpeechTags` / `TagSet` - tag-set semantics
//! - `Lexicon` / `MemoryLexicon` - spelling to tags and lemmata
//! - `TransitionMatrix` - n-gram tag counts and derived probabilities
//! - `ContextualSmoother` - additive and deleted-interpolation smoothing
//! - `Config` - shared configuration
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod error;
pub use error::{Error, Result};

pub mod tags;
pub use tags::{PartOfSpeechTags, TagInfo, TagSet, TaggedWord, DEFAULT_TAG_SEPARATOR};

pub mod lexicon;
pub use lexicon::{Lexicon, LexiconEntry, MemoryLexicon};

pub mod transition;
pub use transition::{TagId, TransitionMatrix, BIGRAM, TRIGRAM, UNIGRAM};

pub mod smoothing;
pub use smoothing::{
    AdditiveSmoother, ContextualSmoother, DeletedInterpolationSmoother, SmootherKind,
    DEFAULT_ADDITIVE_VALUE,
};

/// Default separator placed between the lemmata of a compound word.
pub const DEFAULT_LEMMA_SEPARATOR: &str = "|";

/// Configuration shared by the tagging and lemmatization crates.
///
/// Crate-specific options live in `HeppleConfig` and `LemmaConfig`, which
/// embed this struct.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Field separator of transition matrix files.
    pub delimiter: char,

    /// Contextual smoother built by `build_smoother`.
    pub smoother: SmootherKind,

    /// Additive constant for `SmootherKind::Additive`.
    pub additive_value: f64,

    /// Separator between the lemmata of a compound word.
    pub lemma_separator: String,

    /// Separator between the parts of a compound tag.
    pub tag_separator: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            smoother: SmootherKind::default(),
            additive_value: DEFAULT_ADDITIVE_VALUE,
            lemma_separator: DEFAULT_LEMMA_SEPARATOR.to_string(),
            tag_separator: DEFAULT_TAG_SEPARATOR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Build the configured smoother over `matrix`.
    ///
    /// `lexicon_size` is only used by the additive smoother.
    pub fn build_smoother(
        &self,
        matrix: Arc<TransitionMatrix>,
        lexicon_size: usize,
    ) -> Box<dyn ContextualSmoother> {
        debug!(kind = ?self.smoother, "building contextual smoother");
        match self.smoother {
            SmootherKind::Additive => Box::new(AdditiveSmoother::with_additive_value(
                matrix,
                lexicon_size,
                self.additive_value,
            )),
            SmootherKind::DeletedInterpolation => {
                Box::new(DeletedInterpolationSmoother::new(matrix))
            }
        }
    }

    /// Load a transition matrix file using the configured delimiter.
    pub fn load_transition_matrix<P: AsRef<Path>>(&self, path: P) -> Result<TransitionMatrix> {
        TransitionMatrix::load_file(path, self.delimiter)
    }
}
