//! Error type shared by the loaders of the workspace.
//!
//! Only construction and loading report errors. Per-word operations
//! (probability lookup, tagging, lemmatization) never fail; they fall back to
//! documented defaults instead.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A transition-matrix record had the right shape but an unusable count.
    #[error("invalid record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    /// A retagger or lemmatizer rule could not be parsed or compiled.
    #[error("invalid rule `{rule}`: {reason}")]
    InvalidRule { rule: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("could not serialize configuration: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("invalid lexicon data: {0}")]
    Lexicon(#[from] serde_json::Error),
}

impl Error {
    pub fn invalid_rule<R, S>(rule: R, reason: S) -> Self
    where
        R: Into<String>,
        S: Into<String>,
    {
        Self::InvalidRule {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_record<S>(line: usize, reason: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidRecord {
            line,
            reason: reason.into(),
        }
    }
}
