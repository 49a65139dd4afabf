//! liblemma crate root
//!
//! Reduces inflected spellings to lemmata. Each word class has an ordered
//! list of suffix rewrite rules and a table of irregular forms; the first
//! rule that changes a word wins.
//!
//! Public API exported here:
//! - `Lemmatizer` and `RuleBasedLemmatizer` from `lemmatizer`
//! - `LemmatizerRule` from `rule`
//! - `Dictionary` from `dictionary`
//! - `LemmaResolver` and `WordPartSplitter` from `compound`
//! - `cant_lemmatize` from `classify`
//! - `LemmaConfig` from `config`

pub mod classify;
pub mod compound;
pub mod config;
pub mod dictionary;
pub mod lemmatizer;
pub mod rule;

pub use classify::cant_lemmatize;
pub use compound::{LemmaResolver, WordPartSplitter};
pub use config::LemmaConfig;
pub use dictionary::Dictionary;
pub use lemmatizer::{Lemmatizer, RuleBasedLemmatizer};
pub use rule::{Direction, LemmatizerRule};

pub use libadorn_core::{Lexicon, MemoryLexicon, TagInfo, TagSet};
