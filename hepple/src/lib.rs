//! libhepple crate root
//!
//! Transformation-based part-of-speech retagger in the style of Hepple and
//! Brill. Context rules rewrite a word's tag based on the words and tags
//! around it in a seven-word window.
//!
//! Public API exported here:
//! - `HeppleTagger` and `TaggedSentence` from `tagger`
//! - `Rule` and `ContextTest` from `rule`
//! - `Window` and `Slot` from `window`
//! - `HeppleConfig` from `config`

pub mod config;
pub mod rule;
pub mod tagger;
pub mod window;

pub use config::HeppleConfig;
pub use rule::{ContextTest, Rule};
pub use tagger::{HeppleTagger, TaggedSentence};
pub use window::{Slot, Window, SENTINEL};

// Convenience re-exports for common types used by callers.
pub use libadorn_core::{Lexicon, MemoryLexicon, TaggedWord};
