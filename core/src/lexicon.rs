//! Lexicon service and an in-memory implementation.
//!
//! The retagger asks a lexicon for the candidate tags of a spelling (most
//! frequent first) and the lemmatizer asks it for a known lemma of a
//! (spelling, tag) pair. How a production lexicon stores that data is not
//! this crate's concern; `MemoryLexicon` is a small serializable map that
//! is good enough for tests and for moderate word lists.
//!
//! Public API:
//! - `Lexicon` - the consumed service
//! - `LexiconEntry` - per-spelling tag counts and lemmata
//! - `MemoryLexicon` - `AHashMap`-backed lexicon with JSON and bincode I/O

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::tags::{PartOfSpeechTags, TagSet};

/// Word to tags and (word, tag) to lemma lookups.
pub trait Lexicon: Send + Sync {
    /// Candidate tags for a spelling, most frequent first. Empty if unknown.
    fn categories(&self, spelling: &str) -> Vec<String>;

    /// Known lemma for a spelling with a given tag.
    fn lemma(&self, spelling: &str, tag: &str) -> Option<String>;

    /// Number of distinct spellings.
    fn lexicon_size(&self) -> usize;

    fn part_of_speech_tags(&self) -> &dyn PartOfSpeechTags;

    fn most_common_tag(&self, spelling: &str) -> Option<String> {
        self.categories(spelling).into_iter().next()
    }
}

/// Tag counts and lemmata of one spelling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconEntry {
    /// (tag, count) in insertion order.
    pub categories: Vec<(String, u64)>,
    #[serde(default)]
    pub lemmata: AHashMap<String, String>,
}

impl LexiconEntry {
    fn sorted_tags(&self) -> Vec<String> {
        let mut cats: Vec<&(String, u64)> = self.categories.iter().collect();
        // stable: equal counts keep insertion order
        cats.sort_by(|a, b| b.1.cmp(&a.1));
        cats.into_iter().map(|(t, _)| t.clone()).collect()
    }
}

/// In-memory lexicon.
///
/// Lookups try the spelling as given, then its lowercase form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryLexicon {
    entries: AHashMap<String, LexiconEntry>,
    #[serde(default)]
    tags: TagSet,
}

impl MemoryLexicon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(tags: TagSet) -> Self {
        Self {
            entries: AHashMap::new(),
            tags,
        }
    }

    pub fn set_tags(&mut self, tags: TagSet) {
        self.tags = tags;
    }

    /// Add `count` occurrences of `spelling` with `tag`.
    pub fn insert<S: Into<String>, T: Into<String>>(&mut self, spelling: S, tag: T, count: u64) {
        let tag = tag.into();
        let entry = self.entries.entry(spelling.into()).or_default();
        if let Some(c) = entry.categories.iter_mut().find(|(t, _)| *t == tag) {
            c.1 = c.1.saturating_add(count);
        } else {
            entry.categories.push((tag, count));
        }
    }

    /// Record the lemma of `spelling` when tagged `tag`.
    pub fn set_lemma<S, T, L>(&mut self, spelling: S, tag: T, lemma: L)
    where
        S: Into<String>,
        T: Into<String>,
        L: Into<String>,
    {
        self.entries
            .entry(spelling.into())
            .or_default()
            .lemmata
            .insert(tag.into(), lemma.into());
    }

    pub fn entry(&self, spelling: &str) -> Option<&LexiconEntry> {
        self.entries
            .get(spelling)
            .or_else(|| self.entries.get(&spelling.to_lowercase()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a lexicon written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(bincode::deserialize_from(BufReader::new(file))?)
    }
}

impl Lexicon for MemoryLexicon {
    fn categories(&self, spelling: &str) -> Vec<String> {
        self.entry(spelling)
            .map(LexiconEntry::sorted_tags)
            .unwrap_or_default()
    }

    fn lemma(&self, spelling: &str, tag: &str) -> Option<String> {
        self.entry(spelling)
            .and_then(|e| e.lemmata.get(tag))
            .cloned()
    }

    fn lexicon_size(&self) -> usize {
        self.entries.len()
    }

    fn part_of_speech_tags(&self) -> &dyn PartOfSpeechTags {
        &self.tags
    }
}
