use std::io::BufRead;
use std::path::Path;

use ahash::AHashSet;
use libadorn_core::Result;
use tracing::debug;

/// Set of known lemmata used to gate `+` rules. Words are stored and looked
/// up in lower case.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: AHashSet<String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut d = Self::new();
        for w in words {
            d.insert(w.as_ref());
        }
        d
    }

    /// Read one word per line. Blank lines and `#` comments are skipped.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut d = Self::new();
        for line in reader.lines() {
            let line = line?;
            let word = line.trim();
            if word.is_empty() || word.starts_with('#') {
                continue;
            }
            d.insert(word);
        }
        debug!(words = d.len(), "loaded lemma dictionary");
        Ok(d)
    }

    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::load(std::io::BufReader::new(file))
    }

    pub fn insert(&mut self, word: &str) {
        self.words.insert(word.to_lowercase());
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case() {
        let d = Dictionary::load("# words\nBake\n\n  take  \n".as_bytes()).unwrap();
        assert_eq!(d.len(), 2);
        assert!(d.contains("bake"));
        assert!(d.contains("TAKE"));
        assert!(!d.contains("make"));
    }
}
