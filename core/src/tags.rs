//! Part-of-speech tag-set semantics.
//!
//! The retagger and lemmatizer only ask a handful of questions about a tag:
//! is it a proper noun, a number, a compound (contraction) tag, and which
//! word class drives lemmatization. `PartOfSpeechTags` captures exactly
//! those questions so any tag set (NUPOS, Penn, ...) can be plugged in.
//!
//! `TagSet` is a small table-driven implementation used by tests and by
//! callers that do not bring their own tag set.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Default separator between the parts of a compound tag, e.g. `"vvb|pns12"`.
pub const DEFAULT_TAG_SEPARATOR: &str = "|";

/// Tag-set semantics consumed by the tagging and lemmatization engines.
pub trait PartOfSpeechTags: Send + Sync {
    fn is_proper_noun_tag(&self, tag: &str) -> bool;

    fn is_noun_tag(&self, tag: &str) -> bool;

    fn is_foreign_word_tag(&self, tag: &str) -> bool;

    fn is_number_tag(&self, tag: &str) -> bool;

    /// Major word class of a tag, e.g. `"noun"`. Empty when unknown.
    fn major_word_class(&self, tag: &str) -> String;

    /// Word class used to select lemmatization rules for a tag.
    ///
    /// `"none"` means words with this tag are never lemmatized. An empty
    /// string means no specific class is known.
    fn lemma_word_class(&self, tag: &str) -> String;

    /// Separator between parts of a compound tag.
    fn tag_separator(&self) -> &str {
        DEFAULT_TAG_SEPARATOR
    }

    /// True if the tag denotes a multi-token compound such as a contraction.
    fn is_compound_tag(&self, tag: &str) -> bool {
        let sep = self.tag_separator();
        !sep.is_empty() && tag != sep && tag.contains(sep)
    }

    /// Split a compound tag into its parts. A simple tag yields itself.
    fn split_tag(&self, tag: &str) -> Vec<String> {
        if self.is_compound_tag(tag) {
            tag.split(self.tag_separator())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        } else {
            vec![tag.to_string()]
        }
    }

    fn count_tags(&self, tag: &str) -> usize {
        self.split_tag(tag).len()
    }

    fn join_tags(&self, tags: &[String]) -> String {
        tags.join(self.tag_separator())
    }
}

/// One row of a `TagSet` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    pub tag: String,
    pub major_word_class: String,
    pub lemma_word_class: String,
    #[serde(default)]
    pub proper_noun: bool,
    #[serde(default)]
    pub noun: bool,
    #[serde(default)]
    pub number: bool,
    #[serde(default)]
    pub foreign_word: bool,
}

impl TagInfo {
    pub fn new<T, M, L>(tag: T, major_word_class: M, lemma_word_class: L) -> Self
    where
        T: Into<String>,
        M: Into<String>,
        L: Into<String>,
    {
        Self {
            tag: tag.into(),
            major_word_class: major_word_class.into(),
            lemma_word_class: lemma_word_class.into(),
            ..Self::default()
        }
    }

    pub fn proper_noun(mut self) -> Self {
        self.proper_noun = true;
        self.noun = true;
        self
    }

    pub fn noun(mut self) -> Self {
        self.noun = true;
        self
    }

    pub fn number(mut self) -> Self {
        self.number = true;
        self
    }

    pub fn foreign_word(mut self) -> Self {
        self.foreign_word = true;
        self
    }
}

/// Table-driven tag set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSet {
    tags: AHashMap<String, TagInfo>,
    separator: String,
}

impl TagSet {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_TAG_SEPARATOR)
    }

    pub fn with_separator<S: Into<String>>(separator: S) -> Self {
        Self {
            tags: AHashMap::new(),
            separator: separator.into(),
        }
    }

    /// Build a tag set from its rows. Later rows replace earlier ones.
    pub fn from_tags<I: IntoIterator<Item = TagInfo>>(rows: I) -> Self {
        let mut set = Self::new();
        for row in rows {
            set.insert(row);
        }
        set
    }

    pub fn insert(&mut self, info: TagInfo) {
        self.tags.insert(info.tag.clone(), info);
    }

    pub fn get(&self, tag: &str) -> Option<&TagInfo> {
        self.tags.get(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    fn flag(&self, tag: &str, f: impl Fn(&TagInfo) -> bool) -> bool {
        self.tags.get(tag).map(f).unwrap_or(false)
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartOfSpeechTags for TagSet {
    fn is_proper_noun_tag(&self, tag: &str) -> bool {
        self.flag(tag, |t| t.proper_noun)
    }

    fn is_noun_tag(&self, tag: &str) -> bool {
        self.flag(tag, |t| t.noun)
    }

    fn is_foreign_word_tag(&self, tag: &str) -> bool {
        self.flag(tag, |t| t.foreign_word)
    }

    fn is_number_tag(&self, tag: &str) -> bool {
        self.flag(tag, |t| t.number)
    }

    fn major_word_class(&self, tag: &str) -> String {
        self.tags
            .get(tag)
            .map(|t| t.major_word_class.clone())
            .unwrap_or_default()
    }

    fn lemma_word_class(&self, tag: &str) -> String {
        self.tags
            .get(tag)
            .map(|t| t.lemma_word_class.clone())
            .unwrap_or_default()
    }

    fn tag_separator(&self) -> &str {
        &self.separator
    }
}

/// A spelling paired with its part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedWord {
    pub spelling: String,
    pub tag: String,
}

impl TaggedWord {
    pub fn new<S: Into<String>, T: Into<String>>(spelling: S, tag: T) -> Self {
        Self {
            spelling: spelling.into(),
            tag: tag.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> TagSet {
        TagSet::from_tags([
            TagInfo::new("n1", "noun", "n").noun(),
            TagInfo::new("np1", "noun", "none").proper_noun(),
            TagInfo::new("crd", "numeral", "none").number(),
            TagInfo::new("fw-la", "foreign", "none").foreign_word(),
        ])
    }

    #[test]
    fn flags_come_from_table() {
        let t = tags();
        assert!(t.is_noun_tag("n1"));
        assert!(!t.is_proper_noun_tag("n1"));
        assert!(t.is_proper_noun_tag("np1"));
        assert!(t.is_noun_tag("np1"));
        assert!(t.is_number_tag("crd"));
        assert!(t.is_foreign_word_tag("fw-la"));
        assert!(!t.is_noun_tag("unknown"));
        assert_eq!(t.lemma_word_class("n1"), "n");
        assert_eq!(t.lemma_word_class("zzz"), "");
        assert_eq!(t.major_word_class("crd"), "numeral");
    }

    #[test]
    fn compound_tags_split_on_separator() {
        let t = tags();
        assert!(t.is_compound_tag("vvb|pns12"));
        assert!(!t.is_compound_tag("n1"));
        assert!(!t.is_compound_tag("|"));
        assert_eq!(t.split_tag("vvb|pns12"), vec!["vvb", "pns12"]);
        assert_eq!(t.split_tag("n1"), vec!["n1"]);
        assert_eq!(t.count_tags("a|b|c"), 3);
        assert_eq!(
            t.join_tags(&["vvb".to_string(), "pns12".to_string()]),
            "vvb|pns12"
        );
    }
}
