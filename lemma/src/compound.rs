//! Lemma selection for a tagged word.
//!
//! `LemmaResolver` decides which lemma to report for a `(spelling, tag)`
//! pair: a lexicon entry wins, otherwise the lemmatizer runs with the tag's
//! lemma class. Contractions tagged with a compound tag such as `vm|xx` are
//! split into parts, each part is lemmatized with its own sub-tag, and the
//! results are joined with the lemma separator (`can't` -> `can|not`).

use std::sync::Arc;

use libadorn_core::{Lexicon, PartOfSpeechTags};
use tracing::trace;

use crate::classify;
use crate::config::LemmaConfig;
use crate::lemmatizer::Lemmatizer;

/// Splits a spelling into word parts, e.g. `"can't"` into `["ca", "n't"]`.
pub trait WordPartSplitter: Send + Sync {
    fn split_word(&self, spelling: &str) -> Vec<String>;
}

impl<F> WordPartSplitter for F
where
    F: Fn(&str) -> Vec<String> + Send + Sync,
{
    fn split_word(&self, spelling: &str) -> Vec<String> {
        self(spelling)
    }
}

pub struct LemmaResolver {
    lexicon: Arc<dyn Lexicon>,
    lemmatizer: Arc<dyn Lemmatizer>,
    splitter: Option<Arc<dyn WordPartSplitter>>,
    compound_word_class: String,
    no_lemma_word_class: String,
    use_lexicon_lemmata: bool,
}

impl LemmaResolver {
    pub fn new(lexicon: Arc<dyn Lexicon>, lemmatizer: Arc<dyn Lemmatizer>, config: &LemmaConfig) -> Self {
        Self {
            lexicon,
            lemmatizer,
            splitter: None,
            compound_word_class: config.compound_word_class.clone(),
            no_lemma_word_class: config.no_lemma_word_class.clone(),
            use_lexicon_lemmata: true,
        }
    }

    /// Without a splitter every spelling is a single word part.
    pub fn with_splitter(mut self, splitter: Arc<dyn WordPartSplitter>) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Skip lexicon lemma entries and always run the lemmatizer.
    pub fn ignore_lexicon_lemmata(mut self) -> Self {
        self.use_lexicon_lemmata = false;
        self
    }

    fn tags(&self) -> &dyn PartOfSpeechTags {
        self.lexicon.part_of_speech_tags()
    }

    /// Lemma to report for `spelling` tagged `tag`.
    ///
    /// Lemmata are lower-cased unless the tag is a proper noun tag or the
    /// lemma is compound.
    pub fn resolve(&self, spelling: &str, tag: &str) -> String {
        let lexicon_lemma = if self.use_lexicon_lemmata {
            self.lexicon.lemma(spelling, tag)
        } else {
            None
        };
        let lemma = match lexicon_lemma {
            Some(lemma) => lemma,
            None => self.lemmatize(spelling, tag),
        };

        if !self.lemmatizer.is_compound_lemma(&lemma) && !self.tags().is_proper_noun_tag(tag) {
            lemma.to_lowercase()
        } else {
            lemma
        }
    }

    /// Lemmatizer policy for `spelling` without the lexicon or case folding.
    pub fn lemmatize(&self, spelling: &str, tag: &str) -> String {
        let tags = self.tags();
        let lemma_class = tags.lemma_word_class(tag);

        if self.lemmatizer.cant_lemmatize(spelling) || lemma_class == self.no_lemma_word_class {
            if tags.is_number_tag(tag) {
                return classify::strip_roman_periods(spelling).to_string();
            }
            return spelling.to_string();
        }

        let compound_tag = tags.is_compound_tag(tag);
        if compound_tag {
            let lemma = self.lemmatizer.lemmatize_as(spelling, &self.compound_word_class);
            if self.lemmatizer.is_compound_lemma(&lemma) {
                return lemma;
            }
        }

        let parts = match &self.splitter {
            Some(splitter) => splitter.split_word(spelling),
            None => vec![spelling.to_string()],
        };

        if !compound_tag || parts.len() == 1 {
            return self.lemmatize_whole(spelling, &lemma_class);
        }

        let sub_tags = tags.split_tag(tag);
        if sub_tags.len() != parts.len() {
            trace!(spelling, tag, parts = parts.len(), "word parts do not align with tag");
            return self.lemmatize_whole(spelling, &lemma_class);
        }
        let lemmata: Vec<String> = parts
            .iter()
            .zip(&sub_tags)
            .map(|(part, sub_tag)| {
                self.lemmatizer
                    .lemmatize_as(part, &tags.lemma_word_class(sub_tag))
            })
            .collect();
        self.lemmatizer.join_lemmata(&lemmata)
    }

    /// Lemmatize `spelling` as one word. Without a lemma class the compound
    /// rules are tried first and class-less lemmatization runs if they leave
    /// the word alone.
    fn lemmatize_whole(&self, spelling: &str, lemma_class: &str) -> String {
        if !lemma_class.is_empty() {
            return self.lemmatizer.lemmatize_as(spelling, lemma_class);
        }
        let lemma = self.lemmatizer.lemmatize_as(spelling, &self.compound_word_class);
        // lemmatize_as lower-cases, so compare against the lower-cased spelling
        if lemma == spelling.to_lowercase() {
            return self.lemmatizer.lemmatize(spelling);
        }
        lemma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleBasedLemmatizer;
    use libadorn_core::{MemoryLexicon, TagInfo, TagSet};

    fn resolver() -> LemmaResolver {
        let tags = TagSet::from_tags([
            TagInfo::new("n2", "noun", "n"),
            TagInfo::new("np1", "noun", "none").proper_noun(),
            TagInfo::new("crd", "numeral", "none").number(),
            TagInfo::new("vm", "modal", "v"),
            TagInfo::new("xx", "negative", "x"),
            TagInfo::new("uh", "interjection", ""),
            TagInfo::new("vm|xx|uh", "modal", "v"),
        ]);
        let mut lexicon = MemoryLexicon::with_tags(tags);
        lexicon.set_lemma("Oxen", "n2", "OX");

        let mut lemmatizer = RuleBasedLemmatizer::default();
        lemmatizer.load_rules_str("n:\ns\nx:\nn't not\n").unwrap();
        lemmatizer
            .load_irregular_forms_str("v:\nca can\ncompound:\nwon't will|not\n")
            .unwrap();

        let splitter = |s: &str| -> Vec<String> {
            match s.to_lowercase().strip_suffix("n't") {
                Some(head) if !head.is_empty() => vec![head.to_string(), "n't".to_string()],
                _ => vec![s.to_string()],
            }
        };
        LemmaResolver::new(Arc::new(lexicon), Arc::new(lemmatizer), &LemmaConfig::default())
            .with_splitter(Arc::new(splitter))
    }

    #[test]
    fn lexicon_lemma_comes_first() {
        assert_eq!(resolver().resolve("Oxen", "n2"), "ox");
        assert_eq!(resolver().ignore_lexicon_lemmata().resolve("Oxen", "n2"), "oxen");
    }

    #[test]
    fn simple_and_proper_nouns() {
        let r = resolver();
        assert_eq!(r.resolve("Dogs", "n2"), "dog");
        assert_eq!(r.resolve("London", "np1"), "London");
        assert_eq!(r.resolve(".XIV.", "crd"), "xiv");
    }

    #[test]
    fn contractions() {
        let r = resolver();
        assert_eq!(r.resolve("won't", "vm|xx"), "will|not");
        assert_eq!(r.resolve("can't", "vm|xx"), "can|not");
    }

    #[test]
    fn misaligned_parts_lemmatize_the_whole_word() {
        let r = resolver();
        // two parts against three sub-tags
        assert_eq!(r.resolve("Can't", "vm|xx|uh"), "can't");
        // unknown compound tag without a lemma class falls back to every class
        assert_eq!(r.resolve("Dogs't", "n2|xx|uh"), "dogs't");
        assert!(!r.resolve("o'clock", "vm|xx|uh").is_empty());
    }

    #[test]
    fn empty_lemma_class_tries_compound_rules() {
        let r = resolver();
        assert_eq!(r.lemmatize("Hello", "uh"), "hello");
        assert_eq!(r.lemmatize("Dogs", "uh"), "dog");
        assert_eq!(r.lemmatize("won't", "uh"), "will|not");
    }
}
