// hepple/src/tagger.rs
//
// Transformation-based retagger. Words enter a seven-slot window on the
// right; when a word reaches the centre, the first applicable rule indexed
// by its most frequent lexicon tag may change its tag; when it reaches the
// left edge it is emitted.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::Context;
use libadorn_core::{Lexicon, Result, TaggedWord};
use tracing::{info, trace};

use crate::config::HeppleConfig;
use crate::rule::Rule;
use crate::window::{Slot, Window, CENTER, FLUSH};

/// Output of one tagging pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedSentence {
    pub words: Vec<TaggedWord>,
    /// Number of rule applications during the pass.
    pub corrections: usize,
}

/// Rule-based retagger.
///
/// The rule set is read-only after loading. Each call to `tag_sentence` or
/// `retag_sentence` owns its window, so one tagger can serve many threads.
pub struct HeppleTagger {
    rules: AHashMap<String, Vec<Rule>>,
    rule_count: usize,
    lexicon: Arc<dyn Lexicon>,
    config: HeppleConfig,
    corrections: AtomicUsize,
}

impl std::fmt::Debug for HeppleTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeppleTagger")
            .field("rule_count", &self.rule_count)
            .field("config", &self.config)
            .field("corrections", &self.rule_corrections())
            .finish()
    }
}

impl std::fmt::Display for HeppleTagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hepple tagger")
    }
}

impl HeppleTagger {
    /// A tagger with no rules. It tags every word with its most frequent tag.
    pub fn new(lexicon: Arc<dyn Lexicon>, config: HeppleConfig) -> Self {
        Self {
            rules: AHashMap::new(),
            rule_count: 0,
            lexicon,
            config,
            corrections: AtomicUsize::new(0),
        }
    }

    /// Construct with rules parsed from `rules` (one per line).
    pub fn with_rules(lexicon: Arc<dyn Lexicon>, config: HeppleConfig, rules: &str) -> Result<Self> {
        let mut tagger = Self::new(lexicon, config);
        tagger.set_context_rules(rules.lines())?;
        Ok(tagger)
    }

    /// Load lexicon-independent resources from disk.
    pub fn from_rules_file<P: AsRef<Path>>(
        lexicon: Arc<dyn Lexicon>,
        config: HeppleConfig,
        rules_path: P,
    ) -> anyhow::Result<Self> {
        let path = rules_path.as_ref();
        let mut tagger = Self::new(lexicon, config);
        tagger
            .load_rules_file(path)
            .with_context(|| format!("loading context rules from {}", path.display()))?;
        Ok(tagger)
    }

    /// Replace the rule set. Blank lines are skipped; any other line that
    /// does not parse fails the whole call and leaves the old rules intact.
    pub fn set_context_rules<I, S>(&mut self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules: AHashMap<String, Vec<Rule>> = AHashMap::new();
        let mut count = 0;
        for line in lines {
            let line = line.as_ref();
            if line.trim().is_empty() {
                continue;
            }
            let rule = Rule::parse(line)?;
            rules.entry(rule.from.clone()).or_default().push(rule);
            count += 1;
        }
        info!(rules = count, from_tags = rules.len(), "loaded context rules");
        self.rules = rules;
        self.rule_count = count;
        Ok(())
    }

    pub fn load_rules<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;
        self.set_context_rules(lines)
    }

    pub fn load_rules_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let file = File::open(path)?;
        self.load_rules(BufReader::new(file))
    }

    /// Rules indexed by `from`, in file order.
    pub fn rules_for(&self, from: &str) -> &[Rule] {
        self.rules.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn config(&self) -> &HeppleConfig {
        &self.config
    }

    pub fn lexicon(&self) -> &Arc<dyn Lexicon> {
        &self.lexicon
    }

    /// Corrections made by all passes since the last clear.
    pub fn rule_corrections(&self) -> usize {
        self.corrections.load(Ordering::Relaxed)
    }

    pub fn clear_rule_corrections(&self) {
        self.corrections.store(0, Ordering::Relaxed);
    }

    /// Candidate tags of a spelling. Unknown words get the configured tag.
    fn candidates(&self, spelling: &str) -> Vec<String> {
        let tags = self.lexicon.categories(spelling);
        if tags.is_empty() {
            vec![self.config.unknown_word_tag.clone()]
        } else {
            tags
        }
    }

    /// Apply the first matching rule to the centre slot.
    fn apply_rules(&self, window: &mut Window) -> bool {
        let centre = window.slot(CENTER);
        if centre.is_sentinel() {
            return false;
        }
        let Some(rules) = self.rules.get(centre.first_candidate()) else {
            return false;
        };
        match rules.iter().find(|r| r.applies(window)) {
            Some(rule) => {
                trace!(word = window.word(CENTER), rule = %rule, "rule fired");
                window.set_tag(CENTER, &rule.to);
                true
            }
            None => false,
        }
    }

    /// Push one slot, run the rules and emit whatever leaves the window.
    fn step(&self, window: &mut Window, slot: Slot, out: &mut Vec<TaggedWord>) -> usize {
        window.push(slot);
        let fired = self.apply_rules(window);
        let leaving = window.slot(0);
        if !leaving.is_sentinel() {
            out.push(TaggedWord::new(leaving.word.clone(), leaving.tag.clone()));
        }
        usize::from(fired)
    }

    fn run<I>(&self, slots: I, len: usize) -> TaggedSentence
    where
        I: Iterator<Item = Slot>,
    {
        let mut window = Window::new();
        let mut words = Vec::with_capacity(len);
        let mut corrections = 0;
        for slot in slots.chain(std::iter::repeat_with(Slot::sentinel).take(FLUSH)) {
            corrections += self.step(&mut window, slot, &mut words);
        }
        self.corrections.fetch_add(corrections, Ordering::Relaxed);
        TaggedSentence { words, corrections }
    }

    /// Tag a sentence from scratch, starting from each word's most frequent tag.
    pub fn tag_sentence<S: AsRef<str>>(&self, sentence: &[S]) -> TaggedSentence {
        let slots = sentence.iter().map(|w| {
            let spelling = w.as_ref();
            let candidates = self.candidates(spelling);
            let tag = candidates[0].clone();
            Slot::new(spelling, tag, candidates)
        });
        let tagged = self.run(slots, sentence.len());
        trace!(words = sentence.len(), corrections = tagged.corrections, "tagged sentence");
        tagged
    }

    /// Correct externally assigned tags.
    ///
    /// Rules are still selected by each word's most frequent lexicon tag; the
    /// input tag is what they test and overwrite. Words missing from the
    /// lexicon take their input tag as their only candidate.
    pub fn retag_sentence(&self, sentence: &[TaggedWord]) -> TaggedSentence {
        let slots = sentence.iter().map(|w| {
            let mut candidates = self.lexicon.categories(&w.spelling);
            if candidates.is_empty() {
                candidates.push(w.tag.clone());
            }
            Slot::new(w.spelling.clone(), w.tag.clone(), candidates)
        });
        let tagged = self.run(slots, sentence.len());
        trace!(words = sentence.len(), corrections = tagged.corrections, "retagged sentence");
        tagged
    }

    /// Tag each sentence independently.
    pub fn tag_sentences<S: AsRef<str>>(&self, sentences: &[Vec<S>]) -> Vec<TaggedSentence> {
        sentences.iter().map(|s| self.tag_sentence(s)).collect()
    }
}
