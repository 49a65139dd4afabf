// lemma/src/lemmatizer.rs
//
// Rule tables are keyed by word class. A rules file looks like
//
//     # comment
//     n:
//     sses ss
//     Cies Cy
//     v:
//     CCing C
//
// and an irregular-forms file uses the same `class:` headers followed by
// `form [lemma]` lines.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;

use ahash::AHashMap;
use anyhow::Context;
use libadorn_core::Result;
use tracing::{debug, info, trace};

use crate::classify;
use crate::config::LemmaConfig;
use crate::dictionary::Dictionary;
use crate::rule::LemmatizerRule;

/// Marker rules may place in a result to keep an ending from being rewritten.
const PROTECT_MARKER: char = '!';

/// Reduces spellings to lemmata.
///
/// The compound helpers work on lemmata joined with `lemma_separator`,
/// e.g. `do|not` for a split contraction.
pub trait Lemmatizer: Send + Sync {
    /// Lemma of `spelling` with no word class to guide rule selection.
    fn lemmatize(&self, spelling: &str) -> String;

    /// Lemma of `spelling` using the rules of `word_class`. Several classes
    /// may be given separated by commas.
    fn lemmatize_as(&self, spelling: &str, word_class: &str) -> String;

    fn cant_lemmatize(&self, spelling: &str) -> bool {
        classify::cant_lemmatize(spelling)
    }

    fn lemma_separator(&self) -> &str {
        libadorn_core::DEFAULT_LEMMA_SEPARATOR
    }

    fn join_lemmata(&self, lemmata: &[String]) -> String {
        lemmata.join(self.lemma_separator())
    }

    fn split_lemma(&self, lemma: &str) -> Vec<String> {
        lemma
            .split(self.lemma_separator())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn is_compound_lemma(&self, lemma: &str) -> bool {
        let sep = self.lemma_separator();
        lemma != sep && lemma.contains(sep)
    }

    /// Number of lemmata in `lemma`. The separator on its own is a lemma.
    fn count_lemmata(&self, lemma: &str) -> usize {
        let sep = self.lemma_separator();
        if lemma == sep || sep.is_empty() {
            1
        } else {
            1 + lemma.matches(sep).count()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleBasedLemmatizer {
    rules: BTreeMap<String, Vec<LemmatizerRule>>,
    irregular: BTreeMap<String, AHashMap<String, String>>,
    dictionary: Option<Dictionary>,
    config: LemmaConfig,
}

/// Yields `(class, line)` for every non-header line, tracking `class:` headers.
fn sectioned_lines<R: BufRead>(reader: R) -> Result<Vec<(String, String)>> {
    let mut class = String::new();
    let mut out = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let first = line.split_whitespace().next().unwrap_or(line);
        if let Some(name) = first.strip_suffix(':') {
            class = name.to_lowercase();
            continue;
        }
        out.push((class.clone(), line.to_string()));
    }
    Ok(out)
}

fn clean_up(lemma: &str) -> String {
    lemma.replace(PROTECT_MARKER, "")
}

impl RuleBasedLemmatizer {
    pub fn new(config: LemmaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Load rules and irregular forms from files.
    pub fn from_paths<P, Q>(config: LemmaConfig, rules: P, irregular_forms: Q) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (rules, irregular_forms) = (rules.as_ref(), irregular_forms.as_ref());
        let mut lemmatizer = Self::new(config);
        lemmatizer
            .load_rules_file(rules)
            .with_context(|| format!("loading lemmatizer rules from {}", rules.display()))?;
        lemmatizer
            .load_irregular_forms_file(irregular_forms)
            .with_context(|| format!("loading irregular forms from {}", irregular_forms.display()))?;
        Ok(lemmatizer)
    }

    /// Append the rules read from `reader`. Returns the number of rules read.
    pub fn load_rules<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let lines = sectioned_lines(reader)?;
        let count = lines.len();
        for (class, line) in lines {
            let rule = LemmatizerRule::parse(&line)?;
            self.rules.entry(class).or_default().push(rule);
        }
        info!(rules = count, classes = self.rules.len(), "loaded lemmatizer rules");
        Ok(count)
    }

    pub fn load_rules_str(&mut self, rules: &str) -> Result<usize> {
        self.load_rules(rules.as_bytes())
    }

    pub fn load_rules_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = std::fs::File::open(path)?;
        self.load_rules(std::io::BufReader::new(file))
    }

    /// Add irregular forms read from `reader`. A form without a lemma is its
    /// own lemma.
    pub fn load_irregular_forms<R: BufRead>(&mut self, reader: R) -> Result<usize> {
        let lines = sectioned_lines(reader)?;
        let count = lines.len();
        for (class, line) in lines {
            let mut tokens = line.split_whitespace();
            let Some(form) = tokens.next() else {
                continue;
            };
            let lemma = tokens.next().unwrap_or(form);
            self.irregular
                .entry(class)
                .or_default()
                .insert(form.to_string(), lemma.to_string());
        }
        info!(forms = count, classes = self.irregular.len(), "loaded irregular forms");
        Ok(count)
    }

    pub fn load_irregular_forms_str(&mut self, forms: &str) -> Result<usize> {
        self.load_irregular_forms(forms.as_bytes())
    }

    pub fn load_irregular_forms_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = std::fs::File::open(path)?;
        self.load_irregular_forms(std::io::BufReader::new(file))
    }

    pub fn set_dictionary(&mut self, dictionary: Dictionary) {
        debug!(words = dictionary.len(), "lemmatizer dictionary set");
        self.dictionary = Some(dictionary);
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    pub fn config(&self) -> &LemmaConfig {
        &self.config
    }

    /// Word classes with rules, sorted.
    pub fn rule_word_classes(&self) -> BTreeSet<&str> {
        self.rules.keys().map(String::as_str).collect()
    }

    /// Word classes with irregular forms, sorted.
    pub fn irregular_word_classes(&self) -> BTreeSet<&str> {
        self.irregular.keys().map(String::as_str).collect()
    }

    pub fn rules_for(&self, word_class: &str) -> &[LemmatizerRule] {
        self.rules.get(word_class).map(Vec::as_slice).unwrap_or(&[])
    }

    fn irregular_form(&self, word_class: &str, spelling: &str) -> Option<&str> {
        self.irregular
            .get(word_class)
            .and_then(|forms| forms.get(spelling))
            .map(String::as_str)
    }

    /// First rule of `word_class` that changes `word`.
    fn apply_rules(&self, word_class: &str, word: &str) -> Option<String> {
        self.rules_for(word_class).iter().find_map(|rule| {
            let out = rule.apply(word, self.dictionary.as_ref());
            (out != word).then(|| {
                trace!(rule = %rule, word, lemma = %out, "lemmatizer rule fired");
                out
            })
        })
    }
}

impl Lemmatizer for RuleBasedLemmatizer {
    fn lemmatize(&self, spelling: &str) -> String {
        if self.cant_lemmatize(spelling) {
            return spelling.to_string();
        }
        let lower = spelling.to_lowercase();

        for class in self.irregular.keys() {
            let found = self
                .irregular_form(class, spelling)
                .or_else(|| self.irregular_form(class, &lower));
            if let Some(lemma) = found.filter(|l| *l != spelling) {
                return clean_up(lemma);
            }
        }

        for class in self.rules.keys() {
            if let Some(lemma) = self.apply_rules(class, &lower) {
                return clean_up(&lemma);
            }
        }
        clean_up(&lower)
    }

    fn lemmatize_as(&self, spelling: &str, word_class: &str) -> String {
        let class = word_class.trim().to_lowercase();
        if class.is_empty() {
            return self.lemmatize(spelling);
        }
        if self.cant_lemmatize(spelling) || class == self.config.no_lemma_word_class {
            return spelling.to_string();
        }
        let lower = spelling.to_lowercase();

        let lemma = match self
            .irregular_form(&class, spelling)
            .or_else(|| self.irregular_form(&class, &lower))
        {
            Some(lemma) => lemma.to_string(),
            None => class
                .split(',')
                .map(str::trim)
                .find_map(|c| self.apply_rules(c, &lower))
                .unwrap_or(lower),
        };

        let lemma = clean_up(&lemma);
        if lemma.is_empty() {
            spelling.to_string()
        } else {
            lemma
        }
    }

    fn lemma_separator(&self) -> &str {
        self.config.lemma_separator()
    }
}
