// core/src/transition.rs
//
// Tag transition counts and the probabilities derived from them.
// Counts are keyed by interned tag ids; probabilities and deleted
// interpolation weights are computed lazily and dropped on any mutation.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::OnceLock;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Dense id of an interned tag.
pub type TagId = u32;

pub const UNIGRAM: usize = 0;
pub const BIGRAM: usize = 1;
pub const TRIGRAM: usize = 2;

/// Fixed bigram weights `[λ_uni, λ_bi]` applied after deleted interpolation.
pub const BIGRAM_WEIGHT_OVERRIDE: [f64; 2] = [0.03, 0.97];

/// Raw counts. This is the part that is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct NGramCounts {
    tags: Vec<String>,
    ids: AHashMap<String, TagId>,
    unigrams: AHashMap<TagId, u64>,
    bigrams: AHashMap<(TagId, TagId), u64>,
    trigrams: AHashMap<(TagId, TagId, TagId), u64>,
    total_ngrams: [u64; 3],
    unique_ngrams: [u64; 3],
    total_words: u64,
}

impl NGramCounts {
    fn intern(&mut self, tag: &str) -> TagId {
        if let Some(&id) = self.ids.get(tag) {
            return id;
        }
        let id = self.tags.len() as TagId;
        self.tags.push(tag.to_string());
        self.ids.insert(tag.to_string(), id);
        id
    }

    fn id(&self, tag: &str) -> Option<TagId> {
        self.ids.get(tag).copied()
    }

    fn name(&self, id: TagId) -> &str {
        self.tags.get(id as usize).map(String::as_str).unwrap_or("")
    }

    fn unigram(&self, t: TagId) -> u64 {
        self.unigrams.get(&t).copied().unwrap_or(0)
    }

    fn bigram(&self, t1: TagId, t2: TagId) -> u64 {
        self.bigrams.get(&(t1, t2)).copied().unwrap_or(0)
    }
}

/// Probabilities and interpolation weights computed from a fixed set of counts.
#[derive(Debug, Clone, Default)]
struct Derived {
    unigram: AHashMap<TagId, f64>,
    bigram: AHashMap<(TagId, TagId), f64>,
    trigram: AHashMap<(TagId, TagId, TagId), f64>,
    bigram_weights: [f64; 2],
    trigram_weights: [f64; 3],
}

/// `numerator / denominator`, or 0 when the denominator is 0.
fn safe_divide(numerator: u64, denominator: u64) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

/// `(numerator - 1) / (denominator - 1)`, or 0 when `denominator <= 1`.
fn safe_divide_deleted(numerator: u64, denominator: u64) -> f64 {
    if denominator > 1 {
        (numerator as f64 - 1.0) / (denominator as f64 - 1.0)
    } else {
        0.0
    }
}

impl Derived {
    fn compute(counts: &NGramCounts) -> Self {
        let n = counts.total_ngrams[UNIGRAM];

        let unigram = counts
            .unigrams
            .iter()
            .map(|(&t, &c)| (t, safe_divide(c, n)))
            .collect();
        let bigram = counts
            .bigrams
            .iter()
            .map(|(&(t1, t2), &c)| ((t1, t2), safe_divide(c, counts.unigram(t1))))
            .collect();
        let trigram = counts
            .trigrams
            .iter()
            .map(|(&(t1, t2, t3), &c)| ((t1, t2, t3), safe_divide(c, counts.bigram(t1, t2))))
            .collect();

        Self {
            unigram,
            bigram,
            trigram,
            bigram_weights: bigram_weights(counts),
            trigram_weights: trigram_weights(counts),
        }
    }
}

/// Deleted interpolation over bigrams.
///
/// Each observed bigram credits its count to whichever of the unigram or
/// bigram estimate (with that bigram removed) is larger. The normalised
/// result is then replaced by `BIGRAM_WEIGHT_OVERRIDE`, which downstream
/// tagging accuracy has been tuned against.
fn bigram_weights(counts: &NGramCounts) -> [f64; 2] {
    let n = counts.total_ngrams[UNIGRAM];
    let mut lambda_uni = 0.0;
    let mut lambda_bi = 0.0;

    for (&(t1, t2), &count) in &counts.bigrams {
        if count == 0 {
            continue;
        }
        let unigram_p = safe_divide_deleted(counts.unigram(t2), n);
        let bigram_p = safe_divide_deleted(count, counts.unigram(t1));
        if unigram_p > bigram_p {
            lambda_uni += count as f64;
        } else {
            lambda_bi += count as f64;
        }
    }

    let sum = lambda_uni + lambda_bi;
    if sum > 0.0 {
        lambda_uni /= sum;
        lambda_bi /= sum;
    }
    debug!(lambda_uni, lambda_bi, "estimated bigram weights before override");

    BIGRAM_WEIGHT_OVERRIDE
}

/// Deleted interpolation over trigrams, using plain maximum-likelihood
/// estimates. Ties go to the lower order.
fn trigram_weights(counts: &NGramCounts) -> [f64; 3] {
    let n = counts.total_ngrams[UNIGRAM];
    let mut lambdas = [0.0f64; 3];

    for (&(t1, t2, t3), &count) in &counts.trigrams {
        if count == 0 {
            continue;
        }
        let unigram_p = safe_divide(counts.unigram(t3), n);
        let bigram_p = safe_divide(counts.bigram(t2, t3), counts.unigram(t2));
        let trigram_p = safe_divide(count, counts.bigram(t1, t2));

        let max_p = unigram_p.max(bigram_p).max(trigram_p);
        let slot = if max_p == unigram_p {
            UNIGRAM
        } else if max_p == bigram_p {
            BIGRAM
        } else {
            TRIGRAM
        };
        lambdas[slot] += count as f64;
    }

    let sum: f64 = lambdas.iter().sum();
    if sum > 0.0 {
        for l in lambdas.iter_mut() {
            *l /= sum;
        }
    }
    lambdas
}

/// Unigram, bigram and trigram tag counts with lazily derived
/// maximum-likelihood probabilities and interpolation weights.
///
/// Readers take `&self` and may share one matrix across threads. Every
/// mutation takes `&mut self` and discards the derived values, which are
/// rebuilt on the next probability or weight lookup.
#[derive(Debug, Clone, Default)]
pub struct TransitionMatrix {
    counts: NGramCounts,
    derived: OnceLock<Derived>,
}

impl TransitionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn invalidate(&mut self) {
        self.derived = OnceLock::new();
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| Derived::compute(&self.counts))
    }

    /// Clear all counts and totals.
    pub fn reset(&mut self) {
        self.counts = NGramCounts::default();
        self.invalidate();
    }

    pub fn increment_unigram(&mut self, tag: &str, delta: u64) {
        let t = self.counts.intern(tag);
        let c = &mut self.counts;
        match c.unigrams.get_mut(&t) {
            Some(v) => *v += delta,
            None => {
                c.unigrams.insert(t, delta);
                c.unique_ngrams[UNIGRAM] += 1;
            }
        }
        c.total_ngrams[UNIGRAM] += delta;
        c.total_words += delta;
        self.invalidate();
    }

    pub fn increment_bigram(&mut self, tag1: &str, tag2: &str, delta: u64) {
        let key = (self.counts.intern(tag1), self.counts.intern(tag2));
        let c = &mut self.counts;
        match c.bigrams.get_mut(&key) {
            Some(v) => *v += delta,
            None => {
                c.bigrams.insert(key, delta);
                c.unique_ngrams[BIGRAM] += 1;
            }
        }
        c.total_ngrams[BIGRAM] += delta;
        self.invalidate();
    }

    pub fn increment_trigram(&mut self, tag1: &str, tag2: &str, tag3: &str, delta: u64) {
        let key = (
            self.counts.intern(tag1),
            self.counts.intern(tag2),
            self.counts.intern(tag3),
        );
        let c = &mut self.counts;
        match c.trigrams.get_mut(&key) {
            Some(v) => *v += delta,
            None => {
                c.trigrams.insert(key, delta);
                c.unique_ngrams[TRIGRAM] += 1;
            }
        }
        c.total_ngrams[TRIGRAM] += delta;
        self.invalidate();
    }

    pub fn unigram_count(&self, tag: &str) -> u64 {
        self.counts.id(tag).map(|t| self.counts.unigram(t)).unwrap_or(0)
    }

    pub fn bigram_count(&self, tag1: &str, tag2: &str) -> u64 {
        match (self.counts.id(tag1), self.counts.id(tag2)) {
            (Some(t1), Some(t2)) => self.counts.bigram(t1, t2),
            _ => 0,
        }
    }

    pub fn trigram_count(&self, tag1: &str, tag2: &str, tag3: &str) -> u64 {
        match (self.counts.id(tag1), self.counts.id(tag2), self.counts.id(tag3)) {
            (Some(t1), Some(t2), Some(t3)) => {
                self.counts.trigrams.get(&(t1, t2, t3)).copied().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// P(tag) = count(tag) / total unigram count.
    pub fn unigram_probability(&self, tag: &str) -> f64 {
        self.counts
            .id(tag)
            .and_then(|t| self.derived().unigram.get(&t).copied())
            .unwrap_or(0.0)
    }

    /// P(tag2 | tag1) = count(tag1, tag2) / count(tag1).
    pub fn bigram_probability(&self, tag1: &str, tag2: &str) -> f64 {
        match (self.counts.id(tag1), self.counts.id(tag2)) {
            (Some(t1), Some(t2)) => self.derived().bigram.get(&(t1, t2)).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// P(tag3 | tag1, tag2) = count(tag1, tag2, tag3) / count(tag1, tag2).
    pub fn trigram_probability(&self, tag1: &str, tag2: &str, tag3: &str) -> f64 {
        match (self.counts.id(tag1), self.counts.id(tag2), self.counts.id(tag3)) {
            (Some(t1), Some(t2), Some(t3)) => self
                .derived()
                .trigram
                .get(&(t1, t2, t3))
                .copied()
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Force computation of probabilities and weights if they are stale.
    pub fn calculate_probabilities(&self) {
        self.derived();
    }

    /// True while derived probabilities match the current counts.
    pub fn have_probabilities(&self) -> bool {
        self.derived.get().is_some()
    }

    /// `[λ_uni, λ_bi]`.
    pub fn bigram_weights(&self) -> [f64; 2] {
        self.derived().bigram_weights
    }

    /// `[λ_uni, λ_bi, λ_tri]`.
    pub fn trigram_weights(&self) -> [f64; 3] {
        self.derived().trigram_weights
    }

    /// Sum of all increments for n-grams of the given order (0, 1 or 2).
    pub fn total_ngrams(&self, order: usize) -> u64 {
        self.counts.total_ngrams.get(order).copied().unwrap_or(0)
    }

    /// Number of distinct n-grams of the given order (0, 1 or 2).
    pub fn unique_ngrams(&self, order: usize) -> u64 {
        self.counts.unique_ngrams.get(order).copied().unwrap_or(0)
    }

    pub fn total_word_count(&self) -> u64 {
        self.counts.total_words
    }

    /// Every tag seen in any n-gram, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.counts.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub fn tag_id(&self, tag: &str) -> Option<TagId> {
        self.counts.id(tag)
    }

    /// Size of the tag vocabulary.
    pub fn tag_count(&self) -> usize {
        self.counts.tags.len()
    }

    /// Replace the contents of the matrix with delimited count records.
    ///
    /// Lines with 2, 3 or 4 fields are unigram, bigram and trigram records
    /// whose last field is the count. Other lines are skipped. A record whose
    /// count is not a non-negative integer fails the whole load.
    pub fn load_transition_matrix<R: BufRead>(&mut self, reader: R, delimiter: char) -> Result<()> {
        self.reset();
        let mut skipped = 0usize;

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            let mut fields: Vec<&str> = line.split(delimiter).collect();
            while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }

            let Some((count, tags)) = fields.split_last() else {
                continue;
            };
            if !(1..=3).contains(&tags.len()) {
                if !line.is_empty() {
                    debug!(line = idx + 1, fields = fields.len(), "skipping transition record");
                }
                skipped += 1;
                continue;
            }

            let count: u64 = count
                .trim()
                .parse()
                .map_err(|_| Error::invalid_record(idx + 1, format!("bad count `{count}`")))?;

            match *tags {
                [t] => self.increment_unigram(t, count),
                [t1, t2] => self.increment_bigram(t1, t2, count),
                [t1, t2, t3] => self.increment_trigram(t1, t2, t3, count),
                _ => {}
            }
        }

        self.calculate_probabilities();
        info!(
            unique_tags = self.tag_count(),
            skipped, "loaded transition matrix"
        );
        self.log_ngram_counts();
        Ok(())
    }

    /// Write all non-zero counts, one record per line.
    ///
    /// Rows are sorted by tag. Each row's unigram record is followed by its
    /// bigram records in column order, each bigram followed by the trigrams
    /// that extend it.
    pub fn save_transition_matrix<W: Write>(&self, writer: W, delimiter: char) -> Result<()> {
        #[derive(Default)]
        struct Column<'a> {
            count: u64,
            slices: BTreeMap<&'a str, u64>,
        }
        #[derive(Default)]
        struct Row<'a> {
            count: u64,
            columns: BTreeMap<&'a str, Column<'a>>,
        }

        let c = &self.counts;
        let mut rows: BTreeMap<&str, Row> = BTreeMap::new();
        for (&t, &n) in &c.unigrams {
            rows.entry(c.name(t)).or_default().count = n;
        }
        for (&(t1, t2), &n) in &c.bigrams {
            rows.entry(c.name(t1))
                .or_default()
                .columns
                .entry(c.name(t2))
                .or_default()
                .count = n;
        }
        for (&(t1, t2, t3), &n) in &c.trigrams {
            rows.entry(c.name(t1))
                .or_default()
                .columns
                .entry(c.name(t2))
                .or_default()
                .slices
                .insert(c.name(t3), n);
        }

        let mut w = BufWriter::new(writer);
        let d = delimiter;
        for (row, r) in &rows {
            if r.count > 0 {
                writeln!(w, "{row}{d}{}", r.count)?;
            }
            for (col, cl) in &r.columns {
                if cl.count > 0 {
                    writeln!(w, "{row}{d}{col}{d}{}", cl.count)?;
                }
                for (slice, &n) in &cl.slices {
                    if n > 0 {
                        writeln!(w, "{row}{d}{col}{d}{slice}{d}{n}")?;
                    }
                }
            }
        }
        w.flush()?;
        Ok(())
    }

    /// Load a delimited transition matrix file.
    pub fn load_file<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut matrix = Self::new();
        matrix.load_transition_matrix(BufReader::new(file), delimiter)?;
        Ok(matrix)
    }

    /// Save as a delimited transition matrix file.
    pub fn save_file<P: AsRef<Path>>(&self, path: P, delimiter: char) -> Result<()> {
        self.log_ngram_counts();
        let file = File::create(path.as_ref())?;
        self.save_transition_matrix(file, delimiter)
    }

    /// Save the counts using bincode. Derived values are not stored.
    pub fn save_bincode<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, &self.counts)?;
        writer.flush()?;
        Ok(())
    }

    /// Load counts saved by `save_bincode`.
    pub fn load_bincode<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let counts: NGramCounts = bincode::deserialize_from(reader)?;
        let matrix = Self {
            counts,
            derived: OnceLock::new(),
        };
        matrix.log_ngram_counts();
        Ok(matrix)
    }

    /// Emit n-gram totals at debug level.
    pub fn log_ngram_counts(&self) {
        let t = self.counts.total_ngrams;
        let u = self.counts.unique_ngrams;
        debug!(
            unigrams = t[UNIGRAM],
            bigrams = t[BIGRAM],
            trigrams = t[TRIGRAM],
            "transition matrix total ngram counts"
        );
        debug!(
            unigrams = u[UNIGRAM],
            bigrams = u[BIGRAM],
            trigrams = u[TRIGRAM],
            "transition matrix unique ngram counts"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TransitionMatrix {
        let mut m = TransitionMatrix::new();
        m.increment_unigram("dt", 100);
        m.increment_unigram("nn", 150);
        m.increment_unigram("vb", 50);
        m.increment_bigram("dt", "nn", 80);
        m.increment_bigram("nn", "vb", 40);
        m.increment_bigram("dt", "vb", 2);
        m.increment_trigram("dt", "nn", "vb", 30);
        m.increment_trigram("nn", "vb", "dt", 5);
        m
    }

    #[test]
    fn unseen_ngrams_count_zero() {
        let m = sample();
        assert_eq!(m.unigram_count("xx"), 0);
        assert_eq!(m.bigram_count("dt", "xx"), 0);
        assert_eq!(m.trigram_count("vb", "vb", "vb"), 0);
        assert_eq!(m.unigram_probability("xx"), 0.0);
        assert_eq!(m.bigram_probability("vb", "vb"), 0.0);
    }

    #[test]
    fn totals_track_increments() {
        let mut m = sample();
        m.increment_unigram("dt", 10);
        assert_eq!(m.unigram_count("dt"), 110);
        assert_eq!(m.total_ngrams(UNIGRAM), 310);
        assert_eq!(m.unique_ngrams(UNIGRAM), 3);
        assert_eq!(m.unique_ngrams(BIGRAM), 3);
        assert_eq!(m.unique_ngrams(TRIGRAM), 2);
        assert_eq!(m.total_ngrams(TRIGRAM), 35);
        assert_eq!(m.total_word_count(), 310);
        assert_eq!(m.total_ngrams(7), 0);
    }

    #[test]
    fn probabilities_are_maximum_likelihood() {
        let m = sample();
        assert!((m.unigram_probability("nn") - 0.5).abs() < 1e-12);
        assert!((m.bigram_probability("dt", "nn") - 0.8).abs() < 1e-12);
        assert!((m.trigram_probability("dt", "nn", "vb") - 30.0 / 80.0).abs() < 1e-12);
    }

    #[test]
    fn mutation_invalidates_probabilities() {
        let mut m = sample();
        m.calculate_probabilities();
        assert!(m.have_probabilities());
        m.increment_bigram("dt", "nn", 20);
        assert!(!m.have_probabilities());
        assert!((m.bigram_probability("dt", "nn") - 1.0).abs() < 1e-12);
        assert!(m.have_probabilities());
    }

    #[test]
    fn bigram_weights_use_fixed_override() {
        let m = sample();
        assert_eq!(m.bigram_weights(), [0.03, 0.97]);
    }

    #[test]
    fn trigram_weights_sum_to_one() {
        let m = sample();
        let w = m.trigram_weights();
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        // dt nn vb: uni 50/300, bi 40/150, tri 30/80 -> trigram wins
        // nn vb dt: uni 100/300, bi 0/50, tri 5/40 -> unigram wins
        assert!((w[0] - 5.0 / 35.0).abs() < 1e-12);
        assert_eq!(w[1], 0.0);
        assert!((w[2] - 30.0 / 35.0).abs() < 1e-12);
    }

    #[test]
    fn empty_matrix_has_zero_trigram_weights() {
        let m = TransitionMatrix::new();
        assert_eq!(m.trigram_weights(), [0.0, 0.0, 0.0]);
        assert_eq!(m.unigram_probability("dt"), 0.0);
    }

    #[test]
    fn load_skips_other_shapes_and_rejects_bad_counts() {
        let text = "NN\t100\nDT\tNN\t50\nDT\t100\njust-one-field\na\tb\tc\td\te\n\n";
        let mut m = TransitionMatrix::new();
        m.load_transition_matrix(text.as_bytes(), '\t').unwrap();
        assert_eq!(m.unigram_count("NN"), 100);
        assert_eq!(m.bigram_count("DT", "NN"), 50);
        assert!(m.have_probabilities());

        let bad = "NN\tmany\n";
        let err = m.load_transition_matrix(bad.as_bytes(), '\t').unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));

        let negative = "NN\t-3\n";
        assert!(m.load_transition_matrix(negative.as_bytes(), '\t').is_err());
    }

    #[test]
    fn load_resets_previous_counts() {
        let mut m = sample();
        m.load_transition_matrix("nn,4\n".as_bytes(), ',').unwrap();
        assert_eq!(m.unigram_count("dt"), 0);
        assert_eq!(m.unigram_count("nn"), 4);
        assert_eq!(m.total_ngrams(UNIGRAM), 4);
    }

    #[test]
    fn save_orders_rows_then_columns_then_slices() {
        let m = sample();
        let mut out = Vec::new();
        m.save_transition_matrix(&mut out, '\t').unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "dt\t100",
                "dt\tnn\t80",
                "dt\tnn\tvb\t30",
                "dt\tvb\t2",
                "nn\t150",
                "nn\tvb\t40",
                "nn\tvb\tdt\t5",
                "vb\t50",
            ]
        );
    }
}
