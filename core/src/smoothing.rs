//! Contextual smoothing of tag transition probabilities.
//!
//! A smoother turns the counts of a `TransitionMatrix` into
//! `p(tag | history)` for a bigram or trigram history. Results are memoised
//! per smoother; the memo is shared by all threads using the smoother and
//! filled last-writer-wins, which is safe because every fill is
//! deterministic.

use std::fmt;
use std::sync::{Arc, RwLock};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::transition::{TagId, TransitionMatrix};

/// Third key slot used for bigram entries in the probability cache.
const WILDCARD: TagId = TagId::MAX - 1;

/// Key slot shared by every tag the matrix has never seen. Such tags have
/// zero counts everywhere, so their probabilities coincide.
const UNKNOWN_TAG: TagId = TagId::MAX;

/// Numerator offset of the additive bigram estimate.
const ADDITIVE_BIGRAM_OFFSET: f64 = 0.05;

pub const DEFAULT_ADDITIVE_VALUE: f64 = 0.001;

/// Which smoother a configuration selects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmootherKind {
    Additive,
    #[default]
    DeletedInterpolation,
}

/// Smoothed contextual tag probabilities.
pub trait ContextualSmoother: Send + Sync + fmt::Display {
    /// `p(tag | previous_tag)`.
    fn contextual_probability(&self, tag: &str, previous_tag: &str) -> f64;

    /// `p(tag | previous_previous_tag, previous_tag)`.
    fn trigram_contextual_probability(
        &self,
        tag: &str,
        previous_tag: &str,
        previous_previous_tag: &str,
    ) -> f64;

    fn clear_cached_probabilities(&self);

    fn cached_probabilities_count(&self) -> usize;
}

/// Memo of computed probabilities keyed by interned tag ids.
#[derive(Debug, Default)]
struct ProbabilityCache {
    inner: RwLock<AHashMap<[TagId; 3], f64>>,
}

impl ProbabilityCache {
    fn get_or_compute<F>(&self, key: [TagId; 3], compute: F) -> f64
    where
        F: FnOnce() -> f64,
    {
        if let Ok(map) = self.inner.read() {
            if let Some(&p) = map.get(&key) {
                return p;
            }
        }
        let p = compute();
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, p);
        }
        p
    }

    fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            debug!(entries = map.len(), "clearing cached contextual probabilities");
            map.clear();
        }
    }

    fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }
}

/// Additive (Lidstone) smoothing.
///
/// Bigram: `(count(prev, tag) + 0.05) / (count(prev) + α·|V|)`.
/// Trigram: `(count(pp, p, tag) + α) / (count(pp, p) + α·|V|)`.
/// A zero denominator yields 0.
#[derive(Debug)]
pub struct AdditiveSmoother {
    matrix: Arc<TransitionMatrix>,
    lexicon_size: usize,
    additive_value: f64,
    cache: ProbabilityCache,
}

impl AdditiveSmoother {
    pub fn new(matrix: Arc<TransitionMatrix>, lexicon_size: usize) -> Self {
        Self::with_additive_value(matrix, lexicon_size, DEFAULT_ADDITIVE_VALUE)
    }

    pub fn with_additive_value(
        matrix: Arc<TransitionMatrix>,
        lexicon_size: usize,
        additive_value: f64,
    ) -> Self {
        Self {
            matrix,
            lexicon_size,
            additive_value,
            cache: ProbabilityCache::default(),
        }
    }

    pub fn additive_value(&self) -> f64 {
        self.additive_value
    }

    fn denominator_factor(&self) -> f64 {
        self.additive_value * self.lexicon_size as f64
    }
}

fn interned(matrix: &TransitionMatrix, tag: &str) -> TagId {
    matrix.tag_id(tag).unwrap_or(UNKNOWN_TAG)
}

fn cache_key(matrix: &TransitionMatrix, tags: [&str; 3]) -> [TagId; 3] {
    tags.map(|t| interned(matrix, t))
}

fn bigram_key(matrix: &TransitionMatrix, previous_tag: &str, tag: &str) -> [TagId; 3] {
    [interned(matrix, previous_tag), interned(matrix, tag), WILDCARD]
}

fn divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

impl ContextualSmoother for AdditiveSmoother {
    fn contextual_probability(&self, tag: &str, previous_tag: &str) -> f64 {
        self.cache.get_or_compute(bigram_key(&self.matrix, previous_tag, tag), || {
            divide(
                self.matrix.bigram_count(previous_tag, tag) as f64 + ADDITIVE_BIGRAM_OFFSET,
                self.matrix.unigram_count(previous_tag) as f64 + self.denominator_factor(),
            )
        })
    }

    fn trigram_contextual_probability(
        &self,
        tag: &str,
        previous_tag: &str,
        previous_previous_tag: &str,
    ) -> f64 {
        let key = cache_key(&self.matrix, [previous_previous_tag, previous_tag, tag]);
        self.cache.get_or_compute(key, || {
            divide(
                self.matrix.trigram_count(previous_previous_tag, previous_tag, tag) as f64
                    + self.additive_value,
                self.matrix.bigram_count(previous_previous_tag, previous_tag) as f64
                    + self.denominator_factor(),
            )
        })
    }

    fn clear_cached_probabilities(&self) {
        self.cache.clear();
    }

    fn cached_probabilities_count(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Display for AdditiveSmoother {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Using additive contextual smoothing with additive value={}.",
            self.additive_value
        )
    }
}

/// Linear interpolation of maximum-likelihood estimates using the
/// matrix's deleted-interpolation weights.
#[derive(Debug)]
pub struct DeletedInterpolationSmoother {
    matrix: Arc<TransitionMatrix>,
    cache: ProbabilityCache,
}

impl DeletedInterpolationSmoother {
    pub fn new(matrix: Arc<TransitionMatrix>) -> Self {
        Self {
            matrix,
            cache: ProbabilityCache::default(),
        }
    }
}

impl ContextualSmoother for DeletedInterpolationSmoother {
    fn contextual_probability(&self, tag: &str, previous_tag: &str) -> f64 {
        self.cache.get_or_compute(bigram_key(&self.matrix, previous_tag, tag), || {
            let [uni, bi] = self.matrix.bigram_weights();
            self.matrix.bigram_probability(previous_tag, tag) * bi
                + self.matrix.unigram_probability(tag) * uni
        })
    }

    fn trigram_contextual_probability(
        &self,
        tag: &str,
        previous_tag: &str,
        previous_previous_tag: &str,
    ) -> f64 {
        let key = cache_key(&self.matrix, [previous_previous_tag, previous_tag, tag]);
        self.cache.get_or_compute(key, || {
            let [uni, bi, tri] = self.matrix.trigram_weights();
            self.matrix
                .trigram_probability(previous_previous_tag, previous_tag, tag)
                * tri
                + self.matrix.bigram_probability(previous_tag, tag) * bi
                + self.matrix.unigram_probability(tag) * uni
        })
    }

    fn clear_cached_probabilities(&self) {
        self.cache.clear();
    }

    fn cached_probabilities_count(&self) -> usize {
        self.cache.len()
    }
}

impl fmt::Display for DeletedInterpolationSmoother {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.matrix.bigram_weights();
        let t = self.matrix.trigram_weights();
        writeln!(
            f,
            "Using weights computed by deleted interpolation for contextual smoothing."
        )?;
        writeln!(f, "Bigram weights: lambda1={}, lambda2={}", b[0], b[1])?;
        write!(
            f,
            "Trigram weights: lambda1={}, lambda2={}, lambda3={}",
            t[0], t[1], t[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> Arc<TransitionMatrix> {
        let mut m = TransitionMatrix::new();
        m.increment_unigram("dt", 100);
        m.increment_unigram("nn", 100);
        m.increment_bigram("dt", "nn", 50);
        m.increment_trigram("dt", "nn", "nn", 10);
        Arc::new(m)
    }

    #[test]
    fn additive_bigram_uses_fixed_offset() {
        let s = AdditiveSmoother::new(matrix(), 1000);
        let p = s.contextual_probability("nn", "dt");
        assert!((p - 50.05 / 101.0).abs() < 1e-12);
    }

    #[test]
    fn additive_trigram_uses_additive_value() {
        let s = AdditiveSmoother::with_additive_value(matrix(), 10, 0.5);
        let p = s.trigram_contextual_probability("nn", "nn", "dt");
        assert!((p - 10.5 / 55.0).abs() < 1e-12);
    }

    #[test]
    fn additive_zero_denominator_is_zero() {
        let s = AdditiveSmoother::new(Arc::new(TransitionMatrix::new()), 0);
        assert_eq!(s.contextual_probability("nn", "dt"), 0.0);
        assert_eq!(s.trigram_contextual_probability("nn", "dt", "dt"), 0.0);
    }

    #[test]
    fn deleted_interpolation_bigram_mixes_orders() {
        let s = DeletedInterpolationSmoother::new(matrix());
        let p = s.contextual_probability("nn", "dt");
        assert!((p - (0.97 * 0.5 + 0.03 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn cache_fills_and_clears() {
        let s = DeletedInterpolationSmoother::new(matrix());
        assert_eq!(s.cached_probabilities_count(), 0);
        let a = s.contextual_probability("nn", "dt");
        let b = s.contextual_probability("nn", "dt");
        assert_eq!(a, b);
        s.trigram_contextual_probability("nn", "nn", "dt");
        assert_eq!(s.cached_probabilities_count(), 2);
        s.clear_cached_probabilities();
        assert_eq!(s.cached_probabilities_count(), 0);
    }

    #[test]
    fn unseen_tags_share_a_cache_entry() {
        let s = AdditiveSmoother::new(matrix(), 1000);
        let a = s.contextual_probability("xx", "dt");
        let b = s.contextual_probability("yy", "dt");
        assert_eq!(a, b);
        assert!((a - 0.05 / 101.0).abs() < 1e-12);
        assert_eq!(s.cached_probabilities_count(), 1);

        s.trigram_contextual_probability("xx", "dt", "dt");
        assert_eq!(s.cached_probabilities_count(), 2);
    }

    #[test]
    fn display_names_the_method() {
        let s = AdditiveSmoother::new(matrix(), 1);
        assert!(s.to_string().contains("additive value=0.001"));
        let d = DeletedInterpolationSmoother::new(matrix());
        assert!(d.to_string().contains("lambda2=0.97"));
    }
}
