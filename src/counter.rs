//! Frequency multiset backing each trie node's aggregated top results.
//!
//! `FreqCounter` is a term-to-frequency mapping with an ordered
//! `most_common` view and a compact wire encoding used by trie snapshots.

use std::collections::hash_map;
use std::collections::HashMap;

use crate::error::EngineError;

/// A term-to-frequency multiset.
///
/// Iteration order of the underlying map is unspecified; `most_common`
/// orders by descending frequency with lexicographic tie-breaking so that
/// ranked views and snapshot encodings are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreqCounter {
    counts: HashMap<String, u64>,
}

impl FreqCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        FreqCounter::default()
    }

    /// Number of distinct terms recorded.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no terms are recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Frequency of `term`, 0 if absent.
    pub fn get(&self, term: &str) -> u64 {
        self.counts.get(term).copied().unwrap_or(0)
    }

    /// Set the frequency of `term`, inserting it if absent.
    pub fn set(&mut self, term: String, count: u64) {
        self.counts.insert(term, count);
    }

    /// Add `count` to the frequency of `term`, inserting it if absent.
    pub fn add(&mut self, term: String, count: u64) {
        *self.counts.entry(term).or_insert(0) += count;
    }

    /// Remove `term`; absent terms are ignored.
    pub fn remove(&mut self, term: &str) {
        self.counts.remove(term);
    }

    /// Additively merge `other` into this counter.
    pub fn merge(&mut self, other: &FreqCounter) {
        for (term, count) in &other.counts {
            *self.counts.entry(term.clone()).or_insert(0) += count;
        }
    }

    /// Iterate over `(term, frequency)` pairs in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, u64> {
        self.counts.iter()
    }

    /// The `k` most frequent `(term, frequency)` pairs, highest first.
    /// Ties are broken by lexicographic term order.
    pub fn most_common(&self, k: usize) -> Vec<(String, u64)> {
        let mut pairs: Vec<(String, u64)> = self
            .counts
            .iter()
            .map(|(term, &count)| (term.clone(), count))
            .collect();
        pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        pairs.truncate(k);
        pairs
    }

    /// Encode the top `k` entries as alternating `term freq` tokens.
    ///
    /// Embedded spaces in terms are replaced with `_` so that a phrase
    /// stays a single token on the wire.
    pub fn encode(&self, k: usize) -> String {
        let mut tokens = Vec::with_capacity(2 * k);
        for (term, count) in self.most_common(k) {
            let escaped: Vec<&str> = term.split_whitespace().collect();
            tokens.push(escaped.join("_"));
            tokens.push(count.to_string());
        }
        tokens.join(" ")
    }

    /// Decode an `encode`d string back into a counter, reversing the
    /// underscore substitution.
    pub fn decode(s: &str) -> Result<FreqCounter, EngineError> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() % 2 != 0 {
            return Err(EngineError::SnapshotDecode(format!(
                "odd token count in encoded counter {s:?}"
            )));
        }
        let mut counter = FreqCounter::new();
        for pair in tokens.chunks(2) {
            let term: Vec<&str> = pair[0].split('_').collect();
            let count: u64 = pair[1].parse().map_err(|_| {
                EngineError::SnapshotDecode(format!("bad frequency {:?}", pair[1]))
            })?;
            counter.set(term.join(" "), count);
        }
        Ok(counter)
    }
}
