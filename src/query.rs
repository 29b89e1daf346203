//! The query pipeline: tokenize, expand, enumerate, rank.
//!
//! A query is split into tokens, each token is expanded into a small list
//! of likely spellings, and the Cartesian product of those lists yields
//! the candidate phrases that are looked up (and learned) in the trie.
//! The expansion step is a pluggable capability so the spelling-only
//! engine and the oracle-augmented engine share one pipeline.

use std::collections::HashMap;

use log::debug;
use unicode_normalization::UnicodeNormalization;

use crate::error::EngineError;
use crate::spell::SpellModel;
use crate::trie::TrieIndex;

/// Default number of results a search returns.
pub const DEFAULT_RESULT_LIMIT: usize = 10;
/// Largest configurable result count.
pub const MAX_RESULT_LIMIT: usize = 15;
/// Spelling replacements considered per query token.
pub const EXPANSIONS_PER_TOKEN: usize = 2;
/// Largest configurable per-token expansion count.
pub const MAX_EXPANSIONS: usize = 10;
/// Searches between aggregation rebuilds. Rebuilding after every search
/// keeps results fresh at O(tree) cost per query; production deployments
/// raise it.
pub const DEFAULT_REBUILD_EVERY: u32 = 1;

/// Candidate expansion for a single query token.
pub trait Expand {
    /// Likely whole-word candidates for `token`, best first.
    fn expand(&self, token: &str) -> Vec<String>;
}

/// Basic expansion: the most likely spelling replacements only.
pub struct SpellExpander {
    model: SpellModel,
}

impl SpellExpander {
    pub fn new(model: SpellModel) -> Self {
        SpellExpander { model }
    }
}

impl Expand for SpellExpander {
    fn expand(&self, token: &str) -> Vec<String> {
        self.model.most_likely_replacements(token, EXPANSIONS_PER_TOKEN)
    }
}

/// Contextual next-word source, typically backed by an embedding
/// nearest-neighbor search. Injected, never implemented by the engine
/// itself.
pub trait NextWordOracle {
    /// Words likely to follow or relate to `word`, best first.
    fn next_words(&self, word: &str) -> Vec<String>;
}

/// A fixed-table oracle, handy for tests and offline setups.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    table: HashMap<String, Vec<String>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        StaticOracle::default()
    }

    /// Associate `word` with its related words.
    pub fn insert(&mut self, word: &str, related: &[&str]) {
        self.table.insert(
            word.to_string(),
            related.iter().map(|s| s.to_string()).collect(),
        );
    }
}

impl NextWordOracle for StaticOracle {
    fn next_words(&self, word: &str) -> Vec<String> {
        self.table.get(word).cloned().unwrap_or_default()
    }
}

/// Advanced expansion: spelling replacements plus oracle next-words,
/// deduplicated and capped.
pub struct SemanticExpander {
    model: SpellModel,
    oracle: Box<dyn NextWordOracle>,
    max_expansions: usize,
}

impl SemanticExpander {
    pub fn new(model: SpellModel, oracle: Box<dyn NextWordOracle>) -> Self {
        SemanticExpander {
            model,
            oracle,
            max_expansions: MAX_EXPANSIONS,
        }
    }

    /// Cap the number of candidates produced per token, between 1 and
    /// `MAX_EXPANSIONS`. Out-of-range values are rejected and the prior
    /// cap is retained.
    pub fn set_max_expansions(&mut self, max: usize) -> Result<(), EngineError> {
        if !(1..=MAX_EXPANSIONS).contains(&max) {
            return Err(EngineError::ConfigBounds(format!(
                "expansions per token must be between 1 and {MAX_EXPANSIONS}, got {max}"
            )));
        }
        self.max_expansions = max;
        Ok(())
    }
}

impl Expand for SemanticExpander {
    fn expand(&self, token: &str) -> Vec<String> {
        let mut choices = self
            .model
            .most_likely_replacements(token, EXPANSIONS_PER_TOKEN);
        choices.truncate(self.max_expansions);
        for word in self.oracle.next_words(token) {
            if choices.len() >= self.max_expansions {
                break;
            }
            if !choices.contains(&word) {
                choices.push(word);
            }
        }
        choices
    }
}

/// The autocomplete engine: a trie index fronted by tokenization and
/// candidate expansion.
///
/// Searching both serves and teaches: every enumerated candidate phrase
/// is inserted (or bumped) before results are merged, so the engine
/// learns the vocabulary of its own query stream. Aggregates refresh
/// every `rebuild_every` searches; in between, results may lag behind
/// the newest bumps.
pub struct QueryPipeline {
    trie: TrieIndex,
    expander: Box<dyn Expand>,
    result_limit: usize,
    rebuild_every: u32,
    search_count: u32,
}

impl QueryPipeline {
    /// Build a pipeline over an existing index with a custom expansion
    /// capability.
    pub fn new(trie: TrieIndex, expander: Box<dyn Expand>) -> Self {
        QueryPipeline {
            trie,
            expander,
            result_limit: DEFAULT_RESULT_LIMIT,
            rebuild_every: DEFAULT_REBUILD_EVERY,
            search_count: 0,
        }
    }

    /// Build the basic engine: a fresh index expanded by spelling
    /// replacements only.
    pub fn with_spell(model: SpellModel) -> Self {
        QueryPipeline::new(TrieIndex::new(), Box::new(SpellExpander::new(model)))
    }

    /// Borrow the underlying index.
    pub fn trie(&self) -> &TrieIndex {
        &self.trie
    }

    /// Mutably borrow the underlying index.
    pub fn trie_mut(&mut self) -> &mut TrieIndex {
        &mut self.trie
    }

    /// Replace the underlying index, e.g. after a restore.
    pub fn set_trie(&mut self, trie: TrieIndex) {
        self.trie = trie;
    }

    /// Maximum number of results a search returns.
    pub fn result_limit(&self) -> usize {
        self.result_limit
    }

    /// Set the result count, between 1 and `MAX_RESULT_LIMIT`.
    /// Out-of-range values are rejected and the prior value is retained.
    pub fn set_result_limit(&mut self, limit: usize) -> Result<(), EngineError> {
        if !(1..=MAX_RESULT_LIMIT).contains(&limit) {
            return Err(EngineError::ConfigBounds(format!(
                "result limit must be between 1 and {MAX_RESULT_LIMIT}, got {limit}"
            )));
        }
        self.result_limit = limit;
        Ok(())
    }

    /// Set how many searches run between aggregation rebuilds, at least 1.
    pub fn set_rebuild_every(&mut self, every: u32) -> Result<(), EngineError> {
        if every < 1 {
            return Err(EngineError::ConfigBounds(
                "rebuild interval must be at least 1 search".to_string(),
            ));
        }
        self.rebuild_every = every;
        Ok(())
    }

    /// Ranked suggestions for `query`, most frequent first.
    ///
    /// The query is NFC-normalized, lowercased, and split on whitespace;
    /// an empty or all-whitespace query yields an empty list. Every
    /// candidate phrase enumerated from the per-token expansions is
    /// insert-bumped, and the merged suggestions are drawn from the
    /// terminal nodes' aggregates, which reflect the state as of the
    /// last rebuild.
    pub fn search(&mut self, query: &str) -> Result<Vec<String>, EngineError> {
        let normalized: String = query.nfc().collect::<String>().to_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut expansions = Vec::with_capacity(tokens.len());
        for token in &tokens {
            let mut choices = self.expander.expand(token);
            if choices.is_empty() {
                choices.push((*token).to_string());
            }
            expansions.push(choices);
        }

        let mut phrases = Vec::new();
        enumerate_phrases(&expansions, 0, &mut Vec::new(), &mut phrases);

        let mut pool: Vec<(String, u64)> = Vec::new();
        for phrase in &phrases {
            let id = self.trie.insert(phrase)?;
            pool.extend(self.trie.node(id).top_results.most_common(self.result_limit));
        }
        debug!("merged {} ranked candidates for {query:?}", pool.len());

        pool.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let mut results: Vec<String> = Vec::with_capacity(self.result_limit);
        for (term, _) in pool {
            if !results.contains(&term) {
                results.push(term);
                if results.len() == self.result_limit {
                    break;
                }
            }
        }

        self.search_count += 1;
        if self.search_count >= self.rebuild_every {
            self.search_count = 0;
            self.trie.rebuild_top_results();
        }

        Ok(results)
    }
}

/// Depth-first enumeration of the Cartesian product of the per-token
/// candidate lists, in left-to-right token order.
fn enumerate_phrases(
    lists: &[Vec<String>],
    idx: usize,
    path: &mut Vec<String>,
    out: &mut Vec<String>,
) {
    if idx == lists.len() {
        out.push(path.join(" "));
        return;
    }
    for word in &lists[idx] {
        path.push(word.clone());
        enumerate_phrases(lists, idx + 1, path, out);
        path.pop();
    }
}
