//! Short-TTL result cache fronting the query pipeline.
//!
//! Repeated queries are served from the cache instead of re-running the
//! pipeline, and a bounded history keeps the most recent queries. The
//! cache is abstract; `MemoryCache` is the in-process implementation.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::debug;

use crate::error::EngineError;
use crate::query::QueryPipeline;

/// How long cached result lists stay valid.
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(600);
/// How many recent queries the history keeps.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Contract to the external result/history cache.
pub trait CacheAdapter {
    /// Cached results for `term`; empty if absent or expired.
    fn get_results(&mut self, term: &str) -> Result<Vec<String>, EngineError>;
    /// Store results for `term`. Empty result lists are not stored.
    fn put_results(
        &mut self,
        term: &str,
        results: &[String],
        ttl: Duration,
    ) -> Result<(), EngineError>;
    /// Record `term` in the bounded recent-query history, evicting the
    /// oldest entry when full.
    fn push_history(&mut self, term: &str) -> Result<(), EngineError>;
    /// Recent queries, newest first.
    fn get_history(&mut self) -> Result<Vec<String>, EngineError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    results: Vec<String>,
    expires_at: Instant,
}

/// In-memory cache with per-entry expiry and a bounded history FIFO.
#[derive(Debug)]
pub struct MemoryCache {
    entries: HashMap<String, CacheEntry>,
    history: VecDeque<String>,
    history_limit: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        MemoryCache::new()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        MemoryCache {
            entries: HashMap::new(),
            history: VecDeque::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Number of stored result lists, expired entries included until
    /// their next lookup.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheAdapter for MemoryCache {
    fn get_results(&mut self, term: &str) -> Result<Vec<String>, EngineError> {
        match self.entries.get(term) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(entry.results.clone()),
            Some(_) => {
                self.entries.remove(term);
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }

    fn put_results(
        &mut self,
        term: &str,
        results: &[String],
        ttl: Duration,
    ) -> Result<(), EngineError> {
        if results.is_empty() {
            return Ok(());
        }
        self.entries.insert(
            term.to_string(),
            CacheEntry {
                results: results.to_vec(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn push_history(&mut self, term: &str) -> Result<(), EngineError> {
        if self.history.len() == self.history_limit {
            self.history.pop_back();
        }
        self.history.push_front(term.to_string());
        Ok(())
    }

    fn get_history(&mut self) -> Result<Vec<String>, EngineError> {
        Ok(self.history.iter().cloned().collect())
    }
}

/// A query pipeline fronted by a result cache and a query history.
///
/// Queries are trimmed first, so an all-whitespace query is treated the
/// same as an empty one. Every non-empty query is recorded in the
/// history, cache hit or not.
pub struct CachedPipeline {
    pipeline: QueryPipeline,
    cache: Box<dyn CacheAdapter>,
    ttl: Duration,
}

impl CachedPipeline {
    pub fn new(pipeline: QueryPipeline, cache: Box<dyn CacheAdapter>) -> Self {
        CachedPipeline {
            pipeline,
            cache,
            ttl: DEFAULT_RESULT_TTL,
        }
    }

    /// Override how long results stay cached.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
    }

    /// Borrow the fronted pipeline.
    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    /// Mutably borrow the fronted pipeline.
    pub fn pipeline_mut(&mut self) -> &mut QueryPipeline {
        &mut self.pipeline
    }

    /// Ranked suggestions for `term`, served from the cache when a fresh
    /// entry exists.
    pub fn search(&mut self, term: &str) -> Result<Vec<String>, EngineError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        self.cache.push_history(term)?;
        let cached = self.cache.get_results(term)?;
        if !cached.is_empty() {
            debug!("cache hit for {term:?}");
            return Ok(cached);
        }

        let results = self.pipeline.search(term)?;
        self.cache.put_results(term, &results, self.ttl)?;
        Ok(results)
    }

    /// Recent queries, newest first.
    pub fn history(&mut self) -> Result<Vec<String>, EngineError> {
        self.cache.get_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellModel;

    fn cached_pipeline() -> CachedPipeline {
        CachedPipeline::new(
            QueryPipeline::with_spell(SpellModel::from_text("")),
            Box::new(MemoryCache::new()),
        )
    }

    #[test]
    fn test_empty_results_are_not_stored() {
        let mut cache = MemoryCache::new();
        cache.put_results("term", &[], DEFAULT_RESULT_TTL).unwrap();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_not_served() {
        let mut cache = MemoryCache::new();
        cache
            .put_results("term", &["result".to_string()], Duration::ZERO)
            .unwrap();
        assert!(cache.get_results("term").unwrap().is_empty());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_fresh_entries_are_served() {
        let mut cache = MemoryCache::new();
        cache
            .put_results("term", &["result".to_string()], DEFAULT_RESULT_TTL)
            .unwrap();
        assert_eq!(cache.get_results("term").unwrap(), vec!["result".to_string()]);
    }

    #[test]
    fn test_history_is_newest_first_and_bounded() {
        let mut cache = MemoryCache::new();
        for i in 0..12 {
            cache.push_history(&format!("query{i}")).unwrap();
        }

        let history = cache.get_history().unwrap();
        assert_eq!(history.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(history[0], "query11");
        assert_eq!(history[9], "query2");
    }

    #[test]
    fn test_cache_hit_skips_the_pipeline() {
        let mut front = cached_pipeline();
        front.search("linux").unwrap(); // learns, returns nothing yet
        front.search("linux").unwrap(); // returns and caches the result

        let bumps_before = front
            .pipeline()
            .trie()
            .node(front.pipeline().trie().lookup("linux").unwrap())
            .total_count();
        let results = front.search("linux").unwrap();

        assert_eq!(results, vec!["linux".to_string()]);
        let bumps_after = front
            .pipeline()
            .trie()
            .node(front.pipeline().trie().lookup("linux").unwrap())
            .total_count();
        assert_eq!(bumps_before, bumps_after);
    }

    #[test]
    fn test_whitespace_query_is_trimmed_away() {
        let mut front = cached_pipeline();
        assert!(front.search("   ").unwrap().is_empty());
        assert!(front.history().unwrap().is_empty());
    }

    #[test]
    fn test_front_records_history() {
        let mut front = cached_pipeline();
        front.search("tea").unwrap();
        front.search("ted").unwrap();

        assert_eq!(
            front.history().unwrap(),
            vec!["ted".to_string(), "tea".to_string()]
        );
    }
}
