//! # typeahead-rs
//!
//! A learning autocomplete engine in Rust.
//!
//! Queries are tokenized, expanded into likely spellings, and looked up
//! in a ranked-prefix trie that aggregates how often each term has been
//! searched. Every query also teaches the engine: candidate phrases are
//! inserted (or bumped) on the fly, so suggestions adapt to the query
//! stream. The trie can be path-compressed, serialized, and restored,
//! and adapters front it with an external graph store and a short-TTL
//! result cache.
//!
//! ## Quick Start
//!
//! ```rust
//! use typeahead_rs::{QueryPipeline, SpellModel};
//!
//! let model = SpellModel::from_text("a small reference corpus");
//! let mut engine = QueryPipeline::with_spell(model);
//!
//! engine.search("rust").unwrap(); // the engine learns the query
//! let results = engine.search("rust").unwrap();
//! assert_eq!(results[0], "rust");
//! ```
//!
//! ## Snapshots
//!
//! A trie can be compressed and serialized into an ordered record list
//! that reconstructs it exactly:
//!
//! ```rust
//! use typeahead_rs::{QueryPipeline, SpellModel, TrieIndex};
//!
//! let mut engine = QueryPipeline::with_spell(SpellModel::from_text(""));
//! engine.search("time machine").unwrap();
//!
//! let mut trie = engine.trie().clone();
//! trie.path_compression();
//! let records = trie.serialize();
//! let restored = TrieIndex::deserialize(&records).unwrap();
//! assert_eq!(restored.serialize(), records);
//! ```

pub mod cache;
pub mod corpus;
pub mod counter;
pub mod error;
pub mod node;
pub mod persist;
pub mod query;
pub mod spell;
pub mod trie;

// Re-export main types for convenience
pub use cache::{CacheAdapter, CachedPipeline, MemoryCache};
pub use counter::FreqCounter;
pub use error::EngineError;
pub use node::{NodeId, TrieNode};
pub use persist::{MemoryGraphStore, NodeProps, PersistenceAdapter};
pub use query::{
    Expand, NextWordOracle, QueryPipeline, SemanticExpander, SpellExpander, StaticOracle,
};
pub use spell::SpellModel;
pub use trie::{NodeRecord, TrieIndex};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline_with_spelling_correction() {
        let model = SpellModel::from_text("democracy democracy freedom");
        let mut engine = QueryPipeline::with_spell(model);

        engine.search("democrac").unwrap();
        let results = engine.search("democrac").unwrap();

        assert!(results.contains(&"democracy".to_string()));
    }

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
