//! Node records for the ranked-prefix trie.
//!
//! Nodes live in an arena owned by the index and refer to each other by
//! stable `NodeId` keys, which keeps the child-to-parent back-reference
//! free of cyclic ownership.

use std::collections::BTreeMap;

use crate::counter::FreqCounter;

/// Stable arena key of a trie node.
pub type NodeId = usize;

/// A single node in the trie.
#[derive(Debug, Clone)]
pub struct TrieNode {
    /// The full string from the root to this node. The root's prefix is
    /// the empty string.
    pub prefix: String,
    /// Children keyed by the single character extending the prefix.
    /// Ordered so traversals and snapshots are deterministic.
    pub children: BTreeMap<char, NodeId>,
    /// Containing node; `None` only at the root.
    pub parent: Option<NodeId>,
    /// True if some insertion terminates at this node.
    pub is_word: bool,
    /// Bumps accumulated since the last aggregation rebuild.
    pub count: u64,
    /// Aggregated term frequencies over this node's subtree.
    pub top_results: FreqCounter,
}

impl TrieNode {
    /// Create a fresh non-word node.
    pub fn new(prefix: String, parent: Option<NodeId>) -> Self {
        TrieNode {
            prefix,
            children: BTreeMap::new(),
            parent,
            is_word: false,
            count: 0,
            top_results: FreqCounter::new(),
        }
    }

    /// Check if this node has any children.
    pub fn can_walk(&self) -> bool {
        !self.children.is_empty()
    }

    /// Total historical frequency recorded for this node's own prefix.
    pub fn total_count(&self) -> u64 {
        self.top_results.get(&self.prefix)
    }

    /// Last character of the prefix, the key under which this node hangs
    /// off its parent. `None` only at the root.
    pub fn last_char(&self) -> Option<char> {
        self.prefix.chars().last()
    }
}
