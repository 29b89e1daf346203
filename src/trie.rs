//! The ranked-prefix trie index.
//!
//! Terms are stored character by character, phrases included (a space is
//! just another edge character). Each node aggregates the historical
//! frequencies of the terms in its subtree; `rebuild_top_results` folds
//! pending per-node bumps into those aggregates bottom-up. The index can
//! be path-compressed and serialized into an ordered record list that
//! reconstructs it bit-identically.

use std::collections::VecDeque;
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};
use slab::Slab;

use crate::counter::FreqCounter;
use crate::error::EngineError;
use crate::node::{NodeId, TrieNode};

/// Number of top results a node record carries in a snapshot.
pub const DEFAULT_TOP_K: usize = 10;

/// One serialized trie node: prefix, word flag ("1"/"0"), encoded top
/// results, and the number of direct children that follow in pre-order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub prefix: String,
    pub is_word: String,
    pub top_results: String,
    pub child_count: String,
}

impl NodeRecord {
    fn new(prefix: &str, is_word: bool, top_results: String, child_count: usize) -> Self {
        NodeRecord {
            prefix: prefix.to_string(),
            is_word: if is_word { "1" } else { "0" }.to_string(),
            top_results,
            child_count: child_count.to_string(),
        }
    }
}

/// The in-memory trie index.
///
/// Nodes live in a slab arena and refer to each other by `NodeId`, so the
/// parent back-reference needed by rebuilds and deletes is an index walk
/// rather than a cyclic ownership problem.
#[derive(Debug, Clone)]
pub struct TrieIndex {
    nodes: Slab<TrieNode>,
    root: NodeId,
}

impl Default for TrieIndex {
    fn default() -> Self {
        TrieIndex::new()
    }
}

impl fmt::Display for TrieIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trie index with {} nodes", self.node_count())
    }
}

impl TrieIndex {
    /// Create an empty index holding only the root.
    pub fn new() -> Self {
        let mut nodes = Slab::new();
        let root = nodes.insert(TrieNode::new(String::new(), None));
        TrieIndex { nodes, root }
    }

    /// Id of the root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if no term has been inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Borrow a node by id. Panics on a stale id.
    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    /// Iterate over all live `(id, node)` pairs in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &TrieNode)> {
        self.nodes.iter()
    }

    /// Drop every term and reset the index to a lone root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(TrieNode::new(String::new(), None));
    }

    /// Insert `term`, creating path nodes as needed, and bump its pending
    /// count by one. Returns the terminal node id.
    pub fn insert(&mut self, term: &str) -> Result<NodeId, EngineError> {
        self.insert_inner(term, None)
    }

    /// Insert `term` with a historical frequency seeded from stored
    /// state. The seed replaces the pending count, so the next rebuild
    /// distributes the full stored total to the term's node and every
    /// ancestor aggregate. Returns the terminal node id.
    pub fn insert_seeded(&mut self, term: &str, count: u64) -> Result<NodeId, EngineError> {
        self.insert_inner(term, Some(count))
    }

    fn insert_inner(&mut self, term: &str, seed: Option<u64>) -> Result<NodeId, EngineError> {
        if term.is_empty() {
            return Err(EngineError::InputShape(
                "cannot insert an empty term".to_string(),
            ));
        }

        let mut cur = self.root;
        for ch in term.chars() {
            let existing = self.nodes[cur].children.get(&ch).copied();
            cur = match existing {
                Some(child) => child,
                None => {
                    let mut prefix = self.nodes[cur].prefix.clone();
                    prefix.push(ch);
                    let child = self.nodes.insert(TrieNode::new(prefix, Some(cur)));
                    self.nodes[cur].children.insert(ch, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[cur];
        node.is_word = true;
        match seed {
            Some(count) => node.count = count,
            None => node.count += 1,
        }

        debug!("insert used for {term}");
        Ok(cur)
    }

    /// Terminal node of `term` if the whole path exists.
    pub fn lookup(&self, term: &str) -> Option<NodeId> {
        let mut cur = self.root;
        for ch in term.chars() {
            cur = *self.nodes[cur].children.get(&ch)?;
        }
        Some(cur)
    }

    /// True if `term` was inserted as a word.
    pub fn contains(&self, term: &str) -> bool {
        self.lookup(term)
            .map(|id| self.nodes[id].is_word)
            .unwrap_or(false)
    }

    /// Delete `term` and the whole subtree below it.
    ///
    /// Missing paths and non-word terminals are silent no-ops. Ancestors
    /// left childless and wordless are detached as well, and every word
    /// removed with the subtree is dropped from the aggregates of the
    /// surviving ancestors up to the root.
    pub fn delete(&mut self, term: &str) {
        let target = match self.lookup(term) {
            Some(id) if id != self.root && self.nodes[id].is_word => id,
            _ => return,
        };

        let words = self.words_in_subtree(target);

        let parent = self.nodes[target]
            .parent
            .expect("non-root node has a parent");
        let key = self.nodes[target]
            .last_char()
            .expect("non-root prefix is non-empty");
        self.nodes[parent].children.remove(&key);
        self.free_subtree(target);

        let mut kept = parent;
        while kept != self.root {
            let node = &self.nodes[kept];
            if node.is_word || node.can_walk() {
                break;
            }
            let up = node.parent.expect("non-root node has a parent");
            let key = node.last_char().expect("non-root prefix is non-empty");
            self.nodes[up].children.remove(&key);
            self.nodes.remove(kept);
            kept = up;
        }

        let mut cur = Some(kept);
        while let Some(id) = cur {
            for word in &words {
                self.nodes[id].top_results.remove(word);
            }
            cur = self.nodes[id].parent;
        }
    }

    /// Breadth-first collection of every word terminating in the subtree
    /// rooted at `id`, that node included.
    fn words_in_subtree(&self, id: NodeId) -> Vec<String> {
        let mut queue = VecDeque::from([id]);
        let mut words = Vec::new();
        while let Some(cur) = queue.pop_front() {
            let node = &self.nodes[cur];
            if node.is_word {
                words.push(node.prefix.clone());
            }
            queue.extend(node.children.values());
        }
        words
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut queue = VecDeque::from([id]);
        while let Some(cur) = queue.pop_front() {
            queue.extend(self.nodes[cur].children.values());
            self.nodes.remove(cur);
        }
    }

    /// Fold pending counts into the aggregated top results, bottom-up.
    ///
    /// For every leaf, a running multiset is carried up the parent chain;
    /// each word node on the way contributes its pending count (which is
    /// then reset) and each node absorbs the multiset additively. After
    /// the pass every node's aggregate reflects all bumps recorded so far,
    /// and replaying the pass is a no-op since all counts are zero.
    pub fn rebuild_top_results(&mut self) {
        let mut stack = vec![self.root];
        let mut leaves = Vec::new();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.can_walk() {
                stack.extend(node.children.values());
            } else {
                leaves.push(id);
            }
        }

        for leaf in leaves {
            let mut carried = FreqCounter::new();
            let mut cur = Some(leaf);
            while let Some(id) = cur {
                let node = &mut self.nodes[id];
                if node.is_word {
                    carried.set(node.prefix.clone(), node.count);
                    node.count = 0;
                }
                node.top_results.merge(&carried);
                cur = node.parent;
            }
        }
    }

    /// Collapse chains of single-child non-word nodes below the root (the
    /// root itself is never compressed).
    ///
    /// The set of terminating words is preserved; intermediate prefixes
    /// are not rediscoverable afterwards, so this is used to shrink a trie
    /// right before serialization.
    pub fn path_compression(&mut self) {
        let children: Vec<NodeId> = self.nodes[self.root].children.values().copied().collect();
        for child in children {
            self.compress(child);
        }
    }

    fn compress(&mut self, id: NodeId) {
        if !self.nodes[id].can_walk() {
            return;
        }
        while !self.nodes[id].is_word && self.nodes[id].children.len() == 1 {
            self.absorb_only_child(id);
        }
        let children: Vec<NodeId> = self.nodes[id].children.values().copied().collect();
        for child in children {
            self.compress(child);
        }
    }

    /// Replace `id`'s content with its only child's prefix, children, word
    /// flag, and pending count. The node keeps its own aggregate, which on
    /// a single-child chain covers the same subtree.
    fn absorb_only_child(&mut self, id: NodeId) {
        let child_id = *self.nodes[id]
            .children
            .values()
            .next()
            .expect("caller checked for a single child");
        let child = self.nodes.remove(child_id);

        let node = &mut self.nodes[id];
        node.prefix = child.prefix;
        node.children = child.children;
        node.is_word = child.is_word;
        node.count = child.count;

        let grandchildren: Vec<NodeId> = self.nodes[id].children.values().copied().collect();
        for grandchild in grandchildren {
            self.nodes[grandchild].parent = Some(id);
        }
    }

    /// Serialize the trie into pre-order records carrying the default
    /// number of top results per node.
    pub fn serialize(&self) -> Vec<NodeRecord> {
        self.serialize_top_k(DEFAULT_TOP_K)
    }

    /// Serialize the trie into pre-order records, keeping the
    /// `top_k_per_node` best results of each node.
    pub fn serialize_top_k(&self, top_k_per_node: usize) -> Vec<NodeRecord> {
        let mut records = Vec::with_capacity(self.nodes.len());
        self.serialize_node(self.root, top_k_per_node, &mut records);
        records
    }

    fn serialize_node(&self, id: NodeId, k: usize, records: &mut Vec<NodeRecord>) {
        let node = &self.nodes[id];
        records.push(NodeRecord::new(
            &node.prefix,
            node.is_word,
            node.top_results.encode(k),
            node.children.len(),
        ));
        for &child in node.children.values() {
            self.serialize_node(child, k, records);
        }
    }

    /// Reconstruct an index from serialized records.
    ///
    /// The first record is the root; each record's child count drives the
    /// recursion. Pending counts come back as zero and aggregates are set
    /// directly from the decoded multisets. Any structural violation is a
    /// `SnapshotDecode` error and the partial reconstruction is discarded.
    pub fn deserialize(records: &[NodeRecord]) -> Result<TrieIndex, EngineError> {
        let first = records
            .first()
            .ok_or_else(|| EngineError::SnapshotDecode("no records".to_string()))?;
        if !first.prefix.is_empty() {
            return Err(EngineError::SnapshotDecode(format!(
                "root record has prefix {:?}, expected an empty prefix",
                first.prefix
            )));
        }

        let mut trie = TrieIndex::new();
        let (is_word, top_results, child_count) = Self::decode_record(first)?;
        let root = trie.root;
        trie.nodes[root].is_word = is_word;
        trie.nodes[root].top_results = top_results;

        let consumed = trie.build_children(root, child_count, records, 1)?;
        if consumed != records.len() {
            return Err(EngineError::SnapshotDecode(format!(
                "{} trailing records after the root subtree",
                records.len() - consumed
            )));
        }
        Ok(trie)
    }

    fn decode_record(record: &NodeRecord) -> Result<(bool, FreqCounter, usize), EngineError> {
        let is_word = match record.is_word.as_str() {
            "1" => true,
            "0" => false,
            other => {
                return Err(EngineError::SnapshotDecode(format!(
                    "bad word flag {other:?} on record for {:?}",
                    record.prefix
                )))
            }
        };
        let top_results = FreqCounter::decode(&record.top_results)?;
        let child_count: usize = record.child_count.parse().map_err(|_| {
            EngineError::SnapshotDecode(format!(
                "bad child count {:?} on record for {:?}",
                record.child_count, record.prefix
            ))
        })?;
        Ok((is_word, top_results, child_count))
    }

    fn build_children(
        &mut self,
        parent: NodeId,
        child_count: usize,
        records: &[NodeRecord],
        mut index: usize,
    ) -> Result<usize, EngineError> {
        for _ in 0..child_count {
            let record = records.get(index).ok_or_else(|| {
                EngineError::SnapshotDecode(format!(
                    "child count of {:?} exceeds the remaining records",
                    self.nodes[parent].prefix
                ))
            })?;

            let parent_prefix = self.nodes[parent].prefix.clone();
            if !record.prefix.starts_with(&parent_prefix)
                || record.prefix.len() <= parent_prefix.len()
            {
                return Err(EngineError::SnapshotDecode(format!(
                    "prefix {:?} does not extend parent prefix {parent_prefix:?}",
                    record.prefix
                )));
            }

            let (is_word, top_results, children) = Self::decode_record(record)?;
            // Key the child by the first character beyond the parent's
            // prefix: the edge character, even when the prefix spans a
            // whole compressed chain.
            let key = record.prefix[parent_prefix.len()..]
                .chars()
                .next()
                .expect("child prefix is longer than its parent's");
            if self.nodes[parent].children.contains_key(&key) {
                return Err(EngineError::SnapshotDecode(format!(
                    "duplicate child key {key:?} under {parent_prefix:?}"
                )));
            }

            let mut node = TrieNode::new(record.prefix.clone(), Some(parent));
            node.is_word = is_word;
            node.top_results = top_results;
            let id = self.nodes.insert(node);
            self.nodes[parent].children.insert(key, id);

            index = self.build_children(id, children, records, index + 1)?;
        }
        Ok(index)
    }
}
