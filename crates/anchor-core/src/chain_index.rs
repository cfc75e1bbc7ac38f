//! In-memory block index: an arena of [`ChainNode`]s addressed by [`NodeId`].
//!
//! A block can only be inserted on top of a parent the index already knows,
//! so every node's ancestor chain is unbroken down to genesis. Parent lookup
//! is an O(1) arena access, and a [`ChainTip`] handle can only be obtained
//! for a node that exists, which is what lets the checkpoint walks in
//! `anchor-consensus` be infallible.
//!
//! The index does not pick a best chain. Side branches live alongside the
//! main chain; which node is the tip is decided by the caller.
//!
//! Not thread-safe. Callers should wrap in a `RwLock` and hold one read guard
//! for the duration of any walk.

use std::collections::HashMap;

use crate::error::ChainIndexError;
use crate::types::{ChainNode, Hash256, NodeId};

/// Arena of known blocks plus a hash → id map.
#[derive(Debug, Default, Clone)]
pub struct ChainIndex {
    /// Arena: `NodeId(i)` addresses `nodes[i]`. Append-only.
    nodes: Vec<ChainNode>,
    /// Hash → arena id.
    by_hash: HashMap<Hash256, NodeId>,
}

impl ChainIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index holding only the genesis block.
    pub fn with_genesis(genesis_hash: Hash256) -> Self {
        let mut index = Self::new();
        index.push(ChainNode::new(0, genesis_hash, None));
        index
    }

    /// Insert the genesis block (height 0, no parent).
    ///
    /// # Errors
    ///
    /// - [`ChainIndexError::DuplicateBlock`] if the hash is already indexed
    /// - [`ChainIndexError::GenesisExists`] if a genesis block is already set
    pub fn insert_genesis(&mut self, hash: Hash256) -> Result<NodeId, ChainIndexError> {
        if self.by_hash.contains_key(&hash) {
            return Err(ChainIndexError::DuplicateBlock(hash));
        }
        if let Some(genesis) = self.genesis() {
            return Err(ChainIndexError::GenesisExists(genesis.hash));
        }
        Ok(self.push(ChainNode::new(0, hash, None)))
    }

    /// Insert a block on top of `parent`. Its height is `parent.height + 1`.
    ///
    /// # Errors
    ///
    /// - [`ChainIndexError::DuplicateBlock`] if the hash is already indexed
    /// - [`ChainIndexError::UnknownParent`] if `parent` is not indexed
    pub fn insert(&mut self, hash: Hash256, parent: &Hash256) -> Result<NodeId, ChainIndexError> {
        if self.by_hash.contains_key(&hash) {
            return Err(ChainIndexError::DuplicateBlock(hash));
        }
        let parent_id = self
            .by_hash
            .get(parent)
            .copied()
            .ok_or(ChainIndexError::UnknownParent {
                hash,
                parent: *parent,
            })?;
        let height = self.nodes[parent_id.0].height.saturating_add(1);
        Ok(self.push(ChainNode::new(height, hash, Some(parent_id))))
    }

    fn push(&mut self, node: ChainNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.by_hash.insert(node.hash, id);
        self.nodes.push(node);
        id
    }

    /// Look up a node by arena id.
    pub fn get(&self, id: NodeId) -> Option<&ChainNode> {
        self.nodes.get(id.0)
    }

    /// Arena id of the block with this hash.
    pub fn id_of(&self, hash: &Hash256) -> Option<NodeId> {
        self.by_hash.get(hash).copied()
    }

    /// Look up a node by block hash.
    pub fn by_hash(&self, hash: &Hash256) -> Option<&ChainNode> {
        self.id_of(hash).and_then(|id| self.get(id))
    }

    /// Whether a block with this hash is indexed.
    pub fn contains(&self, hash: &Hash256) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Parent of `node`, `None` at genesis.
    pub fn parent_of(&self, node: &ChainNode) -> Option<&ChainNode> {
        node.parent().and_then(|id| self.get(id))
    }

    /// The genesis block, if one has been inserted.
    pub fn genesis(&self) -> Option<&ChainNode> {
        self.nodes.first()
    }

    /// Snapshot handle rooted at `id`, for ancestor walks.
    ///
    /// Returns `None` if `id` does not belong to this index.
    pub fn tip(&self, id: NodeId) -> Option<ChainTip<'_>> {
        self.get(id).map(|node| ChainTip { index: self, node })
    }

    /// Snapshot handle rooted at the block with this hash.
    pub fn tip_by_hash(&self, hash: &Hash256) -> Option<ChainTip<'_>> {
        self.id_of(hash).and_then(|id| self.tip(id))
    }

    /// Iterate from `id` back to genesis, inclusive at both ends.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            next: self.get(id),
        }
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no blocks are indexed.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A borrowed view of a chain ending at a particular node.
///
/// This is the explicit "best tip" snapshot the checkpoint walks take as a
/// parameter. Holding one keeps the index borrowed, so the chain cannot move
/// under the walk.
#[derive(Debug, Clone, Copy)]
pub struct ChainTip<'a> {
    index: &'a ChainIndex,
    node: &'a ChainNode,
}

impl<'a> ChainTip<'a> {
    /// The tip node.
    pub fn node(&self) -> &'a ChainNode {
        self.node
    }

    /// Height of the tip.
    pub fn height(&self) -> u64 {
        self.node.height
    }

    /// Hash of the tip.
    pub fn hash(&self) -> Hash256 {
        self.node.hash
    }

    /// The index this tip belongs to.
    pub fn index(&self) -> &'a ChainIndex {
        self.index
    }

    /// Parent of `node` within the same index.
    pub fn parent_of(&self, node: &ChainNode) -> Option<&'a ChainNode> {
        self.index.parent_of(node)
    }

    /// Iterate from the tip back to genesis.
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors {
            index: self.index,
            next: Some(self.node),
        }
    }
}

/// Iterator over a node and its ancestors, newest first.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    index: &'a ChainIndex,
    next: Option<&'a ChainNode>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ChainNode;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.index.parent_of(current);
        Some(current)
    }
}
