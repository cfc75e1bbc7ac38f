//! Trait interfaces between the checkpoint core and its collaborators.
//!
//! - [`HashIndex`] — "blocks currently known locally", keyed by hash.
//!   Implemented by [`ChainIndex`] and by plain `HashMap`/`BTreeMap`s of
//!   [`ChainNode`]s.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::chain_index::ChainIndex;
use crate::types::{ChainNode, Hash256};

/// Hash-addressed view of the blocks the local node has materialized.
///
/// Membership is independent of whether a block is on the best chain.
pub trait HashIndex {
    /// Look up a block by hash. Returns `None` if it is not known locally.
    fn lookup(&self, hash: &Hash256) -> Option<&ChainNode>;

    /// Whether a block with this hash is known locally.
    ///
    /// Default implementation delegates to [`lookup`](Self::lookup).
    fn contains_hash(&self, hash: &Hash256) -> bool {
        self.lookup(hash).is_some()
    }
}

impl HashIndex for ChainIndex {
    fn lookup(&self, hash: &Hash256) -> Option<&ChainNode> {
        self.by_hash(hash)
    }
}

impl<S: BuildHasher> HashIndex for HashMap<Hash256, ChainNode, S> {
    fn lookup(&self, hash: &Hash256) -> Option<&ChainNode> {
        self.get(hash)
    }
}

impl HashIndex for BTreeMap<Hash256, ChainNode> {
    fn lookup(&self, hash: &Hash256) -> Option<&ChainNode> {
        self.get(hash)
    }
}

impl<T: HashIndex + ?Sized> HashIndex for &T {
    fn lookup(&self, hash: &Hash256) -> Option<&ChainNode> {
        (**self).lookup(hash)
    }
}
