//! Shared block index plus best tip, behind a `RwLock`.
//!
//! [`SharedChain`] stands in for the node's chain-selection layer: it owns
//! the [`ChainIndex`] and decides which node is the best tip. Checkpoint
//! queries take one read lock for their whole duration, so the tip cannot
//! move under an ancestor walk.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard};
use tracing::debug;

use anchor_core::chain_index::{ChainIndex, ChainTip};
use anchor_core::error::ChainIndexError;
use anchor_core::types::{Hash256, NodeId};

/// Block index and the id of the current best tip.
#[derive(Debug)]
pub struct ChainState {
    index: ChainIndex,
    best: NodeId,
}

impl ChainState {
    fn new(genesis_hash: Hash256) -> Self {
        let mut index = ChainIndex::new();
        let best = index
            .insert_genesis(genesis_hash)
            .expect("fresh index accepts genesis");
        Self { index, best }
    }

    /// The block index.
    pub fn index(&self) -> &ChainIndex {
        &self.index
    }

    /// Snapshot of the current best tip.
    ///
    /// The best tip starts at genesis and is only ever replaced with the id
    /// of an indexed block.
    pub fn best_tip(&self) -> ChainTip<'_> {
        self.index
            .tip(self.best)
            .expect("best tip is always an indexed block")
    }

    /// Index a block on top of `parent`, returning its height.
    ///
    /// # Errors
    ///
    /// - [`ChainIndexError::DuplicateBlock`] if the hash is already indexed
    /// - [`ChainIndexError::UnknownParent`] if `parent` is not indexed
    pub fn insert_block(&mut self, hash: Hash256, parent: &Hash256) -> Result<u64, ChainIndexError> {
        let id = self.index.insert(hash, parent)?;
        let height = self.index.get(id).map_or(0, |n| n.height);
        debug!(%hash, height, "indexed block");
        Ok(height)
    }

    /// Make the block with `hash` the best tip.
    ///
    /// # Errors
    ///
    /// Returns [`ChainIndexError::UnknownBlock`] if the hash is not indexed.
    pub fn set_best_tip(&mut self, hash: &Hash256) -> Result<(), ChainIndexError> {
        self.best = self
            .index
            .id_of(hash)
            .ok_or(ChainIndexError::UnknownBlock(*hash))?;
        debug!(%hash, "best tip updated");
        Ok(())
    }
}

/// Cloneable handle to the shared chain state.
#[derive(Clone, Debug)]
pub struct SharedChain {
    inner: Arc<RwLock<ChainState>>,
}

impl SharedChain {
    /// Start a chain holding only the genesis block, which is the best tip.
    pub fn new(genesis_hash: Hash256) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ChainState::new(genesis_hash))),
        }
    }

    /// Take a read lock for a consistent snapshot.
    pub fn read(&self) -> RwLockReadGuard<'_, ChainState> {
        self.inner.read()
    }

    /// Take an upgradable read lock.
    ///
    /// Plain readers may share it, but no writer can get in until it is
    /// dropped or upgraded. Used to check a block and then insert it against
    /// the same best tip.
    pub fn upgradable_read(&self) -> RwLockUpgradableReadGuard<'_, ChainState> {
        self.inner.upgradable_read()
    }

    /// Index a block on top of `parent` without moving the best tip.
    ///
    /// Returns the new block's height.
    ///
    /// # Errors
    ///
    /// - [`ChainIndexError::DuplicateBlock`] if the hash is already indexed
    /// - [`ChainIndexError::UnknownParent`] if `parent` is not indexed
    pub fn add_block(&self, hash: Hash256, parent: &Hash256) -> Result<u64, ChainIndexError> {
        self.inner.write().insert_block(hash, parent)
    }

    /// Make the block with `hash` the best tip.
    ///
    /// # Errors
    ///
    /// Returns [`ChainIndexError::UnknownBlock`] if the hash is not indexed.
    pub fn set_best_tip(&self, hash: &Hash256) -> Result<(), ChainIndexError> {
        self.inner.write().set_best_tip(hash)
    }

    /// Height and hash of the current best tip.
    pub fn best_tip(&self) -> (u64, Hash256) {
        let state = self.read();
        let tip = state.best_tip();
        (tip.height(), tip.hash())
    }

    /// Number of indexed blocks. Never zero: genesis is indexed on creation.
    pub fn block_count(&self) -> usize {
        self.read().index().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(seed: u8) -> Hash256 {
        Hash256([seed; 32])
    }

    #[test]
    fn starts_at_genesis() {
        let chain = SharedChain::new(h(1));
        assert_eq!(chain.best_tip(), (0, h(1)));
        assert_eq!(chain.block_count(), 1);
    }

    #[test]
    fn add_block_does_not_move_tip() {
        let chain = SharedChain::new(h(1));
        assert_eq!(chain.add_block(h(2), &h(1)).unwrap(), 1);
        assert_eq!(chain.best_tip(), (0, h(1)));

        chain.set_best_tip(&h(2)).unwrap();
        assert_eq!(chain.best_tip(), (1, h(2)));
    }

    #[test]
    fn set_best_tip_rejects_unknown_block() {
        let chain = SharedChain::new(h(1));
        assert_eq!(
            chain.set_best_tip(&h(9)).unwrap_err(),
            ChainIndexError::UnknownBlock(h(9))
        );
        assert_eq!(chain.best_tip(), (0, h(1)));
    }

    #[test]
    fn clones_share_state() {
        let chain = SharedChain::new(h(1));
        let other = chain.clone();
        other.add_block(h(2), &h(1)).unwrap();
        other.set_best_tip(&h(2)).unwrap();
        assert_eq!(chain.best_tip(), (1, h(2)));
    }

    #[test]
    fn upgraded_guard_writes_through() {
        let chain = SharedChain::new(h(1));
        let guard = chain.upgradable_read();
        assert_eq!(guard.best_tip().height(), 0);
        let mut state = RwLockUpgradableReadGuard::upgrade(guard);
        assert_eq!(state.insert_block(h(2), &h(1)).unwrap(), 1);
        state.set_best_tip(&h(2)).unwrap();
        drop(state);
        assert_eq!(chain.best_tip(), (1, h(2)));
    }

    #[test]
    fn concurrent_readers_see_consistent_tip() {
        let chain = SharedChain::new(h(1));
        let mut parent = h(1);
        for seed in 2..=50u8 {
            chain.add_block(h(seed), &parent).unwrap();
            parent = h(seed);
        }
        chain.set_best_tip(&h(50)).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let chain = chain.clone();
                std::thread::spawn(move || {
                    let state = chain.read();
                    let tip = state.best_tip();
                    let walked = tip.ancestors().count() as u64;
                    walked == tip.height() + 1
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
