//! Checkpoint service: the checkpoint policy wired to the shared chain.
//!
//! Every method that looks at the chain holds one read lock for its whole
//! duration, which is the consistent snapshot the ancestor walks need.
//! [`CheckpointService::accept_block`] holds an upgradable read lock and
//! upgrades it to insert, so the tip it checked against is the tip in place
//! when the block lands.

use parking_lot::RwLockUpgradableReadGuard;
use tracing::{debug, info};

use anchor_consensus::sync;
use anchor_consensus::{CheckpointPolicy, Checkpoints, ReorgSummary};
use anchor_core::constants::NetworkType;
use anchor_core::error::ChainIndexError;
use anchor_core::types::Hash256;

use crate::chain::SharedChain;
use crate::config::NodeConfig;
use crate::error::NodeError;

/// Owned `(height, hash)` of a block, returned once the lock is released.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSummary {
    pub height: u64,
    pub hash: Hash256,
}

/// Checkpoint queries against the live chain.
#[derive(Clone, Debug)]
pub struct CheckpointService {
    policy: CheckpointPolicy,
    chain: SharedChain,
}

impl CheckpointService {
    /// Service over the compiled-in table for the configured network.
    pub fn new(config: &NodeConfig, chain: SharedChain) -> Self {
        info!(network = %config.network_type, "checkpoint service starting");
        Self::with_policy(CheckpointPolicy::for_network(config.network_type), chain)
    }

    /// Service over an explicit policy.
    pub fn with_policy(policy: CheckpointPolicy, chain: SharedChain) -> Self {
        Self { policy, chain }
    }

    pub fn network(&self) -> NetworkType {
        self.checkpoints().network()
    }

    pub fn checkpoints(&self) -> &Checkpoints {
        self.policy.checkpoints()
    }

    pub fn chain(&self) -> &SharedChain {
        &self.chain
    }

    /// See [`Checkpoints::check_hardened`].
    pub fn check_hardened(&self, height: u64, hash: &Hash256) -> bool {
        self.checkpoints().check_hardened(height, hash)
    }

    /// See [`Checkpoints::total_blocks_estimate`].
    pub fn total_blocks_estimate(&self) -> u64 {
        self.checkpoints().total_blocks_estimate()
    }

    /// Newest checkpoint present in the local block index.
    pub fn last_checkpoint(&self) -> Option<BlockSummary> {
        let state = self.chain.read();
        self.checkpoints()
            .last_checkpoint(state.index())
            .map(|node| BlockSummary {
                height: node.height,
                hash: node.hash,
            })
    }

    /// Current sync checkpoint behind the best tip.
    pub fn sync_checkpoint(&self) -> BlockSummary {
        let state = self.chain.read();
        let node = sync::auto_select_sync_checkpoint(state.best_tip());
        BlockSummary {
            height: node.height,
            hash: node.hash,
        }
    }

    /// Whether `height` is above the current sync checkpoint.
    pub fn check_sync(&self, height: u64) -> bool {
        let state = self.chain.read();
        sync::check_sync(state.best_tip(), height)
    }

    /// Run the block policy for `hash` at `height` against the best tip.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Checkpoint`] when the block is vetoed.
    pub fn check_block(&self, height: u64, hash: &Hash256) -> Result<(), NodeError> {
        let state = self.chain.read();
        self.policy.check_block(state.best_tip(), height, hash)?;
        Ok(())
    }

    /// Run the reorg policy for switching the best tip to `candidate`.
    ///
    /// # Errors
    ///
    /// - [`NodeError::ChainIndex`] if `candidate` is not indexed
    /// - [`NodeError::Checkpoint`] when the switch is vetoed
    pub fn check_reorg(&self, candidate: &Hash256) -> Result<ReorgSummary, NodeError> {
        let state = self.chain.read();
        let candidate_tip = state
            .index()
            .tip_by_hash(candidate)
            .ok_or(ChainIndexError::UnknownBlock(*candidate))?;
        Ok(self.policy.check_reorg(state.best_tip(), candidate_tip)?)
    }

    /// Check a new block against the policy, then index it.
    ///
    /// The block's height is derived from `parent`. The best tip is not
    /// moved, and cannot be moved by another writer between the check and
    /// the insert. Returns the new height.
    ///
    /// # Errors
    ///
    /// - [`NodeError::ChainIndex`] if `parent` is unknown or `hash` is
    ///   already indexed
    /// - [`NodeError::Checkpoint`] when the block is vetoed; nothing is indexed
    pub fn accept_block(&self, hash: Hash256, parent: &Hash256) -> Result<u64, NodeError> {
        let state = self.chain.upgradable_read();
        let parent_node = state
            .index()
            .by_hash(parent)
            .ok_or(ChainIndexError::UnknownParent {
                hash,
                parent: *parent,
            })?;
        let height = parent_node.height.saturating_add(1);
        self.policy.check_block(state.best_tip(), height, &hash)?;

        let mut state = RwLockUpgradableReadGuard::upgrade(state);
        let height = state.insert_block(hash, parent)?;
        debug!(%hash, height, "block accepted");
        Ok(height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_consensus::CheckpointTable;
    use anchor_core::error::CheckpointError;

    fn hash_at(height: u64) -> Hash256 {
        let mut bytes = [0x77; 32];
        bytes[..8].copy_from_slice(&height.to_le_bytes());
        Hash256(bytes)
    }

    /// Linear chain 0..=tip, best tip at the top.
    fn chain_to(tip: u64) -> SharedChain {
        let chain = SharedChain::new(hash_at(0));
        for height in 1..=tip {
            chain.add_block(hash_at(height), &hash_at(height - 1)).unwrap();
        }
        chain.set_best_tip(&hash_at(tip)).unwrap();
        chain
    }

    fn service(chain: SharedChain) -> CheckpointService {
        let table = CheckpointTable::from_entries([
            (0, hash_at(0)),
            (300, hash_at(300)),
            (900, hash_at(900)),
        ])
        .unwrap();
        let policy = CheckpointPolicy::new(Checkpoints::with_table(NetworkType::Mainnet, table));
        CheckpointService::with_policy(policy, chain)
    }

    #[test]
    fn new_uses_configured_network() {
        let config = NodeConfig {
            network_type: NetworkType::Testnet,
            ..NodeConfig::default()
        };
        let svc = CheckpointService::new(&config, SharedChain::new(hash_at(0)));
        assert_eq!(svc.network(), NetworkType::Testnet);
        assert_eq!(svc.total_blocks_estimate(), 0);
        assert!(svc.last_checkpoint().is_none());
    }

    #[test]
    fn queries_follow_best_tip() {
        let svc = service(chain_to(600));
        assert_eq!(svc.total_blocks_estimate(), 900);
        assert_eq!(
            svc.last_checkpoint(),
            Some(BlockSummary {
                height: 300,
                hash: hash_at(300)
            })
        );
        assert_eq!(svc.sync_checkpoint().height, 100);
        assert!(svc.check_sync(101));
        assert!(!svc.check_sync(100));

        // Rewind the best tip: the sync checkpoint follows.
        svc.chain().set_best_tip(&hash_at(550)).unwrap();
        assert_eq!(svc.sync_checkpoint().height, 50);
        assert!(svc.check_sync(51));
    }

    #[test]
    fn accept_block_vetoes_checkpoint_conflict() {
        let svc = service(chain_to(0));
        let mut parent = hash_at(0);
        for height in 1..300 {
            svc.accept_block(hash_at(height), &parent).unwrap();
            parent = hash_at(height);
        }
        let forged = Hash256([0xEE; 32]);
        let err = svc.accept_block(forged, &parent).unwrap_err();
        assert!(matches!(
            err,
            NodeError::Checkpoint(CheckpointError::Mismatch { height: 300, .. })
        ));
        assert!(!svc.chain().read().index().contains(&forged));

        assert_eq!(svc.accept_block(hash_at(300), &parent).unwrap(), 300);
    }

    #[test]
    fn accept_block_rejects_deep_side_block() {
        let svc = service(chain_to(600));
        let err = svc
            .accept_block(Hash256([0xEE; 32]), &hash_at(40))
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::Checkpoint(CheckpointError::BelowSyncCheckpoint {
                height: 41,
                sync_height: 100
            })
        ));
    }

    #[test]
    fn accept_block_unknown_parent() {
        let svc = service(chain_to(5));
        let err = svc
            .accept_block(hash_at(7), &Hash256([0xDD; 32]))
            .unwrap_err();
        assert!(matches!(
            err,
            NodeError::ChainIndex(ChainIndexError::UnknownParent { .. })
        ));
    }

    #[test]
    fn check_reorg_unknown_candidate() {
        let svc = service(chain_to(5));
        let err = svc.check_reorg(&Hash256([0xDD; 32])).unwrap_err();
        assert!(matches!(
            err,
            NodeError::ChainIndex(ChainIndexError::UnknownBlock(_))
        ));
    }

    #[test]
    fn accept_block_checks_against_tip_at_insert() {
        let svc = service(chain_to(601));
        svc.chain().set_best_tip(&hash_at(600)).unwrap();
        let side = Hash256([0xEE; 32]);

        // Hold off writers while another thread tries to accept a block one
        // above the sync checkpoint, then advance the tip underneath it.
        let guard = svc.chain().upgradable_read();
        let handle = {
            let svc = svc.clone();
            std::thread::spawn(move || svc.accept_block(side, &hash_at(100)))
        };
        std::thread::sleep(std::time::Duration::from_millis(50));
        let mut state = RwLockUpgradableReadGuard::upgrade(guard);
        state.set_best_tip(&hash_at(601)).unwrap();
        drop(state);

        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(
            err,
            NodeError::Checkpoint(CheckpointError::BelowSyncCheckpoint {
                height: 101,
                sync_height: 101
            })
        ));
        assert!(!svc.chain().read().index().contains(&side));
    }

    #[test]
    fn check_reorg_rejects_deep_fork() {
        let svc = service(chain_to(600));
        let mut parent = hash_at(50);
        for i in 0..600u16 {
            let mut bytes = [0xC4; 32];
            bytes[..2].copy_from_slice(&i.to_le_bytes());
            let hash = Hash256(bytes);
            svc.chain().add_block(hash, &parent).unwrap();
            parent = hash;
        }
        let err = svc.check_reorg(&parent).unwrap_err();
        assert!(matches!(
            err,
            NodeError::Checkpoint(CheckpointError::BelowSyncCheckpoint {
                height: 51,
                sync_height: 100
            })
        ));
        assert_eq!(svc.chain().best_tip(), (600, hash_at(600)));
    }

    #[test]
    fn check_reorg_shallow_fork() {
        let svc = service(chain_to(600));
        let mut parent = hash_at(595);
        for i in 0..10u8 {
            let hash = Hash256([0xB0 + i; 32]);
            svc.chain().add_block(hash, &parent).unwrap();
            parent = hash;
        }
        let summary = svc.check_reorg(&parent).unwrap();
        assert_eq!(summary.fork_height, 595);
        assert_eq!(summary.disconnect, 5);
        assert_eq!(summary.connect, 10);
    }

    #[test]
    fn check_block_and_hardened() {
        let svc = service(chain_to(600));
        assert!(svc.check_hardened(300, &hash_at(300)));
        assert!(!svc.check_hardened(300, &hash_at(301)));
        assert!(svc.check_block(601, &hash_at(601)).is_ok());
        assert!(svc.check_block(900, &hash_at(1)).is_err());
    }
}
