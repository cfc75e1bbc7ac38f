//! Combined checkpoint policy for block acceptance and reorganizations.
//!
//! [`CheckpointPolicy`] is what the node calls. It applies the hash veto from
//! [`crate::checkpoint`] and the depth guard from [`crate::sync`] in one place
//! so no acceptance path can skip either.

use anchor_core::chain_index::ChainTip;
use anchor_core::constants::NetworkType;
use anchor_core::error::CheckpointError;
use anchor_core::types::{ChainNode, Hash256};
use tracing::{debug, warn};

use crate::checkpoint::Checkpoints;
use crate::sync;

/// Shape of an accepted reorganization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReorgSummary {
    /// Height of the last block shared by both branches.
    pub fork_height: u64,
    /// Blocks removed from the current chain.
    pub disconnect: u64,
    /// Blocks added from the candidate branch.
    pub connect: u64,
}

/// Hash checkpoints plus sync-depth guard.
#[derive(Clone, Debug, Default)]
pub struct CheckpointPolicy {
    checkpoints: Checkpoints,
}

impl CheckpointPolicy {
    pub fn new(checkpoints: Checkpoints) -> Self {
        Self { checkpoints }
    }

    /// Policy over the compiled-in table for `network`.
    pub fn for_network(network: NetworkType) -> Self {
        Self::new(Checkpoints::new(network))
    }

    pub fn checkpoints(&self) -> &Checkpoints {
        &self.checkpoints
    }

    /// Check a block at `height` with `hash` before it is appended.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::Mismatch`] if `height` is checkpointed with a
    ///   different hash
    /// - [`CheckpointError::BelowSyncCheckpoint`] if `height` is at or below
    ///   the sync checkpoint for `tip`
    pub fn check_block(
        &self,
        tip: ChainTip<'_>,
        height: u64,
        hash: &Hash256,
    ) -> Result<(), CheckpointError> {
        self.checkpoints.verify_hardened(height, hash)?;
        sync::verify_sync(tip, height)?;
        debug!(height, %hash, "block passes checkpoint policy");
        Ok(())
    }

    /// Check a switch from `tip` to `candidate`.
    ///
    /// The first block replaced on the current chain must lie above the sync
    /// checkpoint, and every block the candidate branch adds must agree with
    /// the hash checkpoints.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::BelowSyncCheckpoint`] if the fork is too deep
    ///   (branches without a common ancestor count as forking below genesis)
    /// - [`CheckpointError::Mismatch`] for the first conflicting block on the
    ///   candidate branch, newest first
    pub fn check_reorg(
        &self,
        tip: ChainTip<'_>,
        candidate: ChainTip<'_>,
    ) -> Result<ReorgSummary, CheckpointError> {
        let Some(fork) = fork_point(tip, candidate) else {
            warn!(
                tip = %tip.hash(),
                candidate = %candidate.hash(),
                "candidate shares no ancestor with current chain"
            );
            let sync_height = sync::auto_select_sync_checkpoint(tip).height;
            return Err(CheckpointError::BelowSyncCheckpoint {
                height: 0,
                sync_height,
            });
        };

        // Nothing on the current chain is replaced when the candidate simply
        // extends it.
        if fork.hash != tip.hash() {
            sync::verify_sync(tip, fork.height.saturating_add(1))?;
        }

        for node in candidate.ancestors().take_while(|n| n.hash != fork.hash) {
            self.checkpoints.verify_hardened(node.height, &node.hash)?;
        }

        let summary = ReorgSummary {
            fork_height: fork.height,
            disconnect: tip.height() - fork.height,
            connect: candidate.height() - fork.height,
        };
        debug!(
            fork_height = summary.fork_height,
            disconnect = summary.disconnect,
            connect = summary.connect,
            "reorg passes checkpoint policy"
        );
        Ok(summary)
    }
}

/// Last block shared by the chains ending at `a` and `b`.
fn fork_point<'a>(a: ChainTip<'a>, b: ChainTip<'a>) -> Option<&'a ChainNode> {
    let mut x = a.node();
    let mut y = b.node();
    while x.height > y.height {
        x = a.parent_of(x)?;
    }
    while y.height > x.height {
        y = b.parent_of(y)?;
    }
    while x.hash != y.hash {
        x = a.parent_of(x)?;
        y = b.parent_of(y)?;
    }
    Some(x)
}
