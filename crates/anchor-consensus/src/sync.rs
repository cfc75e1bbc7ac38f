//! Sync checkpoint selection and the reorg depth guard.
//!
//! The sync checkpoint is the block [`CHECKPOINT_SPAN`] heights behind the
//! best tip (or genesis on a shorter chain). Nothing at or below it may be
//! replaced. It is recomputed from the tip on every call and never stored,
//! so it always moves with the live chain.
//!
//! This is a depth policy, independent of the hash checkpoints in
//! [`crate::checkpoint`]: a height with no pinned hash is still protected
//! once it falls deep enough behind the tip.
//!
//! The walk borrows a [`ChainTip`] snapshot. Callers sharing the index
//! between threads must hold their read lock for the whole call.

use anchor_core::chain_index::ChainTip;
use anchor_core::constants::CHECKPOINT_SPAN;
use anchor_core::error::CheckpointError;
use anchor_core::types::ChainNode;
use tracing::warn;

/// Select the sync checkpoint for `tip` using [`CHECKPOINT_SPAN`].
pub fn auto_select_sync_checkpoint<'a>(tip: ChainTip<'a>) -> &'a ChainNode {
    select_sync_checkpoint_with(tip, CHECKPOINT_SPAN)
}

/// Like [`auto_select_sync_checkpoint`] but with an explicit span.
///
/// Walks parent links from the tip while a parent exists and the candidate
/// is still fewer than `span` heights behind the tip. At most `span` steps.
pub fn select_sync_checkpoint_with<'a>(tip: ChainTip<'a>, span: u64) -> &'a ChainNode {
    let tip_height = tip.height();
    let mut candidate = tip.node();
    while candidate.height.saturating_add(span) > tip_height {
        match tip.parent_of(candidate) {
            Some(parent) => candidate = parent,
            None => break,
        }
    }
    candidate
}

/// Whether `height` lies strictly above the sync checkpoint for `tip`.
///
/// Blocks at or below the sync checkpoint must not be replaced or inserted.
pub fn check_sync(tip: ChainTip<'_>, height: u64) -> bool {
    height > auto_select_sync_checkpoint(tip).height
}

/// Like [`check_sync`] but returns an error callers can propagate.
///
/// # Errors
///
/// Returns [`CheckpointError::BelowSyncCheckpoint`] when `height` is at or
/// below the sync checkpoint.
pub fn verify_sync(tip: ChainTip<'_>, height: u64) -> Result<(), CheckpointError> {
    let sync = auto_select_sync_checkpoint(tip);
    if height > sync.height {
        return Ok(());
    }
    warn!(
        height,
        sync_height = sync.height,
        sync_hash = %sync.hash,
        tip_height = tip.height(),
        "rejecting change at or below sync checkpoint"
    );
    Err(CheckpointError::BelowSyncCheckpoint {
        height,
        sync_height: sync.height,
    })
}
