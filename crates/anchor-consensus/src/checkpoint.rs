//! Hard-coded checkpoint verification.
//!
//! A [`Checkpoints`] value binds one network's [`CheckpointTable`] and answers
//! three questions against it: does a block at a checkpointed height carry
//! the pinned hash, how far along is the chain at least, and which is the
//! newest checkpoint this node actually has locally.
//!
//! # Attack vectors
//!
//! - **Long-range rewrite:** Without checkpoints an attacker with enough hash
//!   power could rewrite arbitrarily deep history. A block whose hash differs
//!   from the table at a checkpointed height is vetoed, so any rewrite must
//!   keep every pinned block.
//!
//! - **Wrong-network table:** Mainnet and testnet each get their own table,
//!   picked from [`NetworkType`] at construction. A node configured for
//!   testnet never vetoes blocks against mainnet pins, and vice versa.
//!
//! # Usage
//!
//! Block acceptance should call [`Checkpoints::verify_hardened`] (or the
//! boolean [`Checkpoints::check_hardened`]) before appending a block whose
//! height is known, and must reject the block on failure rather than just
//! log it. Depth limits on reorganizations live in [`crate::sync`].

use anchor_core::constants::NetworkType;
use anchor_core::error::CheckpointError;
use anchor_core::traits::HashIndex;
use anchor_core::types::{ChainNode, Hash256};
use tracing::warn;

/// One pinned `(height, hash)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointEntry {
    pub height: u64,
    pub hash: Hash256,
}

/// Immutable height → hash table, strictly ascending by height.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckpointTable {
    entries: Vec<CheckpointEntry>,
}

impl CheckpointTable {
    /// The compiled-in table for `network`.
    pub fn for_network(network: NetworkType) -> Self {
        let entries: Vec<_> = network
            .checkpoints()
            .iter()
            .map(|&(height, hash)| CheckpointEntry {
                height,
                hash: Hash256(hash),
            })
            .collect();
        debug_assert!(entries.windows(2).all(|w| w[0].height < w[1].height));
        Self { entries }
    }

    /// Build a table from caller-supplied entries.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::UnorderedTable`] unless heights are strictly
    /// increasing in the order given.
    pub fn from_entries<I>(entries: I) -> Result<Self, CheckpointError>
    where
        I: IntoIterator<Item = (u64, Hash256)>,
    {
        let entries: Vec<_> = entries
            .into_iter()
            .map(|(height, hash)| CheckpointEntry { height, hash })
            .collect();
        if let Some(w) = entries.windows(2).find(|w| w[0].height >= w[1].height) {
            return Err(CheckpointError::UnorderedTable {
                prev: w[0].height,
                next: w[1].height,
            });
        }
        Ok(Self { entries })
    }

    /// A table with no checkpoints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The pinned hash at `height`, if that height is checkpointed.
    pub fn get(&self, height: u64) -> Option<&Hash256> {
        self.entries
            .binary_search_by_key(&height, |e| e.height)
            .ok()
            .map(|i| &self.entries[i].hash)
    }

    /// All entries, lowest height first.
    pub fn entries(&self) -> &[CheckpointEntry] {
        &self.entries
    }

    /// The highest checkpoint.
    pub fn last(&self) -> Option<&CheckpointEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Checkpoint verifier bound to one network's table.
///
/// The network is fixed at construction; every query reads the same table.
#[derive(Clone, Debug)]
pub struct Checkpoints {
    network: NetworkType,
    table: CheckpointTable,
}

impl Checkpoints {
    /// Use the compiled-in table for `network`.
    pub fn new(network: NetworkType) -> Self {
        Self {
            network,
            table: CheckpointTable::for_network(network),
        }
    }

    /// Use an explicit table. Intended for tests and tooling.
    pub fn with_table(network: NetworkType, table: CheckpointTable) -> Self {
        Self { network, table }
    }

    pub fn network(&self) -> NetworkType {
        self.network
    }

    pub fn table(&self) -> &CheckpointTable {
        &self.table
    }

    /// Whether a block at `height` with `hash` agrees with the table.
    ///
    /// Heights without a checkpoint impose no constraint and return `true`.
    /// At a checkpointed height the full 32-byte hash must match.
    ///
    /// A `false` result is a veto: the block, and any chain containing it,
    /// must be rejected.
    pub fn check_hardened(&self, height: u64, hash: &Hash256) -> bool {
        match self.table.get(height) {
            Some(expected) => expected == hash,
            None => true,
        }
    }

    /// Like [`check_hardened`](Self::check_hardened) but returns an error
    /// callers can propagate.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Mismatch`] when `hash` differs from the
    /// checkpoint at `height`.
    pub fn verify_hardened(&self, height: u64, hash: &Hash256) -> Result<(), CheckpointError> {
        match self.table.get(height) {
            Some(expected) if expected != hash => {
                warn!(
                    network = %self.network,
                    height,
                    expected = %expected,
                    got = %hash,
                    "block hash conflicts with checkpoint"
                );
                Err(CheckpointError::Mismatch {
                    height,
                    expected: *expected,
                    got: *hash,
                })
            }
            _ => Ok(()),
        }
    }

    /// Lower bound on the chain length: the highest checkpoint height, or 0
    /// if the table is empty.
    ///
    /// Only meant for progress display.
    pub fn total_blocks_estimate(&self) -> u64 {
        self.table.last().map_or(0, |e| e.height)
    }

    /// The newest checkpoint whose block is present in `index`.
    ///
    /// Scans from the highest checkpoint down and returns the first node
    /// found. A partially synced or pruned node may lack recent checkpoint
    /// blocks; this is the newest one it can anchor to. Returns `None` if no
    /// checkpoint hash is known locally or the table is empty.
    pub fn last_checkpoint<'i, I>(&self, index: &'i I) -> Option<&'i ChainNode>
    where
        I: HashIndex + ?Sized,
    {
        self.table
            .entries()
            .iter()
            .rev()
            .find_map(|entry| index.lookup(&entry.hash))
    }
}

impl Default for Checkpoints {
    fn default() -> Self {
        Self::new(NetworkType::default())
    }
}
