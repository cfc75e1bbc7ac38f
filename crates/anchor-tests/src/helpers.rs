//! Shared test helpers for integration and adversarial tests.

use anchor_consensus::{CheckpointTable, Checkpoints};
use anchor_core::chain_index::ChainIndex;
use anchor_core::constants::NetworkType;
use anchor_core::types::Hash256;

/// Distinct main-chain hash per height.
pub fn hash_at(height: u64) -> Hash256 {
    tagged_hash(0x4D, height)
}

/// Distinct hash per `(tag, height)`, for side branches.
///
/// Tags other than `0x4D` never collide with [`hash_at`].
pub fn tagged_hash(tag: u8, height: u64) -> Hash256 {
    let mut bytes = [tag; 32];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    Hash256(bytes)
}

/// Linear chain `0..=tip_height`, one block per height, hashes from [`hash_at`].
pub fn linear_chain(tip_height: u64) -> ChainIndex {
    let mut index = ChainIndex::with_genesis(hash_at(0));
    for height in 1..=tip_height {
        index
            .insert(hash_at(height), &hash_at(height - 1))
            .expect("linear insert");
    }
    index
}

/// Extend `index` with a branch of `len` blocks on top of main-chain block
/// `fork_height`, hashed with `tag`. Returns the branch tip hash.
pub fn add_branch(index: &mut ChainIndex, tag: u8, fork_height: u64, len: u64) -> Hash256 {
    let mut parent = hash_at(fork_height);
    for height in fork_height + 1..=fork_height + len {
        let hash = tagged_hash(tag, height);
        index.insert(hash, &parent).expect("branch insert");
        parent = hash;
    }
    parent
}

/// Checkpoints over an explicit `(height, hash)` list.
pub fn checkpoints_with(entries: &[(u64, Hash256)]) -> Checkpoints {
    let table = CheckpointTable::from_entries(entries.iter().copied()).expect("ascending table");
    Checkpoints::with_table(NetworkType::Mainnet, table)
}
