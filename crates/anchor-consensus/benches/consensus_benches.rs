//! Criterion benchmarks for anchor-consensus hot paths.
//!
//! Covers: hash checkpoint lookup, newest-known-checkpoint scan, and the
//! sync checkpoint walk on a chain deep enough to take the full span.

use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use anchor_core::chain_index::ChainIndex;
use anchor_core::constants::{NetworkType, MAINNET_CHECKPOINTS};
use anchor_core::types::{ChainNode, Hash256};

use anchor_consensus::{check_sync, Checkpoints};

fn hash_at(height: u64) -> Hash256 {
    let mut bytes = [0x42; 32];
    bytes[..8].copy_from_slice(&height.to_le_bytes());
    Hash256(bytes)
}

fn bench_check_hardened(c: &mut Criterion) {
    let checkpoints = Checkpoints::new(NetworkType::Mainnet);
    let (height, pinned) = MAINNET_CHECKPOINTS[4];
    let pinned = Hash256(pinned);

    c.bench_function("check_hardened_hit", |b| {
        b.iter(|| checkpoints.check_hardened(black_box(height), black_box(&pinned)))
    });
    c.bench_function("check_hardened_miss", |b| {
        b.iter(|| checkpoints.check_hardened(black_box(12_345), black_box(&pinned)))
    });
}

fn bench_last_checkpoint(c: &mut Criterion) {
    let checkpoints = Checkpoints::new(NetworkType::Mainnet);
    // Only genesis is known, so the scan visits every entry.
    let (_, genesis) = MAINNET_CHECKPOINTS[0];
    let mut index = HashMap::new();
    index.insert(Hash256(genesis), ChainNode::detached(0, Hash256(genesis)));

    c.bench_function("last_checkpoint_worst_case", |b| {
        b.iter(|| checkpoints.last_checkpoint(black_box(&index)))
    });
}

fn bench_check_sync(c: &mut Criterion) {
    let mut index = ChainIndex::with_genesis(hash_at(0));
    for height in 1..=2_000 {
        index.insert(hash_at(height), &hash_at(height - 1)).unwrap();
    }
    let tip_id = index.id_of(&hash_at(2_000)).unwrap();

    c.bench_function("check_sync_full_span", |b| {
        b.iter(|| {
            let tip = index.tip(tip_id).unwrap();
            check_sync(tip, black_box(1_600))
        })
    });
}

criterion_group!(benches, bench_check_hardened, bench_last_checkpoint, bench_check_sync);
criterion_main!(benches);
