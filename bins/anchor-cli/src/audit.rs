//! Audit a headers file against the checkpoint policy.
//!
//! The file is a JSON array of `{ "hash": "...", "prev_hash": "..." }`
//! records, parents before children. The first record is genesis and has no
//! `prev_hash`. The last record is taken as the best tip.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use anchor_consensus::auto_select_sync_checkpoint;
use anchor_core::error::CheckpointError;
use anchor_core::types::Hash256;
use anchor_node_lib::{BlockSummary, CheckpointService, SharedChain};

/// One header as it appears in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderRecord {
    pub hash: String,
    #[serde(default)]
    pub prev_hash: Option<String>,
}

/// Outcome of an audit.
#[derive(Debug)]
pub struct AuditReport {
    /// Number of indexed blocks.
    pub blocks: usize,
    /// The best tip (last record).
    pub tip: BlockSummary,
    /// Best-chain blocks that conflict with the checkpoint table, lowest first.
    pub mismatches: Vec<CheckpointError>,
    /// Newest checkpoint present in the file.
    pub last_checkpoint: Option<BlockSummary>,
    /// Sync checkpoint for the tip.
    pub sync_checkpoint: BlockSummary,
}

/// Read header records from a JSON file.
pub fn load_headers(path: &Path) -> Result<Vec<HeaderRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing {}", path.display()))
}

/// Index the records and point the best tip at the last one.
pub fn build_chain(records: &[HeaderRecord]) -> Result<SharedChain> {
    let Some((genesis, rest)) = records.split_first() else {
        bail!("headers file is empty");
    };
    if genesis.prev_hash.is_some() {
        bail!("first record must be genesis (no prev_hash)");
    }
    let genesis_hash: Hash256 = genesis.hash.parse().context("record 0: hash")?;
    let chain = SharedChain::new(genesis_hash);

    let mut last = genesis_hash;
    for (i, record) in rest.iter().enumerate() {
        let n = i + 1;
        let hash: Hash256 = record
            .hash
            .parse()
            .with_context(|| format!("record {n}: hash"))?;
        let Some(prev) = record.prev_hash.as_deref() else {
            bail!("record {n}: missing prev_hash");
        };
        let prev: Hash256 = prev
            .parse()
            .with_context(|| format!("record {n}: prev_hash"))?;
        chain
            .add_block(hash, &prev)
            .with_context(|| format!("record {n}"))?;
        last = hash;
    }
    chain.set_best_tip(&last)?;
    Ok(chain)
}

/// Check the best chain against the service's checkpoint table.
///
/// Every field of the report comes from the same read lock.
pub fn audit(service: &CheckpointService) -> AuditReport {
    let checkpoints = service.checkpoints();
    let state = service.chain().read();
    let tip = state.best_tip();

    let mut mismatches: Vec<_> = tip
        .ancestors()
        .filter_map(|node| checkpoints.verify_hardened(node.height, &node.hash).err())
        .collect();
    mismatches.reverse();

    let last_checkpoint = checkpoints
        .last_checkpoint(state.index())
        .map(|node| BlockSummary {
            height: node.height,
            hash: node.hash,
        });
    let sync = auto_select_sync_checkpoint(tip);

    AuditReport {
        blocks: state.index().len(),
        tip: BlockSummary {
            height: tip.height(),
            hash: tip.hash(),
        },
        mismatches,
        last_checkpoint,
        sync_checkpoint: BlockSummary {
            height: sync.height,
            hash: sync.hash,
        },
    }
}
