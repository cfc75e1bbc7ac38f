//! Error types for the Anchor checkpoint subsystem.
use thiserror::Error;

use crate::types::Hash256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("checkpoint mismatch at height {height}: expected {expected}, got {got}")] Mismatch { height: u64, expected: Hash256, got: Hash256 },
    #[error("height {height} is at or below sync checkpoint {sync_height}")] BelowSyncCheckpoint { height: u64, sync_height: u64 },
    #[error("checkpoint table not strictly ascending: {prev} then {next}")] UnorderedTable { prev: u64, next: u64 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainIndexError {
    #[error("duplicate block: {0}")] DuplicateBlock(Hash256),
    #[error("unknown parent {parent} for block {hash}")] UnknownParent { hash: Hash256, parent: Hash256 },
    #[error("unknown block: {0}")] UnknownBlock(Hash256),
    #[error("genesis already set: {0}")] GenesisExists(Hash256),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashParseError {
    #[error("invalid length: expected 64 hex chars, got {0}")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug)]
pub enum AnchorError {
    #[error(transparent)] Checkpoint(#[from] CheckpointError),
    #[error(transparent)] ChainIndex(#[from] ChainIndexError),
    #[error(transparent)] HashParse(#[from] HashParseError),
}
