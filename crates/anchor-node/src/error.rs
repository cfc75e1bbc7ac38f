//! Errors surfaced by the node-side checkpoint service.
use thiserror::Error;

use anchor_core::error::{ChainIndexError, CheckpointError};

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)] Checkpoint(#[from] CheckpointError),
    #[error(transparent)] ChainIndex(#[from] ChainIndexError),
    #[error("config: {0}")] Config(#[from] config::ConfigError),
}
