//! # anchor-node — Checkpoint service composition.
//!
//! Wires the checkpoint policy into a node:
//! - [`NodeConfig`] — network and logging configuration
//! - [`chain::SharedChain`] — block index and best tip behind a `RwLock`
//! - [`service::CheckpointService`] — checkpoint queries under one read lock

pub mod chain;
pub mod config;
pub mod error;
pub mod service;

pub use chain::SharedChain;
pub use self::config::{LogFormat, NodeConfig};
pub use error::NodeError;
pub use service::{BlockSummary, CheckpointService};
