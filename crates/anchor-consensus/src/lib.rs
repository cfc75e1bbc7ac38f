//! # anchor-consensus — Hard-coded checkpoints and reorg depth policy.
//!
//! - [`checkpoint`]: per-network checkpoint table, hash veto, progress
//!   estimate, and the newest locally known checkpoint.
//! - [`sync`]: the rolling sync checkpoint behind the best tip and the depth
//!   guard built on it.
//! - [`policy`]: both checks combined for block and reorg acceptance.
//!
//! Nothing here locks or caches. Every call reads the caller's snapshot.

pub mod checkpoint;
pub mod policy;
pub mod sync;

pub use checkpoint::{CheckpointEntry, CheckpointTable, Checkpoints};
pub use policy::{CheckpointPolicy, ReorgSummary};
pub use sync::{auto_select_sync_checkpoint, check_sync, verify_sync};
