//! # anchor-core
//! Foundation types for the Anchor checkpoint subsystem: block hashes, the
//! compiled-in checkpoint tables, and the in-memory chain index the
//! checkpoint walks read from.

pub mod chain_index;
pub mod constants;
pub mod error;
pub mod traits;
pub mod types;
