//! Integration and adversarial test suite for Anchor checkpoints.
//!
//! The tests in `tests/` drive the checkpoint core and the node service
//! through whole chains, including forks and chains built to conflict with
//! the checkpoint table.

pub mod helpers;
