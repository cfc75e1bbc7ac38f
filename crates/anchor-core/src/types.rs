//! Core types: block hashes and chain index nodes.
//!
//! Heights use u64 throughout; genesis is height 0.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HashParseError;

/// A 32-byte block hash.
///
/// Bytes are stored in display order, so the [`Display`](fmt::Display) form
/// and the [`FromStr`] form are the same 64 hex characters. Comparison is
/// always over all 32 bytes.
#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Parse 64 hex characters, optionally prefixed with `0x`.
///
/// Surrounding whitespace is ignored; some published checkpoint lists carry
/// a trailing space.
///
/// # Examples
///
/// ```
/// use anchor_core::types::Hash256;
/// let h: Hash256 = "0x00ff000000000000000000000000000000000000000000000000000000000001 "
///     .parse()
///     .unwrap();
/// assert_eq!(h.0[1], 0xff);
/// assert_eq!(h.0[31], 0x01);
/// ```
impl FromStr for Hash256 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if s.len() != 64 {
            return Err(HashParseError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Arena slot of a [`ChainNode`] inside a [`ChainIndex`](crate::chain_index::ChainIndex).
///
/// Ids are only handed out by the index that owns the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A block known to the local node: height, hash, and a link to its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainNode {
    /// Height above genesis (genesis is 0).
    pub height: u64,
    /// Block hash.
    pub hash: Hash256,
    parent: Option<NodeId>,
}

impl ChainNode {
    pub(crate) fn new(height: u64, hash: Hash256, parent: Option<NodeId>) -> Self {
        Self {
            height,
            hash,
            parent,
        }
    }

    /// A node with no parent link.
    ///
    /// Useful for hash maps that only record what is known locally without
    /// the ancestry, e.g. a header summary received from a peer.
    pub fn detached(height: u64, hash: Hash256) -> Self {
        Self::new(height, hash, None)
    }

    /// Arena id of the parent, `None` for genesis and detached nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether this node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
