//! Protocol constants and the compiled-in checkpoint tables.

use hex_literal::hex;
use serde::{Deserialize, Serialize};

/// Network type: Mainnet or Testnet.
///
/// Controls which checkpoint table is active.
///
/// # Examples
///
/// ```
/// use anchor_core::constants::NetworkType;
/// let net = NetworkType::default();
/// assert_eq!(net, NetworkType::Mainnet);
/// assert!(!net.checkpoints().is_empty());
/// assert!(NetworkType::Testnet.checkpoints().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network. Carries no checkpoints.
    Testnet,
}

impl NetworkType {
    /// Lowercase network name, as used in config files and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// The hard-coded checkpoint table for this network.
    pub fn checkpoints(&self) -> &'static [(u64, [u8; 32])] {
        match self {
            Self::Mainnet => MAINNET_CHECKPOINTS,
            Self::Testnet => TESTNET_CHECKPOINTS,
        }
    }
}

impl std::fmt::Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Minimum distance in blocks between the sync checkpoint and the best tip.
///
/// Reorganizations may not reach at or below the block this many heights
/// behind the tip. Same value on every network.
pub const CHECKPOINT_SPAN: u64 = 500;

/// Hard-coded mainnet checkpoints: (height, block_hash) pairs.
///
/// Strictly ascending by height. A good checkpoint block is surrounded by
/// blocks with sane timestamps and contains no unusual transactions.
pub const MAINNET_CHECKPOINTS: &[(u64, [u8; 32])] = &[
    (0, hex!("000005dab0c470667d1c87d42e5fd7d805ccfc2fa950215c14610eea4eb5c882")), // genesis
    (29443, hex!("000001e10382362eb61e610b3cce6b0a69852c09e9cb8d3b9dcc0c59fc594e49")),
    (54364, hex!("7f48fe11a37dab810a4245e4acf9272981da5683978e2f1fab84a3767332d72e")),
    (91699, hex!("0000041da91290856347aba577aa239c321e8c0f7aaee4c85709a85bf927960d")),
    (122082, hex!("dd70fa52cfc3e2dbba2c1098bf40b5c8c8d525520ec9fe55e721e09f837a9a35")),
    (177096, hex!("01a6ff24f62501810c566a8f8c1c7e3d54fef298cdffafeb32c3759e80eff477")),
    (177099, hex!("c35a26b7e8e68fd9207010e7f1dc61ac5e63632784f012c71507139cbae49066")),
    (201538, hex!("410e0d54830ae7cf4d12bda0946824e3599d2a757d1047884f60e0bfb3194b12")),
    (206839, hex!("d688d7024d0d2bc6886ebd9245319aa2013fad24cfcceaf235207b94d3f6b139")),
];

/// Testnet has no checkpoints.
pub const TESTNET_CHECKPOINTS: &[(u64, [u8; 32])] = &[];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_table_strictly_ascending() {
        for pair in MAINNET_CHECKPOINTS.windows(2) {
            assert!(pair[0].0 < pair[1].0, "{} !< {}", pair[0].0, pair[1].0);
        }
    }

    #[test]
    fn mainnet_table_starts_at_genesis() {
        assert_eq!(MAINNET_CHECKPOINTS[0].0, 0);
        assert_eq!(MAINNET_CHECKPOINTS.last().map(|(h, _)| *h), Some(206_839));
    }

    #[test]
    fn mainnet_hashes_distinct() {
        let mut hashes: Vec<_> = MAINNET_CHECKPOINTS.iter().map(|(_, h)| *h).collect();
        hashes.sort();
        hashes.dedup();
        assert_eq!(hashes.len(), MAINNET_CHECKPOINTS.len());
    }

    #[test]
    fn testnet_table_empty() {
        assert!(TESTNET_CHECKPOINTS.is_empty());
        assert!(NetworkType::Testnet.checkpoints().is_empty());
    }

    #[test]
    fn network_names() {
        assert_eq!(NetworkType::Mainnet.name(), "mainnet");
        assert_eq!(NetworkType::Testnet.to_string(), "testnet");
    }

    #[test]
    fn network_deserializes_lowercase() {
        let net: NetworkType = serde_json::from_str("\"testnet\"").unwrap();
        assert_eq!(net, NetworkType::Testnet);
        assert!(serde_json::from_str::<NetworkType>("\"Testnet\"").is_err());
    }

    #[test]
    fn span_is_five_hundred() {
        assert_eq!(CHECKPOINT_SPAN, 500);
    }
}
