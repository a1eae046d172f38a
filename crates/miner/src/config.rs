//! Block producer configuration.

use alloy_primitives::{Address, B256, U256};

/// The default soft cap on the encoded size of a block's transactions.
pub const DEFAULT_TARGET_TXS_SIZE: u64 = 1800 * 1024;

/// Configuration of the block producer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MinerConfig {
    /// The fee recipient, unless the chain mandates one.
    pub etherbase: Address,
    /// The minimum tip a pending transaction must pay.
    pub min_tip: Option<U256>,
    /// Soft cap on the encoded size of the block's transactions.
    pub target_txs_size: u64,
    /// Allows producing a block the chain already holds.
    pub allow_duplicate_blocks: bool,
    /// The parent beacon block root written to Cancun headers.
    pub beacon_root: Option<B256>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            etherbase: Address::ZERO,
            min_tip: None,
            target_txs_size: DEFAULT_TARGET_TXS_SIZE,
            allow_duplicate_blocks: false,
            beacon_root: None,
        }
    }
}

impl MinerConfig {
    /// Sets the fee recipient.
    pub const fn with_etherbase(mut self, etherbase: Address) -> Self {
        self.etherbase = etherbase;
        self
    }

    /// Sets the minimum tip.
    pub const fn with_min_tip(mut self, min_tip: U256) -> Self {
        self.min_tip = Some(min_tip);
        self
    }

    /// Sets the soft cap on the encoded size of the block's transactions.
    pub const fn with_target_txs_size(mut self, target_txs_size: u64) -> Self {
        self.target_txs_size = target_txs_size;
        self
    }

    /// Allows producing blocks the chain already holds. Only meant for tests.
    pub const fn with_allow_duplicate_blocks(mut self, allow: bool) -> Self {
        self.allow_duplicate_blocks = allow;
        self
    }

    /// Sets the parent beacon block root.
    pub const fn with_beacon_root(mut self, beacon_root: B256) -> Self {
        self.beacon_root = Some(beacon_root);
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_default_target_size() {
        assert_eq!(MinerConfig::default().target_txs_size, 1_843_200);
    }

    #[test]
    fn test_setters() {
        let etherbase = address!("0100000000000000000000000000000000000000");
        let config = MinerConfig::default()
            .with_etherbase(etherbase)
            .with_min_tip(U256::from(2))
            .with_target_txs_size(1024);
        assert_eq!(config.etherbase, etherbase);
        assert_eq!(config.min_tip, Some(U256::from(2)));
        assert_eq!(config.target_txs_size, 1024);
        assert!(!config.allow_duplicate_blocks);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(MinerConfig::default()).unwrap();
        assert_eq!(json["targetTxsSize"], 1_843_200);
    }
}
