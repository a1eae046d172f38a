//! Receipt types produced by transaction execution.

use alloc::vec::Vec;
use alloy_primitives::{Address, Log, B256, U256};

use crate::TxType;

/// A log emitted during execution, with its location in the chain.
///
/// The location fields are zero until the block is sealed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReceiptLog {
    /// The emitted log.
    pub inner: Log,
    /// Hash of the block containing the log.
    pub block_hash: B256,
    /// Number of the block containing the log.
    pub block_number: u64,
    /// Hash of the transaction that emitted the log.
    pub transaction_hash: B256,
    /// Index of that transaction in the block.
    pub transaction_index: u32,
    /// Index of the log in the block.
    pub log_index: u32,
}

impl ReceiptLog {
    /// Creates a new unplaced [ReceiptLog].
    pub fn new(inner: Log, transaction_hash: B256) -> Self {
        Self { inner, transaction_hash, ..Default::default() }
    }
}

/// The receipt of an executed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Receipt {
    /// Type of the executed transaction.
    pub tx_type: TxType,
    /// Whether execution succeeded.
    pub status: bool,
    /// Gas used in the block up to and including this transaction.
    pub cumulative_gas_used: u64,
    /// Gas used by this transaction alone.
    pub gas_used: u64,
    /// Blob gas used by this transaction.
    pub blob_gas_used: u64,
    /// Price per gas actually paid.
    pub effective_gas_price: U256,
    /// Logs emitted by the transaction.
    pub logs: Vec<ReceiptLog>,
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// Address of the created contract, if any.
    pub contract_address: Option<Address>,
    /// Hash of the block containing the transaction.
    pub block_hash: B256,
    /// Number of the block containing the transaction.
    pub block_number: u64,
    /// Index of the transaction in the block.
    pub transaction_index: u32,
}

impl Receipt {
    /// Stamps the block location onto the receipt and its logs.
    ///
    /// `log_index` is the index of the receipt's first log within the block. Returns the index
    /// following the receipt's last log.
    pub fn set_location(
        &mut self,
        block_hash: B256,
        block_number: u64,
        transaction_index: u32,
        mut log_index: u32,
    ) -> u32 {
        self.block_hash = block_hash;
        self.block_number = block_number;
        self.transaction_index = transaction_index;
        for log in self.logs.iter_mut() {
            log.block_hash = block_hash;
            log.block_number = block_number;
            log.transaction_hash = self.transaction_hash;
            log.transaction_index = transaction_index;
            log.log_index = log_index;
            log_index = log_index.saturating_add(1);
        }
        log_index
    }
}
