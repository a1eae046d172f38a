//! The pending transaction source.

use alloc::{collections::BTreeMap, vec::Vec};
use alloy_primitives::{Address, U256};
use subnet_primitives::PooledTransaction;

use crate::LazyTransaction;

/// Filters applied when fetching pending transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingFilter {
    /// Minimum tip a transaction must pay.
    pub min_tip: Option<U256>,
    /// Base fee the transactions must be able to pay.
    pub base_fee: Option<U256>,
    /// Blob base fee the blob transactions must be able to pay.
    pub blob_fee: Option<U256>,
    /// Only return transactions without blobs.
    pub only_plain_txs: bool,
    /// Only return blob transactions.
    pub only_blob_txs: bool,
}

/// Describes the transaction pool the builder draws from.
///
/// Implementations must be safe to read while building, so resolution is expected to be a
/// bounded, in-memory lookup.
pub trait TxPool {
    /// Returns the executable transactions matching `filter`, grouped by sender and ordered by
    /// nonce.
    fn pending(&self, filter: PendingFilter) -> BTreeMap<Address, Vec<LazyTransaction>>;

    /// Returns the senders whose transactions were submitted locally.
    fn locals(&self) -> Vec<Address>;

    /// Resolves a lazy handle to the full transaction, or `None` if it was evicted.
    fn resolve(&self, tx: &LazyTransaction) -> Option<PooledTransaction>;
}
