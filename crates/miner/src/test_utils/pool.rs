//! An in-memory transaction pool.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    vec::Vec,
};
use alloy_eips::eip4844::BlobTransactionSidecar;
use alloy_primitives::{Address, B256};
use spin::Mutex;
use subnet_primitives::{PooledTransaction, Transaction};

use crate::{LazyTransaction, PendingFilter, TxPool};

/// A pool serving a fixed set of transactions.
///
/// Transactions arrive in insertion order, which is also their pool time. Every filter passed
/// to [TxPool::pending] is recorded.
#[derive(Debug, Default)]
pub struct MockPool {
    txs: Vec<PooledTransaction>,
    locals: Vec<Address>,
    evicted: Mutex<BTreeSet<B256>>,
    filters: Mutex<Vec<PendingFilter>>,
}

impl MockPool {
    /// Adds a transaction.
    pub fn with_tx(mut self, tx: Transaction) -> Self {
        self.txs.push(PooledTransaction::new(tx));
        self
    }

    /// Adds a blob transaction with its sidecar.
    pub fn with_blob_tx(mut self, tx: Transaction, sidecar: BlobTransactionSidecar) -> Self {
        self.txs.push(PooledTransaction::new(tx).with_sidecar(sidecar));
        self
    }

    /// Marks `sender` as local.
    pub fn with_local(mut self, sender: Address) -> Self {
        self.locals.push(sender);
        self
    }

    /// Evicts a transaction. It is still listed as pending but no longer resolves.
    pub fn evict(&self, hash: B256) {
        self.evicted.lock().insert(hash);
    }

    /// Returns the filters passed to [TxPool::pending].
    pub fn filters(&self) -> Vec<PendingFilter> {
        self.filters.lock().clone()
    }

    fn lazy(tx: &Transaction, time: u64) -> LazyTransaction {
        LazyTransaction {
            hash: tx.hash(),
            sender: tx.from,
            nonce: tx.nonce,
            time,
            gas: tx.gas_limit,
            gas_fee_cap: tx.gas_fee_cap,
            gas_tip_cap: tx.gas_tip_cap,
            blob_gas: tx.blob_gas(),
        }
    }
}

impl TxPool for MockPool {
    fn pending(&self, filter: PendingFilter) -> BTreeMap<Address, Vec<LazyTransaction>> {
        self.filters.lock().push(filter);

        let mut pending: BTreeMap<Address, Vec<LazyTransaction>> = BTreeMap::new();
        for (time, pooled) in self.txs.iter().enumerate() {
            let tx = &pooled.tx;
            if (filter.only_plain_txs && tx.is_blob()) || (filter.only_blob_txs && !tx.is_blob()) {
                continue;
            }
            if filter.base_fee.is_some_and(|base_fee| tx.gas_fee_cap < base_fee) {
                continue;
            }
            if filter.min_tip.is_some_and(|min_tip| tx.gas_tip_cap < min_tip) {
                continue;
            }
            if filter.blob_fee.is_some_and(|blob_fee| tx.is_blob() && tx.blob_fee_cap < blob_fee) {
                continue;
            }
            pending.entry(tx.from).or_default().push(Self::lazy(tx, time as u64));
        }
        for txs in pending.values_mut() {
            txs.sort_by_key(|tx| tx.nonce);
        }
        pending
    }

    fn locals(&self) -> Vec<Address> {
        self.locals.clone()
    }

    fn resolve(&self, tx: &LazyTransaction) -> Option<PooledTransaction> {
        if self.evicted.lock().contains(&tx.hash) {
            return None;
        }
        self.txs.iter().find(|pooled| pooled.tx.hash() == tx.hash).cloned()
    }
}
