//! Price and nonce ordering of pending transactions.

use alloc::{
    collections::{BTreeMap, BinaryHeap, VecDeque},
    vec::Vec,
};
use alloy_primitives::{Address, B256, U256};
use core::cmp::Ordering;

/// A lightweight handle to a pooled transaction.
///
/// Carries what the builder needs to rank and budget the transaction. The full payload is
/// resolved from the pool only once the transaction is selected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LazyTransaction {
    /// Transaction hash.
    pub hash: B256,
    /// The sender.
    pub sender: Address,
    /// Sender nonce.
    pub nonce: u64,
    /// Time the transaction entered the pool, in seconds.
    pub time: u64,
    /// Gas limit.
    pub gas: u64,
    /// Maximum total fee per gas.
    pub gas_fee_cap: U256,
    /// Maximum priority fee per gas.
    pub gas_tip_cap: U256,
    /// Blob gas consumed by the transaction.
    pub blob_gas: u64,
}

impl LazyTransaction {
    /// Returns `min(gas_tip_cap, gas_fee_cap - base_fee)`, or `None` if the fee cap is below
    /// the base fee.
    pub fn effective_tip(&self, base_fee: U256) -> Option<U256> {
        let headroom = self.gas_fee_cap.checked_sub(base_fee)?;
        Some(self.gas_tip_cap.min(headroom))
    }
}

/// A sender's head transaction together with its tip at the block's base fee.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TxWithMinerFee {
    tx: LazyTransaction,
    fees: U256,
}

impl Ord for TxWithMinerFee {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher tip first, then earlier arrival.
        self.fees
            .cmp(&other.fees)
            .then_with(|| other.tx.time.cmp(&self.tx.time))
            .then_with(|| other.tx.hash.cmp(&self.tx.hash))
    }
}

impl PartialOrd for TxWithMinerFee {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending transactions ordered by tip, preserving each sender's nonce order.
///
/// Only the lowest-nonce transaction of each sender competes at any time. Advancing a sender
/// with [Self::shift] exposes its next nonce; discarding it with [Self::pop] drops everything
/// it has left, so a later nonce is never surfaced while an earlier one is unresolved.
#[derive(Debug, Clone, Default)]
pub struct TransactionsByPriceAndNonce {
    txs: BTreeMap<Address, VecDeque<LazyTransaction>>,
    heads: BinaryHeap<TxWithMinerFee>,
    base_fee: U256,
}

impl TransactionsByPriceAndNonce {
    /// Creates a new ordering over `txs`, grouped by sender.
    ///
    /// Senders whose lowest-nonce transaction cannot pay `base_fee` are dropped.
    pub fn new(txs: BTreeMap<Address, Vec<LazyTransaction>>, base_fee: U256) -> Self {
        let mut heads = BinaryHeap::with_capacity(txs.len());
        let mut queues = BTreeMap::new();

        for (sender, mut list) in txs {
            list.sort_by_key(|tx| tx.nonce);
            let mut queue = VecDeque::from(list);
            let Some(head) = queue.pop_front() else { continue };
            let Some(fees) = head.effective_tip(base_fee) else {
                trace!(target: "miner", "Dropping sender with fee cap below base fee: {sender}");
                continue;
            };
            heads.push(TxWithMinerFee { tx: head, fees });
            queues.insert(sender, queue);
        }

        Self { txs: queues, heads, base_fee }
    }

    /// Returns the best transaction and its tip, without changing the ordering.
    pub fn peek(&self) -> Option<(&LazyTransaction, U256)> {
        self.heads.peek().map(|head| (&head.tx, head.fees))
    }

    /// Replaces the best transaction with the next one from the same sender.
    ///
    /// If the sender has nothing left, or its next transaction cannot pay the base fee, the
    /// sender is dropped.
    pub fn shift(&mut self) {
        let Some(head) = self.heads.pop() else { return };
        let sender = head.tx.sender;

        let next = self.txs.get_mut(&sender).and_then(VecDeque::pop_front);
        match next.and_then(|tx| tx.effective_tip(self.base_fee).map(|fees| (tx, fees))) {
            Some((tx, fees)) => self.heads.push(TxWithMinerFee { tx, fees }),
            None => {
                self.txs.remove(&sender);
            }
        }
    }

    /// Removes the best transaction and every remaining transaction of its sender.
    pub fn pop(&mut self) {
        if let Some(head) = self.heads.pop() {
            self.txs.remove(&head.tx.sender);
        }
    }

    /// Removes every transaction.
    pub fn clear(&mut self) {
        self.heads.clear();
        self.txs.clear();
    }

    /// Returns true if no transactions are left.
    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    /// Returns the number of senders with a transaction competing.
    pub fn senders(&self) -> usize {
        self.heads.len()
    }
}
