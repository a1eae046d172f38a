//! The mutable state of a single block building attempt.

use alloc::vec::Vec;
use alloy_eips::eip4844::{BlobTransactionSidecar, DATA_GAS_PER_BLOB, MAX_DATA_GAS_PER_BLOCK};
use alloy_primitives::{Address, B256};
use subnet_fees::{FeeConfig, Rules};
use subnet_primitives::{Header, Receipt, SealedHeader, Transaction};

use crate::{GasPool, PredicateContext, PredicateResults, StateDb};

/// A point the [Environment] can be reverted to after a failed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSnapshot {
    state: usize,
    gas: u64,
}

/// Everything accumulated while building one block.
///
/// An environment is created for a single attempt, mutated sequentially by it, and consumed when
/// the block is sealed.
#[derive(Debug)]
pub struct Environment<S> {
    /// The fork rules of the block.
    pub rules: Rules,
    /// The state the block executes against.
    pub state: S,
    /// The parent block header.
    pub parent: SealedHeader,
    /// The header under construction.
    pub header: Header,
    /// The fee recipient.
    pub coinbase: Address,
    /// The fee config in force at the parent.
    pub fee_config: FeeConfig,
    /// Gas left in the block.
    pub gas_pool: GasPool,
    /// Number of included transactions.
    pub tcount: usize,
    /// Encoded size of the included transactions.
    pub size: u64,
    /// Number of blobs included.
    pub blobs: u64,
    /// The included transactions.
    pub txs: Vec<Transaction>,
    /// Receipts of the included transactions.
    pub receipts: Vec<Receipt>,
    /// Sidecars of the included blob transactions, in inclusion order.
    pub sidecars: Vec<BlobTransactionSidecar>,
    /// Predicate verification results of the included transactions.
    pub predicate_results: PredicateResults,
    /// The context predicates are verified in, if any.
    pub predicate_context: Option<PredicateContext>,
}

impl<S: StateDb> Environment<S> {
    /// Creates an empty environment for `header`.
    pub fn new(
        rules: Rules,
        state: S,
        parent: SealedHeader,
        header: Header,
        fee_config: FeeConfig,
        predicate_context: Option<PredicateContext>,
    ) -> Self {
        Self {
            rules,
            state,
            parent,
            coinbase: header.beneficiary,
            gas_pool: GasPool::new(header.gas_limit),
            header,
            fee_config,
            tcount: 0,
            size: 0,
            blobs: 0,
            txs: Vec::new(),
            receipts: Vec::new(),
            sidecars: Vec::new(),
            predicate_results: PredicateResults::default(),
            predicate_context,
        }
    }

    /// Returns the blob gas left in the block.
    pub fn blob_gas_left(&self) -> u64 {
        MAX_DATA_GAS_PER_BLOCK.saturating_sub(self.blobs.saturating_mul(DATA_GAS_PER_BLOB))
    }

    /// Returns true if no further blob fits in the block.
    pub fn blob_budget_exhausted(&self) -> bool {
        self.blobs.saturating_mul(DATA_GAS_PER_BLOB) >= MAX_DATA_GAS_PER_BLOCK
    }

    /// Takes a snapshot of the state and the gas pool.
    pub fn snapshot(&mut self) -> EnvSnapshot {
        EnvSnapshot { state: self.state.snapshot(), gas: self.gas_pool.gas() }
    }

    /// Undoes a failed transaction: reverts the state and gas pool to `snapshot` and drops the
    /// transaction's predicate results.
    pub fn revert(&mut self, snapshot: EnvSnapshot, tx_hash: &B256) {
        self.state.revert_to_snapshot(snapshot.state);
        self.gas_pool.set_gas(snapshot.gas);
        self.predicate_results.delete_tx_results(tx_hash);
    }

    /// Appends an executed transaction and its receipt to the block.
    pub fn commit(&mut self, tx: Transaction, mut receipt: Receipt) {
        self.header.gas_used = self.header.gas_limit.saturating_sub(self.gas_pool.gas());
        receipt.cumulative_gas_used = self.header.gas_used;
        self.size = self.size.saturating_add(tx.size());
        self.tcount += 1;
        self.txs.push(tx);
        self.receipts.push(receipt);
    }

    /// Appends an executed blob transaction, its receipt and its sidecar to the block.
    pub fn commit_blob(
        &mut self,
        tx: Transaction,
        receipt: Receipt,
        sidecar: BlobTransactionSidecar,
    ) {
        self.blobs = self.blobs.saturating_add(sidecar.blobs.len() as u64);
        let blob_gas_used = self.header.blob_gas_used.unwrap_or_default();
        self.header.blob_gas_used = Some(blob_gas_used.saturating_add(receipt.blob_gas_used));
        self.sidecars.push(sidecar);
        self.commit(tx, receipt);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::MockState;
    use alloc::{collections::BTreeMap, vec};
    use alloy_eips::eip4844::Blob;
    use alloy_primitives::{address, b256, Bytes};

    fn env() -> Environment<MockState> {
        let header = Header { gas_limit: 100_000, ..Default::default() };
        Environment::new(
            Rules::default(),
            MockState::default(),
            Header::default().seal_slow(),
            header,
            FeeConfig::default(),
            None,
        )
    }

    #[test]
    fn test_commit_tracks_gas_and_size() {
        let mut env = env();
        env.gas_pool.sub_gas(21_000).unwrap();
        let tx = Transaction { gas_limit: 21_000, ..Default::default() };
        let size = tx.size();
        env.commit(tx, Receipt { gas_used: 21_000, ..Default::default() });

        assert_eq!(env.header.gas_used, 21_000);
        assert_eq!(env.receipts[0].cumulative_gas_used, 21_000);
        assert_eq!(env.size, size);
        assert_eq!(env.tcount, 1);
    }

    #[test]
    fn test_commit_blob_counts_blobs() {
        let mut env = env();
        env.header.blob_gas_used = Some(0);
        let sidecar = BlobTransactionSidecar {
            blobs: vec![Blob::default(); 2],
            commitments: Vec::new(),
            proofs: Vec::new(),
        };
        let receipt = Receipt { blob_gas_used: 2 * DATA_GAS_PER_BLOB, ..Default::default() };
        env.commit_blob(Transaction::default(), receipt, sidecar);

        assert_eq!(env.blobs, 2);
        assert_eq!(env.header.blob_gas_used, Some(2 * DATA_GAS_PER_BLOB));
        assert_eq!(env.sidecars.len(), 1);
        assert_eq!(env.blob_gas_left(), MAX_DATA_GAS_PER_BLOCK - 2 * DATA_GAS_PER_BLOB);
        assert!(!env.blob_budget_exhausted());

        env.blobs = MAX_DATA_GAS_PER_BLOCK / DATA_GAS_PER_BLOB;
        assert!(env.blob_budget_exhausted());
        assert_eq!(env.blob_gas_left(), 0);
    }

    #[test]
    fn test_revert_restores_state_gas_and_predicates() {
        let mut env = env();
        let sender = address!("0100000000000000000000000000000000000000");
        let tx_hash = b256!("0100000000000000000000000000000000000000000000000000000000000000");

        let snapshot = env.snapshot();
        env.state.set_nonce(sender, 7);
        env.gas_pool.sub_gas(50_000).unwrap();
        let mut results = BTreeMap::new();
        results.insert(sender, Bytes::from_static(&[1]));
        env.predicate_results.set_tx_results(tx_hash, results);

        env.revert(snapshot, &tx_hash);
        assert_eq!(env.state.nonce(&sender), 0);
        assert_eq!(env.gas_pool.gas(), 100_000);
        assert!(env.predicate_results.is_empty());
    }
}
