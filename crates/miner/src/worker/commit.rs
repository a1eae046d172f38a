//! Transaction selection and execution.

use alloc::{collections::BTreeMap, vec::Vec};
use alloy_eips::eip4844::{calc_blob_gasprice, DATA_GAS_PER_BLOB, MAX_DATA_GAS_PER_BLOCK};
use alloy_primitives::{Address, U256};
use subnet_primitives::{PooledTransaction, Receipt, Transaction};

use super::Miner;
use crate::{
    check_predicates, CancellationToken, ChainReader, Environment, ExecutionEngine, LazyTransaction,
    Lane, MinerError, MinerResult, PendingFilter, SkipReason, StateDb, TransactionsByPriceAndNonce,
    TxContext, TxPool, TxRejection,
};

/// Gas of the cheapest possible transaction.
const TX_GAS: u64 = 21_000;

type PendingTxs = BTreeMap<Address, Vec<LazyTransaction>>;

impl<C, P, E> Miner<C, P, E>
where
    C: ChainReader,
    P: TxPool,
    E: ExecutionEngine<State = C::State>,
{
    /// Fills the block with pending transactions, locals first.
    pub(super) fn fill_transactions(
        &self,
        env: &mut Environment<C::State>,
        cancel: &CancellationToken,
    ) -> MinerResult<()> {
        let mut filter = PendingFilter {
            min_tip: self.config.min_tip,
            base_fee: env.header.base_fee_per_gas,
            blob_fee: env
                .header
                .excess_blob_gas
                .map(|excess| U256::from(calc_blob_gasprice(excess))),
            only_plain_txs: true,
            only_blob_txs: false,
        };
        let mut remote_plain = self.pool.pending(filter);
        filter.only_plain_txs = false;
        filter.only_blob_txs = true;
        let mut remote_blob = self.pool.pending(filter);

        let mut local_plain = PendingTxs::new();
        let mut local_blob = PendingTxs::new();
        for account in self.pool.locals() {
            if let Some(txs) = remote_plain.remove(&account).filter(|txs| !txs.is_empty()) {
                local_plain.insert(account, txs);
            }
            if let Some(txs) = remote_blob.remove(&account).filter(|txs| !txs.is_empty()) {
                local_blob.insert(account, txs);
            }
        }

        let base_fee = env.header.base_fee_per_gas.unwrap_or_default();
        for (plain, blob) in [(local_plain, local_blob), (remote_plain, remote_blob)] {
            if plain.is_empty() && blob.is_empty() {
                continue;
            }
            let mut lanes = [
                Lane::plain(TransactionsByPriceAndNonce::new(plain, base_fee)),
                Lane::blob(TransactionsByPriceAndNonce::new(blob, base_fee)),
            ];
            self.commit_transactions(env, &mut lanes, cancel)?;
        }
        Ok(())
    }

    /// Executes transactions from `lanes` until the block is full or the lanes are exhausted.
    ///
    /// Transactions that cannot be included never abort the attempt: the sender is either
    /// advanced to its next nonce or dropped for the rest of the block.
    pub(super) fn commit_transactions(
        &self,
        env: &mut Environment<C::State>,
        lanes: &mut [Lane],
        cancel: &CancellationToken,
    ) -> MinerResult<()> {
        loop {
            if cancel.is_cancelled() {
                debug!(
                    target: "miner",
                    "Block building cancelled at {count} txs",
                    count = env.tcount,
                );
                return Err(MinerError::Cancelled);
            }

            if env.gas_pool.gas() < TX_GAS {
                trace!(
                    target: "miner",
                    "Not enough gas for further transactions | Have: {have} | Want: {TX_GAS}",
                    have = env.gas_pool.gas(),
                );
                return Ok(());
            }

            if env.blob_budget_exhausted() {
                lanes.iter_mut().filter(|lane| lane.is_blob()).for_each(|lane| lane.txs.clear());
            }

            let heads =
                lanes.iter().map(|lane| lane.peek().map(|(_, tip)| tip)).collect::<Vec<_>>();
            let Some(index) = self.lane_selector.select(&heads) else {
                return Ok(());
            };
            let Some(lane) = lanes.get_mut(index) else {
                return Ok(());
            };
            let Some(ltx) = lane.peek().map(|(tx, _)| tx.clone()) else {
                return Ok(());
            };

            if env.gas_pool.gas() < ltx.gas {
                trace!(
                    target: "miner",
                    "Not enough gas left for transaction {hash} | Left: {left} | Needed: {needed}",
                    hash = ltx.hash,
                    left = env.gas_pool.gas(),
                    needed = ltx.gas,
                );
                self.metrics.inc_skipped_txs(SkipReason::InsufficientGas);
                lane.txs.pop();
                continue;
            }

            let blob_gas_left = env.blob_gas_left();
            if blob_gas_left < ltx.blob_gas {
                trace!(
                    target: "miner",
                    "Not enough blob gas left for transaction {hash} | Left: {blob_gas_left} | Needed: {needed}",
                    hash = ltx.hash,
                    needed = ltx.blob_gas,
                );
                self.metrics.inc_skipped_txs(SkipReason::InsufficientBlobGas);
                lane.txs.pop();
                continue;
            }

            let Some(pooled) = self.pool.resolve(&ltx) else {
                warn!(target: "miner", "Ignoring evicted transaction {hash}", hash = ltx.hash);
                self.metrics.inc_skipped_txs(SkipReason::Evicted);
                lane.txs.pop();
                continue;
            };

            let total_size = env.size.saturating_add(pooled.tx.size());
            if total_size > self.config.target_txs_size {
                trace!(
                    target: "miner",
                    "Transaction {hash} would exceed the target size | Size: {total_size} | Target: {target}",
                    hash = ltx.hash,
                    target = self.config.target_txs_size,
                );
                self.metrics.inc_skipped_txs(SkipReason::Oversized);
                lane.txs.pop();
                continue;
            }

            env.state.set_tx_context(ltx.hash, env.tcount);
            match self.commit_transaction(env, pooled) {
                Ok(()) => {
                    self.metrics.inc_committed_txs();
                    lane.txs.shift();
                }
                Err(rejection) if rejection.is_nonce_too_low() => {
                    // The pool raced with the chain; the sender's next nonce may still be valid.
                    trace!(
                        target: "miner",
                        "Skipping transaction with low nonce {hash}: {rejection}",
                        hash = ltx.hash,
                    );
                    self.metrics.inc_rejected_txs(&rejection);
                    lane.txs.shift();
                }
                Err(rejection) => {
                    debug!(
                        target: "miner",
                        "Transaction failed, account skipped | Hash: {hash} | Sender: {sender} | Error: {rejection}",
                        hash = ltx.hash,
                        sender = ltx.sender,
                    );
                    self.metrics.inc_rejected_txs(&rejection);
                    lane.txs.pop();
                }
            }
        }
    }

    /// Executes a resolved transaction and appends it to the block.
    fn commit_transaction(
        &self,
        env: &mut Environment<C::State>,
        pooled: PooledTransaction,
    ) -> Result<(), TxRejection> {
        let (tx, sidecar) = pooled.into_parts();
        if !tx.is_blob() {
            let receipt = self.apply_transaction(env, &tx)?;
            env.commit(tx, receipt);
            return Ok(());
        }

        let sidecar = sidecar.ok_or_else(|| TxRejection::MissingBlobSidecar(tx.hash()))?;
        let blobs = env.blobs.saturating_add(sidecar.blobs.len() as u64);
        if blobs.saturating_mul(DATA_GAS_PER_BLOB) > MAX_DATA_GAS_PER_BLOCK {
            return Err(TxRejection::BlobLimitExceeded {
                blobs,
                limit: MAX_DATA_GAS_PER_BLOCK / DATA_GAS_PER_BLOB,
            });
        }
        let receipt = self.apply_transaction(env, &tx)?;
        env.commit_blob(tx, receipt, sidecar);
        Ok(())
    }

    /// Verifies the transaction's predicates and executes it.
    ///
    /// Predicates are only verified under Durango rules. On failure the environment is left exactly as it was before the call.
    fn apply_transaction(
        &self,
        env: &mut Environment<C::State>,
        tx: &Transaction,
    ) -> Result<Receipt, TxRejection> {
        let tx_hash = tx.hash();
        let snapshot = env.snapshot();

        if env.rules.is_durango {
            let results = check_predicates(
                &env.rules,
                &self.predicaters,
                env.predicate_context.as_ref(),
                &tx.access_list,
            )?;
            env.predicate_results.set_tx_results(tx_hash, results);
        }

        let ctx = TxContext {
            header: &env.header,
            coinbase: env.coinbase,
            rules: &env.rules,
            predicate_results: &env.predicate_results,
            index: env.tcount,
        };
        match self.engine.apply_transaction(&ctx, &mut env.state, &mut env.gas_pool, tx) {
            Ok(receipt) => Ok(receipt),
            Err(err) => {
                env.revert(snapshot, &tx_hash);
                Err(err.into())
            }
        }
    }
}
