//! A minimal execution engine.

use alloc::{collections::BTreeMap, string::ToString, vec, vec::Vec};
use alloy_primitives::{Bytes, Log, B256, U256};
use subnet_fees::PrecompileUpgrade;
use subnet_primitives::{
    Block, Header, Receipt, ReceiptLog, SealedBlock, SealedHeader, Transaction,
};

use super::{MockError, MockState};
use crate::{ExecutionEngine, GasPool, TxContext, TxExecutionError};

/// An engine that checks nonces, charges each transaction its full gas limit and emits one log
/// per transaction.
///
/// Scripted failures take effect after the nonce is bumped and the gas charged, so they leave
/// changes behind that the builder has to revert.
#[derive(Debug, Default)]
pub struct MockEngine {
    failures: BTreeMap<B256, TxExecutionError>,
    fail_upgrades: bool,
    fail_finalize: bool,
}

impl MockEngine {
    /// Makes the transaction with `hash` fail with `err`.
    pub fn with_failure(mut self, hash: B256, err: TxExecutionError) -> Self {
        self.failures.insert(hash, err);
        self
    }

    /// Makes every upgrade fail.
    pub const fn with_failing_upgrades(mut self) -> Self {
        self.fail_upgrades = true;
        self
    }

    /// Makes block assembly fail.
    pub const fn with_failing_finalize(mut self) -> Self {
        self.fail_finalize = true;
        self
    }
}

impl ExecutionEngine for MockEngine {
    type Error = MockError;
    type State = MockState;

    fn prepare(&self, header: &mut Header) -> Result<(), Self::Error> {
        header.difficulty = U256::from(1);
        Ok(())
    }

    fn apply_upgrade(
        &self,
        upgrade: &PrecompileUpgrade,
        _header: &Header,
        state: &mut Self::State,
    ) -> Result<(), Self::Error> {
        if self.fail_upgrades {
            return Err(MockError(alloc::format!("cannot configure {}", upgrade.address)));
        }
        state.apply_upgrade(upgrade.address);
        Ok(())
    }

    fn apply_transaction(
        &self,
        ctx: &TxContext<'_>,
        state: &mut Self::State,
        gas_pool: &mut GasPool,
        tx: &Transaction,
    ) -> Result<Receipt, TxExecutionError> {
        let expected = state.nonce(&tx.from);
        if tx.nonce < expected {
            return Err(TxExecutionError::NonceTooLow {
                address: tx.from,
                tx: tx.nonce,
                state: expected,
            });
        }
        if tx.nonce > expected {
            return Err(TxExecutionError::NonceTooHigh {
                address: tx.from,
                tx: tx.nonce,
                state: expected,
            });
        }

        let base_fee = ctx.header.base_fee_per_gas.unwrap_or_default();
        let tip =
            tx.effective_gas_tip(base_fee).map_err(|e| TxExecutionError::Other(e.to_string()))?;
        gas_pool.sub_gas(tx.gas_limit)?;
        state.set_nonce(tx.from, expected + 1);

        let hash = tx.hash();
        if let Some(err) = self.failures.get(&hash) {
            return Err(err.clone());
        }

        let log = Log::new_unchecked(tx.from, Vec::new(), Bytes::new());
        Ok(Receipt {
            tx_type: tx.tx_type,
            status: true,
            gas_used: tx.gas_limit,
            blob_gas_used: tx.blob_gas(),
            effective_gas_price: base_fee + tip,
            logs: vec![ReceiptLog::new(log, hash)],
            transaction_hash: hash,
            transaction_index: ctx.index as u32,
            ..Default::default()
        })
    }

    fn finalize_and_assemble(
        &self,
        mut header: Header,
        parent: &SealedHeader,
        state: &mut Self::State,
        txs: Vec<Transaction>,
        _receipts: &[Receipt],
    ) -> Result<SealedBlock, Self::Error> {
        if self.fail_finalize {
            return Err(MockError("cannot assemble block".to_string()));
        }
        header.parent_hash = parent.hash();
        header.state_root = state.root();
        Ok(Block { header, body: txs }.seal_slow())
    }
}
