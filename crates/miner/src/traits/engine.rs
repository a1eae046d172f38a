//! The execution engine the builder drives.

use alloc::vec::Vec;
use alloy_primitives::Address;
use core::fmt::Display;
use subnet_fees::{PrecompileUpgrade, Rules};
use subnet_primitives::{Header, Receipt, SealedBlock, SealedHeader, Transaction};

use crate::{GasPool, PredicateResults, StateDb, TxExecutionError};

/// Block context for executing a single transaction.
#[derive(Debug, Clone, Copy)]
pub struct TxContext<'a> {
    /// The header of the block under construction.
    pub header: &'a Header,
    /// The fee recipient.
    pub coinbase: Address,
    /// The fork rules of the block.
    pub rules: &'a Rules,
    /// Predicate results of the block so far, including the transaction's own.
    pub predicate_results: &'a PredicateResults,
    /// Index of the transaction in the block.
    pub index: usize,
}

/// Executes transactions and assembles blocks.
pub trait ExecutionEngine {
    /// The error type for the [ExecutionEngine].
    type Error: Display;

    /// The state handle the engine executes against.
    type State: StateDb;

    /// Fills in consensus fields of a header before any transaction executes.
    fn prepare(&self, header: &mut Header) -> Result<(), Self::Error>;

    /// Applies a scheduled precompile upgrade to the state.
    fn apply_upgrade(
        &self,
        upgrade: &PrecompileUpgrade,
        header: &Header,
        state: &mut Self::State,
    ) -> Result<(), Self::Error>;

    /// Executes a transaction, deducting its gas from `gas_pool`.
    ///
    /// On error the builder reverts the state and gas pool, so implementations need not.
    fn apply_transaction(
        &self,
        ctx: &TxContext<'_>,
        state: &mut Self::State,
        gas_pool: &mut GasPool,
        tx: &Transaction,
    ) -> Result<Receipt, TxExecutionError>;

    /// Finalizes the state root and assembles the sealed block.
    fn finalize_and_assemble(
        &self,
        header: Header,
        parent: &SealedHeader,
        state: &mut Self::State,
        txs: Vec<Transaction>,
        receipts: &[Receipt],
    ) -> Result<SealedBlock, Self::Error>;
}
