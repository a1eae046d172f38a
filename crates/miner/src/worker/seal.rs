//! Sealing of a filled block.

use alloc::string::ToString;
use alloy_primitives::U256;
use subnet_fees::{block_gas_cost, verify_block_fee, FeeError};

use super::{GeneratedBlock, Miner};
use crate::{ChainReader, Environment, ExecutionEngine, MinerError, MinerResult, TxPool};

impl<C, P, E> Miner<C, P, E>
where
    C: ChainReader,
    P: TxPool,
    E: ExecutionEngine<State = C::State>,
{
    /// Charges the block gas cost, records predicate results and assembles the block.
    pub(super) fn seal(&self, mut env: Environment<C::State>) -> MinerResult<GeneratedBlock> {
        if env.rules.is_subnet_evm {
            let cost = block_gas_cost(&env.fee_config, env.parent.header(), env.header.timestamp);
            env.header.block_gas_cost = Some(cost);
            let base_fee = env.header.base_fee_per_gas.ok_or(FeeError::MissingBaseFee)?;
            verify_block_fee(base_fee, cost, &env.txs, &env.receipts)?;
        }

        if env.rules.is_durango {
            let results = env.predicate_results.encode()?;
            let mut extra_data = env.header.extra_data.to_vec();
            extra_data.extend_from_slice(&results);
            env.header.extra_data = extra_data.into();
        }

        let Environment { header, parent, mut state, txs, mut receipts, sidecars, tcount, .. } =
            env;
        let block = self
            .engine
            .finalize_and_assemble(header, &parent, &mut state, txs, &receipts)
            .map_err(|e| MinerError::Engine(e.to_string()))?
            .with_sidecars(sidecars);

        let (hash, number) = (block.hash(), block.number());
        if !self.config.allow_duplicate_blocks && self.chain.has_block(hash, number) {
            return Err(MinerError::DuplicateBlock { hash, number });
        }

        let mut log_index = 0;
        let mut fees = U256::ZERO;
        for (index, receipt) in receipts.iter_mut().enumerate() {
            log_index = receipt.set_location(hash, number, receipt_index(index)?, log_index);
            fees = fees.saturating_add(
                receipt.effective_gas_price.saturating_mul(U256::from(receipt.gas_used)),
            );
        }

        info!(
            target: "miner",
            "Commit new mining work | Number: {number} | Hash: {hash} | Txs: {tcount} | Gas: {gas} | Fees: {fees}",
            gas = block.header.gas_used,
        );
        self.metrics.record_block(&block);

        Ok(GeneratedBlock { block, receipts })
    }
}

/// Converts a transaction's position in the block to its receipt index.
fn receipt_index(index: usize) -> MinerResult<u32> {
    u32::try_from(index).map_err(|_| MinerError::TransactionIndexOverflow(index))
}
