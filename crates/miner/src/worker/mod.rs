//! The block producer.
//!
//! A building attempt runs three phases over a single [Environment]:
//!
//! 1. Preparing: the header is derived from the parent, fees are computed, the coinbase is
//!    resolved and scheduled upgrades are applied.
//! 2. Selecting: pending transactions are drawn from the pool, locals before remotes, and
//!    executed one by one. A failed transaction only costs its sender its place in the block.
//! 3. Sealing: the block gas cost is charged, predicate results are appended to the header and
//!    the engine assembles the block.
//!
//! A failure while preparing or sealing aborts the attempt and no block is returned.

use alloc::{string::ToString, sync::Arc, vec::Vec};
use alloy_eips::eip4844::calc_excess_blob_gas;
use subnet_fees::{calc_base_fee, calc_gas_limit, ChainConfig};
use subnet_primitives::{Header, Receipt, SealedBlock};

use crate::{
    CancellationToken, ChainReader, Clock, ConfigError, Environment, ExecutionEngine,
    LaneSelector, MinerConfig, MinerError, MinerMetrics, MinerResult, PredicateContext,
    Predicaters, TxPool,
};

mod builder;
pub use builder::MinerBuilder;

mod commit;

mod seal;

/// A sealed block together with its finalized receipts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBlock {
    /// The sealed block.
    pub block: SealedBlock,
    /// The receipts, stamped with the block's location.
    pub receipts: Vec<Receipt>,
}

/// Builds blocks on top of the current head of a chain.
///
/// The miner holds only shared, read-only inputs. Each call to [Miner::generate_block] builds
/// in its own [Environment], so attempts never observe each other.
#[derive(Debug)]
pub struct Miner<C, P, E> {
    /// The block producer configuration.
    pub(crate) config: MinerConfig,
    /// The chain configuration.
    pub(crate) chain_config: Arc<ChainConfig>,
    /// The chain to build on.
    pub(crate) chain: C,
    /// The pending transaction source.
    pub(crate) pool: P,
    /// The execution engine.
    pub(crate) engine: E,
    /// The registered predicate verifiers.
    pub(crate) predicaters: Predicaters,
    /// The strategy merging transaction lanes.
    pub(crate) lane_selector: Arc<dyn LaneSelector + Send + Sync>,
    /// The metrics sink.
    pub(crate) metrics: Arc<dyn MinerMetrics + Send + Sync>,
    /// The clock stamping block timestamps.
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
}

impl<C, P, E> Miner<C, P, E>
where
    C: ChainReader,
    P: TxPool,
    E: ExecutionEngine<State = C::State>,
{
    /// Returns a [MinerBuilder] for the given chain.
    pub fn builder(chain_config: Arc<ChainConfig>) -> MinerBuilder<C, P, E> {
        MinerBuilder::with_chain_config(chain_config)
    }

    /// Returns the block producer configuration.
    pub const fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Returns the chain configuration.
    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    /// Returns the chain the miner builds on.
    pub const fn chain(&self) -> &C {
        &self.chain
    }

    /// Returns the transaction pool.
    pub const fn pool(&self) -> &P {
        &self.pool
    }

    /// Builds a block on top of the current head.
    ///
    /// `predicate_context` is required to include transactions carrying predicates. Cancelling
    /// `cancel` stops the attempt before the next transaction and discards the block.
    pub fn generate_block(
        &self,
        predicate_context: Option<PredicateContext>,
        cancel: &CancellationToken,
    ) -> MinerResult<GeneratedBlock> {
        let mut env = self.prepare_environment(predicate_context)?;
        self.fill_transactions(&mut env, cancel)?;
        if cancel.is_cancelled() {
            return Err(MinerError::Cancelled);
        }
        self.seal(env)
    }

    /// Derives the next header from the current head and opens its environment.
    fn prepare_environment(
        &self,
        predicate_context: Option<PredicateContext>,
    ) -> MinerResult<Environment<C::State>> {
        let parent = self.chain.current_header();
        let chain_config = &*self.chain_config;

        // Blocks may share their parent's timestamp.
        let timestamp = self.clock.now().max(parent.timestamp);
        let number =
            parent.number.checked_add(1).ok_or(MinerError::BlockNumberOverflow(parent.number))?;

        let fee_config = self
            .chain
            .fee_config_at(parent.header())
            .map_err(|e| MinerError::Chain(e.to_string()))?;
        fee_config.validate().map_err(ConfigError::from)?;

        let gas_limit = if chain_config.is_subnet_evm_active(timestamp) {
            fee_config.gas_limit
        } else {
            calc_gas_limit(parent.gas_limit, fee_config.gas_limit)
        };

        let mut header = Header {
            parent_hash: parent.hash(),
            number,
            gas_limit,
            timestamp,
            ..Default::default()
        };

        if chain_config.is_subnet_evm_active(timestamp) {
            let (extra_data, base_fee) =
                calc_base_fee(chain_config, &fee_config, parent.header(), timestamp)?;
            header.extra_data = extra_data;
            header.base_fee_per_gas = Some(base_fee);
        }

        if chain_config.is_cancun_active(timestamp) {
            let excess_blob_gas = if chain_config.is_cancun_active(parent.timestamp) {
                calc_excess_blob_gas(
                    parent.excess_blob_gas.unwrap_or_default(),
                    parent.blob_gas_used.unwrap_or_default(),
                )
            } else {
                calc_excess_blob_gas(0, 0)
            };
            header.blob_gas_used = Some(0);
            header.excess_blob_gas = Some(excess_blob_gas);
            header.parent_beacon_block_root = Some(self.config.beacon_root.unwrap_or_default());
        }

        let etherbase = self.config.etherbase;
        if etherbase.is_zero() {
            return Err(ConfigError::MissingCoinbase.into());
        }
        header.beneficiary = etherbase;
        let (required_coinbase, allow_fee_recipients) = self
            .chain
            .coinbase_at(parent.header())
            .map_err(|e| MinerError::Chain(e.to_string()))?;
        if !allow_fee_recipients {
            if required_coinbase != etherbase {
                info!(
                    target: "miner",
                    "Fee recipients are disabled, using required coinbase {required_coinbase} instead of {etherbase}"
                );
            }
            header.beneficiary = required_coinbase;
        }

        self.engine
            .prepare(&mut header)
            .map_err(|e| MinerError::Engine(alloc::format!("failed to prepare header: {e}")))?;

        let state =
            self.chain.state_at(parent.state_root).map_err(|e| MinerError::Chain(e.to_string()))?;
        let rules = chain_config.rules(number, timestamp);
        let mut env = Environment::new(rules, state, parent, header, fee_config, predicate_context);

        for upgrade in chain_config.upgrades_between(env.parent.timestamp, env.header.timestamp) {
            if let Err(e) = self.engine.apply_upgrade(upgrade, &env.header, &mut env.state) {
                error!(
                    target: "miner",
                    "Failed to configure precompile {address} for block # {number}: {e}",
                    address = upgrade.address,
                );
                return Err(MinerError::Engine(e.to_string()));
            }
        }

        debug!(
            target: "miner",
            "Prepared block # {number} | Timestamp: {timestamp} | Gas limit: {gas_limit} | Base fee: {base_fee:?}",
            base_fee = env.header.base_fee_per_gas,
        );
        Ok(env)
    }
}
