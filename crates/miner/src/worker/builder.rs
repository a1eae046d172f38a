//! Contains the builder pattern for the [Miner].

use alloc::sync::Arc;
use alloy_primitives::Address;
use subnet_fees::ChainConfig;

use super::Miner;
use crate::{
    ChainReader, Clock, ConfigError, ExecutionEngine, HighestTip, LaneSelector, MinerConfig,
    MinerMetrics, NoopMinerMetrics, Predicater, Predicaters, TxPool,
};

/// The builder pattern for the [Miner].
#[derive(Debug)]
pub struct MinerBuilder<C, P, E> {
    /// The chain configuration.
    chain_config: Arc<ChainConfig>,
    /// The block producer configuration.
    config: MinerConfig,
    /// The [ChainReader] to build on.
    chain: Option<C>,
    /// The [TxPool] to draw transactions from.
    pool: Option<P>,
    /// The [ExecutionEngine] to execute transactions with.
    engine: Option<E>,
    /// The registered predicate verifiers.
    predicaters: Predicaters,
    /// The strategy merging transaction lanes.
    lane_selector: Option<Arc<dyn LaneSelector + Send + Sync>>,
    /// The metrics sink.
    metrics: Option<Arc<dyn MinerMetrics + Send + Sync>>,
    /// The clock stamping block timestamps.
    clock: Option<Arc<dyn Clock + Send + Sync>>,
}

impl<C, P, E> MinerBuilder<C, P, E>
where
    C: ChainReader,
    P: TxPool,
    E: ExecutionEngine<State = C::State>,
{
    /// Instantiate a new builder with the given [ChainConfig].
    pub fn with_chain_config(chain_config: Arc<ChainConfig>) -> Self {
        Self {
            chain_config,
            config: MinerConfig::default(),
            chain: None,
            pool: None,
            engine: None,
            predicaters: Predicaters::new(),
            lane_selector: None,
            metrics: None,
            clock: None,
        }
    }

    /// Set the [MinerConfig].
    pub fn with_config(mut self, config: MinerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the [ChainReader].
    pub fn with_chain(mut self, chain: C) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Set the [TxPool].
    pub fn with_pool(mut self, pool: P) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Set the [ExecutionEngine].
    pub fn with_engine(mut self, engine: E) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Register a [Predicater] for the precompile at `address`.
    pub fn with_predicater(
        mut self,
        address: Address,
        predicater: Arc<dyn Predicater + Send + Sync>,
    ) -> Self {
        self.predicaters.insert(address, predicater);
        self
    }

    /// Set the [LaneSelector]. Defaults to [HighestTip].
    pub fn with_lane_selector(
        mut self,
        lane_selector: Arc<dyn LaneSelector + Send + Sync>,
    ) -> Self {
        self.lane_selector = Some(lane_selector);
        self
    }

    /// Set the [MinerMetrics] sink. Defaults to [NoopMinerMetrics].
    pub fn with_metrics(mut self, metrics: Arc<dyn MinerMetrics + Send + Sync>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the [Clock]. Defaults to the system clock when the `std` feature is enabled.
    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the [Miner] from the builder configuration.
    pub fn build(self) -> Result<Miner<C, P, E>, ConfigError> {
        if self.config.etherbase.is_zero() {
            return Err(ConfigError::MissingCoinbase);
        }
        self.chain_config.fee_config.validate()?;

        let chain = self.chain.ok_or(ConfigError::MissingComponent("chain"))?;
        let pool = self.pool.ok_or(ConfigError::MissingComponent("transaction pool"))?;
        let engine = self.engine.ok_or(ConfigError::MissingComponent("execution engine"))?;
        let clock = match self.clock {
            Some(clock) => clock,
            None => default_clock()?,
        };

        Ok(Miner {
            config: self.config,
            chain_config: self.chain_config,
            chain,
            pool,
            engine,
            predicaters: self.predicaters,
            lane_selector: self.lane_selector.unwrap_or_else(|| Arc::new(HighestTip)),
            metrics: self.metrics.unwrap_or_else(|| Arc::new(NoopMinerMetrics)),
            clock,
        })
    }
}

#[cfg(feature = "std")]
fn default_clock() -> Result<Arc<dyn Clock + Send + Sync>, ConfigError> {
    Ok(Arc::new(crate::SystemClock))
}

#[cfg(not(feature = "std"))]
fn default_clock() -> Result<Arc<dyn Clock + Send + Sync>, ConfigError> {
    Err(ConfigError::MissingClock)
}
