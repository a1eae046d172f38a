//! Chain and fee configuration.

use alloc::{collections::BTreeSet, vec::Vec};
use alloy_primitives::{Address, U256};

use crate::FeeConfigError;

/// The fee parameters of the chain.
///
/// The fee config can change over time through a fee manager precompile, so callers should
/// always use the config in force at the parent block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FeeConfig {
    /// The gas limit of every block once the fee fork is active.
    pub gas_limit: u64,
    /// The target number of seconds between blocks.
    pub target_block_rate: u64,
    /// The lowest base fee a block may have.
    pub min_base_fee: U256,
    /// The target gas consumed over the rolling window.
    pub target_gas: u64,
    /// Bounds the base fee change between blocks.
    pub base_fee_change_denominator: u64,
    /// The lowest block gas cost.
    pub min_block_gas_cost: U256,
    /// The highest block gas cost.
    pub max_block_gas_cost: U256,
    /// The change in block gas cost per second away from the target block rate.
    pub block_gas_cost_step: U256,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            gas_limit: 8_000_000,
            target_block_rate: 2,
            min_base_fee: U256::from(25_000_000_000u64),
            target_gas: 15_000_000,
            base_fee_change_denominator: 36,
            min_block_gas_cost: U256::ZERO,
            max_block_gas_cost: U256::from(1_000_000u64),
            block_gas_cost_step: U256::from(200_000u64),
        }
    }
}

impl FeeConfig {
    /// Validates the fee config.
    pub fn validate(&self) -> Result<(), FeeConfigError> {
        if self.gas_limit == 0 {
            return Err(FeeConfigError::ZeroGasLimit);
        }
        if self.target_block_rate == 0 {
            return Err(FeeConfigError::ZeroTargetBlockRate);
        }
        if self.target_gas == 0 {
            return Err(FeeConfigError::ZeroTargetGas);
        }
        if self.base_fee_change_denominator == 0 {
            return Err(FeeConfigError::ZeroChangeDenominator);
        }
        if self.max_block_gas_cost < self.min_block_gas_cost {
            return Err(FeeConfigError::InvertedBlockGasCostBounds {
                min: self.min_block_gas_cost,
                max: self.max_block_gas_cost,
            });
        }
        Ok(())
    }

    /// Sets the gas limit.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Sets the target block rate.
    pub const fn with_target_block_rate(mut self, target_block_rate: u64) -> Self {
        self.target_block_rate = target_block_rate;
        self
    }

    /// Sets the minimum base fee.
    pub const fn with_min_base_fee(mut self, min_base_fee: U256) -> Self {
        self.min_base_fee = min_base_fee;
        self
    }

    /// Sets the target gas.
    pub const fn with_target_gas(mut self, target_gas: u64) -> Self {
        self.target_gas = target_gas;
        self
    }

    /// Sets the base fee change denominator.
    pub const fn with_base_fee_change_denominator(mut self, denominator: u64) -> Self {
        self.base_fee_change_denominator = denominator;
        self
    }

    /// Sets the block gas cost bounds.
    pub const fn with_block_gas_cost_bounds(mut self, min: U256, max: U256) -> Self {
        self.min_block_gas_cost = min;
        self.max_block_gas_cost = max;
        self
    }

    /// Sets the block gas cost step.
    pub const fn with_block_gas_cost_step(mut self, step: U256) -> Self {
        self.block_gas_cost_step = step;
        self
    }
}

/// A scheduled change to a stateful precompile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PrecompileUpgrade {
    /// The address of the precompile.
    pub address: Address,
    /// The timestamp at which the upgrade takes effect.
    pub timestamp: u64,
    /// Whether the upgrade disables the precompile.
    pub disable: bool,
    /// Whether the precompile verifies access list predicates.
    pub predicater: bool,
}

/// The static configuration of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ChainConfig {
    /// The chain id.
    pub chain_id: u64,
    /// Activation timestamp of the fee fork.
    pub subnet_evm_time: Option<u64>,
    /// Activation timestamp of Durango.
    pub durango_time: Option<u64>,
    /// Activation timestamp of Cancun.
    pub cancun_time: Option<u64>,
    /// The fee config at genesis.
    pub fee_config: FeeConfig,
    /// Whether block producers may choose their own fee recipient.
    pub allow_fee_recipients: bool,
    /// Precompile upgrades, in activation order.
    pub upgrades: Vec<PrecompileUpgrade>,
}

impl ChainConfig {
    /// Returns true if the fee fork is active at the given timestamp.
    pub fn is_subnet_evm_active(&self, timestamp: u64) -> bool {
        self.subnet_evm_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Durango is active at the given timestamp.
    pub fn is_durango_active(&self, timestamp: u64) -> bool {
        self.durango_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns true if Cancun is active at the given timestamp.
    pub fn is_cancun_active(&self, timestamp: u64) -> bool {
        self.cancun_time.is_some_and(|t| timestamp >= t)
    }

    /// Returns the rules in force for a block.
    pub fn rules(&self, number: u64, timestamp: u64) -> Rules {
        let mut predicaters = BTreeSet::new();
        for upgrade in self.upgrades.iter().filter(|u| u.timestamp <= timestamp) {
            if upgrade.disable {
                predicaters.remove(&upgrade.address);
            } else if upgrade.predicater {
                predicaters.insert(upgrade.address);
            }
        }

        Rules {
            number,
            timestamp,
            is_subnet_evm: self.is_subnet_evm_active(timestamp),
            is_durango: self.is_durango_active(timestamp),
            is_cancun: self.is_cancun_active(timestamp),
            predicaters,
        }
    }

    /// Returns the upgrades taking effect in `(parent_time, time]`, in schedule order.
    pub fn upgrades_between(
        &self,
        parent_time: u64,
        time: u64,
    ) -> impl Iterator<Item = &PrecompileUpgrade> + '_ {
        self.upgrades.iter().filter(move |u| parent_time < u.timestamp && u.timestamp <= time)
    }
}

/// The fork rules in force for a single block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rules {
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The fee fork is active.
    pub is_subnet_evm: bool,
    /// Durango is active.
    pub is_durango: bool,
    /// Cancun is active.
    pub is_cancun: bool,
    /// The enabled precompiles that verify predicates.
    pub predicaters: BTreeSet<Address>,
}

impl Rules {
    /// Returns true if any predicate-verifying precompile is enabled.
    pub fn predicaters_exist(&self) -> bool {
        !self.predicaters.is_empty()
    }

    /// Returns true if `address` is an enabled predicate-verifying precompile.
    pub fn is_predicater(&self, address: &Address) -> bool {
        self.predicaters.contains(address)
    }
}
