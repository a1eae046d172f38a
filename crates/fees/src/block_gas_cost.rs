//! The block gas cost, an anti-spam surcharge on fast block production.

use alloy_primitives::U256;
use subnet_primitives::Header;

use crate::FeeConfig;

/// Computes the block gas cost of a child of `parent` produced at `timestamp`.
pub fn block_gas_cost(config: &FeeConfig, parent: &Header, timestamp: u64) -> U256 {
    calc_block_gas_cost(config, parent.block_gas_cost, parent.timestamp, timestamp)
}

/// Computes the block gas cost from the parent's cost and the time elapsed since the parent.
///
/// The cost starts from `parent_cost` (or the configured minimum when absent) and moves by
/// `block_gas_cost_step` per second the block is early or late relative to the target block
/// rate: early blocks pay more, late blocks less. A child timestamp before the parent's counts
/// as zero elapsed seconds. The result is clamped to the configured bounds.
pub fn calc_block_gas_cost(
    config: &FeeConfig,
    parent_cost: Option<U256>,
    parent_time: u64,
    current_time: u64,
) -> U256 {
    let parent_cost = parent_cost.unwrap_or(config.min_block_gas_cost);
    let elapsed = current_time.saturating_sub(parent_time);
    let target = config.target_block_rate;
    let step = config.block_gas_cost_step;

    let cost = if elapsed < target {
        parent_cost.saturating_add(step.saturating_mul(U256::from(target - elapsed)))
    } else {
        parent_cost.saturating_sub(step.saturating_mul(U256::from(elapsed - target)))
    };

    if cost < config.min_block_gas_cost {
        config.min_block_gas_cost
    } else if cost > config.max_block_gas_cost {
        config.max_block_gas_cost
    } else {
        cost
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn config() -> FeeConfig {
        FeeConfig::default()
            .with_target_block_rate(2)
            .with_block_gas_cost_bounds(U256::ZERO, U256::from(1_000_000))
            .with_block_gas_cost_step(U256::from(50_000))
    }

    #[rstest]
    #[case::no_parent_cost_at_target(None, 10, 12, 0)]
    #[case::no_parent_cost_same_second(None, 10, 10, 100_000)]
    #[case::early(Some(100_000), 10, 11, 150_000)]
    #[case::at_target(Some(100_000), 10, 12, 100_000)]
    #[case::late(Some(100_000), 10, 13, 50_000)]
    #[case::clamped_to_max(Some(990_000), 10, 10, 1_000_000)]
    #[case::clamped_to_min(Some(100_000), 10, 100, 0)]
    #[case::negative_elapsed(Some(100_000), 10, 5, 200_000)]
    #[case::max_decays_to_floor(Some(1_000_000), 0, 22, 0)]
    #[case::max_one_step_above_floor(Some(1_000_000), 0, 21, 50_000)]
    fn test_calc_block_gas_cost(
        #[case] parent_cost: Option<u64>,
        #[case] parent_time: u64,
        #[case] current_time: u64,
        #[case] expected: u64,
    ) {
        let cost = calc_block_gas_cost(
            &config(),
            parent_cost.map(U256::from),
            parent_time,
            current_time,
        );
        assert_eq!(cost, U256::from(expected));
    }

    #[test]
    fn test_header_block_gas_cost() {
        let parent =
            Header { timestamp: 10, block_gas_cost: Some(U256::from(50_000)), ..Default::default() };
        assert_eq!(block_gas_cost(&config(), &parent, 11), U256::from(100_000));
    }

    proptest! {
        #[test]
        fn test_cost_within_bounds(
            parent_cost in proptest::option::of(any::<u64>()),
            parent_time in any::<u64>(),
            current_time in any::<u64>(),
        ) {
            let config = config();
            let cost = calc_block_gas_cost(&config, parent_cost.map(U256::from), parent_time, current_time);
            prop_assert!(cost >= config.min_block_gas_cost);
            prop_assert!(cost <= config.max_block_gas_cost);
        }

        #[test]
        fn test_cost_non_increasing_with_elapsed(
            parent_cost in 0u64..=1_000_000,
            elapsed in 0u64..1_000,
        ) {
            let config = config();
            let earlier = calc_block_gas_cost(&config, Some(U256::from(parent_cost)), 0, elapsed);
            let later = calc_block_gas_cost(&config, Some(U256::from(parent_cost)), 0, elapsed + 1);
            prop_assert!(later <= earlier);
        }
    }
}
