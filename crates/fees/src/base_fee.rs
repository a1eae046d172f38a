//! The rolling-window base fee.

use alloc::vec;
use alloy_primitives::{Bytes, U256};
use subnet_primitives::Header;

use crate::{
    block_gas_cost::calc_block_gas_cost,
    constants::{FEE_WINDOW_SIZE, ROLLUP_WINDOW},
    ChainConfig, FeeConfig, FeeError, FeeResult, LongWindow,
};

/// Computes the fee window and base fee of a child of `parent` produced at `timestamp`.
///
/// The parent's window is rolled forward one bucket per elapsed second. While the parent is
/// still inside the window, its gas used plus the block gas cost it was charged is added to its
/// bucket. The base fee then moves toward the target in proportion to how far the window's total
/// gas is from `target_gas`, and never drops below `min_base_fee`.
///
/// Returns the encoded window, to be placed at the start of the child's `extra_data`, and the
/// child's base fee.
pub fn calc_base_fee(
    chain: &ChainConfig,
    config: &FeeConfig,
    parent: &Header,
    timestamp: u64,
) -> FeeResult<(Bytes, U256)> {
    if !chain.is_subnet_evm_active(parent.timestamp) || parent.number == 0 {
        return Ok((Bytes::from(vec![0u8; FEE_WINDOW_SIZE]), config.min_base_fee));
    }

    let mut window = LongWindow::decode(&parent.extra_data, ROLLUP_WINDOW)?;
    if timestamp < parent.timestamp {
        return Err(FeeError::TimestampBeforeParent { parent: parent.timestamp, timestamp });
    }
    let parent_base_fee = parent.base_fee_per_gas.ok_or(FeeError::MissingParentBaseFee)?;

    let roll = timestamp - parent.timestamp;
    window.roll(roll);

    if roll < ROLLUP_WINDOW as u64 {
        let block_gas_cost =
            calc_block_gas_cost(config, parent.block_gas_cost, parent.timestamp, timestamp)
                .saturating_to::<u64>();
        let added_gas = parent.gas_used.saturating_add(block_gas_cost);
        window.update(ROLLUP_WINDOW - 1 - roll as usize, added_gas)?;
    }

    let total_gas = window.sum();
    let target_gas = config.target_gas;
    let mut base_fee = parent_base_fee;

    if total_gas > target_gas {
        let delta = base_fee_delta(config, parent_base_fee, total_gas - target_gas);
        base_fee = base_fee.saturating_add(delta);
    } else if total_gas < target_gas {
        let mut delta = base_fee_delta(config, parent_base_fee, target_gas - total_gas);
        // One decrease per full window without blocks.
        if roll > ROLLUP_WINDOW as u64 {
            delta = delta.saturating_mul(U256::from(roll / ROLLUP_WINDOW as u64));
        }
        base_fee = base_fee.saturating_sub(delta);
    }

    let base_fee = base_fee.max(config.min_base_fee);
    trace!(
        target: "fees",
        total_gas,
        target_gas,
        roll,
        %parent_base_fee,
        %base_fee,
        "Computed base fee"
    );

    Ok((Bytes::from(window.encode()), base_fee))
}

/// Estimates the base fee of a block produced at `timestamp` on top of `parent`.
///
/// Unlike [calc_base_fee], a `timestamp` before the parent's is raised to the parent's so that
/// clock skew does not fail the estimate.
pub fn estimate_next_base_fee(
    chain: &ChainConfig,
    config: &FeeConfig,
    parent: &Header,
    timestamp: u64,
) -> FeeResult<(Bytes, U256)> {
    calc_base_fee(chain, config, parent, timestamp.max(parent.timestamp))
}

/// `max(1, parent_base_fee * gas_delta / target_gas / base_fee_change_denominator)`
fn base_fee_delta(config: &FeeConfig, parent_base_fee: U256, gas_delta: u64) -> U256 {
    let delta = parent_base_fee.saturating_mul(U256::from(gas_delta)) /
        U256::from(config.target_gas.max(1)) /
        U256::from(config.base_fee_change_denominator.max(1));
    delta.max(U256::from(1))
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;
    use rstest::rstest;

    const PARENT_BASE_FEE: u64 = 36_000_000;

    fn chain() -> ChainConfig {
        ChainConfig { subnet_evm_time: Some(0), ..Default::default() }
    }

    /// A fee config with no block gas cost so windows hold only gas used.
    fn config() -> FeeConfig {
        FeeConfig::default()
            .with_min_base_fee(U256::from(1))
            .with_target_gas(15_000_000)
            .with_base_fee_change_denominator(36)
            .with_block_gas_cost_bounds(U256::ZERO, U256::ZERO)
    }

    fn parent(gas_used: u64, window: &[u64]) -> Header {
        Header {
            number: 1,
            timestamp: 100,
            gas_used,
            base_fee_per_gas: Some(U256::from(PARENT_BASE_FEE)),
            extra_data: Bytes::from(LongWindow::from_slots(window.to_vec()).encode()),
            ..Default::default()
        }
    }

    fn zero_window() -> Vec<u64> {
        vec![0; ROLLUP_WINDOW]
    }

    #[test]
    fn test_genesis_parent_returns_initial_values() {
        let parent = Header { number: 0, ..parent(0, &zero_window()) };
        let (extra, base_fee) = calc_base_fee(&chain(), &config(), &parent, 101).unwrap();
        assert_eq!(extra, Bytes::from(vec![0u8; FEE_WINDOW_SIZE]));
        assert_eq!(base_fee, config().min_base_fee);
    }

    #[test]
    fn test_inactive_fork_returns_initial_values() {
        let chain = ChainConfig { subnet_evm_time: Some(1_000), ..Default::default() };
        let (extra, base_fee) =
            calc_base_fee(&chain, &config(), &parent(1_000_000, &zero_window()), 101).unwrap();
        assert_eq!(extra.len(), FEE_WINDOW_SIZE);
        assert_eq!(base_fee, U256::from(1));
    }

    #[test]
    fn test_timestamp_before_parent() {
        let err = calc_base_fee(&chain(), &config(), &parent(0, &zero_window()), 99).unwrap_err();
        assert_eq!(err, FeeError::TimestampBeforeParent { parent: 100, timestamp: 99 });
    }

    #[test]
    fn test_estimate_tolerates_clock_skew() {
        let parent = parent(15_000_000, &zero_window());
        let estimated = estimate_next_base_fee(&chain(), &config(), &parent, 99).unwrap();
        assert_eq!(estimated, calc_base_fee(&chain(), &config(), &parent, 100).unwrap());
    }

    #[test]
    fn test_missing_parent_base_fee() {
        let parent = Header { base_fee_per_gas: None, ..parent(0, &zero_window()) };
        let err = calc_base_fee(&chain(), &config(), &parent, 101).unwrap_err();
        assert_eq!(err, FeeError::MissingParentBaseFee);
    }

    #[test]
    fn test_short_extra_data() {
        let parent = Header { extra_data: Bytes::from(vec![0u8; 40]), ..parent(0, &zero_window()) };
        let err = calc_base_fee(&chain(), &config(), &parent, 101).unwrap_err();
        assert_eq!(err, FeeError::WindowSizeMismatch { expected: ROLLUP_WINDOW, actual: 5 });
    }

    #[rstest]
    #[case::at_target(15_000_000, 1, PARENT_BASE_FEE)]
    #[case::double_target(30_000_000, 1, PARENT_BASE_FEE + 1_000_000)]
    #[case::empty_parent(0, 1, PARENT_BASE_FEE - 1_000_000)]
    #[case::parent_outside_window(15_000_000, 10, PARENT_BASE_FEE - 1_000_000)]
    #[case::two_empty_windows(15_000_000, 25, PARENT_BASE_FEE - 2_000_000)]
    fn test_base_fee_adjustment(
        #[case] gas_used: u64,
        #[case] elapsed: u64,
        #[case] expected: u64,
    ) {
        let parent = parent(gas_used, &zero_window());
        let (_, base_fee) = calc_base_fee(&chain(), &config(), &parent, 100 + elapsed).unwrap();
        assert_eq!(base_fee, U256::from(expected));
    }

    #[test]
    fn test_parent_gas_lands_in_its_bucket() {
        let parent = parent(1_234, &zero_window());
        let (extra, _) = calc_base_fee(&chain(), &config(), &parent, 102).unwrap();
        let window = LongWindow::decode_exact(&extra, ROLLUP_WINDOW).unwrap();
        let mut expected = zero_window();
        expected[ROLLUP_WINDOW - 3] = 1_234;
        assert_eq!(window.slots(), expected.as_slice());
    }

    #[test]
    fn test_block_gas_cost_counts_toward_window() {
        let config = config()
            .with_block_gas_cost_bounds(U256::ZERO, U256::from(1_000_000))
            .with_block_gas_cost_step(U256::from(50_000));
        let parent = parent(1_000, &zero_window());
        let (extra, _) = calc_base_fee(&chain(), &config, &parent, 101).unwrap();
        let window = LongWindow::decode_exact(&extra, ROLLUP_WINDOW).unwrap();
        // One second early against a two second target.
        assert_eq!(window.slots()[ROLLUP_WINDOW - 2], 1_000 + 50_000);
    }

    #[test]
    fn test_window_rolls_existing_gas() {
        let mut slots = zero_window();
        slots[ROLLUP_WINDOW - 1] = 7_000_000;
        slots[ROLLUP_WINDOW - 2] = 8_000_000;
        let parent = parent(0, &slots);
        let (extra, base_fee) = calc_base_fee(&chain(), &config(), &parent, 102).unwrap();
        let window = LongWindow::decode_exact(&extra, ROLLUP_WINDOW).unwrap();
        assert_eq!(window.slots()[ROLLUP_WINDOW - 3], 7_000_000);
        assert_eq!(window.slots()[ROLLUP_WINDOW - 4], 8_000_000);
        assert_eq!(window.sum(), 15_000_000);
        assert_eq!(base_fee, U256::from(PARENT_BASE_FEE));
    }

    #[test]
    fn test_delta_is_at_least_one() {
        let parent = Header { base_fee_per_gas: Some(U256::from(2)), ..parent(15_000_001, &zero_window()) };
        let (_, base_fee) = calc_base_fee(&chain(), &config(), &parent, 101).unwrap();
        assert_eq!(base_fee, U256::from(3));
    }

    #[test]
    fn test_clamped_to_min_base_fee() {
        let config = config().with_min_base_fee(U256::from(PARENT_BASE_FEE));
        let (_, base_fee) =
            calc_base_fee(&chain(), &config, &parent(0, &zero_window()), 101).unwrap();
        assert_eq!(base_fee, U256::from(PARENT_BASE_FEE));
    }

    #[test]
    fn test_long_gap_regression() {
        let parent = parent(u64::MAX, &[u64::MAX; ROLLUP_WINDOW]);
        let timestamp = 100 + ROLLUP_WINDOW as u64 + 1_000;
        let (extra, base_fee) = calc_base_fee(&chain(), &config(), &parent, timestamp).unwrap();
        assert_eq!(extra, Bytes::from(vec![0u8; FEE_WINDOW_SIZE]));
        assert!(base_fee >= config().min_base_fee);
    }

    proptest! {
        #[test]
        fn test_base_fee_never_below_floor(
            parent_base_fee in any::<u64>(),
            gas_used in any::<u64>(),
            window in proptest::collection::vec(any::<u64>(), ROLLUP_WINDOW),
            elapsed in 0u64..100_000,
            min_base_fee in 0u64..1_000_000_000,
        ) {
            let config = config().with_min_base_fee(U256::from(min_base_fee));
            let parent = Header {
                base_fee_per_gas: Some(U256::from(parent_base_fee)),
                ..parent(gas_used, &window)
            };
            let (extra, base_fee) = calc_base_fee(&chain(), &config, &parent, 100 + elapsed).unwrap();
            prop_assert_eq!(extra.len(), FEE_WINDOW_SIZE);
            prop_assert!(base_fee >= U256::from(min_base_fee));
        }
    }
}
