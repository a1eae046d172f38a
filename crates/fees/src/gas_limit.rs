//! Gas limit rules for blocks before the fee fork.

use crate::{
    constants::{GAS_LIMIT_BOUND_DIVISOR, MIN_GAS_LIMIT},
    FeeError, FeeResult,
};

/// Computes the gas limit of the next block, moving from `parent_gas_limit` toward
/// `desired_limit` by at most `parent_gas_limit / 1024 - 1`.
pub fn calc_gas_limit(parent_gas_limit: u64, desired_limit: u64) -> u64 {
    let delta = (parent_gas_limit / GAS_LIMIT_BOUND_DIVISOR).saturating_sub(1);
    let desired_limit = desired_limit.max(MIN_GAS_LIMIT);

    if parent_gas_limit < desired_limit {
        return parent_gas_limit.saturating_add(delta).min(desired_limit);
    }
    if parent_gas_limit > desired_limit {
        return parent_gas_limit.saturating_sub(delta).max(desired_limit);
    }
    parent_gas_limit
}

/// Verifies that `gas_limit` is within the bounds allowed by the parent's gas limit.
pub fn verify_gas_limit(parent_gas_limit: u64, gas_limit: u64) -> FeeResult<()> {
    let diff = parent_gas_limit.abs_diff(gas_limit);
    if diff >= parent_gas_limit / GAS_LIMIT_BOUND_DIVISOR || gas_limit < MIN_GAS_LIMIT {
        return Err(FeeError::InvalidGasLimit { parent: parent_gas_limit, found: gas_limit });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::raise(8_000_000, 15_000_000, 8_000_000 + 7_811)]
    #[case::raise_to_desired(8_000_000, 8_000_100, 8_000_100)]
    #[case::lower(8_000_000, 5_000_000, 8_000_000 - 7_811)]
    #[case::lower_to_desired(8_000_000, 7_999_900, 7_999_900)]
    #[case::unchanged(8_000_000, 8_000_000, 8_000_000)]
    #[case::desired_below_minimum(5_100, 0, 5_097)]
    fn test_calc_gas_limit(#[case] parent: u64, #[case] desired: u64, #[case] expected: u64) {
        assert_eq!(calc_gas_limit(parent, desired), expected);
    }

    #[test]
    fn test_calc_gas_limit_tiny_parent() {
        assert_eq!(calc_gas_limit(100, 8_000_000), 100);
    }

    #[rstest]
    #[case::within(8_000_000, 8_007_000, true)]
    #[case::at_bound(8_000_000, 8_007_812, false)]
    #[case::below_minimum(5_000, 4_999, false)]
    fn test_verify_gas_limit(#[case] parent: u64, #[case] gas_limit: u64, #[case] ok: bool) {
        assert_eq!(verify_gas_limit(parent, gas_limit).is_ok(), ok);
    }
}
