//! Verification of block fees and header gas fields.

use alloy_primitives::U256;
use subnet_primitives::{Header, Receipt, Transaction};

use crate::{
    base_fee::calc_base_fee, block_gas_cost::block_gas_cost, constants::FEE_WINDOW_SIZE,
    gas_limit::verify_gas_limit, ChainConfig, FeeConfig, FeeError, FeeResult,
};

/// Verifies that the tips paid by `txs` cover the block gas cost.
///
/// Each transaction contributes its effective tip times the gas it used. The total is converted
/// to gas at `base_fee` and must be at least `required_block_gas_cost`.
pub fn verify_block_fee(
    base_fee: U256,
    required_block_gas_cost: U256,
    txs: &[Transaction],
    receipts: &[Receipt],
) -> FeeResult<()> {
    if base_fee.is_zero() {
        return Err(FeeError::NonPositiveBaseFee);
    }
    if txs.len() != receipts.len() {
        return Err(FeeError::ReceiptCountMismatch { txs: txs.len(), receipts: receipts.len() });
    }
    if required_block_gas_cost.is_zero() {
        return Ok(());
    }

    let mut total_block_fee = U256::ZERO;
    for (tx, receipt) in txs.iter().zip(receipts) {
        let tip = tx.effective_gas_tip(base_fee)?;
        total_block_fee =
            total_block_fee.saturating_add(tip.saturating_mul(U256::from(receipt.gas_used)));
    }

    let block_gas = total_block_fee / base_fee;
    if block_gas < required_block_gas_cost {
        return Err(FeeError::InsufficientBlockFee {
            block_gas,
            required: required_block_gas_cost,
        });
    }
    Ok(())
}

/// Returns the lowest tip per gas that would have covered the header's block gas cost.
///
/// Returns `None` before the fee fork or for a block that used no gas.
pub fn min_required_tip(chain: &ChainConfig, header: &Header) -> FeeResult<Option<U256>> {
    if !chain.is_subnet_evm_active(header.timestamp) {
        return Ok(None);
    }
    let base_fee = header.base_fee_per_gas.ok_or(FeeError::MissingBaseFee)?;
    let block_gas_cost = header.block_gas_cost.ok_or(FeeError::MissingBlockGasCost)?;
    if header.gas_used == 0 {
        return Ok(None);
    }
    Ok(Some(block_gas_cost.saturating_mul(base_fee) / U256::from(header.gas_used)))
}

/// Verifies the gas-related fields of `header` against its parent.
///
/// After the fee fork the gas limit must equal the configured limit, and the fee window, base
/// fee and block gas cost must match the values derived from the parent. Before it, the gas
/// limit may only drift within the bound set by the parent.
pub fn verify_header_gas_fields(
    chain: &ChainConfig,
    config: &FeeConfig,
    parent: &Header,
    header: &Header,
) -> FeeResult<()> {
    let is_active = chain.is_subnet_evm_active(header.timestamp);
    if is_active {
        if header.gas_limit != config.gas_limit {
            return Err(FeeError::GasLimitMismatch {
                expected: config.gas_limit,
                found: header.gas_limit,
            });
        }
    } else {
        verify_gas_limit(parent.gas_limit, header.gas_limit)?;
    }

    if header.gas_used > header.gas_limit {
        return Err(FeeError::GasUsedExceedsLimit { used: header.gas_used, limit: header.gas_limit });
    }
    if !is_active {
        return Ok(());
    }

    let (window, expected_base_fee) = calc_base_fee(chain, config, parent, header.timestamp)?;
    if header.extra_data.get(..FEE_WINDOW_SIZE) != Some(window.as_ref()) {
        return Err(FeeError::InvalidFeeWindow);
    }

    let base_fee = header.base_fee_per_gas.ok_or(FeeError::MissingBaseFee)?;
    if base_fee < config.min_base_fee {
        return Err(FeeError::BaseFeeBelowMinimum { base_fee, minimum: config.min_base_fee });
    }
    if base_fee != expected_base_fee {
        return Err(FeeError::BaseFeeMismatch { expected: expected_base_fee, found: base_fee });
    }

    let expected_cost = block_gas_cost(config, parent, header.timestamp);
    if header.block_gas_cost != Some(expected_cost) {
        return Err(FeeError::BlockGasCostMismatch {
            expected: expected_cost,
            found: header.block_gas_cost,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::block_gas_cost::calc_block_gas_cost;
    use alloc::{vec, vec::Vec};
    use alloy_primitives::Bytes;
    use rstest::rstest;
    use subnet_primitives::{TransactionError, TxType};

    fn config() -> FeeConfig {
        FeeConfig::default()
            .with_target_block_rate(2)
            .with_block_gas_cost_bounds(U256::ZERO, U256::from(1_000_000))
            .with_block_gas_cost_step(U256::from(50_000))
    }

    fn legacy_tx(gas_price: u64) -> Transaction {
        Transaction {
            tx_type: TxType::Legacy,
            gas_fee_cap: U256::from(gas_price),
            gas_tip_cap: U256::from(gas_price),
            gas_limit: 1_000_000,
            ..Default::default()
        }
    }

    fn receipt(gas_used: u64) -> Receipt {
        Receipt { gas_used, ..Default::default() }
    }

    /// Block gas cost of a child produced in the same second as a parent with no cost.
    fn required_cost() -> U256 {
        calc_block_gas_cost(&config(), Some(U256::ZERO), 10, 10)
    }

    #[rstest]
    #[case::tx_only_base_fee(vec![(100, 1_000)], false)]
    #[case::tx_covers_block_fee(vec![(200, 100_000)], true)]
    #[case::tx_one_gas_short(vec![(200, 99_999)], false)]
    #[case::split_across_txs(vec![(200, 50_000), (300, 25_000)], true)]
    #[case::split_one_short(vec![(200, 50_000), (300, 24_999)], false)]
    fn test_verify_block_fee(#[case] txs: Vec<(u64, u64)>, #[case] ok: bool) {
        assert_eq!(required_cost(), U256::from(100_000));
        let receipts: Vec<_> = txs.iter().map(|(_, gas)| receipt(*gas)).collect();
        let txs: Vec<_> = txs.iter().map(|(price, _)| legacy_tx(*price)).collect();
        let result = verify_block_fee(U256::from(100), required_cost(), &txs, &receipts);
        assert_eq!(result.is_ok(), ok, "{result:?}");
    }

    #[test]
    fn test_insufficient_block_fee_reports_gas() {
        let err =
            verify_block_fee(U256::from(100), required_cost(), &[legacy_tx(200)], &[receipt(99_999)])
                .unwrap_err();
        assert_eq!(
            err,
            FeeError::InsufficientBlockFee { block_gas: U256::from(99_999), required: U256::from(100_000) }
        );
    }

    #[test]
    fn test_no_required_cost_with_no_txs() {
        assert_eq!(verify_block_fee(U256::from(100), U256::ZERO, &[], &[]), Ok(()));
    }

    #[test]
    fn test_required_cost_with_no_txs() {
        assert!(verify_block_fee(U256::from(100), U256::from(1), &[], &[]).is_err());
    }

    #[test]
    fn test_zero_base_fee() {
        assert_eq!(
            verify_block_fee(U256::ZERO, U256::ZERO, &[], &[]),
            Err(FeeError::NonPositiveBaseFee)
        );
    }

    #[test]
    fn test_receipt_count_mismatch() {
        assert_eq!(
            verify_block_fee(U256::from(1), U256::from(1), &[legacy_tx(1)], &[]),
            Err(FeeError::ReceiptCountMismatch { txs: 1, receipts: 0 })
        );
    }

    #[test]
    fn test_fee_cap_below_base_fee() {
        let err = verify_block_fee(U256::from(100), U256::from(1), &[legacy_tx(99)], &[receipt(1)])
            .unwrap_err();
        assert_eq!(
            err,
            FeeError::FeeCapTooLow(TransactionError::FeeCapTooLow {
                fee_cap: U256::from(99),
                base_fee: U256::from(100)
            })
        );
    }

    #[rstest]
    #[case::inactive(None, Some(100), Some(100_000), 1_000, None)]
    #[case::no_gas_used(Some(0), Some(100), Some(100_000), 0, None)]
    #[case::covers_cost(Some(0), Some(100), Some(100_000), 100_000, Some(100))]
    #[case::rounds_down(Some(0), Some(100), Some(100_000), 300_000, Some(33))]
    fn test_min_required_tip(
        #[case] fork: Option<u64>,
        #[case] base_fee: Option<u64>,
        #[case] block_gas_cost: Option<u64>,
        #[case] gas_used: u64,
        #[case] expected: Option<u64>,
    ) {
        let chain = ChainConfig { subnet_evm_time: fork, ..Default::default() };
        let header = Header {
            base_fee_per_gas: base_fee.map(U256::from),
            block_gas_cost: block_gas_cost.map(U256::from),
            gas_used,
            ..Default::default()
        };
        assert_eq!(min_required_tip(&chain, &header).unwrap(), expected.map(U256::from));
    }

    #[test]
    fn test_min_required_tip_missing_fields() {
        let chain = ChainConfig { subnet_evm_time: Some(0), ..Default::default() };
        let header = Header { base_fee_per_gas: Some(U256::from(1)), ..Default::default() };
        assert_eq!(min_required_tip(&chain, &header), Err(FeeError::MissingBlockGasCost));
    }

    fn chain() -> ChainConfig {
        ChainConfig { subnet_evm_time: Some(0), ..Default::default() }
    }

    fn parent() -> Header {
        Header {
            number: 5,
            timestamp: 100,
            gas_limit: config().gas_limit,
            gas_used: 1_000_000,
            base_fee_per_gas: Some(config().min_base_fee),
            block_gas_cost: Some(U256::ZERO),
            extra_data: Bytes::from(vec![0u8; FEE_WINDOW_SIZE]),
            ..Default::default()
        }
    }

    fn valid_child() -> Header {
        let parent = parent();
        let (window, base_fee) = calc_base_fee(&chain(), &config(), &parent, 103).unwrap();
        Header {
            number: 6,
            timestamp: 103,
            gas_limit: config().gas_limit,
            base_fee_per_gas: Some(base_fee),
            block_gas_cost: Some(block_gas_cost(&config(), &parent, 103)),
            extra_data: window,
            ..Default::default()
        }
    }

    #[test]
    fn test_verify_header_gas_fields() {
        assert_eq!(verify_header_gas_fields(&chain(), &config(), &parent(), &valid_child()), Ok(()));
    }

    #[test]
    fn test_verify_header_allows_trailing_extra_data() {
        let mut child = valid_child();
        let mut extra = child.extra_data.to_vec();
        extra.extend_from_slice(&[1, 2, 3]);
        child.extra_data = Bytes::from(extra);
        assert_eq!(verify_header_gas_fields(&chain(), &config(), &parent(), &child), Ok(()));
    }

    #[rstest]
    #[case::gas_limit(|h: &mut Header| h.gas_limit += 1)]
    #[case::gas_used(|h: &mut Header| h.gas_used = h.gas_limit + 1)]
    #[case::window(|h: &mut Header| h.extra_data = Bytes::from(vec![1u8; FEE_WINDOW_SIZE]))]
    #[case::base_fee(|h: &mut Header| h.base_fee_per_gas = h.base_fee_per_gas.map(|f| f + U256::from(1)))]
    #[case::missing_base_fee(|h: &mut Header| h.base_fee_per_gas = None)]
    #[case::block_gas_cost(|h: &mut Header| h.block_gas_cost = Some(U256::from(1)))]
    #[case::missing_block_gas_cost(|h: &mut Header| h.block_gas_cost = None)]
    fn test_verify_header_rejects(#[case] tamper: fn(&mut Header)) {
        let mut child = valid_child();
        tamper(&mut child);
        assert!(verify_header_gas_fields(&chain(), &config(), &parent(), &child).is_err());
    }

    #[test]
    fn test_verify_header_before_fork() {
        let chain = ChainConfig::default();
        let parent = Header { gas_limit: 8_000_000, ..Default::default() };
        let child = Header { gas_limit: 8_007_000, ..Default::default() };
        assert_eq!(verify_header_gas_fields(&chain, &config(), &parent, &child), Ok(()));

        let child = Header { gas_limit: 9_000_000, ..Default::default() };
        assert_eq!(
            verify_header_gas_fields(&chain, &config(), &parent, &child),
            Err(FeeError::InvalidGasLimit { parent: 8_000_000, found: 9_000_000 })
        );
    }
}
