//! Errors for the `subnet-fees` crate.

use alloy_primitives::U256;
use subnet_primitives::TransactionError;

/// A consensus violation in the fee rules.
///
/// Any of these aborts block production or verification.
#[derive(derive_more::Display, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    /// The encoded window is not a whole number of counters.
    #[display("Fee window length {_0} is not a multiple of 8")]
    UnalignedWindow(usize),
    /// The encoded window holds a different number of counters than expected.
    #[display("Fee window has {actual} slots, expected {expected}")]
    WindowSizeMismatch {
        /// The expected slot count.
        expected: usize,
        /// The slot count found.
        actual: usize,
    },
    /// A window update targeted a slot outside the window.
    #[display("Fee window offset {offset} out of bounds for {slots} slots")]
    WindowOffsetOutOfBounds {
        /// The offset of the update.
        offset: usize,
        /// The number of slots in the window.
        slots: usize,
    },
    /// The child timestamp precedes its parent's.
    #[display("Timestamp {timestamp} precedes parent timestamp {parent}")]
    TimestampBeforeParent {
        /// The parent timestamp.
        parent: u64,
        /// The child timestamp.
        timestamp: u64,
    },
    /// The parent has no base fee after the fee fork.
    #[display("Parent base fee missing after fee fork activation")]
    MissingParentBaseFee,
    /// The header has no base fee after the fee fork.
    #[display("Header base fee missing after fee fork activation")]
    MissingBaseFee,
    /// The header has no block gas cost after the fee fork.
    #[display("Header block gas cost missing after fee fork activation")]
    MissingBlockGasCost,
    /// The base fee of the block is zero.
    #[display("Base fee must be positive")]
    NonPositiveBaseFee,
    /// A transaction cannot pay the base fee.
    #[display("Transaction fee cap too low: {_0}")]
    FeeCapTooLow(TransactionError),
    /// The number of receipts does not match the number of transactions.
    #[display("Mismatched receipts: {txs} transactions, {receipts} receipts")]
    ReceiptCountMismatch {
        /// The number of transactions.
        txs: usize,
        /// The number of receipts.
        receipts: usize,
    },
    /// The tips paid in the block do not cover its block gas cost.
    #[display("Insufficient gas ({block_gas}) to cover the block cost ({required})")]
    InsufficientBlockFee {
        /// Gas covered by tips at the block's base fee.
        block_gas: U256,
        /// The block gas cost.
        required: U256,
    },
    /// The header's fee window does not match the one derived from its parent.
    #[display("Invalid fee window in header extra data")]
    InvalidFeeWindow,
    /// The header's base fee does not match the one derived from its parent.
    #[display("Invalid base fee: expected {expected}, found {found}")]
    BaseFeeMismatch {
        /// The derived base fee.
        expected: U256,
        /// The base fee in the header.
        found: U256,
    },
    /// The header's base fee is below the configured minimum.
    #[display("Base fee {base_fee} below minimum {minimum}")]
    BaseFeeBelowMinimum {
        /// The base fee in the header.
        base_fee: U256,
        /// The configured minimum.
        minimum: U256,
    },
    /// The header's block gas cost does not match the one derived from its parent.
    #[display("Invalid block gas cost: expected {expected}, found {found:?}")]
    BlockGasCostMismatch {
        /// The derived block gas cost.
        expected: U256,
        /// The block gas cost in the header.
        found: Option<U256>,
    },
    /// The header's gas limit differs from the configured limit.
    #[display("Invalid gas limit: expected {expected}, found {found}")]
    GasLimitMismatch {
        /// The configured gas limit.
        expected: u64,
        /// The gas limit in the header.
        found: u64,
    },
    /// The header's gas limit moved too far from its parent's before the fee fork.
    #[display("Invalid gas limit: parent {parent}, found {found}")]
    InvalidGasLimit {
        /// The parent gas limit.
        parent: u64,
        /// The gas limit in the header.
        found: u64,
    },
    /// The header uses more gas than its limit.
    #[display("Gas used {used} exceeds gas limit {limit}")]
    GasUsedExceedsLimit {
        /// The gas used.
        used: u64,
        /// The gas limit.
        limit: u64,
    },
}

impl From<TransactionError> for FeeError {
    fn from(err: TransactionError) -> Self {
        Self::FeeCapTooLow(err)
    }
}

impl core::error::Error for FeeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::FeeCapTooLow(err) => Some(err),
            _ => None,
        }
    }
}

/// A [Result] type for the [FeeError] enum.
pub type FeeResult<T> = Result<T, FeeError>;

/// An invalid [FeeConfig].
///
/// [FeeConfig]: crate::FeeConfig
#[derive(derive_more::Display, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeConfigError {
    /// The gas limit is zero.
    #[display("Gas limit must be positive")]
    ZeroGasLimit,
    /// The target block rate is zero.
    #[display("Target block rate must be positive")]
    ZeroTargetBlockRate,
    /// The target gas is zero.
    #[display("Target gas must be positive")]
    ZeroTargetGas,
    /// The base fee change denominator is zero.
    #[display("Base fee change denominator must be positive")]
    ZeroChangeDenominator,
    /// The block gas cost bounds are inverted.
    #[display("Max block gas cost {max} below min block gas cost {min}")]
    InvertedBlockGasCostBounds {
        /// The minimum block gas cost.
        min: U256,
        /// The maximum block gas cost.
        max: U256,
    },
}

impl core::error::Error for FeeConfigError {}
