//! Protocol constants for the fee rules.

/// The number of one-second buckets in the rolling fee window.
pub const ROLLUP_WINDOW: usize = 10;

/// The size, in bytes, of one window counter.
pub const WINDOW_SLOT_SIZE: usize = 8;

/// The size, in bytes, of the encoded fee window at the start of `extra_data`.
pub const FEE_WINDOW_SIZE: usize = ROLLUP_WINDOW * WINDOW_SLOT_SIZE;

/// The lowest gas limit a block may have.
pub const MIN_GAS_LIMIT: u64 = 5000;

/// The bound divisor of the gas limit, used in gas limit update calculations.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;
