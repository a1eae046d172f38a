//! The gas available to a block under construction.

use crate::TxExecutionError;

/// Tracks the gas remaining in a block.
///
/// The pool only shrinks during a building attempt, except when a failed transaction restores
/// it to the value captured before that transaction ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasPool(u64);

impl GasPool {
    /// Creates a pool holding `gas`.
    pub const fn new(gas: u64) -> Self {
        Self(gas)
    }

    /// Returns the gas remaining.
    pub const fn gas(&self) -> u64 {
        self.0
    }

    /// Deducts `amount` from the pool.
    pub fn sub_gas(&mut self, amount: u64) -> Result<(), TxExecutionError> {
        self.0 = self.0.checked_sub(amount).ok_or(TxExecutionError::GasLimitReached)?;
        Ok(())
    }

    /// Returns `amount` to the pool.
    pub fn add_gas(&mut self, amount: u64) {
        self.0 = self.0.saturating_add(amount);
    }

    /// Resets the pool to `gas`.
    pub fn set_gas(&mut self, gas: u64) {
        self.0 = gas;
    }
}
