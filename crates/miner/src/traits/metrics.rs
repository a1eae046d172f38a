//! Metrics emitted while building blocks.

use core::fmt::Debug;
use subnet_primitives::SealedBlock;

use crate::TxRejection;

/// Why the builder passed over a transaction without executing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The block has too little gas left.
    InsufficientGas,
    /// The block has too little blob gas left.
    InsufficientBlobGas,
    /// The transaction would push the block past its size target.
    Oversized,
    /// The pool evicted the transaction before it could be resolved.
    Evicted,
}

/// A sink for block building metrics.
pub trait MinerMetrics: Debug {
    /// Records a committed transaction.
    fn inc_committed_txs(&self);

    /// Records a transaction passed over without execution.
    fn inc_skipped_txs(&self, reason: SkipReason);

    /// Records a rejected transaction.
    fn inc_rejected_txs(&self, rejection: &TxRejection);

    /// Records a sealed block.
    fn record_block(&self, block: &SealedBlock);
}

/// A [MinerMetrics] implementation that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMinerMetrics;

impl MinerMetrics for NoopMinerMetrics {
    fn inc_committed_txs(&self) {
        // No-op
    }

    fn inc_skipped_txs(&self, _reason: SkipReason) {
        // No-op
    }

    fn inc_rejected_txs(&self, _rejection: &TxRejection) {
        // No-op
    }

    fn record_block(&self, _block: &SealedBlock) {
        // No-op
    }
}
