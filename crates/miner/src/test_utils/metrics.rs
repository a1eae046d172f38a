//! A metrics sink that records what it is told.

use alloc::vec::Vec;
use spin::Mutex;
use subnet_primitives::SealedBlock;

use crate::{MinerMetrics, SkipReason, TxRejection};

/// Records every metric in memory.
#[derive(Debug, Default)]
pub struct MockMetrics {
    /// Number of committed transactions.
    pub committed: Mutex<usize>,
    /// Skipped transactions, in order.
    pub skipped: Mutex<Vec<SkipReason>>,
    /// Rejected transactions, in order.
    pub rejected: Mutex<Vec<TxRejection>>,
    /// Number of sealed blocks.
    pub blocks: Mutex<usize>,
}

impl MinerMetrics for MockMetrics {
    fn inc_committed_txs(&self) {
        *self.committed.lock() += 1;
    }

    fn inc_skipped_txs(&self, reason: SkipReason) {
        self.skipped.lock().push(reason);
    }

    fn inc_rejected_txs(&self, rejection: &TxRejection) {
        self.rejected.lock().push(rejection.clone());
    }

    fn record_block(&self, _block: &SealedBlock) {
        *self.blocks.lock() += 1;
    }
}
