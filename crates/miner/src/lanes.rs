//! Transaction lanes and the strategy that merges them.

use alloy_primitives::U256;
use core::fmt::Debug;

use crate::{LazyTransaction, TransactionsByPriceAndNonce};

/// The kind of transactions a [Lane] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneKind {
    /// Transactions without blobs.
    Plain,
    /// Blob-carrying transactions, budgeted against the block's blob gas.
    Blob,
}

/// An independent price and nonce ordering polled by the builder.
#[derive(Debug, Clone)]
pub struct Lane {
    /// The kind of transactions in the lane.
    pub kind: LaneKind,
    /// The ordered transactions.
    pub txs: TransactionsByPriceAndNonce,
}

impl Lane {
    /// Creates a lane of plain transactions.
    pub const fn plain(txs: TransactionsByPriceAndNonce) -> Self {
        Self { kind: LaneKind::Plain, txs }
    }

    /// Creates a lane of blob transactions.
    pub const fn blob(txs: TransactionsByPriceAndNonce) -> Self {
        Self { kind: LaneKind::Blob, txs }
    }

    /// Returns true if the lane carries blob transactions.
    pub const fn is_blob(&self) -> bool {
        matches!(self.kind, LaneKind::Blob)
    }

    /// Returns the head of the lane and its tip.
    pub fn peek(&self) -> Option<(&LazyTransaction, U256)> {
        self.txs.peek()
    }
}

/// Picks which lane's head transaction the builder tries next.
pub trait LaneSelector: Debug {
    /// Returns the index of the lane to take from, given each lane's head tip, or `None` if
    /// every lane is exhausted.
    fn select(&self, heads: &[Option<U256>]) -> Option<usize>;
}

/// Selects the lane whose head pays the highest tip. Ties go to the earliest lane.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestTip;

impl LaneSelector for HighestTip {
    fn select(&self, heads: &[Option<U256>]) -> Option<usize> {
        let mut best: Option<(usize, U256)> = None;
        for (i, tip) in heads.iter().enumerate() {
            let Some(tip) = *tip else { continue };
            if best.map_or(true, |(_, best_tip)| tip > best_tip) {
                best = Some((i, tip));
            }
        }
        best.map(|(i, _)| i)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::all_empty(&[None, None], None)]
    #[case::plain_only(&[Some(5), None], Some(0))]
    #[case::blob_only(&[None, Some(5)], Some(1))]
    #[case::blob_higher(&[Some(5), Some(6)], Some(1))]
    #[case::plain_higher(&[Some(7), Some(6)], Some(0))]
    #[case::tie_prefers_plain(&[Some(5), Some(5)], Some(0))]
    #[case::three_lanes(&[Some(1), Some(9), Some(9)], Some(1))]
    fn test_highest_tip(#[case] heads: &[Option<u64>], #[case] expected: Option<usize>) {
        let heads: alloc::vec::Vec<_> = heads.iter().map(|t| t.map(U256::from)).collect();
        assert_eq!(HighestTip.select(&heads), expected);
    }
}
