//! The mutable state a block is built on.

use alloy_primitives::B256;

/// A journaled state handle.
///
/// The builder takes a snapshot before every transaction and reverts to it if the transaction
/// fails, so a failed transaction leaves no trace in the block's state.
pub trait StateDb {
    /// Takes a snapshot of the current state and returns its id.
    fn snapshot(&mut self) -> usize;

    /// Reverts all changes made since the snapshot with the given id.
    fn revert_to_snapshot(&mut self, id: usize);

    /// Sets the hash and block index of the transaction about to execute.
    fn set_tx_context(&mut self, tx_hash: B256, index: usize);
}
