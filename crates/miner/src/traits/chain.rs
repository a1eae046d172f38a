//! Read access to the canonical chain.

use alloy_primitives::{Address, B256};
use core::fmt::Display;
use subnet_fees::FeeConfig;
use subnet_primitives::{Header, SealedHeader};

use crate::StateDb;

/// Describes the chain the builder extends.
pub trait ChainReader {
    /// The error type for the [ChainReader].
    type Error: Display;

    /// The state handle opened by [Self::state_at].
    type State: StateDb;

    /// Returns the current head of the chain. New blocks are built on top of it.
    fn current_header(&self) -> SealedHeader;

    /// Opens the state at the given root.
    fn state_at(&self, root: B256) -> Result<Self::State, Self::Error>;

    /// Returns the fee config in force at `parent`.
    fn fee_config_at(&self, parent: &Header) -> Result<FeeConfig, Self::Error>;

    /// Returns the coinbase required at `parent`, and whether producers may choose their own.
    fn coinbase_at(&self, parent: &Header) -> Result<(Address, bool), Self::Error>;

    /// Returns true if the chain already holds the block.
    fn has_block(&self, hash: B256, number: u64) -> bool;
}
