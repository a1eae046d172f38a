//! This module contains the [Block] types.

use alloc::vec::Vec;
use alloy_eips::eip4844::BlobTransactionSidecar;
use alloy_primitives::B256;

use crate::{Header, SealedHeader, Transaction};

/// A block that has not been sealed yet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    /// Block header.
    pub header: Header,
    /// Transactions in this block.
    pub body: Vec<Transaction>,
}

impl Block {
    /// Seals the block, hashing its header.
    pub fn seal_slow(self) -> SealedBlock {
        SealedBlock { header: self.header.seal_slow(), body: self.body, sidecars: Vec::new() }
    }
}

/// A sealed block, ready to be handed to chain insertion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SealedBlock {
    /// Sealed block header.
    pub header: SealedHeader,
    /// Transactions in this block. Blob transactions are stored without their sidecars.
    pub body: Vec<Transaction>,
    /// Blob sidecars, in the order their transactions appear in the body.
    pub sidecars: Vec<BlobTransactionSidecar>,
}

impl SealedBlock {
    /// Returns the block hash.
    pub const fn hash(&self) -> B256 {
        self.header.hash
    }

    /// Returns the block number.
    pub const fn number(&self) -> u64 {
        self.header.header.number
    }

    /// Attaches the blob sidecars of the block's blob transactions.
    pub fn with_sidecars(mut self, sidecars: Vec<BlobTransactionSidecar>) -> Self {
        self.sidecars = sidecars;
        self
    }
}
