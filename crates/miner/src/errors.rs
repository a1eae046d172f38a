//! Error types for the `subnet-miner` crate.

use alloc::string::String;
use alloy_primitives::{Address, B256};
use subnet_fees::{FeeConfigError, FeeError};
use thiserror::Error;

use crate::PredicateResultsError;

/// A failed block building attempt.
///
/// Any of these aborts the attempt; no partial block is returned.
#[derive(Error, Debug)]
pub enum MinerError {
    /// The miner is misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// The block would violate the fee rules.
    #[error("Consensus violation: {0}")]
    ConsensusViolation(#[from] FeeError),
    /// The chain could not provide the parent state or config.
    #[error("Chain error: {0}")]
    Chain(String),
    /// The execution engine failed outside of transaction execution.
    #[error("Engine error: {0}")]
    Engine(String),
    /// The predicate results could not be encoded into the header.
    #[error("Failed to marshal predicate results: {0}")]
    PredicateResults(#[from] PredicateResultsError),
    /// The block was already produced.
    #[error("Produced duplicate block (hash: {hash}, number: {number})")]
    DuplicateBlock {
        /// The block hash.
        hash: B256,
        /// The block number.
        number: u64,
    },
    /// The parent is the last representable block.
    #[error("Block number overflows after parent {0}")]
    BlockNumberOverflow(u64),
    /// The block holds more transactions than a receipt can index.
    #[error("Transaction index {0} out of range")]
    TransactionIndexOverflow(usize),
    /// The attempt was cancelled.
    #[error("Block building cancelled")]
    Cancelled,
}

impl MinerError {
    /// Returns true if the error is a fee rule violation.
    pub const fn is_consensus_violation(&self) -> bool {
        matches!(self, Self::ConsensusViolation(_))
    }

    /// Returns true if the error is a configuration error.
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// A [Result] type for the [MinerError] enum.
pub type MinerResult<T> = Result<T, MinerError>;

/// A miner configuration error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No coinbase was configured.
    #[error("Cannot mine without etherbase")]
    MissingCoinbase,
    /// A required collaborator was not provided.
    #[error("Missing {0}")]
    MissingComponent(&'static str),
    /// No clock was configured and the system clock is unavailable.
    #[error("No clock configured")]
    MissingClock,
    /// The fee config is invalid.
    #[error("Invalid fee config: {0}")]
    InvalidFeeConfig(#[from] FeeConfigError),
}

/// An error returned by the execution engine for a single transaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxExecutionError {
    /// The transaction nonce is below the sender's state nonce.
    #[error("Nonce too low: address {address}, tx: {tx} state: {state}")]
    NonceTooLow {
        /// The sender.
        address: Address,
        /// The transaction nonce.
        tx: u64,
        /// The state nonce.
        state: u64,
    },
    /// The transaction nonce is above the sender's state nonce.
    #[error("Nonce too high: address {address}, tx: {tx} state: {state}")]
    NonceTooHigh {
        /// The sender.
        address: Address,
        /// The transaction nonce.
        tx: u64,
        /// The state nonce.
        state: u64,
    },
    /// The block gas pool cannot cover the transaction.
    #[error("Gas limit reached")]
    GasLimitReached,
    /// The sender cannot pay for the transaction.
    #[error("Insufficient funds for gas * price + value: address {0}")]
    InsufficientFunds(Address),
    /// The gas limit is below the intrinsic gas.
    #[error("Intrinsic gas too low")]
    IntrinsicGas,
    /// Any other execution failure.
    #[error("{0}")]
    Other(String),
}

/// Why a transaction was left out of the block.
///
/// Rejections are contained to the sender's lane and never abort the attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxRejection {
    /// Execution failed.
    #[error(transparent)]
    Execution(#[from] TxExecutionError),
    /// A blob transaction reached the builder without its sidecar.
    #[error("Blob transaction {0} has no sidecar")]
    MissingBlobSidecar(B256),
    /// The transaction's blobs do not fit in the block.
    #[error("Max data blobs reached: {blobs} blobs, limit {limit}")]
    BlobLimitExceeded {
        /// Blobs in the block including the transaction's.
        blobs: u64,
        /// The per-block blob limit.
        limit: u64,
    },
    /// The transaction carries predicates but no predicate context was given.
    #[error("Missing predicate context")]
    MissingPredicateContext,
    /// A predicate targets a precompile with no registered verifier.
    #[error("No predicate verifier registered for {0}")]
    UnknownPredicater(Address),
}

impl TxRejection {
    /// Returns true if the rejection is a nonce-too-low execution error.
    pub const fn is_nonce_too_low(&self) -> bool {
        matches!(self, Self::Execution(TxExecutionError::NonceTooLow { .. }))
    }
}
