//! Transaction types consumed by the block builder.

use alloc::vec::Vec;
use alloy_eips::{eip2930::AccessList, eip4844::BlobTransactionSidecar};
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{BufMut, Encodable, EMPTY_STRING_CODE};

use crate::DATA_GAS_PER_BLOB;

/// An error returned when pricing a [Transaction] against a base fee.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionError {
    /// The transaction's fee cap cannot cover the base fee.
    #[error("max fee per gas {fee_cap} less than block base fee {base_fee}")]
    FeeCapTooLow {
        /// The fee cap of the transaction.
        fee_cap: U256,
        /// The base fee it was priced against.
        base_fee: U256,
    },
}

/// The envelope type of a [Transaction].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TxType {
    /// Legacy transaction with a single gas price.
    #[default]
    Legacy = 0,
    /// EIP-1559 dynamic fee transaction.
    DynamicFee = 2,
    /// EIP-4844 blob transaction.
    Blob = 3,
}

/// A sender-recovered transaction.
///
/// Signatures are verified before a transaction reaches the builder, so the sender is carried
/// directly and the hash commits to it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Transaction {
    /// The envelope type.
    pub tx_type: TxType,
    /// The recovered sender.
    pub from: Address,
    /// Chain id the transaction is bound to.
    pub chain_id: u64,
    /// Sender nonce.
    pub nonce: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Maximum total fee per gas. The gas price for legacy transactions.
    pub gas_fee_cap: U256,
    /// Maximum priority fee per gas. The gas price for legacy transactions.
    pub gas_tip_cap: U256,
    /// Call target, `None` for contract creation.
    pub to: Option<Address>,
    /// Value transferred.
    pub value: U256,
    /// Call data.
    pub input: Bytes,
    /// EIP-2930 access list. Carries predicate payloads as storage keys.
    pub access_list: AccessList,
    /// Maximum fee per blob gas.
    pub blob_fee_cap: U256,
    /// Versioned hashes of the attached blobs.
    pub blob_hashes: Vec<B256>,
}

impl Transaction {
    /// Returns the hash of the transaction.
    pub fn hash(&self) -> B256 {
        keccak256(self.encoded())
    }

    /// Returns the size of the encoded transaction, in bytes.
    pub fn size(&self) -> u64 {
        self.encoded_length() as u64
    }

    /// Returns the tip paid per gas at the given base fee.
    ///
    /// The tip is `min(gas_tip_cap, gas_fee_cap - base_fee)`. Errors if the fee cap is below
    /// the base fee.
    pub fn effective_gas_tip(&self, base_fee: U256) -> Result<U256, TransactionError> {
        if self.gas_fee_cap < base_fee {
            return Err(TransactionError::FeeCapTooLow { fee_cap: self.gas_fee_cap, base_fee });
        }
        Ok(self.gas_tip_cap.min(self.gas_fee_cap - base_fee))
    }

    /// Returns the blob gas consumed by the transaction.
    pub fn blob_gas(&self) -> u64 {
        self.blob_hashes.len() as u64 * DATA_GAS_PER_BLOB
    }

    /// Returns true if the transaction carries blobs.
    pub const fn is_blob(&self) -> bool {
        matches!(self.tx_type, TxType::Blob)
    }

    /// Returns the type-prefixed encoding of the transaction.
    pub fn encoded(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_length());
        if self.tx_type != TxType::Legacy {
            out.push(self.tx_type as u8);
        }
        self.encode(&mut out);
        out
    }

    fn encoded_length(&self) -> usize {
        let prefix = usize::from(self.tx_type != TxType::Legacy);
        prefix + self.length()
    }

    fn to_length(&self) -> usize {
        self.to.map_or(1, |to| to.length())
    }

    fn encode_to(&self, out: &mut dyn BufMut) {
        match self.to {
            Some(to) => to.encode(out),
            None => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn payload_length(&self) -> usize {
        let common = self.nonce.length() +
            self.gas_limit.length() +
            self.to_length() +
            self.value.length() +
            self.input.length() +
            self.from.length();
        match self.tx_type {
            TxType::Legacy => common + self.gas_fee_cap.length(),
            TxType::DynamicFee => {
                common +
                    self.chain_id.length() +
                    self.gas_tip_cap.length() +
                    self.gas_fee_cap.length() +
                    self.access_list.length()
            }
            TxType::Blob => {
                common +
                    self.chain_id.length() +
                    self.gas_tip_cap.length() +
                    self.gas_fee_cap.length() +
                    self.access_list.length() +
                    self.blob_fee_cap.length() +
                    self.blob_hashes.length()
            }
        }
    }
}

impl Encodable for Transaction {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header { list: true, payload_length: self.payload_length() }.encode(out);
        match self.tx_type {
            TxType::Legacy => {
                self.nonce.encode(out);
                self.gas_fee_cap.encode(out);
                self.gas_limit.encode(out);
                self.encode_to(out);
                self.value.encode(out);
                self.input.encode(out);
            }
            TxType::DynamicFee | TxType::Blob => {
                self.chain_id.encode(out);
                self.nonce.encode(out);
                self.gas_tip_cap.encode(out);
                self.gas_fee_cap.encode(out);
                self.gas_limit.encode(out);
                self.encode_to(out);
                self.value.encode(out);
                self.input.encode(out);
                self.access_list.encode(out);
                if self.is_blob() {
                    self.blob_fee_cap.encode(out);
                    self.blob_hashes.encode(out);
                }
            }
        }
        self.from.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + alloy_rlp::length_of_length(payload_length)
    }
}

/// A [Transaction] as held by the transaction pool, with its blob sidecar if it has one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PooledTransaction {
    /// The transaction.
    pub tx: Transaction,
    /// The blob sidecar. Only blob transactions carry one.
    pub sidecar: Option<BlobTransactionSidecar>,
}

impl PooledTransaction {
    /// Creates a new [PooledTransaction] without a sidecar.
    pub const fn new(tx: Transaction) -> Self {
        Self { tx, sidecar: None }
    }

    /// Attaches a blob sidecar.
    pub fn with_sidecar(mut self, sidecar: BlobTransactionSidecar) -> Self {
        self.sidecar = Some(sidecar);
        self
    }

    /// Splits the pooled transaction into the bare transaction and its sidecar.
    pub fn into_parts(self) -> (Transaction, Option<BlobTransactionSidecar>) {
        (self.tx, self.sidecar)
    }
}
