//! Contains the [Header] type and its sealed form.

use alloy_consensus::constants::{EMPTY_OMMER_ROOT_HASH, EMPTY_ROOT_HASH};
use alloy_primitives::{keccak256, Address, Bloom, Bytes, B256, B64, U256};
use alloy_rlp::{length_of_length, BufMut, Encodable};

/// A block header.
///
/// `extra_data` starts with the encoded rolling fee window once the fee fork is active. The
/// optional fields at the tail are fork-gated and are RLP encoded only up to the last one
/// that is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: B256,
    /// Hash of the ommers list. Always the empty list hash.
    pub ommers_hash: B256,
    /// Recipient of the block's fees.
    pub beneficiary: Address,
    /// State root after executing the block.
    pub state_root: B256,
    /// Root of the transactions trie.
    pub transactions_root: B256,
    /// Root of the receipts trie.
    pub receipts_root: B256,
    /// Bloom filter over all logs in the block.
    pub logs_bloom: Bloom,
    /// Block difficulty.
    pub difficulty: U256,
    /// Block height.
    pub number: u64,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Gas used by the block's transactions.
    pub gas_used: u64,
    /// Block timestamp, in seconds.
    pub timestamp: u64,
    /// Free-form extra data. Carries the rolling fee window.
    pub extra_data: Bytes,
    /// Mix hash.
    pub mix_hash: B256,
    /// Block nonce.
    pub nonce: B64,
    /// Base fee per gas, present once the fee fork is active.
    pub base_fee_per_gas: Option<U256>,
    /// Block gas cost, present once the fee fork is active.
    pub block_gas_cost: Option<U256>,
    /// Blob gas used by the block, present after Cancun.
    pub blob_gas_used: Option<u64>,
    /// Excess blob gas carried into the block, present after Cancun.
    pub excess_blob_gas: Option<u64>,
    /// Parent beacon block root, present after Cancun.
    pub parent_beacon_block_root: Option<B256>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: B256::ZERO,
            ommers_hash: EMPTY_OMMER_ROOT_HASH,
            beneficiary: Address::ZERO,
            state_root: EMPTY_ROOT_HASH,
            transactions_root: EMPTY_ROOT_HASH,
            receipts_root: EMPTY_ROOT_HASH,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::from(1),
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: B64::ZERO,
            base_fee_per_gas: None,
            block_gas_cost: None,
            blob_gas_used: None,
            excess_blob_gas: None,
            parent_beacon_block_root: None,
        }
    }
}

impl Header {
    /// Computes the hash of the header. This is the keccak of its RLP encoding.
    pub fn hash_slow(&self) -> B256 {
        let mut out = alloc::vec::Vec::with_capacity(self.length());
        self.encode(&mut out);
        keccak256(&out)
    }

    /// Seals the header, computing its hash.
    pub fn seal_slow(self) -> SealedHeader {
        let hash = self.hash_slow();
        SealedHeader { header: self, hash }
    }

    /// Returns the number of optional trailing fields that must be encoded.
    const fn trailing_fields(&self) -> usize {
        if self.parent_beacon_block_root.is_some() {
            5
        } else if self.excess_blob_gas.is_some() {
            4
        } else if self.blob_gas_used.is_some() {
            3
        } else if self.block_gas_cost.is_some() {
            2
        } else if self.base_fee_per_gas.is_some() {
            1
        } else {
            0
        }
    }

    fn payload_length(&self) -> usize {
        let mut length = self.parent_hash.length() +
            self.ommers_hash.length() +
            self.beneficiary.length() +
            self.state_root.length() +
            self.transactions_root.length() +
            self.receipts_root.length() +
            self.logs_bloom.length() +
            self.difficulty.length() +
            self.number.length() +
            self.gas_limit.length() +
            self.gas_used.length() +
            self.timestamp.length() +
            self.extra_data.length() +
            self.mix_hash.length() +
            self.nonce.length();

        let trailing = self.trailing_fields();
        if trailing > 0 {
            length += self.base_fee_per_gas.unwrap_or_default().length();
        }
        if trailing > 1 {
            length += self.block_gas_cost.unwrap_or_default().length();
        }
        if trailing > 2 {
            length += self.blob_gas_used.unwrap_or_default().length();
        }
        if trailing > 3 {
            length += self.excess_blob_gas.unwrap_or_default().length();
        }
        if trailing > 4 {
            length += self.parent_beacon_block_root.unwrap_or_default().length();
        }
        length
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn BufMut) {
        alloy_rlp::Header { list: true, payload_length: self.payload_length() }.encode(out);
        self.parent_hash.encode(out);
        self.ommers_hash.encode(out);
        self.beneficiary.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        self.nonce.encode(out);

        let trailing = self.trailing_fields();
        if trailing > 0 {
            self.base_fee_per_gas.unwrap_or_default().encode(out);
        }
        if trailing > 1 {
            self.block_gas_cost.unwrap_or_default().encode(out);
        }
        if trailing > 2 {
            self.blob_gas_used.unwrap_or_default().encode(out);
        }
        if trailing > 3 {
            self.excess_blob_gas.unwrap_or_default().encode(out);
        }
        if trailing > 4 {
            self.parent_beacon_block_root.unwrap_or_default().encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

/// A [Header] paired with its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SealedHeader {
    /// The header.
    pub header: Header,
    /// The hash of the header.
    pub hash: B256,
}

impl SealedHeader {
    /// Returns a reference to the inner header.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the header hash.
    pub const fn hash(&self) -> B256 {
        self.hash
    }

    /// Unseals the header.
    pub fn unseal(self) -> Header {
        self.header
    }
}

impl core::ops::Deref for SealedHeader {
    type Target = Header;

    fn deref(&self) -> &Self::Target {
        &self.header
    }
}
