//! An in-memory chain.

use alloc::{collections::BTreeSet, string::ToString};
use alloy_primitives::{Address, B256};
use spin::Mutex;
use subnet_fees::FeeConfig;
use subnet_primitives::{Header, SealedHeader};

use super::{MockError, MockState};
use crate::ChainReader;

/// A chain with a single head and a fixed fee config.
#[derive(Debug, Default)]
pub struct MockChain {
    head: SealedHeader,
    state: MockState,
    fee_config: FeeConfig,
    coinbase: Address,
    allow_fee_recipients: bool,
    missing_state: bool,
    blocks: Mutex<BTreeSet<(B256, u64)>>,
}

impl MockChain {
    /// Creates a chain whose head is `head`, with fee recipients allowed.
    pub fn new(head: Header) -> Self {
        Self { head: head.seal_slow(), allow_fee_recipients: true, ..Default::default() }
    }

    /// Sets the state at the head.
    pub fn with_state(mut self, state: MockState) -> Self {
        self.state = state;
        self
    }

    /// Sets the fee config.
    pub fn with_fee_config(mut self, fee_config: FeeConfig) -> Self {
        self.fee_config = fee_config;
        self
    }

    /// Mandates `coinbase` as the fee recipient.
    pub fn with_required_coinbase(mut self, coinbase: Address) -> Self {
        self.coinbase = coinbase;
        self.allow_fee_recipients = false;
        self
    }

    /// Makes [ChainReader::state_at] fail.
    pub fn without_state(mut self) -> Self {
        self.missing_state = true;
        self
    }

    /// Records a block as known.
    pub fn insert_block(&self, hash: B256, number: u64) {
        self.blocks.lock().insert((hash, number));
    }
}

impl ChainReader for MockChain {
    type Error = MockError;
    type State = MockState;

    fn current_header(&self) -> SealedHeader {
        self.head.clone()
    }

    fn state_at(&self, root: B256) -> Result<Self::State, Self::Error> {
        if self.missing_state {
            return Err(MockError(alloc::format!("missing trie node {root}")));
        }
        Ok(self.state.clone())
    }

    fn fee_config_at(&self, _parent: &Header) -> Result<FeeConfig, Self::Error> {
        Ok(self.fee_config)
    }

    fn coinbase_at(&self, _parent: &Header) -> Result<(Address, bool), Self::Error> {
        if self.allow_fee_recipients {
            return Ok((Address::ZERO, true));
        }
        if self.coinbase.is_zero() {
            return Err(MockError("no coinbase configured".to_string()));
        }
        Ok((self.coinbase, false))
    }

    fn has_block(&self, hash: B256, number: u64) -> bool {
        self.blocks.lock().contains(&(hash, number))
    }
}
