//! An in-memory journaled state.

use alloc::{collections::BTreeMap, vec::Vec};
use alloy_primitives::{keccak256, Address, B256};

use crate::StateDb;

/// A state holding account nonces and applied upgrades, with snapshots taken by copying.
#[derive(Debug, Clone, Default)]
pub struct MockState {
    nonces: BTreeMap<Address, u64>,
    upgrades: Vec<Address>,
    journal: Vec<(BTreeMap<Address, u64>, Vec<Address>)>,
    tx_context: Option<(B256, usize)>,
}

impl MockState {
    /// Returns the nonce of `address`.
    pub fn nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or_default()
    }

    /// Sets the nonce of `address`.
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        self.nonces.insert(address, nonce);
    }

    /// Records an applied upgrade.
    pub fn apply_upgrade(&mut self, address: Address) {
        self.upgrades.push(address);
    }

    /// Returns the applied upgrades, in order.
    pub fn upgrades(&self) -> &[Address] {
        &self.upgrades
    }

    /// Returns the last transaction context set.
    pub const fn tx_context(&self) -> Option<(B256, usize)> {
        self.tx_context
    }

    /// Returns a digest of the state.
    pub fn root(&self) -> B256 {
        let mut buf = Vec::new();
        for (address, nonce) in &self.nonces {
            buf.extend_from_slice(address.as_slice());
            buf.extend_from_slice(&nonce.to_be_bytes());
        }
        for address in &self.upgrades {
            buf.extend_from_slice(address.as_slice());
        }
        keccak256(buf)
    }
}

impl StateDb for MockState {
    fn snapshot(&mut self) -> usize {
        self.journal.push((self.nonces.clone(), self.upgrades.clone()));
        self.journal.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        if id >= self.journal.len() {
            return;
        }
        let (nonces, upgrades) = self.journal.swap_remove(id);
        self.journal.truncate(id);
        self.nonces = nonces;
        self.upgrades = upgrades;
    }

    fn set_tx_context(&mut self, tx_hash: B256, index: usize) {
        self.tx_context = Some((tx_hash, index));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_nested_snapshots() {
        let alice = Address::with_last_byte(1);
        let mut state = MockState::default();

        let outer = state.snapshot();
        state.set_nonce(alice, 1);
        let inner = state.snapshot();
        state.set_nonce(alice, 2);

        state.revert_to_snapshot(inner);
        assert_eq!(state.nonce(&alice), 1);
        state.revert_to_snapshot(outer);
        assert_eq!(state.nonce(&alice), 0);
    }
}
