//! Predicate verification and the per-block predicate results.
//!
//! Predicates are carried in a transaction's access list: every access list entry addressed to
//! an enabled predicate precompile is one predicate, formed by concatenating its storage keys.
//! Each predicate is verified before the transaction executes and the outcome is recorded as a
//! bitset, with bit `i` set when predicate `i` failed.

use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, B256};
use core::fmt::Debug;
use subnet_fees::Rules;
use thiserror::Error;

use crate::TxRejection;

/// The codec version prefixed to encoded [PredicateResults].
pub const PREDICATE_RESULTS_CODEC_VERSION: u16 = 0;

/// Block context handed to predicate verifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PredicateContext {
    /// Height of the proposer chain the block is built against.
    pub proposer_height: u64,
}

/// A precompile that verifies predicates.
pub trait Predicater: Debug {
    /// Verifies a single predicate.
    fn verify_predicate(&self, ctx: &PredicateContext, predicate: &[u8]) -> Result<(), String>;
}

/// The registered predicate verifiers, keyed by precompile address.
pub type Predicaters = BTreeMap<Address, Arc<dyn Predicater + Send + Sync>>;

/// An error encoding or decoding [PredicateResults].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateResultsError {
    /// The input ended early.
    #[error("Unexpected end of predicate results")]
    UnexpectedEof,
    /// The codec version is not supported.
    #[error("Unsupported predicate results codec version {0}")]
    UnsupportedVersion(u16),
    /// Bytes remained after decoding.
    #[error("Trailing bytes after predicate results")]
    TrailingBytes,
    /// A length does not fit the wire format.
    #[error("Predicate results too large")]
    TooLarge,
}

/// Predicate results of every transaction in a block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PredicateResults {
    results: BTreeMap<B256, BTreeMap<Address, Bytes>>,
}

impl PredicateResults {
    /// Records the results of a transaction, replacing any earlier ones.
    pub fn set_tx_results(&mut self, tx_hash: B256, results: BTreeMap<Address, Bytes>) {
        if results.is_empty() {
            self.results.remove(&tx_hash);
            return;
        }
        self.results.insert(tx_hash, results);
    }

    /// Removes the results of a transaction.
    pub fn delete_tx_results(&mut self, tx_hash: &B256) {
        self.results.remove(tx_hash);
    }

    /// Returns the results of a transaction.
    pub fn tx_results(&self, tx_hash: &B256) -> Option<&BTreeMap<Address, Bytes>> {
        self.results.get(tx_hash)
    }

    /// Returns the result bitset of one predicater for a transaction.
    pub fn get(&self, tx_hash: &B256, address: &Address) -> Option<&Bytes> {
        self.results.get(tx_hash).and_then(|r| r.get(address))
    }

    /// Returns true if no transaction has results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns the number of transactions with results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Encodes the results.
    ///
    /// The layout is a big-endian `u16` codec version, a `u32` transaction count, and for each
    /// transaction in hash order its 32-byte hash, a `u32` address count, and for each address
    /// in order the 20-byte address followed by the `u32`-length-prefixed result.
    pub fn encode(&self) -> Result<Vec<u8>, PredicateResultsError> {
        let mut out = Vec::new();
        out.extend_from_slice(&PREDICATE_RESULTS_CODEC_VERSION.to_be_bytes());
        put_len(&mut out, self.results.len())?;
        for (tx_hash, results) in &self.results {
            out.extend_from_slice(tx_hash.as_slice());
            put_len(&mut out, results.len())?;
            for (address, result) in results {
                out.extend_from_slice(address.as_slice());
                put_len(&mut out, result.len())?;
                out.extend_from_slice(result);
            }
        }
        Ok(out)
    }

    /// Decodes results produced by [Self::encode].
    pub fn decode(mut buf: &[u8]) -> Result<Self, PredicateResultsError> {
        let version = u16::from_be_bytes(take(&mut buf)?);
        if version != PREDICATE_RESULTS_CODEC_VERSION {
            return Err(PredicateResultsError::UnsupportedVersion(version));
        }

        let mut results = BTreeMap::new();
        for _ in 0..take_len(&mut buf)? {
            let tx_hash = B256::from(take::<32>(&mut buf)?);
            let mut tx_results = BTreeMap::new();
            for _ in 0..take_len(&mut buf)? {
                let address = Address::from(take::<20>(&mut buf)?);
                let len = take_len(&mut buf)? as usize;
                if buf.len() < len {
                    return Err(PredicateResultsError::UnexpectedEof);
                }
                let (result, rest) = buf.split_at(len);
                tx_results.insert(address, Bytes::copy_from_slice(result));
                buf = rest;
            }
            results.insert(tx_hash, tx_results);
        }

        if !buf.is_empty() {
            return Err(PredicateResultsError::TrailingBytes);
        }
        Ok(Self { results })
    }
}

fn put_len(out: &mut Vec<u8>, len: usize) -> Result<(), PredicateResultsError> {
    let len = u32::try_from(len).map_err(|_| PredicateResultsError::TooLarge)?;
    out.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

fn take<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N], PredicateResultsError> {
    if buf.len() < N {
        return Err(PredicateResultsError::UnexpectedEof);
    }
    let (head, rest) = buf.split_at(N);
    let mut out = [0u8; N];
    out.copy_from_slice(head);
    *buf = rest;
    Ok(out)
}

fn take_len(buf: &mut &[u8]) -> Result<u32, PredicateResultsError> {
    take::<4>(buf).map(u32::from_be_bytes)
}

/// Groups the predicates in `access_list` by enabled predicater.
///
/// Each access list entry addressed to a predicater is one predicate: the concatenation of its
/// storage keys.
pub fn prepare_predicate_storage_slots(
    rules: &Rules,
    access_list: &AccessList,
) -> BTreeMap<Address, Vec<Vec<u8>>> {
    let mut slots: BTreeMap<Address, Vec<Vec<u8>>> = BTreeMap::new();
    for item in access_list.0.iter() {
        if !rules.is_predicater(&item.address) {
            continue;
        }
        let predicate = item.storage_keys.iter().flat_map(|key| key.0).collect();
        slots.entry(item.address).or_default().push(predicate);
    }
    slots
}

/// Verifies the predicates in `access_list` and returns a failure bitset per predicater.
///
/// Returns no results when no predicater is enabled or the access list carries no predicates.
/// Fails if predicates are present but no context was given, or if a predicater has no
/// registered verifier.
pub fn check_predicates(
    rules: &Rules,
    predicaters: &Predicaters,
    ctx: Option<&PredicateContext>,
    access_list: &AccessList,
) -> Result<BTreeMap<Address, Bytes>, TxRejection> {
    let mut results = BTreeMap::new();
    if !rules.predicaters_exist() {
        return Ok(results);
    }

    let arguments = prepare_predicate_storage_slots(rules, access_list);
    if arguments.is_empty() {
        return Ok(results);
    }
    let ctx = ctx.ok_or(TxRejection::MissingPredicateContext)?;

    for (address, predicates) in arguments {
        let verifier = predicaters.get(&address).ok_or(TxRejection::UnknownPredicater(address))?;
        let mut failed = Vec::new();
        for (i, predicate) in predicates.iter().enumerate() {
            if let Err(err) = verifier.verify_predicate(ctx, predicate) {
                debug!(target: "miner", "Predicate {i} failed for {address}: {err}");
                failed.push(i);
            }
        }
        let bitset = bitset_bytes(&failed);
        debug!(
            target: "miner",
            "Predicate verification complete | Address: {address} | Predicates: {count} | Result: {bitset}",
            count = predicates.len(),
            bitset = Bytes::copy_from_slice(&bitset),
        );
        results.insert(address, Bytes::from(bitset));
    }
    Ok(results)
}

/// Encodes set bit indices as a minimal big-endian integer.
fn bitset_bytes(bits: &[usize]) -> Vec<u8> {
    let Some(max) = bits.iter().copied().max() else { return Vec::new() };
    let len = max / 8 + 1;
    let mut out = alloc::vec![0u8; len];
    for bit in bits {
        out[len - 1 - bit / 8] |= 1 << (bit % 8);
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use alloc::vec;
    use alloy_eips::eip2930::AccessListItem;
    use alloy_primitives::{address, b256, bytes};
    use rstest::rstest;

    const WARP: Address = address!("0200000000000000000000000000000000000005");
    const OTHER: Address = address!("00000000000000000000000000000000000000aa");

    /// Accepts predicates whose first byte is zero.
    #[derive(Debug)]
    struct LeadingZero;

    impl Predicater for LeadingZero {
        fn verify_predicate(&self, _: &PredicateContext, predicate: &[u8]) -> Result<(), String> {
            match predicate.first() {
                Some(0) => Ok(()),
                _ => Err("leading byte not zero".into()),
            }
        }
    }

    fn rules() -> Rules {
        let mut rules = Rules { is_durango: true, ..Default::default() };
        rules.predicaters.insert(WARP);
        rules
    }

    fn predicaters() -> Predicaters {
        let mut map: Predicaters = BTreeMap::new();
        map.insert(WARP, Arc::new(LeadingZero));
        map
    }

    fn key(first: u8) -> B256 {
        let mut key = B256::ZERO;
        key.0[0] = first;
        key
    }

    #[rstest]
    #[case::none(&[], vec![])]
    #[case::bit_zero(&[0], vec![0x01])]
    #[case::bits_zero_and_three(&[0, 3], vec![0x09])]
    #[case::bit_eight(&[8], vec![0x01, 0x00])]
    #[case::bits_one_and_nine(&[1, 9], vec![0x02, 0x02])]
    fn test_bitset_bytes(#[case] bits: &[usize], #[case] expected: Vec<u8>) {
        assert_eq!(bitset_bytes(bits), expected);
    }

    #[test]
    fn test_prepare_predicate_storage_slots() {
        let access_list = AccessList(vec![
            AccessListItem { address: WARP, storage_keys: vec![key(1), key(2)] },
            AccessListItem { address: OTHER, storage_keys: vec![key(3)] },
            AccessListItem { address: WARP, storage_keys: vec![key(4)] },
        ]);
        let slots = prepare_predicate_storage_slots(&rules(), &access_list);
        assert_eq!(slots.len(), 1);
        let predicates = &slots[&WARP];
        assert_eq!(predicates.len(), 2);
        assert_eq!(predicates[0].len(), 64);
        assert_eq!(predicates[0][0], 1);
        assert_eq!(predicates[0][32], 2);
        assert_eq!(predicates[1], key(4).to_vec());
    }

    #[test]
    fn test_check_predicates_records_failures() {
        let access_list = AccessList(vec![
            AccessListItem { address: WARP, storage_keys: vec![key(0)] },
            AccessListItem { address: WARP, storage_keys: vec![key(1)] },
            AccessListItem { address: WARP, storage_keys: vec![key(0)] },
        ]);
        let ctx = PredicateContext::default();
        let results = check_predicates(&rules(), &predicaters(), Some(&ctx), &access_list).unwrap();
        assert_eq!(results.get(&WARP), Some(&bytes!("02")));
    }

    #[test]
    fn test_check_predicates_all_valid() {
        let access_list =
            AccessList(vec![AccessListItem { address: WARP, storage_keys: vec![key(0)] }]);
        let ctx = PredicateContext::default();
        let results = check_predicates(&rules(), &predicaters(), Some(&ctx), &access_list).unwrap();
        assert_eq!(results.get(&WARP), Some(&Bytes::new()));
    }

    #[test]
    fn test_check_predicates_without_predicaters() {
        let access_list =
            AccessList(vec![AccessListItem { address: WARP, storage_keys: vec![key(1)] }]);
        let results =
            check_predicates(&Rules::default(), &predicaters(), None, &access_list).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_check_predicates_no_predicates_skips_context() {
        let access_list =
            AccessList(vec![AccessListItem { address: OTHER, storage_keys: vec![key(1)] }]);
        let results = check_predicates(&rules(), &predicaters(), None, &access_list).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_check_predicates_missing_context() {
        let access_list =
            AccessList(vec![AccessListItem { address: WARP, storage_keys: vec![key(0)] }]);
        assert_eq!(
            check_predicates(&rules(), &predicaters(), None, &access_list),
            Err(TxRejection::MissingPredicateContext)
        );
    }

    #[test]
    fn test_check_predicates_unknown_predicater() {
        let access_list =
            AccessList(vec![AccessListItem { address: WARP, storage_keys: vec![key(0)] }]);
        let ctx = PredicateContext::default();
        assert_eq!(
            check_predicates(&rules(), &BTreeMap::new(), Some(&ctx), &access_list),
            Err(TxRejection::UnknownPredicater(WARP))
        );
    }

    #[test]
    fn test_results_set_and_delete() {
        let tx = b256!("00000000000000000000000000000000000000000000000000000000000000aa");
        let mut results = PredicateResults::default();
        results.set_tx_results(tx, BTreeMap::from([(WARP, bytes!("01"))]));
        assert_eq!(results.get(&tx, &WARP), Some(&bytes!("01")));

        results.delete_tx_results(&tx);
        assert!(results.is_empty());

        results.set_tx_results(tx, BTreeMap::new());
        assert!(results.tx_results(&tx).is_none());
    }

    #[test]
    fn test_encode_empty_results() {
        assert_eq!(PredicateResults::default().encode().unwrap(), vec![0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_encode_layout() {
        let tx = B256::repeat_byte(0x11);
        let mut results = PredicateResults::default();
        results.set_tx_results(tx, BTreeMap::from([(WARP, bytes!("0102"))]));

        let encoded = results.encode().unwrap();
        let mut expected = vec![0, 0, 0, 0, 0, 1];
        expected.extend_from_slice(tx.as_slice());
        expected.extend_from_slice(&[0, 0, 0, 1]);
        expected.extend_from_slice(WARP.as_slice());
        expected.extend_from_slice(&[0, 0, 0, 2, 1, 2]);
        assert_eq!(encoded, expected);
        assert_eq!(PredicateResults::decode(&encoded).unwrap(), results);
    }

    #[rstest]
    #[case::empty(vec![], PredicateResultsError::UnexpectedEof)]
    #[case::bad_version(vec![0, 1, 0, 0, 0, 0], PredicateResultsError::UnsupportedVersion(1))]
    #[case::truncated(vec![0, 0, 0, 0, 0, 1, 0xaa], PredicateResultsError::UnexpectedEof)]
    #[case::trailing(vec![0, 0, 0, 0, 0, 0, 0xff], PredicateResultsError::TrailingBytes)]
    fn test_decode_errors(#[case] bytes: Vec<u8>, #[case] expected: PredicateResultsError) {
        assert_eq!(PredicateResults::decode(&bytes), Err(expected));
    }
}
