//! The rolling gas window carried in `extra_data`.

use alloc::vec::Vec;

use crate::{
    constants::{ROLLUP_WINDOW, WINDOW_SLOT_SIZE},
    FeeError, FeeResult,
};

/// A fixed-length window of saturating `u64` gas counters.
///
/// Slot `0` is the oldest bucket and the last slot the newest. Counters never wrap; every
/// addition saturates at [u64::MAX]. The wire form is the big-endian concatenation of the
/// counters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LongWindow {
    slots: Vec<u64>,
}

impl Default for LongWindow {
    fn default() -> Self {
        Self::zeroed(ROLLUP_WINDOW)
    }
}

impl LongWindow {
    /// Creates a window of `slots` zero counters.
    pub fn zeroed(slots: usize) -> Self {
        Self { slots: alloc::vec![0; slots] }
    }

    /// Creates a window from raw counters.
    pub const fn from_slots(slots: Vec<u64>) -> Self {
        Self { slots }
    }

    /// Decodes a window of exactly `slots` counters.
    ///
    /// Fails if `bytes` is not a whole number of counters or holds a different number of them.
    pub fn decode_exact(bytes: &[u8], slots: usize) -> FeeResult<Self> {
        if bytes.len() % WINDOW_SLOT_SIZE != 0 {
            return Err(FeeError::UnalignedWindow(bytes.len()));
        }
        let actual = bytes.len() / WINDOW_SLOT_SIZE;
        if actual != slots {
            return Err(FeeError::WindowSizeMismatch { expected: slots, actual });
        }

        let slots = bytes
            .chunks_exact(WINDOW_SLOT_SIZE)
            .map(|chunk| {
                let mut buf = [0u8; WINDOW_SLOT_SIZE];
                buf.copy_from_slice(chunk);
                u64::from_be_bytes(buf)
            })
            .collect();
        Ok(Self { slots })
    }

    /// Decodes a window of `slots` counters from the start of `bytes`.
    ///
    /// Trailing data after the window is ignored.
    pub fn decode(bytes: &[u8], slots: usize) -> FeeResult<Self> {
        let size = slots * WINDOW_SLOT_SIZE;
        if bytes.len() < size {
            return Err(FeeError::WindowSizeMismatch {
                expected: slots,
                actual: bytes.len() / WINDOW_SLOT_SIZE,
            });
        }
        Self::decode_exact(&bytes[..size], slots)
    }

    /// Encodes the window as big-endian counters.
    pub fn encode(&self) -> Vec<u8> {
        self.slots.iter().flat_map(|slot| slot.to_be_bytes()).collect()
    }

    /// Returns the counters.
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// Returns the number of counters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the window has no counters.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Shifts the window forward by `roll` buckets.
    ///
    /// Slot `i` takes the value of slot `i + roll` and the newest `roll` slots are zeroed. A
    /// roll of the full window length or more zeroes everything.
    pub fn roll(&mut self, roll: u64) {
        let len = self.slots.len();
        let roll = usize::try_from(roll).unwrap_or(usize::MAX);
        if roll >= len {
            self.slots.iter_mut().for_each(|slot| *slot = 0);
            return;
        }
        self.slots.copy_within(roll.., 0);
        self.slots[len - roll..].iter_mut().for_each(|slot| *slot = 0);
    }

    /// Returns the saturating sum of all counters.
    pub fn sum(&self) -> u64 {
        self.slots.iter().fold(0u64, |acc, slot| acc.saturating_add(*slot))
    }

    /// Adds `amount` to the counter at `offset`, saturating at [u64::MAX].
    pub fn update(&mut self, offset: usize, amount: u64) -> FeeResult<()> {
        let slots = self.slots.len();
        let slot = self
            .slots
            .get_mut(offset)
            .ok_or(FeeError::WindowOffsetOutOfBounds { offset, slots })?;
        *slot = slot.saturating_add(amount);
        Ok(())
    }
}
