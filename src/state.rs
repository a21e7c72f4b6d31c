//! The 16-word ChaCha-layout state and the key/IV setup that fills it.

use crate::params::Params;
use crate::rounds::apply_round;

/// Number of 32-bit words in the Freestyle/ChaCha state.
pub(crate) const STATE_WORDS: usize = 16;

pub(crate) const CONSTANT0: usize = 0;
pub(crate) const CONSTANT1: usize = 1;
pub(crate) const CONSTANT2: usize = 2;
pub(crate) const CONSTANT3: usize = 3;
pub(crate) const KEY0: usize = 4;
pub(crate) const COUNTER: usize = 12;
pub(crate) const IV0: usize = 13;
pub(crate) const IV1: usize = 14;
pub(crate) const IV2: usize = 15;

/// `"expand 32-byte k"`, used when the key is 256 bits.
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// `"expand 16-byte k"`, used when the key is 128 bits (the key is then
/// repeated into the upper half of the key words).
const TAU: [u32; 4] = [0x6170_7865, 0x3120_646e, 0x7962_2d31, 0x6b20_6574];

/// The number of 16-bit init hashes a context can hold (valid range 7..=56).
pub(crate) const MAX_INIT_HASHES: usize = 56;

/// Which key length the caller supplied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyBits {
    /// 128-bit key, repeated into the upper key words; constants are `tau`.
    Bits128,
    /// 256-bit key; constants are `sigma`.
    Bits256,
}

/// The mutable cipher state shared by [`crate::EncryptContext`] and
/// [`crate::DecryptContext`] (shared core state, minus the fields that are
/// direction-specific and therefore live on the wrapping context types).
pub(crate) struct State {
    pub(crate) input: [u32; STATE_WORDS],
    pub(crate) rand: [u32; 8],
    pub(crate) init_hash: [u16; MAX_INIT_HASHES],
    pub(crate) pepper: u32,
    pub(crate) is_pepper_set: bool,
    pub(crate) initial_counter: u32,
    pub(crate) params: Params,
}

impl State {
    /// Key/IV/parameter setup. `key` is 16 or 32 bytes
    /// little-endian, `iv` is 12 bytes little-endian.
    pub(crate) fn new(key: &[u8], key_bits: KeyBits, iv: &[u8; 12], params: Params) -> Self {
        let mut input = [0u32; STATE_WORDS];

        let constants = match key_bits {
            KeyBits::Bits128 => TAU,
            KeyBits::Bits256 => SIGMA,
        };
        input[CONSTANT0..=CONSTANT3].copy_from_slice(&constants);

        match key_bits {
            KeyBits::Bits128 => {
                for (word, chunk) in input[KEY0..KEY0 + 4].iter_mut().zip(key.chunks_exact(4)) {
                    *word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
                }
                // Repeat the 128-bit key into the upper half.
                let (lo, hi) = input.split_at_mut(KEY0 + 4);
                hi[..4].copy_from_slice(&lo[KEY0..KEY0 + 4]);
            }
            KeyBits::Bits256 => {
                for (word, chunk) in input[KEY0..KEY0 + 8].iter_mut().zip(key.chunks_exact(4)) {
                    *word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
                }
            }
        }

        for (word, chunk) in input[IV0..=IV2].iter_mut().zip(iv.chunks_exact(4)) {
            *word = u32::from_le_bytes(chunk.try_into().expect("4-byte chunk"));
        }
        input[COUNTER] = 0;

        input[CONSTANT0] ^= params.cipher_parameter[0];
        input[CONSTANT1] ^= params.cipher_parameter[1];

        State {
            input,
            rand: [0u32; 8],
            init_hash: [0u16; MAX_INIT_HASHES],
            pepper: 0,
            is_pepper_set: false,
            initial_counter: 0,
            params,
        }
    }

    /// Applies `num_precomputed_rounds` column/diagonal rounds to `input`,
    /// once. Running this a second time after restoring `input[COUNTER]`
    /// reproduces the same state.
    pub(crate) fn precompute_rounds(&mut self) {
        for r in 1..=u32::from(self.params.num_precomputed_rounds) {
            apply_round(&mut self.input, r);
        }
    }

    pub(crate) fn increment_counter(&mut self) {
        self.input[COUNTER] = self.input[COUNTER].wrapping_add(1);
    }

    /// Addresses block `counter` relative to the post-precompute base, for
    /// random access.
    pub(crate) fn set_counter(&mut self, counter: u32) {
        self.input[COUNTER] = self.initial_counter.wrapping_add(counter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;

    fn test_params() -> Params {
        Params::new(8, 32, 4, 4, 8, 7, KeyBits::Bits256).unwrap()
    }

    #[test]
    fn precompute_rounds_is_idempotent() {
        let key = [0u8; 32];
        let iv = [0u8; 12];
        let mut state = State::new(&key, KeyBits::Bits256, &iv, test_params());
        state.precompute_rounds();
        let first = state.input;
        state.input[COUNTER] = 0;
        state.precompute_rounds();
        assert_eq!(state.input, first);
    }

    #[test]
    fn bits128_key_is_repeated_into_upper_half() {
        let key = [0x42u8; 16];
        let iv = [0u8; 12];
        let state = State::new(&key, KeyBits::Bits128, &iv, test_params());
        assert_eq!(&state.input[KEY0..KEY0 + 4], &state.input[KEY0 + 4..KEY0 + 8]);
    }
}
