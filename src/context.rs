//! The session API: init entry points, `set_counter`, and `process`,
//! realized as two context types that share a private [`State`] — one
//! parameterized over a round oracle for encryption, one fixed for
//! decryption since it never draws randomness.

use crate::block::{BlockMode, Payload, process_block};
use crate::error::{ParamError, ProcessError};
use crate::oracle::RoundOracle;
use crate::params::Params;
use crate::setup::{randomized_setup_decrypt, randomized_setup_encrypt};
use crate::state::{KeyBits, State};

#[cfg(feature = "zeroize")]
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A context set up for encryption, parameterized over the source of
/// randomness used to pick each block's round count.
pub struct EncryptContext<O: RoundOracle> {
    state: State,
    oracle: O,
}

/// A context set up for decryption.
pub struct DecryptContext {
    state: State,
}

#[cfg(feature = "zeroize")]
impl<O: RoundOracle> Drop for EncryptContext<O> {
    fn drop(&mut self) {
        self.state.input.zeroize();
        self.state.rand.zeroize();
        self.state.pepper.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl<O: RoundOracle> ZeroizeOnDrop for EncryptContext<O> {}

#[cfg(feature = "zeroize")]
impl Drop for DecryptContext {
    fn drop(&mut self) {
        self.state.input.zeroize();
        self.state.rand.zeroize();
        self.state.pepper.zeroize();
    }
}

#[cfg(feature = "zeroize")]
impl ZeroizeOnDrop for DecryptContext {}

impl<O: RoundOracle> EncryptContext<O> {
    /// Initializes with a freshly drawn pepper (`init_encrypt`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] if `params` violates a parameter invariant.
    pub fn new(
        key: &[u8],
        key_bits: KeyBits,
        iv: &[u8; 12],
        params: RawParams,
        mut oracle: O,
    ) -> Result<Self, ParamError> {
        let params = params.validate(key_bits)?;
        let mut state = State::new(key, key_bits, iv, params);
        randomized_setup_encrypt(&mut state, &mut oracle);
        Ok(EncryptContext { state, oracle })
    }

    /// Initializes with a caller-chosen pepper (`init_encrypt_with_pepper`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] if `params` violates a parameter invariant.
    pub fn new_with_pepper(
        key: &[u8],
        key_bits: KeyBits,
        iv: &[u8; 12],
        params: RawParams,
        pepper: u32,
        mut oracle: O,
    ) -> Result<Self, ParamError> {
        let params = params.validate(key_bits)?;
        let mut state = State::new(key, key_bits, iv, params);
        state.pepper = pepper;
        state.is_pepper_set = true;
        randomized_setup_encrypt(&mut state, &mut oracle);
        Ok(EncryptContext { state, oracle })
    }

    /// The init hashes produced during setup; send these to the decryptor
    /// alongside the ciphertext.
    #[must_use]
    pub fn init_hash(&self) -> &[u16] {
        &self.state.init_hash[..usize::from(self.state.params.num_init_hashes)]
    }

    /// The pepper that was used (drawn or caller-supplied).
    #[must_use]
    pub fn pepper(&self) -> u32 {
        self.state.pepper
    }

    /// Addresses block `counter` relative to the post-setup base, for
    /// random access.
    pub fn set_counter(&mut self, counter: u32) {
        self.state.set_counter(counter);
    }

    /// Encrypts `input` into `output`, writing one block hash per 64-byte
    /// block into `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::DecryptFailed`] if a block's round search
    /// somehow returns fewer than `min_rounds` (can only happen from a
    /// corrupted context; encryption itself never fails to find a round
    /// count in range).
    ///
    /// # Panics
    ///
    /// Panics if `output` is shorter than `input`, or `hash` has fewer than
    /// `ceil(input.len() / 64)` slots.
    pub fn process(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        hash: &mut [u16],
    ) -> Result<(), ProcessError> {
        assert!(output.len() >= input.len());
        assert!(hash.len() >= input.len().div_ceil(64));

        for (block, (in_chunk, out_chunk)) in input
            .chunks(64)
            .zip(output.chunks_mut(64))
            .enumerate()
        {
            let hash_slot = &mut hash[block];
            let rounds = process_block(
                &self.state.input,
                self.state.rand[0],
                &self.state.params,
                Payload::Data { input: in_chunk, output: out_chunk },
                BlockMode::Encrypt { oracle: &mut self.oracle, hash_out: hash_slot },
            );
            if rounds < self.state.params.min_rounds {
                return Err(ProcessError::DecryptFailed);
            }
            self.state.increment_counter();
        }
        Ok(())
    }
}

impl DecryptContext {
    /// Initializes for decrypt; pepper search starts at 0 (`init_decrypt`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] if `params` violates a parameter invariant, or
    /// `ProcessError::PepperSearchExhausted` if no pepper in
    /// `[0, 2^pepper_bits)` decodes `init_hash`.
    pub fn new(
        key: &[u8],
        key_bits: KeyBits,
        iv: &[u8; 12],
        params: RawParams,
        init_hash: &[u16],
    ) -> Result<Self, DecryptInitError> {
        Self::new_with_pepper(key, key_bits, iv, params, 0, init_hash)
    }

    /// Initializes for decrypt starting the pepper search at `pepper`
    /// (`init_decrypt_with_pepper`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError`] if `params` violates a parameter invariant, or
    /// `ProcessError::PepperSearchExhausted` if no pepper in
    /// `[pepper, 2^pepper_bits)` decodes `init_hash`.
    pub fn new_with_pepper(
        key: &[u8],
        key_bits: KeyBits,
        iv: &[u8; 12],
        params: RawParams,
        pepper: u32,
        init_hash: &[u16],
    ) -> Result<Self, DecryptInitError> {
        let params = params.validate(key_bits).map_err(DecryptInitError::Param)?;
        let mut state = State::new(key, key_bits, iv, params);
        state.pepper = pepper;
        state.is_pepper_set = true;

        let count = usize::from(params.num_init_hashes);
        state.init_hash[..count].copy_from_slice(&init_hash[..count]);

        if randomized_setup_decrypt(&mut state) {
            Ok(DecryptContext { state })
        } else {
            Err(DecryptInitError::Process(ProcessError::PepperSearchExhausted))
        }
    }

    /// Addresses block `counter` relative to the post-setup base, for
    /// random access.
    pub fn set_counter(&mut self, counter: u32) {
        self.state.set_counter(counter);
    }

    /// Decrypts `input` into `output` using one block hash per 64-byte
    /// block from `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::DecryptFailed`] if any block's round search
    /// does not find a round count whose hash matches; the whole stream is
    /// aborted and no output past that point should be trusted.
    ///
    /// # Panics
    ///
    /// Panics if `output` is shorter than `input`, or `hash` has fewer than
    /// `ceil(input.len() / 64)` slots.
    pub fn process(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        hash: &[u16],
    ) -> Result<(), ProcessError> {
        assert!(output.len() >= input.len());
        assert!(hash.len() >= input.len().div_ceil(64));

        for (block, (in_chunk, out_chunk)) in input
            .chunks(64)
            .zip(output.chunks_mut(64))
            .enumerate()
        {
            let rounds = process_block::<crate::setup::NoOracle>(
                &self.state.input,
                self.state.rand[0],
                &self.state.params,
                Payload::Data { input: in_chunk, output: out_chunk },
                BlockMode::Decrypt { expected: hash[block] },
            );
            if rounds < self.state.params.min_rounds {
                return Err(ProcessError::DecryptFailed);
            }
            self.state.increment_counter();
        }
        Ok(())
    }
}

/// Unvalidated constructor arguments for [`Params::new`], grouped so the
/// init entry points don't each take six bare integers.
#[derive(Clone, Copy, Debug)]
pub struct RawParams {
    /// Inclusive lower bound of the per-block round count.
    pub min_rounds: u32,
    /// Inclusive upper bound of the per-block round count.
    pub max_rounds: u32,
    /// Rounds applied once at setup, not repeated per block.
    pub num_precomputed_rounds: u8,
    /// Round-count granularity.
    pub hash_interval: u32,
    /// Size of the pepper search space, in bits.
    pub pepper_bits: u8,
    /// Number of setup blocks used to authenticate the session.
    pub num_init_hashes: u8,
}

impl RawParams {
    fn validate(self, key_bits: KeyBits) -> Result<Params, ParamError> {
        Params::new(
            self.min_rounds,
            self.max_rounds,
            self.num_precomputed_rounds,
            self.hash_interval,
            self.pepper_bits,
            self.num_init_hashes,
            key_bits,
        )
    }
}

/// Failure mode of [`DecryptContext::new`]/[`DecryptContext::new_with_pepper`]:
/// either the parameters were invalid, or the pepper search exhausted
/// without a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptInitError {
    /// A parameter invariant was violated.
    Param(ParamError),
    /// Setup failed — see [`ProcessError::PepperSearchExhausted`].
    Process(ProcessError),
}

impl core::fmt::Display for DecryptInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Param(e) => write!(f, "{e}"),
            Self::Process(e) => write!(f, "{e}"),
        }
    }
}

impl core::error::Error for DecryptInitError {}
