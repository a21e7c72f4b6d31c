#![no_std]
#![doc = include_str!("../README.md")]

//! # Usage
//!
//! Freestyle does not implement the [`cipher`](https://docs.rs/cipher) crate's
//! `StreamCipher` trait: a Freestyle block produces a *hash* alongside its
//! keystream, and decryption needs that hash to search for the round count
//! the encryptor drew, so the two directions have different call shapes.
//! Instead the crate exposes [`EncryptContext`] and [`DecryptContext`]
//! directly.
//!
//! ```
//! use freestyle::{DecryptContext, EncryptContext, KeyBits, RawParams, ReplayOracle};
//!
//! let key = [0x42; 32];
//! let iv = [0x24; 12];
//! let params = RawParams {
//!     min_rounds: 8,
//!     max_rounds: 32,
//!     num_precomputed_rounds: 4,
//!     hash_interval: 4,
//!     pepper_bits: 8,
//!     num_init_hashes: 7,
//! };
//!
//! let oracle = ReplayOracle::new(&[3, 11, 5]);
//! let mut enc = EncryptContext::new(&key, KeyBits::Bits256, &iv, params, oracle).unwrap();
//! let plaintext = b"Freestyle is a randomized, variable round ChaCha";
//! let mut ciphertext = [0u8; 48];
//! let mut hashes = [0u16; 1];
//! enc.process(plaintext, &mut ciphertext, &mut hashes).unwrap();
//!
//! let mut dec = DecryptContext::new_with_pepper(
//!     &key,
//!     KeyBits::Bits256,
//!     &iv,
//!     params,
//!     enc.pepper(),
//!     enc.init_hash(),
//! )
//! .unwrap();
//! let mut decrypted = [0u8; 48];
//! dec.process(&ciphertext, &mut decrypted, &hashes).unwrap();
//! assert_eq!(&decrypted[..], &plaintext[..]);
//! ```

mod block;
mod context;
mod error;
mod hash;
mod oracle;
mod params;
mod rounds;
mod setup;
mod state;

pub use context::{DecryptContext, DecryptInitError, EncryptContext, RawParams};
pub use error::{ParamError, ProcessError};
pub use oracle::{ReplayOracle, RoundOracle};
pub use params::Params;
pub use state::KeyBits;

/// Re-exported so callers can supply an [`RoundOracle`] without a direct
/// dependency on `rand_core`.
pub use rand_core;
