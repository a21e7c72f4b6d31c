//! Error types surfaced by the three categories in the cipher's error model:
//! bad parameters (fatal at init), a single block failing to decrypt, and
//! pepper-search exhaustion during decrypt setup.

use core::fmt;

/// A precondition from the parameter invariants was violated.
///
/// Returned by [`crate::Params::new`]; fatal at construction time, never
/// retried internally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParamError {
    /// `min_rounds` must be at least 1.
    MinRoundsZero,
    /// `max_rounds` must not exceed 65536.
    MaxRoundsTooLarge,
    /// `min_rounds` must not exceed `max_rounds`.
    MinGreaterThanMax,
    /// `min_rounds` must be a multiple of `hash_interval`.
    MinRoundsNotAligned,
    /// `max_rounds` must be a multiple of `hash_interval`.
    MaxRoundsNotAligned,
    /// `hash_interval` must be at least 1.
    HashIntervalZero,
    /// `num_precomputed_rounds` must be in `1..=16`.
    PrecomputedRoundsOutOfRange,
    /// `num_precomputed_rounds` must not exceed `min_rounds - 4`.
    PrecomputedRoundsExceedMinRounds,
    /// `pepper_bits` must be in `8..=32`.
    PepperBitsOutOfRange,
    /// `num_init_hashes` must be in `7..=56`.
    NumInitHashesOutOfRange,
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::MinRoundsZero => "min_rounds must be at least 1",
            Self::MaxRoundsTooLarge => "max_rounds must not exceed 65536",
            Self::MinGreaterThanMax => "min_rounds must not exceed max_rounds",
            Self::MinRoundsNotAligned => "min_rounds must be a multiple of hash_interval",
            Self::MaxRoundsNotAligned => "max_rounds must be a multiple of hash_interval",
            Self::HashIntervalZero => "hash_interval must be at least 1",
            Self::PrecomputedRoundsOutOfRange => "num_precomputed_rounds must be in 1..=16",
            Self::PrecomputedRoundsExceedMinRounds => {
                "num_precomputed_rounds must not exceed min_rounds - 4"
            }
            Self::PepperBitsOutOfRange => "pepper_bits must be in 8..=32",
            Self::NumInitHashesOutOfRange => "num_init_hashes must be in 7..=56",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ParamError {}

/// A runtime failure while processing a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProcessError {
    /// A block's round search returned fewer rounds than `min_rounds`
    /// (decrypt: no round count in range matched the expected hash).
    DecryptFailed,
    /// During decrypt setup, no pepper in `[pepper, 2^pepper_bits)` made
    /// every init-hash setup block decode; the context is unusable.
    PepperSearchExhausted,
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::DecryptFailed => "block round search did not find a matching hash",
            Self::PepperSearchExhausted => "no pepper in range decoded the init hashes",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for ProcessError {}
