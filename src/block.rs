//! The per-block engine: round search, hashing, and keystream
//! generation for one 64-byte block.

use crate::hash::{CollisionSet, block_hash};
use crate::oracle::RoundOracle;
use crate::params::Params;
use crate::rounds::apply_round;
use crate::state::{COUNTER, STATE_WORDS};

/// Whether this call produces keystream or is a keystream-less setup block
/// (a `NULL` plaintext/ciphertext for setup blocks).
pub(crate) enum Payload<'a> {
    /// A setup block: only the hash is wanted.
    Setup,
    /// A payload block: `input` is XORed with the generated keystream into
    /// `output`. Both slices have the same length, at most 64.
    Data { input: &'a [u8], output: &'a mut [u8] },
}

/// The direction-specific half of the per-block protocol, modeled as a
/// tagged variant with two arms rather than a virtual method.
pub(crate) enum BlockMode<'a, O> {
    /// Draw a random round count and report the resulting hash.
    Encrypt { oracle: &'a mut O, hash_out: &'a mut u16 },
    /// Search rounds up to `max_rounds` for one whose hash matches `expected`.
    Decrypt { expected: u16 },
}

/// Runs one block of the protocol: picks a round budget, searches rounds
/// while hashing, then derives keystream and XORs the payload.
///
/// Returns the number of rounds used (`R` on encrypt, `r` on decrypt), or
/// `0` on decrypt if no round count in range produced the expected hash.
pub(crate) fn process_block<O: RoundOracle>(
    input: &[u32; STATE_WORDS],
    rand0: u32,
    params: &Params,
    payload: Payload<'_>,
    mode: BlockMode<'_, O>,
) -> u32 {
    // Step 1: copy state, fold rand[0] into the counter.
    let mut output = *input;
    output[COUNTER] ^= rand0;

    // Step 2: pick the round budget for this block.
    let (target, expected, hash_out) = match mode {
        BlockMode::Encrypt { oracle, hash_out } => {
            let span = params.max_rounds - params.min_rounds + params.hash_interval;
            let draw = oracle.uniform_below(span);
            let mut candidate = params.min_rounds + draw;
            candidate -= candidate % params.hash_interval;
            debug_assert!(candidate >= params.min_rounds);
            debug_assert!(candidate <= params.max_rounds);
            (candidate, None, Some(hash_out))
        }
        BlockMode::Decrypt { expected } => (params.max_rounds, Some(expected), None),
    };

    // Steps 3-4: round loop with hashing and collision resolution.
    let mut hash: u16 = 0;
    let mut collided = CollisionSet::new();
    let mut r = u32::from(params.num_precomputed_rounds) + 1;
    let mut matched_at = None;
    while r <= target {
        apply_round(&mut output, r);

        if r >= params.min_rounds && r % params.hash_interval == 0 {
            let candidate = block_hash(&output, hash, r);
            hash = collided.claim(candidate);

            if expected == Some(hash) {
                matched_at = Some(r);
                break;
            }
        }
        r += 1;
    }

    // Step 5: report the hash (encrypt), or bail out on no match (decrypt).
    let rounds_used = match (expected, matched_at) {
        (Some(_), Some(r)) => r,
        (Some(_), None) => return 0,
        (None, _) => target,
    };

    if let Some(hash_out) = hash_out {
        *hash_out = hash;
    }

    // Step 6: produce keystream, unless this was a setup block.
    if let Payload::Data { input: plaintext, output: ciphertext } = payload {
        let mut keystream = [0u8; 64];
        for (i, (word, orig)) in output.iter().zip(input.iter()).enumerate() {
            let combined = word.wrapping_add(*orig);
            keystream[4 * i..4 * i + 4].copy_from_slice(&combined.to_le_bytes());
        }
        for (c, (p, k)) in ciphertext.iter_mut().zip(plaintext.iter().zip(keystream.iter())) {
            *c = p ^ k;
        }
    }

    // Step 7.
    rounds_used
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::ReplayOracle;
    use crate::params::Params;
    use crate::setup::NoOracle;
    use crate::state::KeyBits;

    fn params() -> Params {
        Params::new(8, 32, 4, 4, 8, 7, KeyBits::Bits256).unwrap()
    }

    #[test]
    fn encrypt_then_decrypt_same_block_round_trips() {
        let input = [7u32; STATE_WORDS];
        let params = params();
        let plaintext = *b"Hello, Freestyle number one!!!!!"; // 32 bytes
        let mut ciphertext = [0u8; 32];
        let mut hash = 0u16;
        let mut oracle = ReplayOracle::new(&[3]);

        let rounds_enc = process_block(
            &input,
            0,
            &params,
            Payload::Data { input: &plaintext, output: &mut ciphertext },
            BlockMode::Encrypt { oracle: &mut oracle, hash_out: &mut hash },
        );
        assert!(rounds_enc >= params.min_rounds && rounds_enc <= params.max_rounds);
        assert_eq!(rounds_enc % params.hash_interval, 0);

        let mut decrypted = [0u8; 32];
        let rounds_dec = process_block::<NoOracle>(
            &input,
            0,
            &params,
            Payload::Data { input: &ciphertext, output: &mut decrypted },
            BlockMode::Decrypt { expected: hash },
        );
        assert_eq!(rounds_dec, rounds_enc);
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn decrypt_with_wrong_hash_reports_zero_or_a_different_round_count() {
        let input = [7u32; STATE_WORDS];
        let params = params();
        let rounds_dec = process_block::<NoOracle>(
            &input,
            0,
            &params,
            Payload::Setup,
            BlockMode::Decrypt { expected: 0xFFFF },
        );
        // Either it fails outright, or (astronomically unlikely) some
        // round count happens to also hash to 0xFFFF; either way it must
        // not silently report more rounds than max_rounds.
        assert!(rounds_dec == 0 || rounds_dec <= params.max_rounds);
    }
}
