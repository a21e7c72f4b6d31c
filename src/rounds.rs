//! The ChaCha quarter round, its `AXR` cousin used for hashing, and the
//! column/diagonal permutation built from them.

use crate::state::STATE_WORDS;

/// The ChaCha quarter round function.
///
/// `a += b; d ^= a; d = rotl(d,16); c += d; b ^= c; b = rotl(b,12);`
/// `a += b; d ^= a; d = rotl(d,8); c += d; b ^= c; b = rotl(b,7);`
#[inline]
pub(crate) fn quarter_round(a: usize, b: usize, c: usize, d: usize, state: &mut [u32; STATE_WORDS]) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] ^= state[a];
    state[d] = state[d].rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] ^= state[c];
    state[b] = state[b].rotate_left(7);
}

/// The auxiliary mixer used by the per-block hash and the `rand[]` derivation.
///
/// `a = a + b; c = c ^ a; c = rotl(c, r)`.
#[inline]
pub(crate) fn axr(a: &mut u32, b: u32, c: &mut u32, r: u32) {
    *a = a.wrapping_add(b);
    *c ^= *a;
    *c = c.rotate_left(r);
}

/// A column round: `QR` applied to the four columns of the 4x4 state.
#[inline]
pub(crate) fn column_round(state: &mut [u32; STATE_WORDS]) {
    quarter_round(0, 4, 8, 12, state);
    quarter_round(1, 5, 9, 13, state);
    quarter_round(2, 6, 10, 14, state);
    quarter_round(3, 7, 11, 15, state);
}

/// A diagonal round: `QR` applied to the four diagonals of the 4x4 state.
#[inline]
pub(crate) fn diagonal_round(state: &mut [u32; STATE_WORDS]) {
    quarter_round(0, 5, 10, 15, state);
    quarter_round(1, 6, 11, 12, state);
    quarter_round(2, 7, 8, 13, state);
    quarter_round(3, 4, 9, 14, state);
}

/// Applies round `r` (1-indexed): a column round when `r` is odd, a
/// diagonal round when `r` is even, identical to plain ChaCha.
#[inline]
pub(crate) fn apply_round(state: &mut [u32; STATE_WORDS], r: u32) {
    if r & 1 == 1 {
        column_round(state);
    } else {
        diagonal_round(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_round_matches_rfc8439_test_vector() {
        // <https://datatracker.ietf.org/doc/html/rfc8439#section-2.1.1>
        let mut state = [
            0x1111_1111,
            0x0102_0304,
            0x9b8d_6f43,
            0x0123_4567,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        quarter_round(0, 1, 2, 3, &mut state);
        assert_eq!(
            &state[..4],
            &[0xea2a_92f4, 0xcb1c_f8ce, 0x4581_472e, 0x5881_c4bb]
        );
    }

    #[test]
    fn apply_round_alternates_column_then_diagonal() {
        let mut by_helper = [1u32; STATE_WORDS];
        let mut by_manual = [1u32; STATE_WORDS];

        apply_round(&mut by_helper, 1);
        column_round(&mut by_manual);
        assert_eq!(by_helper, by_manual);

        apply_round(&mut by_helper, 2);
        diagonal_round(&mut by_manual);
        assert_eq!(by_helper, by_manual);
    }
}
