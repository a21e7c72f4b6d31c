//! A pluggable source of per-block round counts, so tests can
//! deterministically replay round sequences instead of depending on a
//! concrete source of randomness.

use rand_core::RngCore;

/// A source of uniformly-distributed integers below a given bound.
///
/// Only [`EncryptContext`](crate::EncryptContext) needs one: decrypt never
/// draws random rounds (it always searches up to `max_rounds`), so
/// `DecryptContext` carries no oracle at all.
pub trait RoundOracle {
    /// Returns a value uniformly distributed in `[0, bound)`.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `bound` is zero; callers in this crate
    /// never pass zero.
    fn uniform_below(&mut self, bound: u32) -> u32;
}

impl<T: RngCore + ?Sized> RoundOracle for T {
    fn uniform_below(&mut self, bound: u32) -> u32 {
        debug_assert!(bound > 0);
        // Widening-multiply reduction, the same technique `rand`'s `Uniform`
        // sampler uses for `gen_range` over a `RngCore` without pulling in
        // the full `rand` crate: biased for non-power-of-two bounds, but the
        // protocol only needs the round count to vary, not to be perfectly
        // uniform.
        ((u64::from(self.next_u32()) * u64::from(bound)) >> 32) as u32
    }
}

/// A [`RoundOracle`] that replays a fixed sequence of draws, for
/// deterministic tests.
pub struct ReplayOracle<'a> {
    script: &'a [u32],
    pos: usize,
}

impl<'a> ReplayOracle<'a> {
    /// Creates an oracle that returns each value in `script` in turn.
    #[must_use]
    pub fn new(script: &'a [u32]) -> Self {
        ReplayOracle { script, pos: 0 }
    }
}

impl RoundOracle for ReplayOracle<'_> {
    fn uniform_below(&mut self, bound: u32) -> u32 {
        let value = self.script.get(self.pos).copied().unwrap_or(0) % bound;
        self.pos += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_oracle_cycles_through_script_then_zero() {
        let mut oracle = ReplayOracle::new(&[5, 7]);
        assert_eq!(oracle.uniform_below(10), 5);
        assert_eq!(oracle.uniform_below(10), 7);
        assert_eq!(oracle.uniform_below(10), 0);
    }
}
