use rand::RngCore;

/// Source of randomness used for the sync handshake nonce and the shakeout pipeline's jitter
/// and out-of-order sampling, injected so endpoint behavior is deterministically testable
/// instead of reaching for `rand::random()` directly.
pub trait Rng {
    /// A fresh 32-bit value, uniformly distributed.
    fn next_u32(&mut self) -> u32;

    /// A value uniformly distributed over `[low, high)`. Returns `low` if `high <= low`.
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32;
}

impl<T: RngCore> Rng for T {
    fn next_u32(&mut self) -> u32 {
        RngCore::next_u32(self)
    }

    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.next_u32() % (high - low)
    }
}

/// Resamples until a nonzero 16-bit magic number is drawn. The magic must be nonzero so that a
/// freshly constructed endpoint's `remote_magic_number` of `0` can mean "not yet synced".
pub(crate) fn fresh_magic(rng: &mut impl Rng) -> u16 {
    loop {
        let candidate = rng.next_u32() as u16;
        if candidate != 0 {
            return candidate;
        }
    }
}
