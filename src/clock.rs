/// A monotonically non-decreasing millisecond clock, injected so the endpoint's timers are
/// deterministically testable instead of reaching for `Instant::now()` directly.
///
/// Hosts typically implement this with a single shared `Instant` sampled once per poll tick;
/// tests implement it with a counter they advance by hand.
pub trait Clock {
    /// Milliseconds since some arbitrary, fixed epoch. Must never decrease across calls.
    fn now_ms(&self) -> u32;
}
