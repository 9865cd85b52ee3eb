use std::time::{Duration, Instant};

use crate::traits::TimeSource;

/// Default tick resolution: half a millisecond.
pub const DEFAULT_TICK: Duration = Duration::from_micros(500);

/// Configuration for [`TickClock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    /// Length of one tick. Must be non-zero; a zero tick is treated as one
    /// nanosecond.
    pub tick: Duration,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

/// Monotonic clock that counts ticks elapsed since it was created.
///
/// The count wraps at `u32::MAX`; the codec masks it further to the width of
/// the wire field.
#[derive(Debug, Clone)]
pub struct TickClock {
    epoch: Instant,
    tick_nanos: u128,
}

impl TickClock {
    /// Create a clock with the default half-millisecond tick.
    pub fn new() -> Self {
        Self::with_config(ClockConfig::default())
    }

    pub fn with_config(config: ClockConfig) -> Self {
        Self {
            epoch: Instant::now(),
            tick_nanos: config.tick.as_nanos().max(1),
        }
    }

    /// Ticks elapsed between the clock's epoch and `at`, wrapped to 32 bits.
    pub fn ticks_at(&self, at: Instant) -> u32 {
        let elapsed = at.saturating_duration_since(self.epoch).as_nanos();
        // Truncation is the wrap.
        (elapsed / self.tick_nanos) as u32
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TickClock {
    fn now(&self) -> u32 {
        self.ticks_at(Instant::now())
    }
}

/// A time source that always reports the same tick. Useful for reproducible
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixedTime(pub u32);

impl TimeSource for FixedTime {
    fn now(&self) -> u32 {
        self.0
    }
}
