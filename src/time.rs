//! Monotonic time source used by the call logic.
//!
//! The dispatcher only ever compares two [`Instant`]s, so time is injected
//! through the [`Clock`] trait. Firmware uses the Embassy timer, tests use
//! [`ManualClock`] and advance it by hand.

use core::ops::Add;
use core::time::Duration;

/// A point on a monotonic millisecond timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Instant {
    millis: u64,
}

impl Instant {
    /// Creates an instant `millis` milliseconds after the timeline origin.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Creates an instant `secs` seconds after the timeline origin.
    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Self {
            millis: secs * 1000,
        }
    }

    /// Milliseconds since the timeline origin.
    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.millis
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[inline]
    pub fn duration_since(self, earlier: Instant) -> Duration {
        Duration::from_millis(self.millis.saturating_sub(earlier.millis))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        let delta = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Instant::from_millis(self.millis.saturating_add(delta))
    }
}

/// Monotonic clock with an async delay.
#[allow(async_fn_in_trait, reason = "single-threaded executors only")]
pub trait Clock {
    /// Current time.
    fn now(&self) -> Instant;

    /// Waits for `duration` to elapse.
    async fn sleep(&mut self, duration: Duration);
}

/// Clock driven by the test, `sleep` advances it immediately.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Instant,
    slept: Duration,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    pub const fn starting_at(start: Instant) -> Self {
        Self {
            now: start,
            slept: Duration::ZERO,
        }
    }

    /// Moves the clock forward.
    pub fn advance(&mut self, by: Duration) {
        self.now = self.now + by;
    }

    /// Jumps the clock to `at`.
    pub fn set(&mut self, at: Instant) {
        self.now = at;
    }

    /// Sum of every duration passed to `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.slept
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now
    }

    async fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
        self.advance(duration);
    }
}

#[cfg(feature = "embassy-rp")]
impl From<embassy_time::Instant> for Instant {
    fn from(value: embassy_time::Instant) -> Self {
        Instant::from_millis(value.as_millis())
    }
}

/// Clock backed by the Embassy time driver.
#[cfg(feature = "embassy-rp")]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embassy-rp")]
impl Clock for EmbassyClock {
    fn now(&self) -> Instant {
        embassy_time::Instant::now().into()
    }

    async fn sleep(&mut self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        embassy_time::Timer::after_millis(millis).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_since_saturates() {
        let a = Instant::from_secs(10);
        let b = Instant::from_secs(4);
        assert_eq!(a.duration_since(b), Duration::from_secs(6));
        assert_eq!(b.duration_since(a), Duration::ZERO);
    }

    #[test]
    fn test_add_duration() {
        let t = Instant::from_millis(500) + Duration::from_millis(2500);
        assert_eq!(t.as_millis(), 3000);
    }

    #[tokio::test]
    async fn test_manual_clock_sleep_advances() {
        let mut clock = ManualClock::starting_at(Instant::from_secs(1));
        clock.sleep(Duration::from_millis(2500)).await;
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now(), Instant::from_secs(4));
        assert_eq!(clock.total_slept(), Duration::from_millis(2500));
    }
}
