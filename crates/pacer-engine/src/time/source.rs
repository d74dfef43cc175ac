use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Raw time readings consumed by a [`MonotonicClock`](super::MonotonicClock).
///
/// Readings are measured from an arbitrary epoch fixed when the source is
/// created. A source may misbehave and report a reading earlier than a
/// previous one (clock rollback); the clock absorbs that.
pub trait TimeSource {
    /// Current reading since the source epoch.
    fn now(&self) -> Duration;

    /// Blocks the caller for roughly `duration`.
    ///
    /// Used for the bounded idle wait while the host is inactive.
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Wall-clock source backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    epoch: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: Cell<Duration>,
    slept: Cell<Duration>,
    sleeps: Cell<u32>,
}

/// Deterministic time source driven by hand.
///
/// Clones share the same underlying reading, so a test can keep one handle
/// while the scheduler owns another:
///
/// ```
/// use std::time::Duration;
/// use pacer_engine::time::{ManualTimeSource, MonotonicClock};
///
/// let source = ManualTimeSource::new();
/// let mut clock = MonotonicClock::new(source.clone());
///
/// source.advance(Duration::from_millis(10));
/// assert_eq!(clock.sample().elapsed_real_time, Duration::from_millis(10));
/// ```
///
/// [`sleep`](TimeSource::sleep) does not block; it advances the reading by
/// the requested amount and records it.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    state: Rc<ManualState>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: Duration) -> Self {
        let source = Self::new();
        source.set(now);
        source
    }

    /// Moves the reading forward.
    pub fn advance(&self, by: Duration) {
        self.state.now.set(self.state.now.get() + by);
    }

    /// Shorthand for `advance(Duration::from_millis(ms))`.
    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Overwrites the reading. May move backwards.
    pub fn set(&self, now: Duration) {
        self.state.now.set(now);
    }

    /// Total time requested through [`TimeSource::sleep`].
    pub fn slept(&self) -> Duration {
        self.state.slept.get()
    }

    pub fn sleep_count(&self) -> u32 {
        self.state.sleeps.get()
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Duration {
        self.state.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
        self.state.slept.set(self.state.slept.get() + duration);
        self.state.sleeps.set(self.state.sleeps.get().saturating_add(1));
    }
}
