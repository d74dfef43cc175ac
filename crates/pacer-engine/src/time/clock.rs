use std::time::Duration;

use super::source::{SystemTimeSource, TimeSource};

/// Immutable timing snapshot produced by [`MonotonicClock::sample`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClockSample {
    /// Real time accumulated since the clock was created. Never decreases.
    pub total_real_time: Duration,

    /// Real time since the previous sample. Zero when the source jumped
    /// backwards.
    pub elapsed_real_time: Duration,

    /// `elapsed_real_time` minus any time the clock spent suspended,
    /// floored at zero.
    pub elapsed_adjusted_time: Duration,

    /// The source reported an earlier reading than the previous sample.
    pub backward_jump: bool,
}

impl ClockSample {
    /// Returns this sample with both elapsed values forced to zero.
    pub fn zeroed(self) -> Self {
        Self {
            elapsed_real_time: Duration::ZERO,
            elapsed_adjusted_time: Duration::ZERO,
            ..self
        }
    }
}

/// Monotonic clock producing [`ClockSample`] snapshots from a [`TimeSource`].
///
/// The clock owns its source; there is no process-wide clock, so tests and
/// replays inject a [`ManualTimeSource`](super::ManualTimeSource).
///
/// Anomalies from the source are absorbed here: a reading earlier than the
/// previous one yields a zero delta and the total keeps its value.
/// Time spent between [`suspend`](Self::suspend) and
/// [`resume`](Self::resume) counts as real time but is removed from the
/// adjusted delta.
#[derive(Debug, Clone)]
pub struct MonotonicClock<S = SystemTimeSource> {
    source: S,
    last: Duration,
    total: Duration,
    suspend_depth: u32,
    suspended_since: Option<Duration>,
    suspended_pending: Duration,
}

impl MonotonicClock<SystemTimeSource> {
    /// Clock over the process wall clock.
    pub fn system() -> Self {
        Self::new(SystemTimeSource::new())
    }
}

impl Default for MonotonicClock<SystemTimeSource> {
    fn default() -> Self {
        Self::system()
    }
}

impl<S: TimeSource> MonotonicClock<S> {
    /// Creates a clock whose first sample measures from the source's current
    /// reading.
    pub fn new(source: S) -> Self {
        let last = source.now();
        Self {
            source,
            last,
            total: Duration::ZERO,
            suspend_depth: 0,
            suspended_since: None,
            suspended_pending: Duration::ZERO,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Real time accumulated up to the last sample.
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn is_suspended(&self) -> bool {
        self.suspend_depth > 0
    }

    /// Takes a new sample and moves the reference point to now.
    pub fn sample(&mut self) -> ClockSample {
        let now = self.source.now();

        let (elapsed, backward_jump) = match now.checked_sub(self.last) {
            Some(delta) => (delta, false),
            None => {
                log::debug!(
                    "time source went backwards by {:?}; treating as zero elapsed",
                    self.last - now
                );
                (Duration::ZERO, true)
            }
        };

        self.last = now;
        self.total += elapsed;

        let mut suspended = std::mem::take(&mut self.suspended_pending);
        if let Some(since) = self.suspended_since {
            suspended += now.saturating_sub(since);
            self.suspended_since = Some(now);
        }

        ClockSample {
            total_real_time: self.total,
            elapsed_real_time: elapsed,
            elapsed_adjusted_time: elapsed.saturating_sub(suspended),
            backward_jump,
        }
    }

    /// Stops adjusted time from advancing. Calls nest.
    pub fn suspend(&mut self) {
        if self.suspend_depth == 0 {
            self.suspended_since = Some(self.source.now());
        }
        self.suspend_depth = self.suspend_depth.saturating_add(1);
    }

    /// Undoes one [`suspend`](Self::suspend). Extra calls are ignored.
    pub fn resume(&mut self) {
        match self.suspend_depth {
            0 => {}
            1 => {
                self.suspend_depth = 0;
                if let Some(since) = self.suspended_since.take() {
                    self.suspended_pending += self.source.now().saturating_sub(since);
                }
            }
            _ => self.suspend_depth -= 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTimeSource;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn clock() -> (ManualTimeSource, MonotonicClock<ManualTimeSource>) {
        let source = ManualTimeSource::starting_at(Duration::from_secs(100));
        let clock = MonotonicClock::new(source.clone());
        (source, clock)
    }

    #[test]
    fn first_sample_measures_from_construction() {
        let (source, mut clock) = clock();
        source.advance_ms(16);

        let s = clock.sample();
        assert_eq!(s.elapsed_real_time, ms(16));
        assert_eq!(s.elapsed_adjusted_time, ms(16));
        assert_eq!(s.total_real_time, ms(16));
        assert!(!s.backward_jump);
    }

    #[test]
    fn totals_accumulate() {
        let (source, mut clock) = clock();
        for _ in 0..3 {
            source.advance_ms(10);
            clock.sample();
        }
        assert_eq!(clock.total(), ms(30));
    }

    #[test]
    fn backward_jump_is_zero_elapsed_and_total_holds() {
        let (source, mut clock) = clock();
        source.advance_ms(50);
        clock.sample();

        source.set(Duration::from_secs(99));
        let s = clock.sample();
        assert!(s.backward_jump);
        assert_eq!(s.elapsed_real_time, Duration::ZERO);
        assert_eq!(s.elapsed_adjusted_time, Duration::ZERO);
        assert_eq!(s.total_real_time, ms(50));

        // Deltas resume from the rolled-back reading.
        source.advance_ms(5);
        let s = clock.sample();
        assert_eq!(s.elapsed_real_time, ms(5));
        assert_eq!(s.total_real_time, ms(55));
    }

    #[test]
    fn suspended_time_is_removed_from_adjusted_elapsed() {
        let (source, mut clock) = clock();
        source.advance_ms(10);
        clock.suspend();
        source.advance_ms(30);
        clock.resume();
        source.advance_ms(5);

        let s = clock.sample();
        assert_eq!(s.elapsed_real_time, ms(45));
        assert_eq!(s.elapsed_adjusted_time, ms(15));
    }

    #[test]
    fn sample_while_suspended_reports_zero_adjusted() {
        let (source, mut clock) = clock();
        clock.suspend();
        source.advance_ms(20);

        let s = clock.sample();
        assert_eq!(s.elapsed_real_time, ms(20));
        assert_eq!(s.elapsed_adjusted_time, Duration::ZERO);

        source.advance_ms(7);
        clock.resume();
        source.advance_ms(3);
        assert_eq!(clock.sample().elapsed_adjusted_time, ms(3));
    }

    #[test]
    fn suspend_nests() {
        let (source, mut clock) = clock();
        clock.suspend();
        clock.suspend();
        source.advance_ms(10);
        clock.resume();
        assert!(clock.is_suspended());
        source.advance_ms(10);
        clock.resume();
        assert!(!clock.is_suspended());
        clock.resume();

        let s = clock.sample();
        assert_eq!(s.elapsed_real_time, ms(20));
        assert_eq!(s.elapsed_adjusted_time, Duration::ZERO);
    }

    #[test]
    fn zeroed_keeps_total() {
        let s = ClockSample {
            total_real_time: ms(90),
            elapsed_real_time: ms(30),
            elapsed_adjusted_time: ms(30),
            backward_jump: false,
        }
        .zeroed();

        assert_eq!(s.total_real_time, ms(90));
        assert_eq!(s.elapsed_real_time, Duration::ZERO);
        assert_eq!(s.elapsed_adjusted_time, Duration::ZERO);
    }
}
