use std::time::Duration;

use super::error::ConfigError;

/// 166 667 ticks of 100 ns, roughly 1/60 s.
pub const DEFAULT_TARGET_STEP: Duration = Duration::from_nanos(16_666_700);
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_millis(500);
pub const DEFAULT_SLOW_WINDOW: u32 = 20;
/// Jitter tolerance of `target_step >> 6`, i.e. 1/64 of a step.
pub const DEFAULT_SNAP_SHIFT: u32 = 6;
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(20);

const MAX_SNAP_SHIFT: u32 = 63;

/// Frame scheduler configuration.
///
/// Values are validated by [`validate`](Self::validate) whenever a
/// scheduler is built or reconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Advance the simulation in whole `target_step` increments. When false,
    /// each pass simulates once with the measured elapsed time.
    pub fixed_time_step: bool,

    /// Duration of one fixed simulation step.
    pub target_step: Duration,

    /// Cap on elapsed time consumed by a single pass. Bounds catch-up bursts
    /// after a stall (breakpoint, OS suspend, long load).
    pub max_elapsed: Duration,

    /// Number of consecutive non-burst passes needed before the running
    /// slowly flag clears.
    pub slow_window: u32,

    /// Elapsed times within `target_step >> snap_shift` of the target are
    /// treated as exactly one step.
    pub snap_shift: u32,

    /// Sleep performed by a pass while the host is inactive.
    pub idle_sleep: Duration,

    /// Sleep performed before sampling while the host is active but not
    /// focused. Zero disables it.
    pub unfocused_sleep: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: true,
            target_step: DEFAULT_TARGET_STEP,
            max_elapsed: DEFAULT_MAX_ELAPSED,
            slow_window: DEFAULT_SLOW_WINDOW,
            snap_shift: DEFAULT_SNAP_SHIFT,
            idle_sleep: DEFAULT_IDLE_SLEEP,
            unfocused_sleep: Duration::ZERO,
        }
    }
}

impl SchedulerConfig {
    /// Fixed-step configuration updating `hz` times per second.
    pub fn from_hz(hz: u32) -> Result<Self, ConfigError> {
        if hz == 0 {
            return Err(ConfigError::ZeroRate);
        }
        let step = Duration::from_nanos(1_000_000_000 / u64::from(hz));
        Ok(Self::default()
            .with_target_step(step)
            .with_max_elapsed(DEFAULT_MAX_ELAPSED.max(step)))
    }

    pub fn with_fixed_time_step(mut self, fixed: bool) -> Self {
        self.fixed_time_step = fixed;
        self
    }

    pub fn with_target_step(mut self, step: Duration) -> Self {
        self.target_step = step;
        self
    }

    pub fn with_max_elapsed(mut self, max: Duration) -> Self {
        self.max_elapsed = max;
        self
    }

    pub fn with_slow_window(mut self, passes: u32) -> Self {
        self.slow_window = passes;
        self
    }

    pub fn with_snap_shift(mut self, shift: u32) -> Self {
        self.snap_shift = shift;
        self
    }

    pub fn with_idle_sleep(mut self, sleep: Duration) -> Self {
        self.idle_sleep = sleep;
        self
    }

    pub fn with_unfocused_sleep(mut self, sleep: Duration) -> Self {
        self.unfocused_sleep = sleep;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_step.is_zero() {
            return Err(ConfigError::ZeroTargetStep);
        }
        if self.max_elapsed < self.target_step {
            return Err(ConfigError::MaxElapsedBelowStep {
                max_elapsed: self.max_elapsed,
                target_step: self.target_step,
            });
        }
        if self.snap_shift > MAX_SNAP_SHIFT {
            return Err(ConfigError::SnapShiftOutOfRange(self.snap_shift));
        }
        Ok(())
    }

    /// Width of the jitter band around `target_step`.
    pub fn snap_tolerance(&self) -> Duration {
        super::nanos_to_duration(self.target_step.as_nanos() >> self.snap_shift.min(MAX_SNAP_SHIFT))
    }

    /// Largest step count a pass can produce from a clamped sample alone,
    /// not counting leftover accumulated time.
    pub fn max_steps_per_pass(&self) -> u128 {
        self.max_elapsed.as_nanos() / self.target_step.as_nanos().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_and_fixed() {
        let cfg = SchedulerConfig::default();
        assert!(cfg.validate().is_ok());
        assert!(cfg.fixed_time_step);
        assert_eq!(cfg.target_step, Duration::from_nanos(16_666_700));
        assert_eq!(cfg.max_elapsed, Duration::from_millis(500));
    }

    #[test]
    fn zero_step_is_rejected() {
        let cfg = SchedulerConfig::default().with_target_step(Duration::ZERO);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTargetStep));
    }

    #[test]
    fn max_elapsed_below_step_is_rejected() {
        let cfg = SchedulerConfig::default()
            .with_target_step(Duration::from_millis(10))
            .with_max_elapsed(Duration::from_millis(5));
        assert!(matches!(cfg.validate(), Err(ConfigError::MaxElapsedBelowStep { .. })));
    }

    #[test]
    fn snap_shift_bound() {
        assert!(SchedulerConfig::default().with_snap_shift(63).validate().is_ok());
        assert_eq!(
            SchedulerConfig::default().with_snap_shift(64).validate(),
            Err(ConfigError::SnapShiftOutOfRange(64))
        );
    }

    #[test]
    fn from_hz() {
        let cfg = SchedulerConfig::from_hz(100).unwrap();
        assert_eq!(cfg.target_step, Duration::from_millis(10));
        assert_eq!(SchedulerConfig::from_hz(0), Err(ConfigError::ZeroRate));

        let slow = SchedulerConfig::from_hz(1).unwrap();
        assert_eq!(slow.max_elapsed, Duration::from_secs(1));
        assert!(slow.validate().is_ok());
    }

    #[test]
    fn snap_tolerance_is_a_sixty_fourth() {
        let cfg = SchedulerConfig::default().with_target_step(Duration::from_micros(6400));
        assert_eq!(cfg.snap_tolerance(), Duration::from_micros(100));
    }

    #[test]
    fn max_steps_with_defaults() {
        assert_eq!(SchedulerConfig::default().max_steps_per_pass(), 29);
    }
}
