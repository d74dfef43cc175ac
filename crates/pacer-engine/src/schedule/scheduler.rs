use std::time::Duration;

use crate::time::{ClockSample, MonotonicClock, SystemTimeSource, TimeSource};

use super::config::SchedulerConfig;
use super::error::ConfigError;
use super::handler::{FnHandler, FrameHandler};
use super::nanos_to_duration;
use super::pacing::SlowTracker;
use super::stats::SchedulerStats;
use super::step::{FrameInfo, HostState, StepInfo, StepRequest};

/// What a pass did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Host inactive: idle sleep, no sample, no callbacks.
    Idle,
    /// Not enough accumulated time for a fixed step.
    Pending,
    /// At least one simulation step was attempted.
    Simulated,
}

/// Result of [`FrameScheduler::run_pass`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub outcome: PassOutcome,
    /// Steps that completed.
    pub steps: u64,
    pub rendered: bool,
    pub running_slowly: bool,
    /// A step returned [`StepRequest::exit`].
    pub exit_requested: bool,
    /// Clock sample the pass consumed, after forced zeroing. `None` for idle
    /// passes.
    pub sample: Option<ClockSample>,
}

impl PassReport {
    fn idle() -> Self {
        Self {
            outcome: PassOutcome::Idle,
            steps: 0,
            rendered: false,
            running_slowly: false,
            exit_requested: false,
            sample: None,
        }
    }

    fn pending(sample: ClockSample, running_slowly: bool) -> Self {
        Self {
            outcome: PassOutcome::Pending,
            sample: Some(sample),
            running_slowly,
            ..Self::idle()
        }
    }
}

#[derive(Debug, Default)]
struct PassProgress {
    steps: u64,
    advanced: Duration,
    requests: StepRequest,
}

impl PassProgress {
    fn absorb(&mut self, request: StepRequest) {
        self.requests = self.requests.merge(request);
    }
}

/// Fixed-timestep frame scheduler.
///
/// Each call to [`run_pass`](Self::run_pass) samples the clock, converts the
/// elapsed real time into zero or more simulation steps and renders at most
/// once after the steps. In fixed mode the leftover real time carries over
/// in an accumulator that always stays below `target_step` after a pass.
///
/// # Partial passes
///
/// Callback errors propagate out of `run_pass` immediately. Steps that
/// completed before the failure stay committed to
/// [`total_simulation_time`](Self::total_simulation_time). The failing step
/// and any steps after it are dropped: their time has already left the
/// accumulator and is not returned to it. The render callback is not called.
#[derive(Debug)]
pub struct FrameScheduler<S = SystemTimeSource> {
    clock: MonotonicClock<S>,
    config: SchedulerConfig,
    accumulated: Duration,
    total_simulation: Duration,
    slow: SlowTracker,
    force_zero_elapsed: bool,
    real_since_draw: Duration,
    host_was_active: bool,
    stats: SchedulerStats,
}

impl FrameScheduler<SystemTimeSource> {
    /// Scheduler over the process wall clock.
    pub fn system(config: SchedulerConfig) -> Result<Self, ConfigError> {
        Self::new(MonotonicClock::system(), config)
    }
}

impl<S: TimeSource> FrameScheduler<S> {
    pub fn new(clock: MonotonicClock<S>, config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::debug!(
            "frame scheduler: {} step, target {:?}, max elapsed {:?}",
            if config.fixed_time_step { "fixed" } else { "variable" },
            config.target_step,
            config.max_elapsed
        );

        Ok(Self {
            clock,
            slow: SlowTracker::new(config.slow_window),
            config,
            accumulated: Duration::ZERO,
            total_simulation: Duration::ZERO,
            force_zero_elapsed: false,
            real_since_draw: Duration::ZERO,
            host_was_active: true,
            stats: SchedulerStats::default(),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn clock(&self) -> &MonotonicClock<S> {
        &self.clock
    }

    /// Mutable clock access, for suspending adjusted time around host work.
    pub fn clock_mut(&mut self) -> &mut MonotonicClock<S> {
        &mut self.clock
    }

    /// Real time not yet converted into a fixed step.
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn total_simulation_time(&self) -> Duration {
        self.total_simulation
    }

    pub fn is_running_slowly(&self) -> bool {
        self.config.fixed_time_step && self.slow.is_running_slowly()
    }

    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// The next pass treats its elapsed time as zero.
    pub fn reset_elapsed(&mut self) {
        self.force_zero_elapsed = true;
    }

    /// Switches between fixed and variable stepping. A change discards the
    /// accumulator.
    pub fn set_fixed_time_step(&mut self, fixed: bool) {
        if self.config.fixed_time_step == fixed {
            return;
        }
        self.config.fixed_time_step = fixed;
        self.accumulated = Duration::ZERO;
        log::debug!(
            "frame scheduler switched to {} step",
            if fixed { "fixed" } else { "variable" }
        );
    }

    /// Changes the fixed step duration. Discards the accumulator.
    pub fn set_target_step(&mut self, step: Duration) -> Result<(), ConfigError> {
        let config = self.config.clone().with_target_step(step);
        self.set_config(config)
    }

    pub fn set_max_elapsed(&mut self, max: Duration) -> Result<(), ConfigError> {
        let config = self.config.clone().with_max_elapsed(max);
        self.set_config(config)
    }

    /// Replaces the whole configuration after validating it. The accumulator
    /// is discarded when the mode or the step duration changes.
    pub fn set_config(&mut self, config: SchedulerConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if config.fixed_time_step != self.config.fixed_time_step
            || config.target_step != self.config.target_step
        {
            self.accumulated = Duration::ZERO;
        }
        if config.target_step != self.config.target_step {
            log::debug!("target step {:?} -> {:?}", self.config.target_step, config.target_step);
        }

        self.slow.set_window(config.slow_window);
        self.config = config;
        Ok(())
    }

    /// Runs the handler's update once with zero elapsed time before the first
    /// pass, so it can settle its state before any time is measured.
    ///
    /// Nothing is committed to simulation time and no render follows. A
    /// `reset_elapsed` request applies to the next pass; `exit` is returned
    /// for the host to act on.
    pub fn initial_update<H>(
        &mut self,
        handler: &mut H,
        host: HostState,
    ) -> Result<StepRequest, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        let request = handler.update(&StepInfo {
            elapsed: Duration::ZERO,
            total: self.total_simulation,
            running_slowly: false,
            step_index: 0,
            steps_in_pass: 1,
            host_focused: host.focused,
        })?;

        if request.reset_elapsed {
            self.force_zero_elapsed = true;
        }
        log::debug!("initial update done");
        Ok(request)
    }

    /// Runs one pass with separate simulation and render closures.
    pub fn run_pass_with<U, D, E>(
        &mut self,
        update: U,
        draw: D,
        host: HostState,
    ) -> Result<PassReport, E>
    where
        U: FnMut(&StepInfo) -> Result<StepRequest, E>,
        D: FnMut(&FrameInfo) -> Result<(), E>,
    {
        self.run_pass(&mut FnHandler::new(update, draw), host)
    }

    /// Runs one scheduling pass.
    pub fn run_pass<H>(&mut self, handler: &mut H, host: HostState) -> Result<PassReport, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        self.stats.passes += 1;

        if !host.active {
            if self.host_was_active {
                log::debug!("host inactive, simulation paused");
                self.host_was_active = false;
            }
            self.clock.source().sleep(self.config.idle_sleep);
            self.stats.idle_passes += 1;
            return Ok(PassReport::idle());
        }

        if !self.host_was_active {
            log::debug!("host active again, discarding time spent inactive");
            self.host_was_active = true;
            self.force_zero_elapsed = true;
        }

        if !host.focused && !self.config.unfocused_sleep.is_zero() {
            self.clock.source().sleep(self.config.unfocused_sleep);
        }

        let mut sample = self.clock.sample();
        if std::mem::take(&mut self.force_zero_elapsed) {
            sample = sample.zeroed();
            self.real_since_draw = Duration::ZERO;
        }
        self.real_since_draw += sample.elapsed_real_time;

        let elapsed = sample.elapsed_adjusted_time.min(self.config.max_elapsed);

        if self.config.fixed_time_step {
            self.fixed_pass(handler, host, sample, elapsed)
        } else {
            self.variable_pass(handler, host, sample, elapsed)
        }
    }

    fn fixed_pass<H>(
        &mut self,
        handler: &mut H,
        host: HostState,
        sample: ClockSample,
        elapsed: Duration,
    ) -> Result<PassReport, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        let target = self.config.target_step;

        // Leftover time is clamped too: at most max_elapsed / target_step steps.
        self.accumulated =
            (self.accumulated + self.snap_to_target(elapsed)).min(self.config.max_elapsed);
        let acc = self.accumulated.as_nanos();
        let step_nanos = target.as_nanos();
        let steps = u64::try_from(acc / step_nanos).unwrap_or(u64::MAX);
        self.accumulated = nanos_to_duration(acc % step_nanos);

        if steps == 0 {
            self.stats.pending_passes += 1;
            log::trace!("pass pending, accumulated {:?}", self.accumulated);
            return Ok(PassReport::pending(sample, self.slow.is_running_slowly()));
        }

        let was_slow = self.slow.is_running_slowly();
        let running_slowly = self.slow.observe(steps);
        if steps > 1 {
            self.stats.burst_passes += 1;
        }
        if running_slowly && !was_slow {
            log::warn!("simulation running slowly ({steps} steps this pass)");
        } else if was_slow && !running_slowly {
            log::debug!("simulation caught up");
        }

        let mut progress = PassProgress::default();
        for step_index in 0..steps {
            let info = StepInfo {
                elapsed: target,
                total: self.total_simulation,
                running_slowly,
                step_index,
                steps_in_pass: steps,
                host_focused: host.focused,
            };

            let request = handler.update(&info)?;
            self.commit_step(target, request, &mut progress);

            if request.exit {
                break;
            }
        }

        log::trace!(
            "pass ran {}/{steps} steps, accumulated {:?}",
            progress.steps,
            self.accumulated
        );
        self.finish_pass(handler, sample, running_slowly, progress)
    }

    fn variable_pass<H>(
        &mut self,
        handler: &mut H,
        host: HostState,
        sample: ClockSample,
        elapsed: Duration,
    ) -> Result<PassReport, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        self.slow.mark_variable();

        let info = StepInfo {
            elapsed,
            total: self.total_simulation,
            running_slowly: false,
            step_index: 0,
            steps_in_pass: 1,
            host_focused: host.focused,
        };

        let request = handler.update(&info)?;
        let mut progress = PassProgress::default();
        self.commit_step(elapsed, request, &mut progress);

        self.finish_pass(handler, sample, false, progress)
    }

    fn commit_step(&mut self, elapsed: Duration, request: StepRequest, progress: &mut PassProgress) {
        self.total_simulation += elapsed;
        self.stats.steps += 1;
        progress.steps += 1;
        progress.advanced += elapsed;
        progress.absorb(request);
        if request.reset_elapsed {
            self.force_zero_elapsed = true;
        }
    }

    fn finish_pass<H>(
        &mut self,
        handler: &mut H,
        sample: ClockSample,
        running_slowly: bool,
        progress: PassProgress,
    ) -> Result<PassReport, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        let mut report = PassReport {
            outcome: PassOutcome::Simulated,
            steps: progress.steps,
            rendered: false,
            running_slowly,
            exit_requested: progress.requests.exit,
            sample: Some(sample),
        };

        if progress.requests.exit {
            return Ok(report);
        }
        if progress.requests.suppress_draw {
            self.stats.draws_suppressed += 1;
            return Ok(report);
        }

        handler.draw(&FrameInfo {
            total_real_time: sample.total_real_time,
            elapsed_real_time: self.real_since_draw,
            total_simulation_time: self.total_simulation,
            elapsed_simulation_time: progress.advanced,
            running_slowly,
        })?;

        self.real_since_draw = Duration::ZERO;
        self.stats.frames_drawn += 1;
        report.rendered = true;
        Ok(report)
    }

    fn snap_to_target(&self, elapsed: Duration) -> Duration {
        let target = self.config.target_step;
        let diff = elapsed.abs_diff(target);
        if diff < self.config.snap_tolerance() {
            target
        } else {
            elapsed
        }
    }
}
