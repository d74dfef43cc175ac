use std::time::Duration;

use crate::schedule::{FrameHandler, FrameScheduler, HostState};
use crate::time::{SystemTimeSource, TimeSource};

use super::signal::ExitSignal;

/// Why [`HostLoop::run`] returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The [`ExitSignal`] was raised.
    Signal,
    /// A simulation step returned an exit request.
    Requested,
    PassLimit,
    SimulationLimit,
}

/// Totals for one [`HostLoop::run`] call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: u64,
    pub steps: u64,
    pub frames: u64,
    pub simulation_time: Duration,
    pub reason: ExitReason,
}

/// Windowless host loop.
///
/// Repeats scheduler passes until the exit signal is raised, a step asks to
/// exit, or a configured limit is reached. Host flags come from an optional
/// probe sampled once per pass, otherwise from the last
/// [`set_host_state`](Self::set_host_state).
///
/// The first [`run`](Self::run) starts with the scheduler's zero-elapsed
/// [`initial_update`](FrameScheduler::initial_update).
pub struct HostLoop<S = SystemTimeSource> {
    scheduler: FrameScheduler<S>,
    exit: ExitSignal,
    host: HostState,
    probe: Option<Box<dyn FnMut() -> HostState>>,
    pass_limit: Option<u64>,
    simulation_limit: Option<Duration>,
    stats_interval: u64,
    started: bool,
}

impl<S: TimeSource> HostLoop<S> {
    pub fn new(scheduler: FrameScheduler<S>) -> Self {
        Self {
            scheduler,
            exit: ExitSignal::new(),
            host: HostState::FOREGROUND,
            probe: None,
            pass_limit: None,
            simulation_limit: None,
            stats_interval: 0,
            started: false,
        }
    }

    /// Stop after `passes` passes, counting pending and idle ones.
    pub fn with_pass_limit(mut self, passes: u64) -> Self {
        self.pass_limit = Some(passes);
        self
    }

    /// Stop once total simulation time reaches `limit`.
    pub fn with_simulation_limit(mut self, limit: Duration) -> Self {
        self.simulation_limit = Some(limit);
        self
    }

    /// Log scheduler stats at debug level every `passes` passes. Zero
    /// disables it.
    pub fn with_stats_interval(mut self, passes: u64) -> Self {
        self.stats_interval = passes;
        self
    }

    pub fn with_host_probe(mut self, probe: impl FnMut() -> HostState + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn with_exit_signal(mut self, exit: ExitSignal) -> Self {
        self.exit = exit;
        self
    }

    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }

    pub fn set_host_state(&mut self, host: HostState) {
        self.host = host;
    }

    pub fn scheduler(&self) -> &FrameScheduler<S> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler<S> {
        &mut self.scheduler
    }

    pub fn into_scheduler(self) -> FrameScheduler<S> {
        self.scheduler
    }

    pub fn run<H>(&mut self, handler: &mut H) -> Result<RunSummary, H::Error>
    where
        H: FrameHandler + ?Sized,
    {
        let start = *self.scheduler.stats();
        let mut passes = 0_u64;

        log::info!(
            "host loop started ({} step, target {:?})",
            if self.scheduler.config().fixed_time_step { "fixed" } else { "variable" },
            self.scheduler.config().target_step
        );

        let reason = 'run: {
            if !self.started {
                self.started = true;
                if self.scheduler.initial_update(handler, self.host)?.exit {
                    break 'run ExitReason::Requested;
                }
            }

            loop {
                if self.exit.is_exit_requested() {
                    break 'run ExitReason::Signal;
                }
                if self.pass_limit.is_some_and(|limit| passes >= limit) {
                    break 'run ExitReason::PassLimit;
                }
                if self
                    .simulation_limit
                    .is_some_and(|limit| self.scheduler.total_simulation_time() >= limit)
                {
                    break 'run ExitReason::SimulationLimit;
                }

                if let Some(probe) = self.probe.as_mut() {
                    self.host = probe();
                }

                let report = self.scheduler.run_pass(handler, self.host)?;
                passes += 1;

                if report.exit_requested {
                    break 'run ExitReason::Requested;
                }
                if self.stats_interval > 0 && passes % self.stats_interval == 0 {
                    log::debug!("{}", self.scheduler.stats());
                }
            }
        };

        let end = *self.scheduler.stats();
        let summary = RunSummary {
            passes,
            steps: end.steps - start.steps,
            frames: end.frames_drawn - start.frames_drawn,
            simulation_time: self.scheduler.total_simulation_time(),
            reason,
        };

        log::info!(
            "host loop stopped ({:?}) after {} passes, {} steps, {} frames",
            summary.reason,
            summary.passes,
            summary.steps,
            summary.frames
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FrameInfo, SchedulerConfig, StepInfo, StepRequest};
    use crate::time::{ManualTimeSource, MonotonicClock};
    use std::convert::Infallible;

    /// Advances the shared source by a fixed amount on every step so a
    /// headless loop makes progress without real sleeping.
    struct Ticker {
        source: ManualTimeSource,
        per_step: Duration,
        exit_after: Option<u64>,
        exit_on_start: bool,
        initial_updates: u64,
        steps: u64,
        draws: u64,
    }

    impl FrameHandler for Ticker {
        type Error = Infallible;

        fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Infallible> {
            if step.elapsed.is_zero() {
                self.initial_updates += 1;
                if self.exit_on_start {
                    return Ok(StepRequest::EXIT);
                }
                return Ok(StepRequest::CONTINUE);
            }
            self.steps += 1;
            self.source.advance(self.per_step);
            if self.exit_after == Some(self.steps) {
                return Ok(StepRequest::EXIT);
            }
            Ok(StepRequest::CONTINUE)
        }

        fn draw(&mut self, _frame: &FrameInfo) -> Result<(), Infallible> {
            self.draws += 1;
            Ok(())
        }
    }

    fn host_loop(source: &ManualTimeSource) -> HostLoop<ManualTimeSource> {
        let scheduler = FrameScheduler::new(
            MonotonicClock::new(source.clone()),
            SchedulerConfig::from_hz(100).unwrap(),
        )
        .unwrap();
        HostLoop::new(scheduler)
    }

    fn ticker(source: &ManualTimeSource) -> Ticker {
        Ticker {
            source: source.clone(),
            per_step: Duration::from_millis(10),
            exit_after: None,
            exit_on_start: false,
            initial_updates: 0,
            steps: 0,
            draws: 0,
        }
    }

    #[test]
    fn stops_when_a_step_requests_exit() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source);
        source.advance(Duration::from_millis(10));
        let mut app = Ticker {
            exit_after: Some(5),
            ..ticker(&source)
        };

        let summary = host.run(&mut app).unwrap();
        assert_eq!(summary.reason, ExitReason::Requested);
        assert_eq!(summary.steps, 5);
        assert_eq!(summary.frames, 4);
        assert_eq!(app.draws, 4);
    }

    #[test]
    fn stops_at_simulation_limit() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source).with_simulation_limit(Duration::from_millis(100));
        source.advance(Duration::from_millis(10));
        let mut app = ticker(&source);

        let summary = host.run(&mut app).unwrap();
        assert_eq!(summary.reason, ExitReason::SimulationLimit);
        assert_eq!(summary.simulation_time, Duration::from_millis(100));
    }

    #[test]
    fn exit_signal_is_checked_before_each_pass() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source);
        host.exit_signal().request_exit();

        let summary = host.run(&mut ticker(&source)).unwrap();
        assert_eq!(summary.reason, ExitReason::Signal);
        assert_eq!(summary.passes, 0);
    }

    #[test]
    fn first_run_starts_with_one_initial_update() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source).with_pass_limit(2);
        let mut app = ticker(&source);

        host.run(&mut app).unwrap();
        assert_eq!(app.initial_updates, 1);

        let summary = host.run(&mut app).unwrap();
        assert_eq!(summary.reason, ExitReason::PassLimit);
        assert_eq!(app.initial_updates, 1);
    }

    #[test]
    fn initial_update_can_end_the_run() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source);
        let mut app = Ticker {
            exit_on_start: true,
            ..ticker(&source)
        };

        let summary = host.run(&mut app).unwrap();
        assert_eq!(summary.reason, ExitReason::Requested);
        assert_eq!(summary.passes, 0);
        assert_eq!(app.steps, 0);
    }

    #[test]
    fn probe_drives_host_state() {
        let source = ManualTimeSource::new();
        let mut host = host_loop(&source)
            .with_pass_limit(3)
            .with_host_probe(|| HostState::INACTIVE);
        let mut app = ticker(&source);

        let summary = host.run(&mut app).unwrap();
        assert_eq!(summary.reason, ExitReason::PassLimit);
        assert_eq!(app.steps, 0);
        assert_eq!(host.scheduler().stats().idle_passes, 3);
        assert_eq!(source.sleep_count(), 3);
    }
}
