use std::fmt;

/// Lifetime counters kept by a [`FrameScheduler`](super::FrameScheduler).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: u64,
    /// Passes skipped because the host was inactive.
    pub idle_passes: u64,
    /// Passes where no step was due yet.
    pub pending_passes: u64,
    /// Passes that ran more than one fixed step.
    pub burst_passes: u64,
    pub steps: u64,
    pub frames_drawn: u64,
    pub draws_suppressed: u64,
}

impl fmt::Display for SchedulerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passes={} idle={} pending={} bursts={} steps={} frames={} suppressed={}",
            self.passes,
            self.idle_passes,
            self.pending_passes,
            self.burst_passes,
            self.steps,
            self.frames_drawn,
            self.draws_suppressed
        )
    }
}
