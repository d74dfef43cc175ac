/// Hysteretic "running slowly" detector.
///
/// Two saturating counters track passes since the latest burst (a pass that
/// needed more than one step) and the count that was current when that burst
/// happened. On a burst the long counter takes the short counter's value and
/// the short counter restarts, so the flag is raised when two bursts land
/// within `window` passes of each other. The flag stays raised until the
/// long counter has climbed back to `window`.
///
/// Both counters start at zero, so a fresh tracker reports running slowly
/// until `window` passes have been observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlowTracker {
    since_burst: u32,
    since_previous_burst: u32,
    window: u32,
}

impl SlowTracker {
    pub fn new(window: u32) -> Self {
        Self {
            since_burst: 0,
            since_previous_burst: 0,
            window,
        }
    }

    /// Records a pass that ran `steps` fixed steps and returns the new flag.
    pub fn observe(&mut self, steps: u64) -> bool {
        if steps > 1 {
            self.since_previous_burst = self.since_burst;
            self.since_burst = 0;
        } else {
            self.since_burst = self.since_burst.saturating_add(1);
            self.since_previous_burst = self.since_previous_burst.saturating_add(1);
        }
        self.is_running_slowly()
    }

    /// Variable-step passes are never slow; both counters saturate.
    pub fn mark_variable(&mut self) {
        self.since_burst = u32::MAX;
        self.since_previous_burst = u32::MAX;
    }

    pub fn is_running_slowly(&self) -> bool {
        self.since_previous_burst < self.window
    }

    pub fn set_window(&mut self, window: u32) {
        self.window = window;
    }
}
