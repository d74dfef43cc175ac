use std::time::Duration;

/// Host flags sampled once per pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HostState {
    /// The host is running (visible, not minimised, not in an editor).
    /// An inactive host gets an idle sleep instead of simulation.
    pub active: bool,

    /// The host has input focus.
    pub focused: bool,
}

impl HostState {
    pub const FOREGROUND: Self = Self {
        active: true,
        focused: true,
    };

    pub const BACKGROUND: Self = Self {
        active: true,
        focused: false,
    };

    pub const INACTIVE: Self = Self {
        active: false,
        focused: false,
    };
}

impl Default for HostState {
    fn default() -> Self {
        Self::FOREGROUND
    }
}

/// Per-step input handed to [`FrameHandler::update`](super::FrameHandler::update).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepInfo {
    /// Simulation time this step advances by.
    pub elapsed: Duration,

    /// Simulation time before this step.
    pub total: Duration,

    pub running_slowly: bool,

    /// Zero-based index of the step within the pass.
    pub step_index: u64,

    pub steps_in_pass: u64,

    /// Whether the host had focus when the pass started. Input devices
    /// should only be polled when true.
    pub host_focused: bool,
}

/// Requests returned by a simulation step.
///
/// Every flag is one-shot: it applies to the current pass (or, for
/// `reset_elapsed`, the next clock sample) and is then forgotten.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StepRequest {
    /// Skip the render callback for this pass. Simulation is unaffected.
    pub suppress_draw: bool,

    /// Treat the elapsed time of the next sample as zero. Use after work that
    /// stalled the loop (level loads) to avoid a catch-up burst.
    pub reset_elapsed: bool,

    /// Stop the pass: remaining steps and the render are skipped and the
    /// report carries `exit_requested`.
    pub exit: bool,
}

impl StepRequest {
    pub const CONTINUE: Self = Self {
        suppress_draw: false,
        reset_elapsed: false,
        exit: false,
    };

    pub const SUPPRESS_DRAW: Self = Self {
        suppress_draw: true,
        ..Self::CONTINUE
    };

    pub const RESET_ELAPSED: Self = Self {
        reset_elapsed: true,
        ..Self::CONTINUE
    };

    pub const EXIT: Self = Self {
        exit: true,
        ..Self::CONTINUE
    };

    /// Combines two requests; any flag set in either stays set.
    pub fn merge(self, other: Self) -> Self {
        Self {
            suppress_draw: self.suppress_draw || other.suppress_draw,
            reset_elapsed: self.reset_elapsed || other.reset_elapsed,
            exit: self.exit || other.exit,
        }
    }
}

/// Input handed to [`FrameHandler::draw`](super::FrameHandler::draw).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub total_real_time: Duration,

    /// Real time since the previous rendered frame.
    pub elapsed_real_time: Duration,

    pub total_simulation_time: Duration,

    /// Simulation time advanced by this pass.
    pub elapsed_simulation_time: Duration,

    pub running_slowly: bool,
}
