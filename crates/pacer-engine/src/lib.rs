//! Pacer engine crate.
//!
//! Fixed-timestep frame scheduling for game loops: a monotonic clock over an
//! injectable time source, a scheduler that turns elapsed real time into
//! simulation steps and render decisions, and the hosts that drive it.

pub mod core;
pub mod host;
pub mod logging;
pub mod schedule;
pub mod time;
pub mod window;

pub use schedule::{
    FrameHandler, FrameInfo, FrameScheduler, HostState, PassOutcome, PassReport, SchedulerConfig,
    StepInfo, StepRequest,
};
pub use time::{ClockSample, MonotonicClock, TimeSource};
