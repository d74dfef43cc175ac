//! Frame scheduling.
//!
//! [`FrameScheduler`] reconciles a [`MonotonicClock`](crate::time::MonotonicClock)
//! against a fixed simulation step. Each pass:
//!
//! 1. samples the clock (honouring a pending zero-elapsed request),
//! 2. clamps the elapsed time to `max_elapsed`,
//! 3. snaps it to `target_step` when within the jitter tolerance,
//! 4. adds it to the accumulator and drains whole steps,
//! 5. runs [`FrameHandler::update`] once per step, then
//!    [`FrameHandler::draw`] once unless a step suppressed it.
//!
//! In variable mode steps 3-4 are skipped and the simulation runs once with
//! the clamped elapsed time.

mod components;
mod config;
mod error;
mod handler;
mod pacing;
mod scheduler;
mod stats;
mod step;

use std::time::Duration;

pub use components::{Component, ComponentStack};
pub use config::{
    DEFAULT_IDLE_SLEEP, DEFAULT_MAX_ELAPSED, DEFAULT_SLOW_WINDOW, DEFAULT_SNAP_SHIFT,
    DEFAULT_TARGET_STEP, SchedulerConfig,
};
pub use error::ConfigError;
pub use handler::{FnHandler, FrameHandler};
pub use pacing::SlowTracker;
pub use scheduler::{FrameScheduler, PassOutcome, PassReport};
pub use stats::SchedulerStats;
pub use step::{FrameInfo, HostState, StepInfo, StepRequest};

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Callers only pass values bounded by an existing `Duration`.
fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % NANOS_PER_SEC) as u32)
}
