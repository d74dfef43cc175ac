//! Time subsystem.
//!
//! Provides a monotonic clock over an injectable time source:
//! - [`SystemTimeSource`] for real hosts
//! - [`ManualTimeSource`] for tests and deterministic replays
//!
//! One [`MonotonicClock`] is owned by each frame scheduler; call
//! [`MonotonicClock::sample`] once per pass.

mod clock;
mod source;

pub use clock::{ClockSample, MonotonicClock};
pub use source::{ManualTimeSource, SystemTimeSource, TimeSource};
