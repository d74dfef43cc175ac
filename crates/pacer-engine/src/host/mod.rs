//! Host loops.
//!
//! A host owns a [`FrameScheduler`](crate::schedule::FrameScheduler), decides
//! between passes whether to keep going and feeds it the host flags. See
//! [`crate::window`] for the windowed host.

mod host_loop;
mod signal;

pub use host_loop::{ExitReason, HostLoop, RunSummary};
pub use signal::ExitSignal;
