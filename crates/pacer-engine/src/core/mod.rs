//! Core engine-facing contracts.
//!
//! Defines the interface between window hosts and applications. Headless
//! hosts only need [`FrameHandler`](crate::schedule::FrameHandler).

mod app;

pub use app::{App, AppControl};
