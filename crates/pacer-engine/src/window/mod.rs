//! Window host.
//!
//! Owns the `winit` EventLoop and Window and drives a frame scheduler from
//! the loop's idle callback.

mod runtime;

pub use runtime::{WindowConfig, WindowHost};
