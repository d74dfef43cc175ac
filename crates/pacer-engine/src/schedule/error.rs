use std::time::Duration;

use thiserror::Error;

/// Rejected scheduler configuration.
///
/// Raised at construction or when the configuration is changed explicitly;
/// a running pass never produces one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("target step duration must be greater than zero")]
    ZeroTargetStep,

    #[error("maximum elapsed time {max_elapsed:?} is shorter than the target step {target_step:?}")]
    MaxElapsedBelowStep {
        max_elapsed: Duration,
        target_step: Duration,
    },

    #[error("snap tolerance shift {0} is out of range (expected 0..=63)")]
    SnapShiftOutOfRange(u32),

    #[error("update rate must be greater than zero")]
    ZeroRate,
}
