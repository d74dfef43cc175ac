use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared exit request flag, checked by host loops between passes.
///
/// Clones observe the same flag, so a signal handler or another thread can
/// stop a loop that owns the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal {
    flag: Arc<AtomicBool>,
}

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn request_exit(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Clears a previous request so the loop can run again.
    pub fn clear(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let a = ExitSignal::new();
        let b = a.clone();
        assert!(!b.is_exit_requested());
        a.request_exit();
        assert!(b.is_exit_requested());
        b.clear();
        assert!(!a.is_exit_requested());
    }
}
