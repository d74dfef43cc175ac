use anyhow::Result;

use pacer_engine::schedule::{Component, StepInfo, StepRequest};

/// Logs when the simulation starts and stops running slowly, and counts the
/// steps it spent behind.
#[derive(Debug, Default)]
pub struct SlowWatch {
    slow: bool,
    slow_steps: u64,
}

impl Component for SlowWatch {
    type Error = anyhow::Error;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest> {
        if step.running_slowly {
            self.slow_steps += 1;
        }
        if step.running_slowly != self.slow {
            self.slow = step.running_slowly;
            if self.slow {
                log::info!("falling behind at t={:.2}s", step.total.as_secs_f64());
            } else {
                log::info!(
                    "caught up at t={:.2}s ({} slow steps so far)",
                    step.total.as_secs_f64(),
                    self.slow_steps
                );
            }
        }
        Ok(StepRequest::CONTINUE)
    }

    fn is_visible(&self) -> bool {
        false
    }
}
