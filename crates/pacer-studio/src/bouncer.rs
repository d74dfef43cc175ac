use std::time::Duration;

use anyhow::{Result, bail};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use pacer_engine::core::{App, AppControl};
use pacer_engine::schedule::{FrameHandler, FrameInfo, StepInfo, StepRequest};

const GRAVITY: f64 = 9.81;
const RESTITUTION: f64 = 0.85;
const LAUNCH_SPEED: f64 = 9.0;

/// A particle bouncing on the floor, advanced in scheduler steps.
///
/// Optionally stalls every `stall_every` updates to push the scheduler into
/// catch-up bursts.
pub struct Bouncer {
    height: f64,
    velocity: f64,
    bounces: u64,

    updates: u64,
    frames: u64,
    reported_second: u64,

    stall_every: u64,
    stall: Duration,

    caption: String,
}

impl Bouncer {
    pub fn new(stall_every: u64, stall: Duration) -> Self {
        Self {
            height: 5.0,
            velocity: 0.0,
            bounces: 0,
            updates: 0,
            frames: 0,
            reported_second: 0,
            stall_every,
            stall,
            caption: String::new(),
        }
    }

    fn integrate(&mut self, dt: f64) {
        self.velocity -= GRAVITY * dt;
        self.height += self.velocity * dt;

        if self.height < 0.0 {
            self.height = -self.height;
            self.velocity = -self.velocity * RESTITUTION;
            self.bounces += 1;

            if self.velocity < 1.0 {
                self.velocity = LAUNCH_SPEED;
            }
        }
    }
}

impl FrameHandler for Bouncer {
    type Error = anyhow::Error;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest> {
        self.updates += 1;
        self.integrate(step.elapsed.as_secs_f64());

        if !self.height.is_finite() || !self.velocity.is_finite() {
            bail!("simulation diverged after {} updates", self.updates);
        }

        if self.stall_every > 0 && self.updates % self.stall_every == 0 {
            std::thread::sleep(self.stall);
        }

        let second = (step.total + step.elapsed).as_secs();
        if second > self.reported_second {
            self.reported_second = second;
            log::info!(
                "t={second}s height={:.2} velocity={:.2} bounces={}{}",
                self.height,
                self.velocity,
                self.bounces,
                if step.running_slowly { " (running slowly)" } else { "" }
            );
        }

        Ok(StepRequest::CONTINUE)
    }

    fn draw(&mut self, frame: &FrameInfo) -> Result<()> {
        self.frames += 1;
        self.caption = format!(
            "pacer studio | height {:.2} m | sim {:.1}s{}",
            self.height,
            frame.total_simulation_time.as_secs_f64(),
            if frame.running_slowly { " | slow" } else { "" }
        );
        Ok(())
    }
}

impl App for Bouncer {
    fn on_activated(&mut self) {
        log::debug!("studio window focused");
    }

    fn on_deactivated(&mut self) {
        log::debug!("studio window lost focus");
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => AppControl::Exit,
            _ => AppControl::Continue,
        }
    }

    fn caption(&self) -> Option<String> {
        Some(self.caption.clone())
    }

    fn on_exit(&mut self) {
        log::info!(
            "{} updates, {} frames, {} bounces",
            self.updates,
            self.frames,
            self.bounces
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(total_ms: u64) -> StepInfo {
        StepInfo {
            elapsed: Duration::from_millis(10),
            total: Duration::from_millis(total_ms),
            running_slowly: false,
            step_index: 0,
            steps_in_pass: 1,
            host_focused: true,
        }
    }

    #[test]
    fn falls_and_bounces() {
        let mut b = Bouncer::new(0, Duration::ZERO);
        for i in 0..300 {
            b.update(&step(i * 10)).unwrap();
        }
        assert!(b.bounces > 0);
        assert!(b.height >= 0.0);
    }

    #[test]
    fn draw_updates_caption() {
        let mut b = Bouncer::new(0, Duration::ZERO);
        b.draw(&FrameInfo {
            total_real_time: Duration::from_secs(2),
            elapsed_real_time: Duration::from_millis(16),
            total_simulation_time: Duration::from_secs(2),
            elapsed_simulation_time: Duration::from_millis(16),
            running_slowly: true,
        })
        .unwrap();

        let caption = b.caption().unwrap();
        assert!(caption.contains("sim 2.0s"));
        assert!(caption.ends_with("slow"));
    }
}
