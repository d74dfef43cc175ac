use winit::event::WindowEvent;

use crate::schedule::{ComponentStack, FrameHandler, StepRequest};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

impl From<AppControl> for StepRequest {
    fn from(control: AppControl) -> Self {
        match control {
            AppControl::Continue => StepRequest::CONTINUE,
            AppControl::Exit => StepRequest::EXIT,
        }
    }
}

/// Application contract for windowed hosts.
///
/// Simulation and rendering come from [`FrameHandler`]; the hooks here
/// mirror window lifecycle changes the host observes between passes.
pub trait App: FrameHandler {
    /// Called once, after the window exists and before the first pass.
    fn on_start(&mut self) {}

    /// The window gained focus.
    fn on_activated(&mut self) {}

    /// The window lost focus.
    fn on_deactivated(&mut self) {}

    fn on_resize(&mut self, width: u32, height: u32) {
        let _ = (width, height);
    }

    /// Called for every window event before the host handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Window caption to apply after a rendered frame. `None` keeps the
    /// current one.
    fn caption(&self) -> Option<String> {
        None
    }

    /// Called once when the host loop ends.
    fn on_exit(&mut self) {}
}

impl<A: App> App for ComponentStack<A> {
    fn on_start(&mut self) {
        self.root_mut().on_start();
    }

    fn on_activated(&mut self) {
        self.root_mut().on_activated();
    }

    fn on_deactivated(&mut self) {
        self.root_mut().on_deactivated();
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        self.root_mut().on_resize(width, height);
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        self.root_mut().on_window_event(event)
    }

    fn caption(&self) -> Option<String> {
        self.root().caption()
    }

    fn on_exit(&mut self) {
        self.root_mut().on_exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FrameInfo, StepInfo};
    use std::convert::Infallible;

    #[derive(Default)]
    struct Titled {
        started: bool,
        resized: Option<(u32, u32)>,
    }

    impl FrameHandler for Titled {
        type Error = Infallible;

        fn update(&mut self, _step: &StepInfo) -> Result<StepRequest, Infallible> {
            Ok(StepRequest::CONTINUE)
        }

        fn draw(&mut self, _frame: &FrameInfo) -> Result<(), Infallible> {
            Ok(())
        }
    }

    impl App for Titled {
        fn on_start(&mut self) {
            self.started = true;
        }

        fn on_resize(&mut self, width: u32, height: u32) {
            self.resized = Some((width, height));
        }

        fn caption(&self) -> Option<String> {
            Some("titled".to_string())
        }
    }

    #[test]
    fn component_stack_forwards_hooks_to_root() {
        let mut stack = ComponentStack::new(Titled::default());
        stack.on_start();
        stack.on_resize(640, 360);

        assert!(stack.root().started);
        assert_eq!(stack.root().resized, Some((640, 360)));
        assert_eq!(stack.caption().as_deref(), Some("titled"));
    }

    #[test]
    fn control_maps_to_step_request() {
        assert_eq!(StepRequest::from(AppControl::Continue), StepRequest::CONTINUE);
        assert!(StepRequest::from(AppControl::Exit).exit);
    }
}
