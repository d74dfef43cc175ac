use super::handler::FrameHandler;
use super::step::{FrameInfo, StepInfo, StepRequest};

/// Logic attached to a [`ComponentStack`] that runs alongside its root
/// handler.
///
/// `is_enabled` and `is_visible` are read on every step and every render,
/// so a component can switch itself off between passes.
pub trait Component {
    type Error;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Self::Error>;

    fn draw(&mut self, frame: &FrameInfo) -> Result<(), Self::Error> {
        let _ = frame;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn is_visible(&self) -> bool {
        true
    }
}

/// A root [`FrameHandler`] followed by an ordered list of components.
///
/// Each step updates the root, then every enabled component in insertion
/// order; their requests are merged. Each render draws the root, then every
/// visible component in the same order. The first error stops the walk.
pub struct ComponentStack<H: FrameHandler> {
    root: H,
    components: Vec<Box<dyn Component<Error = H::Error>>>,
}

impl<H: FrameHandler> ComponentStack<H> {
    pub fn new(root: H) -> Self {
        Self {
            root,
            components: Vec::new(),
        }
    }

    pub fn with(mut self, component: impl Component<Error = H::Error> + 'static) -> Self {
        self.push(component);
        self
    }

    pub fn push(&mut self, component: impl Component<Error = H::Error> + 'static) {
        self.components.push(Box::new(component));
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn root(&self) -> &H {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut H {
        &mut self.root
    }

    pub fn into_root(self) -> H {
        self.root
    }
}

impl<H: FrameHandler> FrameHandler for ComponentStack<H> {
    type Error = H::Error;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Self::Error> {
        let mut request = self.root.update(step)?;
        for component in &mut self.components {
            if component.is_enabled() {
                request = request.merge(component.update(step)?);
            }
        }
        Ok(request)
    }

    fn draw(&mut self, frame: &FrameInfo) -> Result<(), Self::Error> {
        self.root.draw(frame)?;
        for component in &mut self.components {
            if component.is_visible() {
                component.draw(frame)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{FrameScheduler, HostState, SchedulerConfig};
    use crate::time::{ManualTimeSource, MonotonicClock};
    use std::cell::{Cell, RefCell};
    use std::convert::Infallible;
    use std::rc::Rc;
    use std::time::Duration;

    type Trace = Rc<RefCell<Vec<String>>>;

    struct Root {
        trace: Trace,
    }

    impl FrameHandler for Root {
        type Error = Infallible;

        fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Infallible> {
            self.trace.borrow_mut().push(format!("update root {}", step.step_index));
            Ok(StepRequest::CONTINUE)
        }

        fn draw(&mut self, _frame: &FrameInfo) -> Result<(), Infallible> {
            self.trace.borrow_mut().push("draw root".to_string());
            Ok(())
        }
    }

    struct Named {
        name: &'static str,
        trace: Trace,
        enabled: Rc<Cell<bool>>,
        visible: bool,
        respond: StepRequest,
    }

    impl Named {
        fn new(name: &'static str, trace: &Trace) -> Self {
            Self {
                name,
                trace: trace.clone(),
                enabled: Rc::new(Cell::new(true)),
                visible: true,
                respond: StepRequest::CONTINUE,
            }
        }
    }

    impl Component for Named {
        type Error = Infallible;

        fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Infallible> {
            self.trace
                .borrow_mut()
                .push(format!("update {} {}", self.name, step.step_index));
            Ok(self.respond)
        }

        fn draw(&mut self, _frame: &FrameInfo) -> Result<(), Infallible> {
            self.trace.borrow_mut().push(format!("draw {}", self.name));
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.enabled.get()
        }

        fn is_visible(&self) -> bool {
            self.visible
        }
    }

    fn scheduler() -> (ManualTimeSource, FrameScheduler<ManualTimeSource>) {
        let source = ManualTimeSource::new();
        let scheduler = FrameScheduler::new(
            MonotonicClock::new(source.clone()),
            SchedulerConfig::from_hz(100).unwrap(),
        )
        .unwrap();
        (source, scheduler)
    }

    #[test]
    fn components_follow_root_in_order_with_gating() {
        let trace = Trace::default();
        let hidden = Named {
            visible: false,
            ..Named::new("hidden", &trace)
        };
        let disabled = Named::new("disabled", &trace);
        disabled.enabled.set(false);

        let mut stack = ComponentStack::new(Root {
            trace: trace.clone(),
        })
        .with(Named::new("a", &trace))
        .with(disabled)
        .with(hidden);
        assert_eq!(stack.len(), 3);

        let (source, mut s) = scheduler();
        source.advance_ms(20);
        let report = s.run_pass(&mut stack, HostState::FOREGROUND).unwrap();
        assert_eq!(report.steps, 2);

        assert_eq!(
            *trace.borrow(),
            vec![
                "update root 0",
                "update a 0",
                "update hidden 0",
                "update root 1",
                "update a 1",
                "update hidden 1",
                "draw root",
                "draw a",
                "draw disabled",
            ]
        );
    }

    #[test]
    fn enabled_flag_is_read_every_step() {
        let trace = Trace::default();
        let toggled = Named::new("toggled", &trace);
        let enabled = toggled.enabled.clone();
        let mut stack = ComponentStack::new(Root {
            trace: trace.clone(),
        })
        .with(toggled);

        let (source, mut s) = scheduler();
        source.advance_ms(10);
        s.run_pass(&mut stack, HostState::FOREGROUND).unwrap();

        enabled.set(false);
        source.advance_ms(10);
        s.run_pass(&mut stack, HostState::FOREGROUND).unwrap();

        let updates = trace
            .borrow()
            .iter()
            .filter(|line| line.starts_with("update toggled"))
            .count();
        assert_eq!(updates, 1);
    }

    #[test]
    fn component_requests_are_merged() {
        let trace = Trace::default();
        let mut stack = ComponentStack::new(Root {
            trace: trace.clone(),
        })
        .with(Named {
            respond: StepRequest::SUPPRESS_DRAW,
            ..Named::new("quiet", &trace)
        });

        let (source, mut s) = scheduler();
        source.advance(Duration::from_millis(10));
        let report = s.run_pass(&mut stack, HostState::FOREGROUND).unwrap();

        assert!(!report.rendered);
        assert!(!trace.borrow().iter().any(|line| line.starts_with("draw")));
    }
}
