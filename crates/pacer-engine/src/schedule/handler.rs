use std::marker::PhantomData;

use super::step::{FrameInfo, StepInfo, StepRequest};

/// Simulation and render callbacks driven by a
/// [`FrameScheduler`](super::FrameScheduler).
///
/// Both callbacks run on the scheduler's thread. Within a pass every
/// `update` call completes before `draw` is called, so state written by the
/// simulation can be read by the renderer without synchronisation.
///
/// Errors are not caught: the first failing callback ends the pass and its
/// error is returned from `run_pass`.
pub trait FrameHandler {
    type Error;

    /// Advances the simulation by one step.
    fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Self::Error>;

    /// Renders the current simulation state. Called at most once per pass.
    fn draw(&mut self, frame: &FrameInfo) -> Result<(), Self::Error>;
}

impl<H: FrameHandler + ?Sized> FrameHandler for &mut H {
    type Error = H::Error;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest, Self::Error> {
        (**self).update(step)
    }

    fn draw(&mut self, frame: &FrameInfo) -> Result<(), Self::Error> {
        (**self).draw(frame)
    }
}

/// [`FrameHandler`] built from a pair of closures.
pub struct FnHandler<U, D, E> {
    update: U,
    draw: D,
    _error: PhantomData<fn() -> E>,
}

impl<U, D, E> FnHandler<U, D, E>
where
    U: FnMut(&StepInfo) -> Result<StepRequest, E>,
    D: FnMut(&FrameInfo) -> Result<(), E>,
{
    pub fn new(update: U, draw: D) -> Self {
        Self {
            update,
            draw,
            _error: PhantomData,
        }
    }
}

impl<U, D, E> FrameHandler for FnHandler<U, D, E>
where
    U: FnMut(&StepInfo) -> Result<StepRequest, E>,
    D: FnMut(&FrameInfo) -> Result<(), E>,
{
    type Error = E;

    fn update(&mut self, step: &StepInfo) -> Result<StepRequest, E> {
        (self.update)(step)
    }

    fn draw(&mut self, frame: &FrameInfo) -> Result<(), E> {
        (self.draw)(frame)
    }
}
