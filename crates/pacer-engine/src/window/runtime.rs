use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl};
use crate::schedule::{FrameScheduler, HostState};
use crate::time::TimeSource;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "pacer".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

impl WindowConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }
}

/// Entry point for the windowed host.
///
/// Opens one window and drives the scheduler from the event loop's idle
/// callback. Host flags follow the window: occluded, minimised or
/// suspended windows are inactive; focus follows `WindowEvent::Focused`.
pub struct WindowHost;

impl WindowHost {
    /// Runs until the window closes, the app asks to exit, or a pass fails.
    /// A failed pass is returned as the error.
    pub fn run<S, A>(config: WindowConfig, scheduler: FrameScheduler<S>, app: A) -> Result<()>
    where
        S: TimeSource + 'static,
        A: App + 'static,
        A::Error: Into<anyhow::Error>,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = HostedApp::new(config, scheduler, app);
        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Window conditions the host tracks between passes.
///
/// Occluded, minimised or suspended windows are inactive; focus is reported
/// separately.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct WindowActivity {
    focused: bool,
    occluded: bool,
    minimized: bool,
    suspended: bool,
}

impl WindowActivity {
    const STARTUP: Self = Self {
        focused: true,
        occluded: false,
        minimized: false,
        suspended: false,
    };

    /// A zero-sized surface means the window was minimised.
    fn resized(&mut self, width: u32, height: u32) {
        self.minimized = width == 0 || height == 0;
    }

    fn host_state(&self) -> HostState {
        HostState {
            active: !(self.occluded || self.minimized || self.suspended),
            focused: self.focused,
        }
    }
}

struct HostedApp<S, A> {
    config: WindowConfig,
    scheduler: FrameScheduler<S>,
    app: A,

    window: Option<Window>,
    caption: Option<String>,

    activity: WindowActivity,
    host: HostState,

    started: bool,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<S, A> HostedApp<S, A>
where
    S: TimeSource,
    A: App,
    A::Error: Into<anyhow::Error>,
{
    fn new(config: WindowConfig, scheduler: FrameScheduler<S>, app: A) -> Self {
        Self {
            config,
            scheduler,
            app,
            window: None,
            caption: None,
            activity: WindowActivity::STARTUP,
            host: WindowActivity::STARTUP.host_state(),
            started: false,
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.exit_requested = true;
            self.app.on_exit();
            log::info!("{}", self.scheduler.stats());
        }
        event_loop.exit();
    }

    fn refresh_host(&mut self) {
        let host = self.activity.host_state();
        if host.active != self.host.active {
            log::debug!("window {}", if host.active { "active" } else { "inactive" });
        }
        self.host = host;
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: A::Error) {
        let err: anyhow::Error = err.into();
        log::error!("frame pass failed: {err:#}");
        self.failure = Some(err.context("frame pass failed"));
        self.request_exit(event_loop);
    }

    fn drive_pass(&mut self, event_loop: &ActiveEventLoop) {
        match self.scheduler.run_pass(&mut self.app, self.host) {
            Ok(report) => {
                if report.exit_requested {
                    log::info!("exit requested by simulation");
                    self.request_exit(event_loop);
                } else if report.rendered {
                    self.apply_caption();
                }
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn apply_caption(&mut self) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let Some(caption) = self.app.caption() else {
            return;
        };
        if self.caption.as_deref() != Some(caption.as_str()) {
            window.set_title(&caption);
            self.caption = Some(caption);
        }
    }
}

impl<S, A> ApplicationHandler for HostedApp<S, A>
where
    S: TimeSource,
    A: App,
    A::Error: Into<anyhow::Error>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let attrs = Window::default_attributes()
                .with_title(self.config.title.clone())
                .with_inner_size(self.config.initial_size);

            match event_loop.create_window(attrs).context("failed to create window") {
                Ok(window) => self.window = Some(window),
                Err(err) => {
                    log::error!("{err:#}");
                    self.failure = Some(err);
                    event_loop.exit();
                    return;
                }
            }
        }

        self.activity.suspended = false;
        self.refresh_host();

        if !self.started {
            self.started = true;
            self.app.on_start();

            match self.scheduler.initial_update(&mut self.app, self.host) {
                Ok(request) if request.exit => {
                    log::info!("exit requested by initial update");
                    self.request_exit(event_loop);
                    return;
                }
                Ok(_) => {}
                Err(err) => {
                    self.fail(event_loop, err);
                    return;
                }
            }

            // Window creation time is not simulation time.
            self.scheduler.reset_elapsed();
            log::info!("window host started");
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.activity.suspended = true;
        self.refresh_host();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.request_exit(event_loop);
            }

            WindowEvent::Focused(focused) => {
                self.activity.focused = focused;
                self.refresh_host();
                if focused {
                    self.app.on_activated();
                } else {
                    self.app.on_deactivated();
                }
            }

            WindowEvent::Occluded(occluded) => {
                self.activity.occluded = occluded;
                self.refresh_host();
            }

            WindowEvent::Resized(size) => {
                self.activity.resized(size.width, size.height);
                self.refresh_host();
                if !self.activity.minimized {
                    self.app.on_resize(size.width, size.height);
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if !self.started || self.window.is_none() {
            return;
        }

        self.drive_pass(event_loop);
    }
}
