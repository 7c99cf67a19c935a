use std::collections::HashMap;

pub use winit::error::{EventLoopError, OsError};
use winit::event::WindowEvent;
use winit::event_loop::ActiveEventLoop;
use winit::window::WindowId;

use crate::{
    event::{Event, EventBatch, EventQueue, HandleStatus},
    time::{FrameTime, TimeTracker},
    window::{Window, WindowDescriptor},
};

/// Error type an [`AppFactory`] may fail with.
pub type StartupError = Box<dyn std::error::Error + Send + Sync>;

struct WindowResources {
    events: EventQueue,
    scale_factor: f64,
}

pub struct AppCtx<'a> {
    event_loop: &'a ActiveEventLoop,
    windows: &'a mut HashMap<WindowId, WindowResources>,
}

impl AppCtx<'_> {
    pub fn create_window(&mut self, descriptor: WindowDescriptor) -> Result<Window, OsError> {
        let window = Window::new(self.event_loop, descriptor)?;

        self.windows.insert(
            window.id(),
            WindowResources {
                events: EventQueue::new(),
                scale_factor: window.scale_factor().0,
            },
        );

        Ok(window)
    }

    pub fn exit(&self) {
        self.event_loop.exit();
    }
}

pub trait App {
    /// Called once after construction, before the first update.
    #[allow(unused_variables)]
    fn on_start(&mut self, ctx: &mut AppCtx) {}

    /// Called once per frame before any window renders.
    ///
    /// This is the only per-frame scheduling hook; frame-paced work such as
    /// animation steps belongs here.
    #[allow(unused_variables)]
    fn update(&mut self, ctx: &mut AppCtx, time: &FrameTime) {}

    /// Called once per window that needs rendering, with window-specific input.
    fn render(&mut self, ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch);

    /// Called when the app is about to exit.
    #[allow(unused_variables)]
    fn on_exit(&mut self, ctx: &mut AppCtx) {}
}

/// Builds the app once the event loop is running.
pub type AppFactory = Box<dyn FnOnce(&mut AppCtx) -> Result<Box<dyn App>, StartupError>>;

/// Errors returned by [`run_app`].
#[derive(Debug)]
pub enum RunError {
    /// The event loop could not be created or failed while running.
    EventLoop(EventLoopError),
    /// The app factory failed.
    Startup(StartupError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::EventLoop(e) => write!(f, "Event loop error: {}", e),
            RunError::Startup(e) => write!(f, "Failed to start app: {}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::EventLoop(e) => Some(e),
            RunError::Startup(e) => Some(e.as_ref()),
        }
    }
}

impl From<EventLoopError> for RunError {
    fn from(e: EventLoopError) -> Self {
        RunError::EventLoop(e)
    }
}

struct AppProxy {
    factory: Option<AppFactory>,
    app: Option<Box<dyn App>>,
    startup_error: Option<StartupError>,
    update_called_this_frame: bool,
    windows: HashMap<WindowId, WindowResources>,
    time_tracker: TimeTracker,
}

impl winit::application::ApplicationHandler for AppProxy {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(factory) = self.factory.take() else {
            return;
        };

        let mut ctx = AppCtx {
            event_loop,
            windows: &mut self.windows,
        };

        match factory(&mut ctx) {
            Ok(mut app) => {
                app.on_start(&mut ctx);
                self.app = Some(app);
            }
            Err(e) => {
                tracing::error!("App startup failed: {}", e);
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.update_called_this_frame = false;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        let mut ctx = AppCtx {
            event_loop,
            windows: &mut self.windows,
        };

        match event {
            WindowEvent::RedrawRequested => {
                if !self.update_called_this_frame {
                    let frame_time = self.time_tracker.tick();
                    app.update(&mut ctx, &frame_time);
                    self.update_called_this_frame = true;
                }

                let Some(window) = ctx.windows.get_mut(&window_id) else {
                    return;
                };
                let mut events = window.events.drain();

                app.render(&mut ctx, window_id, &mut events);

                let mut close_requested = false;
                events.dispatch(|event| match event {
                    Event::CloseRequested => {
                        close_requested = true;
                        HandleStatus::consumed()
                    }
                    _ => HandleStatus::ignored(),
                });

                if close_requested {
                    tracing::info!("Close requested for window {:?}", window_id);
                    app.on_exit(&mut ctx);
                    ctx.exit();
                }
            }
            event => {
                let Some(window) = self.windows.get_mut(&window_id) else {
                    return;
                };
                if let WindowEvent::ScaleFactorChanged { scale_factor, .. } = event {
                    window.scale_factor = scale_factor;
                }
                if let Some(event) = Event::from_winit(event, window.scale_factor) {
                    window.events.push(event);
                }
            }
        }
    }
}

/// Run the event loop until the app exits.
pub fn run_app(factory: AppFactory) -> Result<(), RunError> {
    use winit::event_loop::{ControlFlow, EventLoop};

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app_proxy = AppProxy {
        factory: Some(factory),
        app: None,
        startup_error: None,
        update_called_this_frame: false,
        windows: HashMap::new(),
        time_tracker: TimeTracker::new(),
    };
    event_loop.run_app(&mut app_proxy)?;

    match app_proxy.startup_error.take() {
        Some(e) => Err(RunError::Startup(e)),
        None => Ok(()),
    }
}
