use std::sync::Arc;

use teaplot_core::geometry::{LogicalSize, PhysicalSize, ScaleFactor};
pub use winit::window::Window as WinitWindow;
use winit::{error::OsError, event_loop::ActiveEventLoop};

pub struct WindowDescriptor {
    pub title: String,
    pub resizeable: bool,
    pub size: Option<LogicalSize<u32>>,
}

impl Default for WindowDescriptor {
    fn default() -> Self {
        Self {
            title: "teaplot".to_string(),
            resizeable: true,
            size: None,
        }
    }
}

pub struct Window {
    pub window: Arc<WinitWindow>,
}

impl Window {
    pub fn id(&self) -> winit::window::WindowId {
        self.window.id()
    }

    /// Get the logical size of the window (DPI-independent).
    pub fn logical_size(&self) -> LogicalSize<u32> {
        self.physical_size().to_logical(self.scale_factor())
    }

    /// Get the physical size of the window in pixels.
    pub fn physical_size(&self) -> PhysicalSize<u32> {
        let size = self.window.inner_size();
        PhysicalSize::new(size.width, size.height)
    }

    pub fn scale_factor(&self) -> ScaleFactor {
        ScaleFactor(self.window.scale_factor())
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    pub(crate) fn new(
        event_loop: &ActiveEventLoop,
        descriptor: WindowDescriptor,
    ) -> Result<Self, OsError> {
        let mut attributes = WinitWindow::default_attributes()
            .with_title(descriptor.title)
            .with_resizable(descriptor.resizeable);

        if let Some(size) = descriptor.size {
            attributes =
                attributes.with_inner_size(winit::dpi::LogicalSize::new(size.width, size.height));
        }

        let window = Arc::new(event_loop.create_window(attributes)?);

        Ok(Window { window })
    }
}
