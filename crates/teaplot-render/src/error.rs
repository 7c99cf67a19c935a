/// Errors raised while setting up or driving the GPU.
#[derive(Debug)]
pub enum RenderError {
    /// No adapter matched the request.
    NoAdapter(String),
    /// The adapter refused to create a device.
    DeviceRequest(String),
    /// A surface could not be created for the window.
    SurfaceCreation(String),
    /// The adapter cannot present to the surface.
    SurfaceUnsupported,
    /// The next swapchain texture could not be acquired.
    SurfaceAcquire(wgpu::SurfaceError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::NoAdapter(msg) => write!(f, "No suitable GPU adapter: {}", msg),
            RenderError::DeviceRequest(msg) => write!(f, "Failed to create device: {}", msg),
            RenderError::SurfaceCreation(msg) => write!(f, "Failed to create surface: {}", msg),
            RenderError::SurfaceUnsupported => {
                write!(f, "Surface is not supported by the selected adapter")
            }
            RenderError::SurfaceAcquire(e) => write!(f, "Failed to acquire surface texture: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::SurfaceAcquire(e) => Some(e),
            _ => None,
        }
    }
}

pub type RenderResult<T> = Result<T, RenderError>;
