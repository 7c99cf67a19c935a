use std::sync::Arc;

use teaplot_core::geometry::PhysicalSize;
use teaplot_core::profiling::profile_function;
use teaplot_winit::{WindowId, window::Window};

use crate::{
    context::GraphicsContext,
    depth::DepthTexture,
    error::{RenderError, RenderResult},
    frame::{FrameContext, FrameStats},
};

/// A window paired with its configured surface and depth buffer.
pub struct RenderableWindow {
    window: Window,
    context: Arc<GraphicsContext>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTexture,
    pending_resize: Option<PhysicalSize<u32>>,
}

impl RenderableWindow {
    pub fn new(window: Window, context: Arc<GraphicsContext>) -> RenderResult<Self> {
        let PhysicalSize { width, height } = window.physical_size();
        let surface = context
            .instance
            .create_surface(window.window.clone())
            .map_err(|e| RenderError::SurfaceCreation(e.to_string()))?;

        let mut config = surface
            .get_default_config(&context.adapter, width.max(1), height.max(1))
            .ok_or(RenderError::SurfaceUnsupported)?;
        config.present_mode = wgpu::PresentMode::AutoVsync;

        surface.configure(&context.device, &config);
        let depth = DepthTexture::new(&context.device, config.width, config.height);

        tracing::debug!(
            "Configured surface {}x{} as {:?}",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            window,
            context,
            surface,
            config,
            depth,
            pending_resize: None,
        })
    }

    pub fn id(&self) -> WindowId {
        self.window.id()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.config.width, self.config.height)
    }

    /// Defer reconfiguration to the next [`begin_drawing`](Self::begin_drawing).
    pub fn resized(&mut self, new_size: PhysicalSize<u32>) {
        self.pending_resize = Some(new_size);
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.context.device, &self.config);
        self.depth
            .resize(&self.context.device, self.config.width, self.config.height);
    }

    /// Acquire the next surface texture and open a command encoder.
    ///
    /// A lost or outdated surface is reconfigured and reported as an error;
    /// the caller should skip the frame.
    pub fn begin_drawing(&mut self) -> RenderResult<FrameContext> {
        profile_function!();

        if let Some(size) = self.pending_resize.take() {
            if size.width > 0 && size.height > 0 {
                self.config.width = size.width;
                self.config.height = size.height;
                self.reconfigure();
            }
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                self.reconfigure();
                return Err(RenderError::SurfaceAcquire(e));
            }
            Err(e) => return Err(RenderError::SurfaceAcquire(e)),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        Ok(FrameContext {
            stats: FrameStats::default(),
            surface_texture,
            view,
            depth_view: self.depth.view(),
            encoder,
            context: self.context.clone(),
            window: self.window.window.clone(),
        })
    }
}
