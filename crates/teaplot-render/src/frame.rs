use std::sync::Arc;

use teaplot_core::profiling::{profile_function, profile_scope};
use teaplot_winit::window::WinitWindow;

use crate::context::GraphicsContext;

/// Statistics for a rendered frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameStats {
    pub passes: usize,
}

/// Context for a single frame of rendering.
///
/// Obtained from [`RenderableWindow::begin_drawing`](crate::RenderableWindow::begin_drawing)
/// and consumed by [`present`](Self::present).
pub struct FrameContext {
    pub(crate) stats: FrameStats,
    pub(crate) surface_texture: wgpu::SurfaceTexture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) depth_view: Arc<wgpu::TextureView>,
    pub(crate) encoder: wgpu::CommandEncoder,
    pub(crate) context: Arc<GraphicsContext>,
    pub(crate) window: Arc<WinitWindow>,
}

impl FrameContext {
    pub fn graphics_context(&self) -> &GraphicsContext {
        &self.context
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Submit the recorded commands and present the surface.
    pub fn present(self) {
        profile_function!();

        if self.stats.passes == 0 {
            tracing::warn!("Presenting a frame with no render passes");
        }

        {
            profile_scope!("submit_commands");
            self.context.queue.submit(std::iter::once(self.encoder.finish()));
        }

        {
            profile_scope!("present_surface");
            self.surface_texture.present();
        }

        self.window.request_redraw();
    }
}

/// Clear operation for a render pass.
#[derive(Debug, Clone, Copy, Default)]
pub enum ClearOp {
    /// Load existing contents (no clear).
    #[default]
    Load,
    /// Clear to the specified color.
    Clear(wgpu::Color),
}

impl From<crate::Color> for ClearOp {
    fn from(color: crate::Color) -> Self {
        ClearOp::Clear(color.to_wgpu())
    }
}

/// Builder for render passes targeting the frame's surface and depth buffer.
pub struct RenderPassBuilder<'a> {
    label: Option<&'a str>,
    clear_op: ClearOp,
    /// `None` loads the previous depth contents.
    depth_clear: Option<f32>,
}

impl<'a> RenderPassBuilder<'a> {
    pub fn new() -> Self {
        Self {
            label: None,
            clear_op: ClearOp::Load,
            depth_clear: Some(1.0),
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    pub fn clear_color(mut self, color: impl Into<ClearOp>) -> Self {
        self.clear_op = color.into();
        self
    }

    pub fn clear_depth(mut self, depth: f32) -> Self {
        self.depth_clear = Some(depth);
        self
    }

    pub fn load_depth(mut self) -> Self {
        self.depth_clear = None;
        self
    }

    /// Begin the pass. The frame's encoder stays locked until the pass drops.
    pub fn build(self, frame: &'a mut FrameContext) -> RenderPass<'a> {
        let load = match self.clear_op {
            ClearOp::Load => wgpu::LoadOp::Load,
            ClearOp::Clear(color) => wgpu::LoadOp::Clear(color),
        };
        let depth_load = match self.depth_clear {
            Some(depth) => wgpu::LoadOp::Clear(depth),
            None => wgpu::LoadOp::Load,
        };

        let pass = frame
            .encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: self.label,
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &frame.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime();

        frame.stats.passes += 1;

        RenderPass { frame, pass }
    }
}

impl Default for RenderPassBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// A render pass bound to the frame it records into.
pub struct RenderPass<'a> {
    frame: &'a mut FrameContext,
    pass: wgpu::RenderPass<'static>,
}

impl RenderPass<'_> {
    pub fn raw(&mut self) -> &mut wgpu::RenderPass<'static> {
        &mut self.pass
    }

    pub fn frame(&self) -> &FrameContext {
        self.frame
    }

    pub fn finish(self) {
        drop(self);
    }
}
