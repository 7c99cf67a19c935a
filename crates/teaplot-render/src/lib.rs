//! wgpu rendering for teaplot scenes.
//!
//! A [`RenderableWindow`] owns the surface and depth buffer of one window
//! and hands out a [`FrameContext`] per frame. Scene content is drawn by the
//! batched renderers, each keyed by the scene node that owns the data:
//!
//! - [`PlotRenderer`] for point clouds normalized on the GPU
//! - [`LineRenderer`] for axes, grids and series lines
//! - [`MeshRenderer`] for the reveal sweep box
//! - [`SpriteRenderer`] for text labels

mod batch;
mod camera;
mod color;
mod context;
mod depth;
mod error;
mod frame;
pub mod label;
mod line_pipeline;
mod mesh_pipeline;
mod plot_pipeline;
mod sprite_pipeline;
mod window;

pub use batch::{BatchCache, BatchKey, GpuBatch};
pub use camera::{Camera, CameraBinding, CameraUniform, ProjectionMode};
pub use color::Color;
pub use context::{GraphicsContext, GraphicsContextDescriptor};
pub use depth::{DEPTH_FORMAT, DepthTexture};
pub use error::{RenderError, RenderResult};
pub use frame::{ClearOp, FrameContext, FrameStats, RenderPass, RenderPassBuilder};
pub use line_pipeline::{LineInstance, LineRenderer, MIN_LINE_WIDTH};
pub use mesh_pipeline::{MeshRenderer, MeshVertex, cuboid};
pub use plot_pipeline::{POINT_RADIUS, PlotInstance, PlotRenderer, PlotUniform, tetrahedron_vertices};
pub use sprite_pipeline::{SPRITE_SIZE, SpriteInstance, SpriteLabel, SpriteRenderer};
pub use window::RenderableWindow;

pub use glam;
pub use wgpu;
