//! Instanced 3D line renderer.
//!
//! Each segment is a camera-facing quad expanded in the vertex shader
//! perpendicular to both the segment direction and the view direction.
//! Widths are in world units with a floor of [`MIN_LINE_WIDTH`].

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use teaplot_core::profiling::profile_scope;
use wgpu::util::DeviceExt;

use crate::batch::{BatchCache, BatchKey};
use crate::camera::CameraBinding;
use crate::depth::depth_stencil_state;
use crate::{Color, GraphicsContext};

pub const MIN_LINE_WIDTH: f32 = 1.0;

/// GPU instance data for a line segment.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineInstance {
    pub start: [f32; 3],
    pub width: f32,
    pub end: [f32; 3],
    pub _padding: f32,
    pub color: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<LineInstance>(), 48);

impl LineInstance {
    pub fn new(start: Vec3, end: Vec3, width: f32, color: Color) -> Self {
        Self {
            start: start.to_array(),
            width: width.max(MIN_LINE_WIDTH),
            end: end.to_array(),
            _padding: 0.0,
            color: color.to_array(),
        }
    }

    pub fn length(&self) -> f32 {
        Vec3::from_array(self.end).distance(Vec3::from_array(self.start))
    }
}

/// Batched line renderer; one batch per scene node.
pub struct LineRenderer {
    context: Arc<GraphicsContext>,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    batches: BatchCache,
}

impl LineRenderer {
    /// Create a line renderer.
    ///
    /// Translucent line sets (grids) should pass `depth_write = false` so
    /// they never hide geometry drawn after them.
    pub fn new(
        context: Arc<GraphicsContext>,
        camera: &CameraBinding,
        target_format: wgpu::TextureFormat,
        depth_write: bool,
    ) -> Self {
        let device = context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Line Renderer Shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Line Renderer Pipeline Layout"),
            bind_group_layouts: &[camera.layout()],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Renderer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    // Unit quad: x runs along the segment, y across it.
                    wgpu::VertexBufferLayout {
                        array_stride: 8,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<LineInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 0,
                                shader_location: 1,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32,
                                offset: 12,
                                shader_location: 2,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x3,
                                offset: 16,
                                shader_location: 3,
                            },
                            wgpu::VertexAttribute {
                                format: wgpu::VertexFormat::Float32x4,
                                offset: 32,
                                shader_location: 4,
                            },
                        ],
                    },
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(depth_write)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let quad_vertices: [[f32; 2]; 4] = [[0.0, -0.5], [1.0, -0.5], [0.0, 0.5], [1.0, 0.5]];

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Line Renderer Vertex Buffer"),
            contents: bytemuck::cast_slice(&quad_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            context,
            pipeline,
            vertex_buffer,
            batches: BatchCache::new("Line Renderer Instance Buffer"),
        }
    }

    /// Upload the segments of one node if its revision changed.
    pub fn prepare(&mut self, key: BatchKey, revision: u64, segments: &[LineInstance]) {
        profile_scope!("line_renderer_prepare");
        self.batches
            .upload(self.context.device(), key, revision, segments);
    }

    pub fn retain(&mut self, live: impl FnMut(BatchKey) -> bool) {
        self.batches.retain(live);
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass, camera: &CameraBinding) {
        profile_scope!("line_renderer_render");

        if self.batches.is_empty() {
            return;
        }

        pass.push_debug_group("LineRenderer::render");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for (_, batch) in self.batches.iter() {
            pass.set_vertex_buffer(1, batch.buffer.slice(..));
            pass.draw(0..4, 0..batch.count);
        }

        pass.pop_debug_group();
    }
}

const LINE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
    forward: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexInput {
    @location(0) quad: vec2<f32>,
    @location(1) start: vec3<f32>,
    @location(2) width: f32,
    @location(3) end: vec3<f32>,
    @location(4) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;

    let along = input.end - input.start;
    let len = length(along);
    let dir = select(vec3<f32>(1.0, 0.0, 0.0), along / len, len > 0.0);

    // Segments parallel to the view direction fall back to camera up.
    var side = cross(dir, camera.forward.xyz);
    if length(side) < 0.0001 {
        side = camera.up.xyz;
    }
    side = normalize(side);

    let world = input.start + along * input.quad.x + side * input.quad.y * max(input.width, 1.0);
    output.position = camera.view_proj * vec4<f32>(world, 1.0);
    output.color = input.color;

    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_floor() {
        let line = LineInstance::new(Vec3::ZERO, Vec3::X, 0.2, Color::BLACK);
        assert_eq!(line.width, MIN_LINE_WIDTH);

        let thick = LineInstance::new(Vec3::ZERO, Vec3::X, 6.0, Color::BLACK);
        assert_eq!(thick.width, 6.0);
    }

    #[test]
    fn test_length() {
        let line = LineInstance::new(Vec3::ZERO, Vec3::new(3.0, 4.0, 0.0), 1.0, Color::RED);
        assert!((line.length() - 5.0).abs() < 1e-6);
        assert_eq!(line.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
