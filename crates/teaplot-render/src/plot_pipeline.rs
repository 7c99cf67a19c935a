//! Instanced point-cloud renderer with axis normalization on the GPU.
//!
//! Every sample is a small tetrahedron instance holding the raw (scaled)
//! value. The vertex shader maps the value into the graph frame using the
//! per-plot [`PlotUniform`] limits, so zooming and the reveal sweep only
//! rewrite one uniform buffer, never the instances.
//!
//! Points outside `[0, span + 1]` on any axis, or past the `up_to` cutoff
//! on x, are emitted at a degenerate clip position and never rasterized.

use std::sync::Arc;

use ahash::AHashMap;
use bytemuck::{Pod, Zeroable};
use teaplot_core::profiling::profile_scope;
use wgpu::util::DeviceExt;

use crate::batch::{BatchCache, BatchKey};
use crate::camera::CameraBinding;
use crate::depth::depth_stencil_state;
use crate::{Color, GraphicsContext};

/// Circumradius of the tetrahedron drawn per sample, in graph units.
pub const POINT_RADIUS: f32 = 2.0;

/// GPU instance data for one sample.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlotInstance {
    pub value: [f32; 3],
}

impl PlotInstance {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { value: [x, y, z] }
    }
}

/// Per-plot uniforms.
///
/// `axes` holds the visual span of each axis in graph units; `min`/`max`
/// hold the current (zoomed) logical limits.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlotUniform {
    pub origin: [f32; 4],
    pub min: [f32; 4],
    pub max: [f32; 4],
    pub axes: [f32; 4],
    pub color: [f32; 4],
    pub up_to: f32,
    pub point_radius: f32,
    pub _padding: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<PlotUniform>() % 16, 0);

impl PlotUniform {
    pub fn new(origin: [f32; 3], min: [f32; 3], max: [f32; 3], axes: [f32; 3], color: Color, up_to: f32) -> Self {
        Self {
            origin: [origin[0], origin[1], origin[2], 0.0],
            min: [min[0], min[1], min[2], 0.0],
            max: [max[0], max[1], max[2], 0.0],
            axes: [axes[0], axes[1], axes[2], 0.0],
            color: color.to_array(),
            up_to,
            point_radius: POINT_RADIUS,
            _padding: [0.0; 2],
        }
    }
}

/// Twelve vertices (four faces) of a regular tetrahedron.
pub fn tetrahedron_vertices() -> [[f32; 3]; 12] {
    let s = 1.0 / 3.0_f32.sqrt();
    let v = [[s, s, s], [-s, -s, s], [-s, s, -s], [s, -s, -s]];
    let faces = [[2, 1, 0], [0, 3, 2], [1, 3, 0], [2, 3, 1]];

    let mut out = [[0.0; 3]; 12];
    for (i, face) in faces.iter().enumerate() {
        for (j, &corner) in face.iter().enumerate() {
            out[i * 3 + j] = v[corner];
        }
    }
    out
}

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct PlotRenderer {
    context: Arc<GraphicsContext>,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    uniform_layout: wgpu::BindGroupLayout,
    instances: BatchCache,
    uniforms: AHashMap<BatchKey, UniformSlot>,
}

impl PlotRenderer {
    /// `target_format` must match the surface this renderer draws into.
    pub fn new(
        context: Arc<GraphicsContext>,
        camera: &CameraBinding,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let device = context.device();

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Plot Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Plot Shader"),
            source: wgpu::ShaderSource::Wgsl(PLOT_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Plot Pipeline Layout"),
            bind_group_layouts: &[camera.layout(), &uniform_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Plot Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: 12,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        }],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<PlotInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &[wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 1,
                        }],
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
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Plot Tetrahedron Buffer"),
            contents: bytemuck::cast_slice(&tetrahedron_vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            context,
            pipeline,
            vertex_buffer,
            uniform_layout,
            instances: BatchCache::new("Plot Instance Buffer"),
            uniforms: AHashMap::new(),
        }
    }

    /// Stage one plot. Instances upload only on a new `revision`; the
    /// uniform is written every call.
    pub fn prepare(
        &mut self,
        key: BatchKey,
        revision: u64,
        instances: &[PlotInstance],
        uniform: &PlotUniform,
    ) {
        profile_scope!("plot_renderer_prepare");

        self.instances
            .upload(self.context.device(), key, revision, instances);

        let slot = match self.uniforms.entry(key) {
            std::collections::hash_map::Entry::Occupied(slot) => slot.into_mut(),
            std::collections::hash_map::Entry::Vacant(vacant) => {
                let buffer = self.context.device().create_buffer(&wgpu::BufferDescriptor {
                    label: Some("Plot Uniform Buffer"),
                    size: std::mem::size_of::<PlotUniform>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group =
                    self.context
                        .device()
                        .create_bind_group(&wgpu::BindGroupDescriptor {
                            label: Some("Plot Uniform Bind Group"),
                            layout: &self.uniform_layout,
                            entries: &[wgpu::BindGroupEntry {
                                binding: 0,
                                resource: buffer.as_entire_binding(),
                            }],
                        });
                vacant.insert(UniformSlot { buffer, bind_group })
            }
        };

        self.context
            .queue()
            .write_buffer(&slot.buffer, 0, bytemuck::bytes_of(uniform));
    }

    /// Release resources of plots no longer in the scene.
    pub fn retain(&mut self, mut live: impl FnMut(BatchKey) -> bool) {
        self.instances.retain(&mut live);
        self.uniforms.retain(|key, _| live(*key));
    }

    pub fn plot_count(&self) -> usize {
        self.instances.len()
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass, camera: &CameraBinding) {
        profile_scope!("plot_renderer_render");

        if self.instances.is_empty() {
            return;
        }

        pass.push_debug_group("PlotRenderer::render");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        for (key, batch) in self.instances.iter() {
            let Some(slot) = self.uniforms.get(&key) else {
                continue;
            };
            pass.set_bind_group(1, &slot.bind_group, &[]);
            pass.set_vertex_buffer(1, batch.buffer.slice(..));
            pass.draw(0..12, 0..batch.count);
        }

        pass.pop_debug_group();
    }
}

const PLOT_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
    forward: vec4<f32>,
}

struct Plot {
    origin: vec4<f32>,
    min: vec4<f32>,
    max: vec4<f32>,
    axes: vec4<f32>,
    color: vec4<f32>,
    up_to: f32,
    point_radius: f32,
    _padding: vec2<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> plot: Plot;

struct VertexInput {
    @location(0) corner: vec3<f32>,
    @location(1) value: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;

    let real = (input.value - plot.min.xyz) * plot.axes.xyz / (plot.max.xyz - plot.min.xyz);
    let limit = plot.axes.xyz + vec3<f32>(1.0);
    let inside = all(real >= vec3<f32>(0.0)) && all(real <= limit) && real.x <= plot.up_to;

    if !inside {
        output.position = vec4<f32>(0.0);
        output.color = vec4<f32>(0.0);
        return output;
    }

    let world = plot.origin.xyz + real + input.corner * plot.point_radius;
    output.position = camera.view_proj * vec4<f32>(world, 1.0);

    // Light faces by corner height so the solid reads as 3D.
    let shade = 0.8 + 0.2 * input.corner.y;
    output.color = vec4<f32>(plot.color.rgb * shade, plot.color.a);

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
    fn test_tetrahedron_is_unit_sphere_inscribed() {
        for corner in tetrahedron_vertices() {
            let len = (corner[0] * corner[0] + corner[1] * corner[1] + corner[2] * corner[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<PlotUniform>(), 96);
        let uniform = PlotUniform::new(
            [1.0, 2.0, 3.0],
            [0.0; 3],
            [1000.0, 500.0, 500.0],
            [1000.0, 500.0, 500.0],
            Color::RED,
            250.0,
        );
        assert_eq!(uniform.origin, [1.0, 2.0, 3.0, 0.0]);
        assert_eq!(uniform.up_to, 250.0);
        assert_eq!(uniform.point_radius, POINT_RADIUS);
    }
}
