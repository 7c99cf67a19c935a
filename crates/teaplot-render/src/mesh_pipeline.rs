//! Unindexed colored triangle meshes.

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use teaplot_core::profiling::profile_scope;

use crate::batch::{BatchCache, BatchKey};
use crate::camera::CameraBinding;
use crate::depth::depth_stencil_state;
use crate::{Color, GraphicsContext};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub _padding: f32,
    pub color: [f32; 4],
}

impl MeshVertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position: position.to_array(),
            _padding: 0.0,
            color: color.to_array(),
        }
    }
}

/// Triangles of an axis-aligned box of `size` rotated about y by
/// `rotation_y` radians and centred on `center`.
pub fn cuboid(center: Vec3, size: Vec3, rotation_y: f32, color: Color) -> Vec<MeshVertex> {
    let half = size * 0.5;
    let rotation = Quat::from_rotation_y(rotation_y);
    let corner = |x: f32, y: f32, z: f32| center + rotation * (Vec3::new(x, y, z) * half);

    let c = [
        corner(-1.0, -1.0, -1.0),
        corner(1.0, -1.0, -1.0),
        corner(1.0, 1.0, -1.0),
        corner(-1.0, 1.0, -1.0),
        corner(-1.0, -1.0, 1.0),
        corner(1.0, -1.0, 1.0),
        corner(1.0, 1.0, 1.0),
        corner(-1.0, 1.0, 1.0),
    ];

    const FACES: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // +z
        [1, 0, 3, 2], // -z
        [5, 1, 2, 6], // +x
        [0, 4, 7, 3], // -x
        [3, 7, 6, 2], // +y
        [0, 1, 5, 4], // -y
    ];

    let mut vertices = Vec::with_capacity(36);
    for [a, b, c2, d] in FACES {
        for index in [a, b, c2, a, c2, d] {
            vertices.push(MeshVertex::new(c[index], color));
        }
    }
    vertices
}

pub struct MeshRenderer {
    context: Arc<GraphicsContext>,
    pipeline: wgpu::RenderPipeline,
    batches: BatchCache,
}

impl MeshRenderer {
    pub fn new(
        context: Arc<GraphicsContext>,
        camera: &CameraBinding,
        target_format: wgpu::TextureFormat,
        depth_write: bool,
    ) -> Self {
        let device = context.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Renderer Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Renderer Pipeline Layout"),
            bind_group_layouts: &[camera.layout()],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Renderer Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: 16,
                            shader_location: 1,
                        },
                    ],
                }],
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
            depth_stencil: Some(depth_stencil_state(depth_write)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            context,
            pipeline,
            batches: BatchCache::new("Mesh Renderer Vertex Buffer"),
        }
    }

    pub fn prepare(&mut self, key: BatchKey, revision: u64, vertices: &[MeshVertex]) {
        profile_scope!("mesh_renderer_prepare");
        self.batches
            .upload(self.context.device(), key, revision, vertices);
    }

    pub fn retain(&mut self, live: impl FnMut(BatchKey) -> bool) {
        self.batches.retain(live);
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass, camera: &CameraBinding) {
        profile_scope!("mesh_renderer_render");

        if self.batches.is_empty() {
            return;
        }

        pass.push_debug_group("MeshRenderer::render");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);

        for (_, batch) in self.batches.iter() {
            pass.set_vertex_buffer(0, batch.buffer.slice(..));
            pass.draw(0..batch.count, 0..1);
        }

        pass.pop_debug_group();
    }
}

const MESH_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
    forward: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec3<f32>, @location(1) color: vec4<f32>) -> VertexOutput {
    var output: VertexOutput;
    output.position = camera.view_proj * vec4<f32>(position, 1.0);
    output.color = color;
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
    fn test_cuboid_bounds() {
        let center = Vec3::new(10.0, 20.0, 30.0);
        let vertices = cuboid(center, Vec3::new(4.0, 2.0, 6.0), 0.0, Color::RED);
        assert_eq!(vertices.len(), 36);

        for v in &vertices {
            let p = Vec3::from_array(v.position) - center;
            assert!(p.x.abs() <= 2.0 + 1e-5);
            assert!(p.y.abs() <= 1.0 + 1e-5);
            assert!(p.z.abs() <= 3.0 + 1e-5);
        }
    }

    #[test]
    fn test_cuboid_quarter_turn_swaps_x_and_z() {
        let size = Vec3::new(500.0, 1000.0, 5.0);
        let vertices = cuboid(Vec3::ZERO, size, std::f32::consts::FRAC_PI_2, Color::RED);

        let max_x = vertices
            .iter()
            .map(|v| v.position[0].abs())
            .fold(0.0_f32, f32::max);
        let max_z = vertices
            .iter()
            .map(|v| v.position[2].abs())
            .fold(0.0_f32, f32::max);

        assert!((max_x - 2.5).abs() < 1e-3);
        assert!((max_z - 250.0).abs() < 1e-3);
    }
}
