//! Camera-facing text sprites.
//!
//! Each label is rasterized once per `(text, font size)` into its own
//! texture and drawn as a billboard quad that spans the camera's right and
//! up vectors, rotated in the screen plane by the sprite's rotation.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use teaplot_core::profiling::profile_scope;
use wgpu::util::DeviceExt;

use crate::batch::BatchKey;
use crate::camera::CameraBinding;
use crate::depth::depth_stencil_state;
use crate::label::{LabelBitmap, LabelRasterizer};
use crate::GraphicsContext;

/// World-space size of every label sprite.
pub const SPRITE_SIZE: [f32; 2] = [100.0, 50.0];

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 3],
    pub rotation: f32,
    pub size: [f32; 2],
    pub _padding: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);

/// A text label placed in the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteLabel {
    pub text: String,
    pub font_size: f32,
    pub position: Vec3,
    /// Screen-plane rotation in radians.
    pub rotation: f32,
}

impl SpriteLabel {
    pub fn new(text: impl Into<String>, font_size: f32, position: Vec3) -> Self {
        Self {
            text: text.into(),
            font_size,
            position,
            rotation: 0.0,
        }
    }

    pub fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn instance(&self) -> SpriteInstance {
        SpriteInstance {
            position: self.position.to_array(),
            rotation: self.rotation,
            size: SPRITE_SIZE,
            _padding: [0.0; 2],
        }
    }

    fn texture_key(&self) -> TextureKey {
        (self.text.clone(), self.font_size.to_bits())
    }
}

type TextureKey = (String, u32);

struct SpriteBatch {
    revision: u64,
    textures: Vec<TextureKey>,
    buffer: wgpu::Buffer,
}

pub struct SpriteRenderer {
    context: Arc<GraphicsContext>,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    rasterizer: LabelRasterizer,
    textures: AHashMap<TextureKey, wgpu::BindGroup>,
    batches: AHashMap<BatchKey, SpriteBatch>,
}

impl SpriteRenderer {
    pub fn new(
        context: Arc<GraphicsContext>,
        camera: &CameraBinding,
        target_format: wgpu::TextureFormat,
    ) -> Self {
        let device = context.device();

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Sprite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[camera.layout(), &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SpriteInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: 0,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32,
                            offset: 12,
                            shader_location: 1,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: 16,
                            shader_location: 2,
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
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state(true)),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            context,
            pipeline,
            texture_layout,
            sampler,
            rasterizer: LabelRasterizer::new(),
            textures: AHashMap::new(),
            batches: AHashMap::new(),
        }
    }

    /// Stage the labels of one node when its revision changed.
    pub fn prepare(&mut self, key: BatchKey, revision: u64, labels: &[SpriteLabel]) {
        profile_scope!("sprite_renderer_prepare");

        if self
            .batches
            .get(&key)
            .is_some_and(|batch| batch.revision == revision)
        {
            return;
        }

        if labels.is_empty() {
            self.batches.remove(&key);
            return;
        }

        let mut textures = Vec::with_capacity(labels.len());
        for label in labels {
            let texture_key = label.texture_key();
            if !self.textures.contains_key(&texture_key) {
                let bitmap = self.rasterizer.rasterize(&label.text, label.font_size);
                let bind_group = self.upload_bitmap(&bitmap);
                self.textures.insert(texture_key.clone(), bind_group);
            }
            textures.push(texture_key);
        }

        let instances: Vec<SpriteInstance> = labels.iter().map(SpriteLabel::instance).collect();
        let buffer = self
            .context
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Instance Buffer"),
                contents: bytemuck::cast_slice(&instances),
                usage: wgpu::BufferUsages::VERTEX,
            });

        self.batches.insert(
            key,
            SpriteBatch {
                revision,
                textures,
                buffer,
            },
        );
    }

    /// Drop batches of removed nodes and any texture no batch still uses.
    pub fn retain(&mut self, mut live: impl FnMut(BatchKey) -> bool) {
        self.batches.retain(|key, _| live(*key));

        let used: AHashSet<&TextureKey> = self
            .batches
            .values()
            .flat_map(|batch| batch.textures.iter())
            .collect();
        let before = self.textures.len();
        self.textures.retain(|key, _| used.contains(key));

        if self.textures.len() != before {
            tracing::trace!("Evicted {} label textures", before - self.textures.len());
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    fn upload_bitmap(&self, bitmap: &LabelBitmap) -> wgpu::BindGroup {
        let size = wgpu::Extent3d {
            width: bitmap.width,
            height: bitmap.height,
            depth_or_array_layers: 1,
        };

        let texture = self.context.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("Label Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        self.context.queue().write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &bitmap.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bitmap.width * 4),
                rows_per_image: Some(bitmap.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        self.context
            .device()
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Label Texture Bind Group"),
                layout: &self.texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            })
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass, camera: &CameraBinding) {
        profile_scope!("sprite_renderer_render");

        if self.batches.is_empty() {
            return;
        }

        pass.push_debug_group("SpriteRenderer::render");
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, camera.bind_group(), &[]);

        for batch in self.batches.values() {
            pass.set_vertex_buffer(0, batch.buffer.slice(..));
            for (index, texture_key) in batch.textures.iter().enumerate() {
                let Some(bind_group) = self.textures.get(texture_key) else {
                    continue;
                };
                let instance = index as u32;
                pass.set_bind_group(1, bind_group, &[]);
                pass.draw(0..4, instance..instance + 1);
            }
        }

        pass.pop_debug_group();
    }
}

const SPRITE_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
    forward: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var label_texture: texture_2d<f32>;
@group(1) @binding(1)
var label_sampler: sampler;

struct VertexInput {
    @builtin(vertex_index) vertex_index: u32,
    @location(0) position: vec3<f32>,
    @location(1) rotation: f32,
    @location(2) size: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;

    let corner = vec2<f32>(f32(input.vertex_index & 1u), f32(input.vertex_index >> 1u)) - vec2<f32>(0.5);
    let scaled = corner * input.size;
    let c = cos(input.rotation);
    let s = sin(input.rotation);
    let rotated = vec2<f32>(scaled.x * c - scaled.y * s, scaled.x * s + scaled.y * c);

    let world = input.position + camera.right.xyz * rotated.x + camera.up.xyz * rotated.y;
    output.position = camera.view_proj * vec4<f32>(world, 1.0);
    output.uv = vec2<f32>(corner.x + 0.5, 0.5 - corner.y);

    return output;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(label_texture, label_sampler, input.uv);
    if color.a < 0.01 {
        discard;
    }
    return color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_carries_fixed_size() {
        let label = SpriteLabel::new("100", 45.0, Vec3::new(1.0, 2.0, 3.0)).rotated(0.5);
        let instance = label.instance();

        assert_eq!(instance.position, [1.0, 2.0, 3.0]);
        assert_eq!(instance.rotation, 0.5);
        assert_eq!(instance.size, SPRITE_SIZE);
    }

    #[test]
    fn test_texture_key_distinguishes_font_size() {
        let small = SpriteLabel::new("x", 45.0, Vec3::ZERO);
        let large = SpriteLabel::new("x", 70.0, Vec3::ZERO);
        assert_ne!(small.texture_key(), large.texture_key());
        assert_eq!(small.texture_key(), SpriteLabel::new("x", 45.0, Vec3::ONE).texture_key());
    }
}
