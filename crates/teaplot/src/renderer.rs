//! Draws the scenes of a [`GraphSpace`] with the batched renderers.
//!
//! Every visible node is staged under its node id; a batch only uploads
//! again when the node's revision moves. Batches whose node is gone (or
//! hidden) are released after each sync.

use std::sync::Arc;

use teaplot_core::alloc::HashSet;
use teaplot_core::profiling::profile_function;
use teaplot_graph::{GraphSpace, NodeKind, Scene};
use teaplot_render::{
    BatchKey, CameraBinding, CameraUniform, FrameContext, GraphicsContext, LineRenderer,
    MeshRenderer, PlotRenderer, RenderPassBuilder, SpriteRenderer, wgpu,
};

/// Keeps sprite scene keys apart from main scene keys.
const SPRITE_SCENE_BIT: BatchKey = 1 << 63;

#[derive(Default)]
struct LiveBatches {
    lines: HashSet<BatchKey>,
    translucent_lines: HashSet<BatchKey>,
    plots: HashSet<BatchKey>,
    meshes: HashSet<BatchKey>,
    sprites: HashSet<BatchKey>,
}

pub struct SceneRenderer {
    context: Arc<GraphicsContext>,
    camera: CameraBinding,
    lines: LineRenderer,
    translucent_lines: LineRenderer,
    plots: PlotRenderer,
    meshes: MeshRenderer,
    sprites: SpriteRenderer,
}

impl SceneRenderer {
    pub fn new(context: Arc<GraphicsContext>, format: wgpu::TextureFormat) -> Self {
        let camera = CameraBinding::new(context.device());
        Self {
            lines: LineRenderer::new(context.clone(), &camera, format, true),
            translucent_lines: LineRenderer::new(context.clone(), &camera, format, false),
            plots: PlotRenderer::new(context.clone(), &camera, format),
            meshes: MeshRenderer::new(context.clone(), &camera, format, false),
            sprites: SpriteRenderer::new(context.clone(), &camera, format),
            camera,
            context,
        }
    }

    fn stage(&mut self, scene: &Scene, key_bits: BatchKey, live: &mut LiveBatches) {
        for (id, node) in scene.iter().filter(|(_, node)| node.is_visible()) {
            let key = id.raw() | key_bits;
            let revision = node.revision();
            match node.kind() {
                NodeKind::Lines {
                    segments,
                    translucent: false,
                } => {
                    self.lines.prepare(key, revision, segments);
                    live.lines.insert(key);
                }
                NodeKind::Lines {
                    segments,
                    translucent: true,
                } => {
                    self.translucent_lines.prepare(key, revision, segments);
                    live.translucent_lines.insert(key);
                }
                NodeKind::PointCloud { instances, uniform } => {
                    self.plots.prepare(key, revision, instances, uniform);
                    live.plots.insert(key);
                }
                NodeKind::Mesh(vertices) => {
                    self.meshes.prepare(key, revision, vertices);
                    live.meshes.insert(key);
                }
                NodeKind::Sprites(labels) => {
                    self.sprites.prepare(key, revision, labels);
                    live.sprites.insert(key);
                }
            }
        }
    }

    /// Bring the GPU batches in line with the scenes and the active camera.
    pub fn sync(&mut self, space: &GraphSpace) {
        profile_function!();

        let mut camera = space.camera().clone();
        self.camera
            .update(self.context.queue(), &CameraUniform::from_camera(&mut camera));

        let mut live = LiveBatches::default();
        let scenes = space.scenes();
        self.stage(&scenes.main, 0, &mut live);
        self.stage(&scenes.sprites, SPRITE_SCENE_BIT, &mut live);

        self.lines.retain(|key| live.lines.contains(&key));
        self.translucent_lines
            .retain(|key| live.translucent_lines.contains(&key));
        self.plots.retain(|key| live.plots.contains(&key));
        self.meshes.retain(|key| live.meshes.contains(&key));
        self.sprites.retain(|key| live.sprites.contains(&key));
    }

    /// Record both passes of a frame.
    ///
    /// The main pass clears to the space's background and draws opaque
    /// geometry before the translucent grid and sweep marker. Labels get a
    /// second pass over a fresh depth buffer so no plot can hide them.
    pub fn render(&mut self, frame: &mut FrameContext, space: &GraphSpace) {
        profile_function!();
        self.sync(space);

        {
            let mut pass = RenderPassBuilder::new()
                .label("Graph Pass")
                .clear_color(space.clear_colour())
                .clear_depth(1.0)
                .build(frame);
            let raw = pass.raw();
            self.lines.render(raw, &self.camera);
            self.plots.render(raw, &self.camera);
            self.translucent_lines.render(raw, &self.camera);
            self.meshes.render(raw, &self.camera);
            pass.finish();
        }

        let mut pass = RenderPassBuilder::new()
            .label("Label Pass")
            .clear_depth(1.0)
            .build(frame);
        self.sprites.render(pass.raw(), &self.camera);
        pass.finish();
    }
}
