use anyhow::{Context, Result, anyhow};
use teaplot_core::config::ViewerConfig;
use teaplot_core::geometry::{LogicalPosition, LogicalSize};
use teaplot_core::profiling::{new_frame, profile_function};
use teaplot_graph::{ApplyOptions, DataDocument, GraphSpace, Legend, PlaybackController, apply_graph_response};
use teaplot_render::{Camera, GraphicsContext, ProjectionMode, RenderableWindow};
use teaplot_winit::{
    FrameTime, WindowId,
    app::{App, AppCtx},
    event::{Event, EventBatch, HandleStatus, KeyCode, KeyEvent, MouseButton, PhysicalKey},
    window::WindowDescriptor,
};

use crate::renderer::SceneRenderer;

/// Orbit angle per dragged logical pixel at rotate speed 1.
const ORBIT_RADIANS_PER_PIXEL: f32 = 0.005;

pub struct ViewerApp {
    window: RenderableWindow,
    renderer: SceneRenderer,
    space: GraphSpace,
    playback: PlaybackController,
    legend: Legend,
    drag: Option<MouseButton>,
    cursor: Option<LogicalPosition<f64>>,
    now_ms: f64,
}

impl ViewerApp {
    pub fn new(ctx: &mut AppCtx, config: ViewerConfig, document: Option<DataDocument>) -> Result<Self> {
        let window = ctx
            .create_window(WindowDescriptor {
                title: config.window.title.clone(),
                resizeable: true,
                size: Some(LogicalSize::new(config.window.width, config.window.height)),
            })
            .map_err(|e| anyhow!("Failed to create window: {}", e))?;

        let graphics = GraphicsContext::new_owned_sync().context("Failed to set up the GPU")?;
        let window = RenderableWindow::new(window, graphics.clone()).context("Failed to set up the surface")?;
        let renderer = SceneRenderer::new(graphics, window.format());

        let mut space = GraphSpace::new(window.window().logical_size(), config.controls);
        space.resize_graph_count(config.graph_count);
        if config.perspective {
            space.set_perspective(true);
        }

        let (graphs, mut scenes) = space.graphs_and_scenes_mut();
        for (index, graph) in graphs.iter_mut().enumerate() {
            graph.set_show_grid(config.show_grid, &mut scenes);
            if let Some(name) = config.graph_names.get(index) {
                graph.set_name(name.clone(), &mut scenes);
            }
        }

        let mut app = Self {
            window,
            renderer,
            space,
            playback: PlaybackController::new(config.anim_time_ms as f64),
            legend: Legend::default(),
            drag: None,
            cursor: None,
            now_ms: 0.0,
        };

        if let Some(document) = document {
            app.show_document(&document, &ApplyOptions::from(&config));
        }
        Ok(app)
    }

    /// Plot `document`. A rejected document leaves the current plots alone.
    fn show_document(&mut self, document: &DataDocument, options: &ApplyOptions) {
        match apply_graph_response(&mut self.space, document, options) {
            Ok(legend) => {
                for (flow, colour) in legend.iter() {
                    tracing::info!("Flow {} drawn in {:?}", flow, colour);
                }
                self.legend = legend;
            }
            Err(e) => tracing::error!("Failed to plot graph data: {}", e),
        }
    }

    fn toggle_playback(&mut self) {
        if self.space.any_animating() {
            let stopped = self.playback.stop(&mut self.space, self.now_ms);
            tracing::info!("Paused {} graphs", stopped);
        } else {
            let started = self.playback.start(&mut self.space, self.now_ms);
            tracing::info!("Playing {} graphs", started);
        }
    }

    fn on_key(&mut self, ctx: &mut AppCtx, key: &KeyEvent) -> HandleStatus {
        let PhysicalKey::Code(code) = key.physical_key else {
            return HandleStatus::ignored();
        };

        match code {
            KeyCode::Space => self.toggle_playback(),
            KeyCode::Backspace => {
                let restarted = self.playback.reset(&mut self.space, self.now_ms);
                tracing::info!("Restarted {} graphs", restarted);
            }
            KeyCode::KeyG => {
                let shown = self.space.toggle_grid();
                tracing::debug!("Grid {}", if shown { "shown" } else { "hidden" });
            }
            KeyCode::KeyP | KeyCode::Digit3 => self.space.toggle_axis_colours(),
            KeyCode::KeyR => self.space.reset_controls(),
            KeyCode::KeyC => {
                if let Some(&id) = self.space.graph_ids().first() {
                    if let Err(e) = self.space.centre_view_on(id) {
                        tracing::warn!("Cannot centre the view: {}", e);
                    }
                }
            }
            KeyCode::Escape => ctx.exit(),
            _ => return HandleStatus::ignored(),
        }
        HandleStatus::consumed()
    }

    fn drag_camera(&mut self, button: MouseButton, dx: f32, dy: f32) {
        let controls = self.space.controls();
        let viewport_height = self.space.viewport().height.max(1) as f32;
        let camera = self.space.camera_mut();

        match button {
            MouseButton::Left if controls.rotate => {
                let step = ORBIT_RADIANS_PER_PIXEL * controls.rotate_speed;
                camera.orbit(-dx * step, -dy * step);
            }
            MouseButton::Right | MouseButton::Middle if controls.pan => {
                let scale = world_units_per_pixel(camera, viewport_height) * controls.pan_speed;
                camera.pan(-dx * scale, dy * scale);
            }
            _ => {}
        }
    }

    fn zoom_camera(&mut self, lines: f32) {
        let controls = self.space.controls();
        if !controls.zoom {
            return;
        }

        let factor = controls.zoom_speed.powf(lines);
        let camera = self.space.camera_mut();
        if camera.is_orthographic() {
            let zoom = camera.zoom() * factor;
            camera.set_zoom(zoom);
        } else {
            camera.dolly(1.0 / factor);
        }
    }

    fn on_event(&mut self, ctx: &mut AppCtx, event: &Event) -> HandleStatus {
        match event {
            Event::WindowResized(size) => {
                self.window.resized(*size);
                let logical = size.to_logical(self.window.window().scale_factor());
                self.space.resize(logical);
                HandleStatus::consumed()
            }
            Event::ScaleFactorChanged(_) => {
                self.space.resize(self.window.window().logical_size());
                HandleStatus::handled()
            }
            Event::KeyInput(key) if key.is_press() => self.on_key(ctx, key),
            Event::MouseButtonDown(button) => {
                self.drag = Some(*button);
                HandleStatus::consumed()
            }
            Event::MouseButtonUp(button) if self.drag == Some(*button) => {
                self.drag = None;
                HandleStatus::consumed()
            }
            Event::MouseMoved(position) => {
                if let (Some(button), Some(last)) = (self.drag, self.cursor) {
                    let (dx, dy) = position.delta_from(last);
                    self.drag_camera(button, dx as f32, dy as f32);
                }
                self.cursor = Some(*position);
                HandleStatus::consumed()
            }
            Event::MouseLeft => {
                self.cursor = None;
                self.drag = None;
                HandleStatus::handled()
            }
            Event::MouseScrolled(lines) => {
                self.zoom_camera(*lines);
                HandleStatus::consumed()
            }
            _ => HandleStatus::ignored(),
        }
    }

    fn draw(&mut self) {
        profile_function!();

        let mut frame = match self.window.begin_drawing() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Skipping frame: {}", e);
                self.window.window().request_redraw();
                return;
            }
        };
        self.renderer.render(&mut frame, &self.space);
        frame.present();
    }
}

/// How far the view plane moves per logical pixel of drag.
fn world_units_per_pixel(camera: &Camera, viewport_height: f32) -> f32 {
    match camera.projection() {
        ProjectionMode::Orthographic { .. } => 1.0 / camera.zoom(),
        ProjectionMode::Perspective { fov_y_radians, .. } => {
            let distance = (camera.position() - camera.target()).length();
            2.0 * distance * (fov_y_radians * 0.5).tan() / viewport_height
        }
    }
}

impl App for ViewerApp {
    fn on_start(&mut self, _ctx: &mut AppCtx) {
        tracing::info!(
            "Viewer ready with {} graphs and {} flows",
            self.space.graph_count(),
            self.legend.len()
        );
        self.window.window().request_redraw();
    }

    fn update(&mut self, _ctx: &mut AppCtx, time: &FrameTime) {
        new_frame();
        self.now_ms = time.now_ms();

        self.space.step_animations(self.now_ms);
        if self.playback.poll_finished(self.now_ms, &self.space) {
            tracing::info!("Animation finished");
        }
    }

    fn render(&mut self, ctx: &mut AppCtx, window_id: WindowId, events: &mut EventBatch) {
        if window_id != self.window.id() {
            return;
        }

        events.dispatch(|event| self.on_event(ctx, event));
        self.draw();
    }

    fn on_exit(&mut self, _ctx: &mut AppCtx) {
        let (graphs, mut scenes) = self.space.graphs_and_scenes_mut();
        for graph in graphs.iter_mut() {
            graph.destroy(&mut scenes);
        }
        tracing::info!("Shutting down viewer");
    }
}
