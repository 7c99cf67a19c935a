//! The viewer-wide context: scenes, cameras and the live graphs.

use glam::Vec3;
use teaplot_core::config::ControlsConfig;
use teaplot_core::geometry::LogicalSize;
use teaplot_core::profiling::profile_function;
use teaplot_render::{Camera, Color};

use crate::axes::{AxisColours, Sections};
use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, GraphId};
use crate::scene::{SceneContext, Scenes};
use crate::traits::Animatable;

pub const CLEAR_COLOUR: u32 = 0xeeeeee;
pub const CAMERA_START_POSITION: Vec3 = Vec3::new(0.0, 0.0, 1750.0);
pub const ORTHO_START_POSITION: Vec3 = Vec3::new(0.0, 0.0, 500.0);
pub const ORTHO_ZOOM: f32 = 0.8;
pub const FOV_DEGREES: f32 = 45.0;
pub const FAR_PLANE: f32 = 10_000.0;
/// Vertical gap between stacked graphs.
pub const GRAPH_SPACING: f32 = 150.0;
/// Tick marker subdivisions of graphs created by [`GraphSpace::resize_graph_count`].
pub const STACKED_AXIS_SECTIONS: Sections = Sections::uniform(4);

/// Which camera gestures are live, and how fast they move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraControls {
    pub rotate: bool,
    pub zoom: bool,
    pub pan: bool,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl CameraControls {
    fn new(speeds: &ControlsConfig, rotate: bool) -> Self {
        Self {
            rotate,
            zoom: true,
            pan: true,
            rotate_speed: speeds.rotate_speed,
            zoom_speed: speeds.zoom_speed,
            pan_speed: speeds.pan_speed,
        }
    }

    /// Orthographic view: zoom and pan, no rotation.
    pub fn orthographic(speeds: &ControlsConfig) -> Self {
        Self::new(speeds, false)
    }

    pub fn perspective(speeds: &ControlsConfig) -> Self {
        Self::new(speeds, true)
    }

    fn disabled(self) -> Self {
        Self {
            rotate: false,
            zoom: false,
            pan: false,
            ..self
        }
    }
}

#[derive(Debug, Clone)]
struct View {
    camera: Camera,
    /// Pose restored by [`GraphSpace::reset_controls`].
    home: Camera,
    controls: CameraControls,
}

impl View {
    fn new(camera: Camera, controls: CameraControls) -> Self {
        Self {
            home: camera.clone(),
            camera,
            controls,
        }
    }
}

/// Exactly one per viewer session.
#[derive(Debug)]
pub struct GraphSpace {
    scenes: Scenes,
    ortho: View,
    perspective_view: View,
    speeds: ControlsConfig,
    perspective: bool,
    viewport: LogicalSize<u32>,
    graphs: Vec<Graph>,
    next_graph: u64,
}

impl GraphSpace {
    pub fn new(viewport: LogicalSize<u32>, speeds: ControlsConfig) -> Self {
        let mut space = Self {
            scenes: Scenes::new(),
            ortho: View::new(ortho_camera(viewport), CameraControls::orthographic(&speeds)),
            perspective_view: View::new(perspective_camera(viewport), CameraControls::perspective(&speeds)),
            speeds,
            perspective: false,
            viewport,
            graphs: Vec::new(),
            next_graph: 0,
        };
        space.reset_view();
        space
    }

    pub fn clear_colour(&self) -> Color {
        Color::from_hex(CLEAR_COLOUR)
    }

    /// Recreate both cameras at their start poses.
    pub fn reset_view(&mut self) {
        self.ortho = View::new(ortho_camera(self.viewport), CameraControls::orthographic(&self.speeds));
        self.perspective_view = View::new(
            perspective_camera(self.viewport),
            CameraControls::perspective(&self.speeds),
        );
        self.set_perspective(self.perspective);
    }

    /// Move the active camera back to where its controls started.
    pub fn reset_controls(&mut self) {
        let view = self.active_view_mut();
        view.camera = view.home.clone();
    }

    pub fn is_perspective(&self) -> bool {
        self.perspective
    }

    /// Swap the active camera and controls, then rebuild every graph for
    /// the new projection.
    pub fn set_perspective(&mut self, perspective: bool) {
        self.perspective = perspective;
        if perspective {
            self.perspective_view.controls = CameraControls::perspective(&self.speeds);
            self.ortho.controls = CameraControls::orthographic(&self.speeds).disabled();
        } else {
            self.ortho.controls = CameraControls::orthographic(&self.speeds);
            self.perspective_view.controls = CameraControls::perspective(&self.speeds).disabled();
        }

        let mut ctx = SceneContext::new(&mut self.scenes, perspective);
        for graph in &mut self.graphs {
            graph.init(&mut ctx);
        }
        tracing::info!("Projection: {}", if perspective { "perspective" } else { "orthographic" });
    }

    /// Switch every graph between black and RGB axes along with the
    /// projection.
    pub fn toggle_axis_colours(&mut self) {
        let coloured = self
            .graphs
            .first()
            .is_some_and(|graph| graph.axis_colours() == AxisColours::RGB);
        let colours = if coloured { AxisColours::BLACK } else { AxisColours::RGB };

        for graph in &mut self.graphs {
            graph.use_axis_colours(colours);
        }
        self.set_perspective(!self.perspective);
    }

    /// Toggle the grid on every graph. Returns the new state.
    pub fn toggle_grid(&mut self) -> bool {
        let show = !self.graphs.first().is_some_and(|graph| graph.show_grid());
        let mut ctx = SceneContext::new(&mut self.scenes, self.perspective);
        for graph in &mut self.graphs {
            graph.set_show_grid(show, &mut ctx);
        }
        show
    }

    /// Create and draw a graph at `origin`.
    pub fn add_graph(&mut self, origin: Vec3) -> GraphId {
        let id = GraphId(self.next_graph);
        self.next_graph += 1;

        let mut graph = Graph::new(id, origin);
        graph.init(&mut SceneContext::new(&mut self.scenes, self.perspective));
        self.graphs.push(graph);
        tracing::debug!("Added {} at {}", id, origin);
        id
    }

    /// Remove a graph and everything it drew.
    pub fn remove_graph(&mut self, id: GraphId) -> GraphResult<()> {
        let index = self.index_of(id)?;
        let mut graph = self.graphs.remove(index);
        graph.destroy(&mut SceneContext::new(&mut self.scenes, self.perspective));
        Ok(())
    }

    /// Grow or shrink the graph list to `count`, stacking new graphs above
    /// the last one. Graphs are removed from the end.
    pub fn resize_graph_count(&mut self, count: usize) {
        profile_function!();

        while self.graphs.len() > count {
            if let Some(mut graph) = self.graphs.pop() {
                graph.destroy(&mut SceneContext::new(&mut self.scenes, self.perspective));
            }
        }

        while self.graphs.len() < count {
            let origin = match self.graphs.last() {
                Some(last) => Vec3::new(
                    last.origin().x,
                    last.origin().y + last.limits().y.span() + GRAPH_SPACING,
                    0.0,
                ),
                None => Vec3::new(
                    -(self.viewport.width as f32) / 4.0,
                    -(self.viewport.height as f32) / 4.0,
                    0.0,
                ),
            };
            let id = self.add_graph(origin);
            if let Some((graph, mut ctx)) = self.graph_and_scenes_mut(id) {
                graph.set_axis_sections(STACKED_AXIS_SECTIONS, &mut ctx);
            }
        }
    }

    fn index_of(&self, id: GraphId) -> GraphResult<usize> {
        self.graphs
            .iter()
            .position(|graph| graph.id() == id)
            .ok_or(GraphError::UnknownGraph(id))
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    pub fn graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.iter().find(|graph| graph.id() == id)
    }

    /// Graph ids in display order.
    pub fn graph_ids(&self) -> Vec<GraphId> {
        self.graphs.iter().map(Graph::id).collect()
    }

    /// A graph together with the scenes it draws into.
    pub fn graph_and_scenes_mut(&mut self, id: GraphId) -> Option<(&mut Graph, SceneContext<'_>)> {
        let perspective = self.perspective;
        let graph = self.graphs.iter_mut().find(|graph| graph.id() == id)?;
        Some((graph, SceneContext::new(&mut self.scenes, perspective)))
    }

    /// Every graph together with the scenes.
    pub fn graphs_and_scenes_mut(&mut self) -> (&mut [Graph], SceneContext<'_>) {
        (
            &mut self.graphs,
            SceneContext::new(&mut self.scenes, self.perspective),
        )
    }

    /// Step every animating graph once. Returns how many are still running.
    pub fn step_animations(&mut self, now_ms: f64) -> usize {
        let mut ctx = SceneContext::new(&mut self.scenes, self.perspective);
        let mut running = 0;
        for graph in self.graphs.iter_mut().filter(|graph| graph.is_animating()) {
            graph.step_animation(now_ms, &mut ctx);
            if graph.is_animating() {
                running += 1;
            }
        }
        running
    }

    pub fn any_animating(&self) -> bool {
        self.graphs.iter().any(Graph::is_animating)
    }

    /// Move the perspective camera out past the graph's far corner.
    pub fn centre_view_on(&mut self, id: GraphId) -> GraphResult<()> {
        let index = self.index_of(id)?;
        let corner = Vec3::from_array(self.graphs[index].limits().maxs());
        self.perspective_view.camera.set_position(corner * 1.5);
        Ok(())
    }

    pub fn resize(&mut self, viewport: LogicalSize<u32>) {
        self.viewport = viewport;
        let (width, height) = (viewport.width as f32, viewport.height as f32);
        self.ortho.camera.set_viewport(width, height);
        self.perspective_view.camera.set_viewport(width, height);
    }

    pub fn viewport(&self) -> LogicalSize<u32> {
        self.viewport
    }

    fn active_view(&self) -> &View {
        if self.perspective { &self.perspective_view } else { &self.ortho }
    }

    fn active_view_mut(&mut self) -> &mut View {
        if self.perspective {
            &mut self.perspective_view
        } else {
            &mut self.ortho
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.active_view().camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.active_view_mut().camera
    }

    /// Controls of the active camera.
    pub fn controls(&self) -> CameraControls {
        self.active_view().controls
    }

    /// Controls of the camera that is not active. Always disabled.
    pub fn inactive_controls(&self) -> CameraControls {
        if self.perspective {
            self.ortho.controls
        } else {
            self.perspective_view.controls
        }
    }

    pub fn scenes(&self) -> &Scenes {
        &self.scenes
    }
}

fn ortho_camera(viewport: LogicalSize<u32>) -> Camera {
    let mut camera = Camera::orthographic(viewport.width as f32, viewport.height as f32, 0.001, FAR_PLANE);
    camera.look_at(ORTHO_START_POSITION, Vec3::ZERO, Vec3::Y);
    camera.set_zoom(ORTHO_ZOOM);
    camera
}

fn perspective_camera(viewport: LogicalSize<u32>) -> Camera {
    let mut camera = Camera::perspective(FOV_DEGREES, viewport.aspect_ratio(), 1.0, FAR_PLANE);
    camera.look_at(CAMERA_START_POSITION, Vec3::ZERO, Vec3::Y);
    camera
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NodeKind;

    fn space() -> GraphSpace {
        GraphSpace::new(LogicalSize::new(1280, 800), ControlsConfig::default())
    }

    #[test]
    fn test_initial_view() {
        let space = space();
        assert!(!space.is_perspective());
        assert!(space.camera().is_orthographic());
        assert_eq!(space.camera().position(), ORTHO_START_POSITION);
        assert_eq!(space.camera().zoom(), ORTHO_ZOOM);

        let controls = space.controls();
        assert!(!controls.rotate && controls.zoom && controls.pan);
        assert!(!space.inactive_controls().zoom);
    }

    #[test]
    fn test_perspective_swaps_camera_and_controls() {
        let mut space = space();
        space.set_perspective(true);
        assert!(!space.camera().is_orthographic());
        assert_eq!(space.camera().position(), CAMERA_START_POSITION);
        assert!(space.controls().rotate);
        assert!(!space.inactive_controls().pan);
    }

    #[test]
    fn test_stacked_graphs() {
        let mut space = space();
        space.resize_graph_count(3);
        let origins: Vec<Vec3> = space.graphs().iter().map(Graph::origin).collect();

        assert_eq!(origins[0], Vec3::new(-320.0, -200.0, 0.0));
        assert_eq!(origins[1], Vec3::new(-320.0, -200.0 + 500.0 + 150.0, 0.0));
        assert_eq!(origins[2].y, origins[1].y + 650.0);
        assert!(space.graphs().iter().all(|g| g.axis_sections() == STACKED_AXIS_SECTIONS));

        let first = space.graph_ids()[0];
        space.resize_graph_count(1);
        assert_eq!(space.graph_ids(), vec![first]);
    }

    #[test]
    fn test_remove_graph_clears_nodes() {
        let mut space = space();
        let id = space.add_graph(Vec3::ZERO);
        assert!(!space.scenes().main.is_empty());

        space.remove_graph(id).unwrap();
        assert!(space.scenes().main.is_empty());
        assert!(space.scenes().sprites.is_empty());
        assert!(matches!(space.remove_graph(id), Err(GraphError::UnknownGraph(_))));
    }

    #[test]
    fn test_toggle_axis_colours_flips_projection() {
        let mut space = space();
        let id = space.add_graph(Vec3::ZERO);

        space.toggle_axis_colours();
        assert!(space.is_perspective());
        assert_eq!(space.graph(id).unwrap().axis_colours(), AxisColours::RGB);

        space.toggle_axis_colours();
        assert!(!space.is_perspective());
        assert_eq!(space.graph(id).unwrap().axis_colours(), AxisColours::BLACK);
    }

    #[test]
    fn test_toggle_axis_colours_rebuilds_once() {
        let mut space = space();
        let id = space.add_graph(Vec3::ZERO);
        let graph = space.graph(id).unwrap();
        let (axes, grid) = (graph.axes_node().unwrap(), graph.grid_node().unwrap());
        let last = space.scenes().main.get(grid).unwrap().revision();

        space.toggle_axis_colours();
        let main = &space.scenes().main;
        assert_eq!(main.get(axes).unwrap().revision(), last + 1);
        assert_eq!(main.get(grid).unwrap().revision(), last + 2);
        let Some(NodeKind::Lines { segments, .. }) = main.get(axes).map(|node| node.kind()) else {
            panic!("axes should be lines");
        };
        assert_eq!(segments[0].color, AxisColours::RGB.x.to_array());
    }

    #[test]
    fn test_centre_view_and_reset_controls() {
        let mut space = space();
        let id = space.add_graph(Vec3::ZERO);
        space.set_perspective(true);

        space.centre_view_on(id).unwrap();
        assert_eq!(space.camera().position(), Vec3::new(1500.0, 750.0, 750.0));

        space.reset_controls();
        assert_eq!(space.camera().position(), CAMERA_START_POSITION);
    }

    #[test]
    fn test_step_animations_counts_running() {
        let mut space = space();
        space.resize_graph_count(2);
        let ids = space.graph_ids();
        {
            let (graph, mut ctx) = space.graph_and_scenes_mut(ids[0]).unwrap();
            graph.start_animation(100.0, 0.0, &mut ctx);
        }
        assert_eq!(space.step_animations(50.0), 1);

        let mut now = 50.0;
        while space.any_animating() {
            now += 16.0;
            space.step_animations(now);
        }
        assert_eq!(space.step_animations(now + 16.0), 0);
    }
}
