//! A single 3D graph: axes, grid, labels, plots and the reveal sweep.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::Vec3;
use teaplot_core::profiling::profile_function;
use teaplot_render::{Color, SpriteLabel, cuboid};

use crate::animation::{RevealAnimation, StartOutcome, StepOutcome};
use crate::axes::{AxisColours, Sections, grid_lines, principal_axes};
use crate::error::{GraphError, GraphResult};
use crate::labels::{self, NO_LABEL};
use crate::plot::{Plot, PlotFrame, PlotId};
use crate::range::{self, Axis, AxisRange, AxisRanges, ZoomPercentages};
use crate::scene::{NodeId, NodeKind, SceneContext};
use crate::series::DataSeries;
use crate::traits::{Animatable, Drawable, Scalable};

/// Default subdivisions of the tick markers.
pub const DEFAULT_AXIS_SECTIONS: Sections = Sections::uniform(8);
/// Default subdivisions of the grid.
pub const DEFAULT_GRID_SECTIONS: Sections = Sections::uniform(4);

pub const MARKER_DEPTH: f32 = 5.0;
pub const MARKER_OPACITY: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GraphId(pub(crate) u64);

impl GraphId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "graph {}", self.0)
    }
}

/// The translucent plane that travels with the sweep.
#[derive(Debug, Clone, Copy)]
struct SweepMarker {
    node: NodeId,
    /// Elapsed time of the sweep when last stepped.
    elapsed_ms: f64,
}

#[derive(Debug, Default)]
struct GraphNodes {
    axes: Option<NodeId>,
    grid: Option<NodeId>,
    markers: Option<NodeId>,
    name: Option<NodeId>,
    axis_labels: [Option<NodeId>; 3],
}

#[derive(Debug)]
pub struct Graph {
    id: GraphId,
    origin: Vec3,
    limits: AxisRanges,
    zoom_limits: AxisRanges,
    /// Values shown by the tick markers before label zoom.
    axis_label_range: AxisRanges,
    label_limits: AxisRanges,
    axis_sections: Sections,
    grid_sections: Sections,
    show_grid: bool,
    axis_colours: AxisColours,
    name: String,
    axis_labels: [Option<String>; 3],
    plots: Vec<Plot>,
    next_plot: u64,
    animation: RevealAnimation,
    marker: Option<SweepMarker>,
    nodes: GraphNodes,
}

impl Graph {
    /// A graph at `origin` with default limits. Nothing is drawn until
    /// [`Graph::init`].
    pub fn new(id: GraphId, origin: Vec3) -> Self {
        let limits = AxisRanges::graph_default();
        Self {
            id,
            origin,
            limits,
            zoom_limits: limits,
            axis_label_range: AxisRanges::ZERO,
            label_limits: AxisRanges::ZERO,
            axis_sections: DEFAULT_AXIS_SECTIONS,
            grid_sections: DEFAULT_GRID_SECTIONS,
            show_grid: true,
            axis_colours: AxisColours::default(),
            name: String::new(),
            axis_labels: Default::default(),
            plots: Vec::new(),
            next_plot: 0,
            animation: RevealAnimation::new(),
            marker: None,
            nodes: GraphNodes::default(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn limits(&self) -> &AxisRanges {
        &self.limits
    }

    pub fn zoom_limits(&self) -> &AxisRanges {
        &self.zoom_limits
    }

    pub fn axis_label_range(&self) -> &AxisRanges {
        &self.axis_label_range
    }

    /// Label range after [`Graph::zoom_labels`].
    pub fn label_limits(&self) -> &AxisRanges {
        &self.label_limits
    }

    pub fn axis_sections(&self) -> Sections {
        self.axis_sections
    }

    pub fn grid_sections(&self) -> Sections {
        self.grid_sections
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn axis_colours(&self) -> AxisColours {
        self.axis_colours
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis_label(&self, axis: Axis) -> Option<&str> {
        self.axis_labels[axis.index()].as_deref()
    }

    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|plot| plot.id() == id)
    }

    pub fn animation(&self) -> &RevealAnimation {
        &self.animation
    }

    pub fn marker_node(&self) -> Option<NodeId> {
        self.marker.map(|marker| marker.node)
    }

    pub fn axes_node(&self) -> Option<NodeId> {
        self.nodes.axes
    }

    pub fn grid_node(&self) -> Option<NodeId> {
        self.nodes.grid
    }

    pub fn markers_node(&self) -> Option<NodeId> {
        self.nodes.markers
    }

    pub fn name_node(&self) -> Option<NodeId> {
        self.nodes.name
    }

    pub fn axis_label_node(&self, axis: Axis) -> Option<NodeId> {
        self.nodes.axis_labels[axis.index()]
    }

    fn frame(&self) -> PlotFrame {
        PlotFrame {
            origin: self.origin,
            limits: self.limits,
            zoom_limits: self.zoom_limits,
        }
    }

    /// Rebuild the axes, grid and labels for the current projection.
    pub fn init(&mut self, ctx: &mut SceneContext<'_>) {
        profile_function!();

        let axes = principal_axes(self.origin, &self.limits, self.axis_colours, ctx.perspective);
        ctx.main.upsert(
            &mut self.nodes.axes,
            NodeKind::Lines {
                segments: axes,
                translucent: false,
            },
        );

        if self.show_grid {
            let grid = grid_lines(self.origin, &self.limits, self.grid_sections, ctx.perspective);
            ctx.main.upsert(
                &mut self.nodes.grid,
                NodeKind::Lines {
                    segments: grid,
                    translucent: true,
                },
            );
        } else {
            ctx.main.remove_slot(&mut self.nodes.grid);
        }

        self.update_axis_labels(ctx);
        self.update_name(ctx);
        for axis in Axis::ALL {
            self.update_axis_label(axis, ctx);
        }
    }

    /// Rebuild the titles and tick markers only.
    pub fn update_axis_labels(&mut self, ctx: &mut SceneContext<'_>) {
        let mut sprites = labels::axis_titles(self.origin, &self.limits, ctx.perspective);
        for axis in Axis::ALL {
            if axis == Axis::Z && !ctx.perspective {
                continue;
            }
            sprites.extend(labels::axis_markers(
                axis,
                self.origin,
                self.label_limits.get(axis),
                self.axis_sections.get(axis),
                self.limits.get(axis),
            ));
        }
        ctx.sprites.upsert(&mut self.nodes.markers, NodeKind::Sprites(sprites));
    }

    fn update_name(&mut self, ctx: &mut SceneContext<'_>) {
        match labels::name_label(&self.name, self.origin, &self.limits) {
            Some(label) => {
                ctx.sprites.upsert(&mut self.nodes.name, NodeKind::Sprites(vec![label]));
            }
            None => {
                ctx.sprites.remove_slot(&mut self.nodes.name);
            }
        }
    }

    fn update_axis_label(&mut self, axis: Axis, ctx: &mut SceneContext<'_>) {
        let slot = &mut self.nodes.axis_labels[axis.index()];
        let label = self.axis_labels[axis.index()]
            .as_deref()
            .and_then(|text| labels::axis_label(axis, text, self.origin, &self.limits));

        match label {
            Some(label) => {
                let id = ctx.sprites.upsert(slot, NodeKind::Sprites(vec![label]));
                ctx.sprites.set_visible(id, axis != Axis::Z || ctx.perspective);
            }
            None => {
                ctx.sprites.remove_slot(slot);
            }
        }
    }

    /// Set the metric label of one axis. `"NOTHING"` leaves the axis as is.
    pub fn set_axis_label(&mut self, axis: Axis, text: &str, ctx: &mut SceneContext<'_>) {
        if text == NO_LABEL {
            return;
        }
        self.axis_labels[axis.index()] = Some(text.to_string());
        self.update_axis_label(axis, ctx);
    }

    pub fn set_name(&mut self, name: impl Into<String>, ctx: &mut SceneContext<'_>) {
        self.name = name.into();
        self.update_name(ctx);
    }

    pub fn set_show_grid(&mut self, show: bool, ctx: &mut SceneContext<'_>) {
        self.show_grid = show;
        self.init(ctx);
    }

    pub fn set_axis_colours(&mut self, colours: AxisColours, ctx: &mut SceneContext<'_>) {
        self.axis_colours = colours;
        self.init(ctx);
    }

    /// Swap the axis colours without rebuilding; the next `init` picks
    /// them up.
    pub(crate) fn use_axis_colours(&mut self, colours: AxisColours) {
        self.axis_colours = colours;
    }

    pub fn set_axis_sections(&mut self, sections: Sections, ctx: &mut SceneContext<'_>) {
        self.axis_sections = sections;
        self.update_axis_labels(ctx);
    }

    pub fn set_grid_sections(&mut self, sections: Sections, ctx: &mut SceneContext<'_>) {
        self.grid_sections = sections;
        self.init(ctx);
    }

    /// Set the values shown along one axis and clear any label zoom on it.
    pub fn set_axis_label_range(&mut self, axis: Axis, range: AxisRange, ctx: &mut SceneContext<'_>) {
        self.axis_label_range.set(axis, range);
        self.label_limits.set(axis, range);
        self.update_axis_labels(ctx);
    }

    /// Add a plot built from `series` in the current zoom.
    pub fn add_plot(&mut self, series: DataSeries, ctx: &mut SceneContext<'_>) -> GraphResult<PlotId> {
        let id = PlotId(self.next_plot);
        let mut plot = Plot::new(id, self.id, series, &self.frame())?;
        self.next_plot += 1;

        plot.draw(ctx);
        self.plots.push(plot);
        Ok(id)
    }

    pub fn delete_plot(&mut self, id: PlotId, ctx: &mut SceneContext<'_>) -> bool {
        let Some(index) = self.plots.iter().position(|plot| plot.id() == id) else {
            return false;
        };
        let mut plot = self.plots.remove(index);
        plot.erase(ctx);
        self.clean_up_axis_labels(ctx);
        true
    }

    pub fn delete_plots(&mut self, ctx: &mut SceneContext<'_>) {
        for mut plot in self.plots.drain(..) {
            plot.erase(ctx);
        }
        self.clean_up_axis_labels(ctx);
    }

    /// Axis labels describe plotted data, so they go with the last plot.
    fn clean_up_axis_labels(&mut self, ctx: &mut SceneContext<'_>) {
        if !self.plots.is_empty() {
            return;
        }
        for axis in Axis::ALL {
            self.axis_labels[axis.index()] = None;
            ctx.sprites.remove_slot(&mut self.nodes.axis_labels[axis.index()]);
        }
    }

    /// Remove everything the graph put in the scenes, plots included.
    pub fn destroy(&mut self, ctx: &mut SceneContext<'_>) {
        self.animation.stop();
        self.erase(ctx);
        self.plots.clear();
        tracing::debug!("Destroyed {}", self.id);
    }

    /// Move the graph to a new origin.
    pub fn set_origin(&mut self, origin: Vec3, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        self.origin = origin;
        self.reframe_plots(ctx)?;
        self.init(ctx);
        Ok(())
    }

    /// Narrow the visible window of every plot to `percentages` of the
    /// graph limits.
    pub fn zoom(&mut self, percentages: &ZoomPercentages, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        let zoom_limits = self.limits.zoomed(percentages)?;
        for plot in &mut self.plots {
            plot.set_limits(&zoom_limits, ctx)?;
        }
        self.zoom_limits = zoom_limits;
        Ok(())
    }

    /// Rescale the tick marker values to `percentages` of the label range.
    ///
    /// Axes without a label range keep drawing no markers.
    pub fn zoom_labels(&mut self, percentages: &ZoomPercentages, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        let mut label_limits = self.axis_label_range;
        for axis in Axis::ALL {
            let percent = range::percent(axis, percentages);
            range::validate_percent(axis, percent)?;

            let label_range = self.axis_label_range.get(axis);
            if !label_range.is_degenerate() {
                label_limits.set(axis, label_range.zoomed(axis, percent)?);
            }
        }
        self.label_limits = label_limits;
        self.update_axis_labels(ctx);
        Ok(())
    }

    /// Carry every plot into the current frame. Without a sweep in
    /// progress the whole new x span is shown.
    fn reframe_plots(&mut self, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        let frame = self.frame();
        let reveal = self.marker.is_none();
        for plot in &mut self.plots {
            plot.set_frame(&frame, ctx)?;
            if reveal {
                plot.make_points_visible(frame.limits.x.max(), ctx);
            }
        }
        Ok(())
    }

    fn sweep(&self) -> (f32, f32) {
        let start = self.origin.x;
        (start, start + self.limits.x.min() + self.limits.x.max())
    }

    fn marker_mesh(&self, x: f32) -> NodeKind {
        let centre = Vec3::new(
            x,
            self.origin.y + (self.limits.y.max() + self.limits.y.min()) / 2.0,
            self.origin.z + (self.limits.z.max() + self.limits.z.min()) / 2.0,
        );
        let size = Vec3::new(self.limits.z.span(), self.limits.y.span(), MARKER_DEPTH);
        NodeKind::Mesh(cuboid(
            centre,
            size,
            FRAC_PI_2,
            Color::RED.with_alpha(MARKER_OPACITY),
        ))
    }

    fn remove_marker(&mut self, ctx: &mut SceneContext<'_>) {
        if let Some(marker) = self.marker.take() {
            ctx.main.remove(marker.node);
        }
    }

    fn reveal_up_to(&mut self, up_to: f32, ctx: &mut SceneContext<'_>) {
        for plot in &mut self.plots {
            plot.make_points_visible(up_to, ctx);
        }
    }

    /// Stop, drop the sweep progress and start again from the beginning.
    pub fn reset_animation(&mut self, duration_ms: f64, now_ms: f64, ctx: &mut SceneContext<'_>) -> StartOutcome {
        self.animation.stop();
        self.remove_marker(ctx);
        self.start_animation(duration_ms, now_ms, ctx)
    }
}

impl Drawable for Graph {
    fn draw(&mut self, ctx: &mut SceneContext<'_>) {
        self.init(ctx);
        for plot in &mut self.plots {
            plot.draw(ctx);
        }
    }

    fn erase(&mut self, ctx: &mut SceneContext<'_>) {
        ctx.main.remove_slot(&mut self.nodes.axes);
        ctx.main.remove_slot(&mut self.nodes.grid);
        ctx.sprites.remove_slot(&mut self.nodes.markers);
        ctx.sprites.remove_slot(&mut self.nodes.name);
        for slot in &mut self.nodes.axis_labels {
            ctx.sprites.remove_slot(slot);
        }
        self.remove_marker(ctx);
        for plot in &mut self.plots {
            plot.erase(ctx);
        }
    }
}

impl Scalable for Graph {
    /// Replace the graph limits. Zoom is reset to the full range.
    fn set_limits(&mut self, limits: &AxisRanges, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        if let Some(axis) = limits.degenerate_axis() {
            return Err(GraphError::DegenerateRange { axis });
        }

        self.limits = *limits;
        self.zoom_limits = *limits;
        self.reframe_plots(ctx)?;
        self.init(ctx);
        Ok(())
    }
}

impl Animatable for Graph {
    /// Start the sweep, resuming a stopped one. The first step runs
    /// immediately.
    fn start_animation(&mut self, duration_ms: f64, now_ms: f64, ctx: &mut SceneContext<'_>) -> StartOutcome {
        if self.animation.is_animating() {
            tracing::warn!("{} is already animating", self.id);
            return StartOutcome::AlreadyAnimating;
        }

        let (start, end) = self.sweep();
        let elapsed_ms = match self.marker {
            Some(marker) => marker.elapsed_ms,
            None => {
                let node = ctx.main.add(self.marker_mesh(start));
                self.marker = Some(SweepMarker {
                    node,
                    elapsed_ms: 0.0,
                });
                0.0
            }
        };

        tracing::debug!("{}: sweep {}..{} over {}ms from {}ms", self.id, start, end, duration_ms, elapsed_ms);
        let outcome = self.animation.start(start, end, duration_ms, elapsed_ms, now_ms);
        self.step_animation(now_ms, ctx);
        outcome
    }

    fn step_animation(&mut self, now_ms: f64, ctx: &mut SceneContext<'_>) -> StepOutcome {
        let outcome = self.animation.step(now_ms);
        let (start, _) = self.sweep();

        match outcome {
            StepOutcome::Idle => {}
            StepOutcome::Progress { position, elapsed } => {
                self.reveal_up_to(position - start, ctx);
                let mesh = self.marker_mesh(position);
                if let Some(marker) = self.marker.as_mut() {
                    marker.elapsed_ms = elapsed;
                    ctx.main.replace(marker.node, mesh);
                }
            }
            StepOutcome::Finished { position, .. } => {
                self.reveal_up_to(position - start, ctx);
                self.remove_marker(ctx);
                tracing::debug!("{}: sweep finished", self.id);
            }
        }
        outcome
    }

    fn stop_animation(&mut self) -> bool {
        self.animation.stop()
    }

    fn is_animating(&self) -> bool {
        self.animation.is_animating()
    }
}

/// Labels currently attached to a graph's marker node, for inspection.
pub fn marker_labels<'a>(graph: &Graph, ctx: &'a SceneContext<'_>) -> &'a [SpriteLabel] {
    match graph
        .markers_node()
        .and_then(|id| ctx.sprites.get(id))
        .map(|node| node.kind())
    {
        Some(NodeKind::Sprites(sprites)) => sprites,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scenes;
    use teaplot_core::config::PercentRange;

    fn segment_count(ctx: &SceneContext<'_>, id: Option<NodeId>) -> usize {
        match id.and_then(|id| ctx.main.get(id)).map(|node| node.kind()) {
            Some(NodeKind::Lines { segments, .. }) => segments.len(),
            _ => 0,
        }
    }

    fn graph() -> Graph {
        Graph::new(GraphId(0), Vec3::new(-320.0, -240.0, 0.0))
    }

    #[test]
    fn test_init_builds_axes_and_grid() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        graph.init(&mut ctx);

        assert_eq!(segment_count(&ctx, graph.axes_node()), 2);
        assert_eq!(segment_count(&ctx, graph.grid_node()), 10);
        // X and Y titles; no label range means no markers.
        assert_eq!(marker_labels(&graph, &ctx).len(), 2);

        ctx.perspective = true;
        graph.init(&mut ctx);
        assert_eq!(segment_count(&ctx, graph.axes_node()), 3);
        assert_eq!(segment_count(&ctx, graph.grid_node()), 75);
        assert_eq!(ctx.main.len(), 2);
    }

    #[test]
    fn test_grid_toggle_removes_lines() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        graph.init(&mut ctx);

        graph.set_show_grid(false, &mut ctx);
        assert!(graph.grid_node().is_none());
        assert_eq!(ctx.main.len(), 1);

        graph.set_show_grid(true, &mut ctx);
        assert_eq!(segment_count(&ctx, graph.grid_node()), 10);
    }

    #[test]
    fn test_markers_follow_sections() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        graph.init(&mut ctx);

        graph.set_axis_label_range(Axis::X, AxisRange::new(0.0, 80.0).unwrap(), &mut ctx);
        graph.set_axis_label_range(Axis::Y, AxisRange::new(0.0, 40.0).unwrap(), &mut ctx);
        graph.set_axis_label_range(Axis::Z, AxisRange::new(0.0, 4.0).unwrap(), &mut ctx);
        // 2 titles + 9 x markers + 9 y markers; z markers only in perspective.
        assert_eq!(marker_labels(&graph, &ctx).len(), 20);

        ctx.perspective = true;
        graph.init(&mut ctx);
        assert_eq!(marker_labels(&graph, &ctx).len(), 3 + 27);
    }

    #[test]
    fn test_zoom_labels_rescales_values() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        graph.init(&mut ctx);
        graph.set_axis_label_range(Axis::X, AxisRange::new(0.0, 200.0).unwrap(), &mut ctx);

        let zoom = ZoomPercentages {
            x: PercentRange { min: 50.0, max: 100.0 },
            ..Default::default()
        };
        graph.zoom_labels(&zoom, &mut ctx).unwrap();

        assert_eq!(graph.label_limits().x, AxisRange::new(100.0, 200.0).unwrap());
        // Untouched axes without a label range stay empty.
        assert_eq!(graph.label_limits().y, AxisRange::ZERO);

        let texts: Vec<&str> = marker_labels(&graph, &ctx).iter().map(|l| l.text.as_str()).collect();
        assert!(texts.contains(&"100"));
        assert!(texts.contains(&"200"));
        assert!(!texts.contains(&"0"));
    }

    #[test]
    fn test_set_limits_rejects_degenerate() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();

        let mut limits = AxisRanges::graph_default();
        limits.x = AxisRange::ZERO;
        assert!(matches!(
            graph.set_limits(&limits, &mut ctx),
            Err(GraphError::DegenerateRange { axis: Axis::X })
        ));
        assert_eq!(*graph.limits(), AxisRanges::graph_default());
    }

    #[test]
    fn test_zoom_updates_plot_uniforms() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        let plot = graph
            .add_plot(DataSeries::new(vec![vec![100.0, 10.0], vec![900.0, 10.0]]), &mut ctx)
            .unwrap();

        let zoom = ZoomPercentages {
            x: PercentRange { min: 0.0, max: 50.0 },
            ..Default::default()
        };
        graph.zoom(&zoom, &mut ctx).unwrap();

        assert_eq!(graph.zoom_limits().x.max(), 500.0);
        let plot = graph.plot(plot).unwrap();
        assert_eq!(plot.uniform().max[0], 500.0);
        assert_eq!(plot.visible_count(&ctx), 1);
    }

    #[test]
    fn test_axis_labels_cleaned_with_last_plot() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();

        let a = graph.add_plot(DataSeries::new(vec![vec![1.0, 1.0]]), &mut ctx).unwrap();
        let b = graph.add_plot(DataSeries::new(vec![vec![2.0, 2.0]]), &mut ctx).unwrap();
        graph.set_axis_label(Axis::X, "TIME", &mut ctx);
        graph.set_axis_label(Axis::Y, "NOTHING", &mut ctx);
        assert_eq!(graph.axis_label(Axis::X), Some("TIME"));
        assert!(graph.axis_label_node(Axis::Y).is_none());

        assert!(graph.delete_plot(a, &mut ctx));
        assert!(graph.axis_label_node(Axis::X).is_some());

        assert!(graph.delete_plot(b, &mut ctx));
        assert!(!graph.delete_plot(b, &mut ctx));
        assert!(graph.axis_label_node(Axis::X).is_none());
        assert!(ctx.main.is_empty());
    }

    #[test]
    fn test_z_label_hidden_in_ortho() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        graph.set_axis_label(Axis::Z, "seq", &mut ctx);

        let id = graph.axis_label_node(Axis::Z).unwrap();
        assert!(!ctx.sprites.get(id).unwrap().is_visible());

        ctx.perspective = true;
        graph.init(&mut ctx);
        assert!(ctx.sprites.get(id).unwrap().is_visible());
    }

    #[test]
    fn test_sweep_reveals_and_cleans_up() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();
        let plot = graph
            .add_plot(DataSeries::new(vec![vec![100.0, 10.0], vec![900.0, 10.0]]), &mut ctx)
            .unwrap();

        assert_eq!(graph.start_animation(1000.0, 0.0, &mut ctx), StartOutcome::Started);
        assert!(graph.marker_node().is_some());
        assert_eq!(graph.plot(plot).unwrap().visible_count(&ctx), 0);

        graph.step_animation(500.0, &mut ctx);
        graph.step_animation(600.0, &mut ctx);
        assert_eq!(graph.plot(plot).unwrap().visible_count(&ctx), 1);

        let mut now = 600.0;
        while graph.is_animating() {
            now += 16.0;
            graph.step_animation(now, &mut ctx);
        }
        assert!(graph.marker_node().is_none());
        assert_eq!(graph.plot(plot).unwrap().visible_count(&ctx), 2);
        assert_eq!(ctx.main.len(), 1);
    }

    #[test]
    fn test_stop_then_start_resumes() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();

        graph.start_animation(1000.0, 0.0, &mut ctx);
        graph.step_animation(200.0, &mut ctx);
        graph.step_animation(400.0, &mut ctx);
        assert!(graph.stop_animation());
        let marker = graph.marker_node();
        assert!(marker.is_some());

        assert_eq!(
            graph.start_animation(1000.0, 10_000.0, &mut ctx),
            StartOutcome::Started
        );
        assert_eq!(graph.marker_node(), marker);
        // Resumes at the elapsed time of the last step, not from zero.
        assert_eq!(graph.animation().elapsed_ms(), 200.0);
        assert_eq!(
            graph.start_animation(1000.0, 10_000.0, &mut ctx),
            StartOutcome::AlreadyAnimating
        );
    }

    #[test]
    fn test_reset_starts_from_zero() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut graph = graph();

        graph.start_animation(1000.0, 0.0, &mut ctx);
        graph.step_animation(300.0, &mut ctx);
        graph.step_animation(600.0, &mut ctx);

        graph.reset_animation(1000.0, 1000.0, &mut ctx);
        assert!(graph.is_animating());
        assert_eq!(graph.animation().elapsed_ms(), 0.0);
        assert!((graph.animation().position() - graph.origin().x).abs() < 1e-4);
    }

    #[test]
    fn test_destroy_clears_scenes() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, true);
        let mut graph = graph();
        graph.init(&mut ctx);
        graph.set_name("cwnd", &mut ctx);
        graph.add_plot(DataSeries::new(vec![vec![1.0, 1.0]]), &mut ctx).unwrap();
        graph.start_animation(1000.0, 0.0, &mut ctx);

        graph.destroy(&mut ctx);
        assert!(ctx.main.is_empty());
        assert!(ctx.sprites.is_empty());
        assert!(graph.plots().is_empty());
        assert!(!graph.is_animating());
    }
}
