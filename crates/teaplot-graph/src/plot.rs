//! Point clouds built from a [`DataSeries`].

use glam::Vec3;
use teaplot_core::profiling::profile_function;
use teaplot_render::{PlotInstance, PlotUniform};

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphId;
use crate::normalize::is_point_visible;
use crate::range::{AxisRange, AxisRanges};
use crate::scene::{NodeId, NodeKind, SceneContext};
use crate::series::DataSeries;
use crate::traits::{Drawable, Scalable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PlotId(pub(crate) u64);

/// Where a plot sits: the owning graph's origin, its full limits (whose
/// maxima become the axis spans) and the current zoom limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    pub origin: Vec3,
    pub limits: AxisRanges,
    pub zoom_limits: AxisRanges,
}

/// One drawable point cloud owned by a graph.
///
/// The raw samples of the series are drained into scaled instances at
/// construction; the shader maps them into the graph frame using
/// [`PlotUniform`], so zooming and the reveal sweep never touch the
/// instances again.
#[derive(Debug)]
pub struct Plot {
    id: PlotId,
    graph: GraphId,
    series: DataSeries,
    /// Held here while detached, moved into the scene node while drawn.
    instances: Vec<PlotInstance>,
    point_count: usize,
    uniform: PlotUniform,
    node: Option<NodeId>,
}

impl Plot {
    /// Build a plot from `series`, which is left without samples.
    ///
    /// Fails if any sample lacks 2 or 3 finite components.
    pub fn new(id: PlotId, graph: GraphId, mut series: DataSeries, frame: &PlotFrame) -> GraphResult<Self> {
        profile_function!();

        series.validate()?;
        let samples = series.take_samples();
        let mut instances = Vec::with_capacity(samples.len());

        for sample in &samples {
            let x = sample[0] * series.x_scale;
            let y = sample[1] * series.y_scale;
            let z = sample.get(2).map_or(0.0, |z| z * series.z_scale);
            instances.push(PlotInstance::new(x as f32, y as f32, z as f32));
        }

        let uniform = PlotUniform::new(
            frame.origin.to_array(),
            frame.zoom_limits.mins(),
            frame.zoom_limits.maxs(),
            frame.limits.maxs(),
            series.colour,
            frame.limits.x.max(),
        );

        tracing::debug!("Plot {:?} of {:?}: {} points", id, graph, instances.len());

        Ok(Self {
            id,
            graph,
            series,
            point_count: instances.len(),
            instances,
            uniform,
            node: None,
        })
    }

    pub fn id(&self) -> PlotId {
        self.id
    }

    /// The graph this plot belongs to.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn series(&self) -> &DataSeries {
        &self.series
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn uniform(&self) -> &PlotUniform {
        &self.uniform
    }

    pub fn up_to(&self) -> f32 {
        self.uniform.up_to
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Current limits as seen by the shader.
    pub fn limits(&self) -> AxisRanges {
        let [x0, y0, z0, _] = self.uniform.min;
        let [x1, y1, z1, _] = self.uniform.max;
        let range = |min: f32, max: f32| AxisRange::new(min, max).unwrap_or(AxisRange::ZERO);
        AxisRanges::new(range(x0, x1), range(y0, y1), range(z0, z1))
    }

    /// Hide every point whose normalized x exceeds `up_to`.
    pub fn make_points_visible(&mut self, up_to: f32, ctx: &mut SceneContext<'_>) {
        self.uniform.up_to = up_to;
        self.sync_uniform(ctx);
    }

    /// Points the shader would draw with the current uniforms.
    pub fn visible_count(&self, ctx: &SceneContext<'_>) -> usize {
        let instances = match self.node.and_then(|id| ctx.main.get(id)).map(|node| node.kind()) {
            Some(NodeKind::PointCloud { instances, .. }) => instances.as_slice(),
            _ => self.instances.as_slice(),
        };
        let limits = self.limits();
        let axes = [self.uniform.axes[0], self.uniform.axes[1], self.uniform.axes[2]];
        instances
            .iter()
            .filter(|instance| is_point_visible(instance.value, &limits, axes, self.uniform.up_to))
            .count()
    }

    fn sync_uniform(&self, ctx: &mut SceneContext<'_>) {
        if let Some(uniform) = self.node.and_then(|id| ctx.main.plot_uniform_mut(id)) {
            *uniform = self.uniform;
        }
    }
}

impl Drawable for Plot {
    fn draw(&mut self, ctx: &mut SceneContext<'_>) {
        if self.node.is_some_and(|id| ctx.main.contains(id)) {
            return;
        }
        let id = ctx.main.add(NodeKind::PointCloud {
            instances: std::mem::take(&mut self.instances),
            uniform: self.uniform,
        });
        self.node = Some(id);
    }

    fn erase(&mut self, ctx: &mut SceneContext<'_>) {
        if let Some(node) = ctx.main.remove_slot(&mut self.node) {
            if let NodeKind::PointCloud { instances, .. } = node.into_kind() {
                self.instances = instances;
            }
        }
    }
}

impl Scalable for Plot {
    /// Point the shader at new zoom limits. The axis spans stay fixed.
    fn set_limits(&mut self, limits: &AxisRanges, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        if let Some(axis) = limits.degenerate_axis() {
            return Err(GraphError::DegenerateRange { axis });
        }
        let [x0, y0, z0] = limits.mins();
        let [x1, y1, z1] = limits.maxs();
        self.uniform.min = [x0, y0, z0, 0.0];
        self.uniform.max = [x1, y1, z1, 0.0];
        self.sync_uniform(ctx);
        Ok(())
    }
}

impl Plot {
    /// Move the plot into a new frame: origin and axis spans change too.
    pub(crate) fn set_frame(&mut self, frame: &PlotFrame, ctx: &mut SceneContext<'_>) -> GraphResult<()> {
        let [ox, oy, oz] = frame.origin.to_array();
        let [ax, ay, az] = frame.limits.maxs();
        self.uniform.origin = [ox, oy, oz, 0.0];
        self.uniform.axes = [ax, ay, az, 0.0];
        self.set_limits(&frame.zoom_limits, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scenes;
    use teaplot_render::Color;

    fn frame() -> PlotFrame {
        PlotFrame {
            origin: Vec3::new(-10.0, -20.0, 0.0),
            limits: AxisRanges::graph_default(),
            zoom_limits: AxisRanges::graph_default(),
        }
    }

    #[test]
    fn test_plot_drains_series() {
        let series = DataSeries::new(vec![vec![1.0, 2.0], vec![3.0, 4.0, 5.0]])
            .with_scales(10.0, 2.0, 3.0)
            .with_colour(Color::RED);
        let plot = Plot::new(PlotId(0), GraphId(0), series, &frame()).unwrap();

        assert!(plot.series().is_empty());
        assert_eq!(plot.point_count(), 2);
        assert_eq!(plot.instances[0].value, [10.0, 4.0, 0.0]);
        assert_eq!(plot.instances[1].value, [30.0, 8.0, 15.0]);
        assert_eq!(plot.uniform().color, Color::RED.to_array());
    }

    #[test]
    fn test_initial_uniforms_show_everything() {
        let plot = Plot::new(PlotId(0), GraphId(3), DataSeries::default(), &frame()).unwrap();
        assert_eq!(plot.up_to(), 1000.0);
        assert_eq!(plot.uniform().axes, [1000.0, 500.0, 500.0, 0.0]);
        assert_eq!(plot.uniform().origin, [-10.0, -20.0, 0.0, 0.0]);
        assert_eq!(plot.graph(), GraphId(3));
    }

    #[test]
    fn test_malformed_samples_rejected() {
        let short = DataSeries::new(vec![vec![1.0, 2.0], vec![1.0]]);
        assert!(matches!(
            Plot::new(PlotId(0), GraphId(0), short, &frame()),
            Err(GraphError::InvalidSeries { index: 1, .. })
        ));

        let nan = DataSeries::new(vec![vec![1.0, f64::NAN]]);
        assert!(Plot::new(PlotId(0), GraphId(0), nan, &frame()).is_err());
    }

    #[test]
    fn test_draw_and_erase_keep_geometry() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let series = DataSeries::new(vec![vec![1.0, 2.0]; 4]);
        let mut plot = Plot::new(PlotId(0), GraphId(0), series, &frame()).unwrap();

        plot.draw(&mut ctx);
        plot.draw(&mut ctx);
        assert_eq!(ctx.main.len(), 1);
        assert_eq!(plot.visible_count(&ctx), 4);

        plot.erase(&mut ctx);
        assert!(ctx.main.is_empty());
        assert_eq!(plot.instances.len(), 4);
    }

    #[test]
    fn test_uniform_updates_reach_scene() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let series = DataSeries::new(vec![vec![100.0, 10.0], vec![600.0, 10.0]]);
        let mut plot = Plot::new(PlotId(0), GraphId(0), series, &frame()).unwrap();
        plot.draw(&mut ctx);

        plot.make_points_visible(300.0, &mut ctx);
        assert_eq!(plot.visible_count(&ctx), 1);

        let id = plot.node().unwrap();
        assert_eq!(ctx.main.plot_uniform_mut(id).map(|u| u.up_to), Some(300.0));
    }

    #[test]
    fn test_degenerate_limits_rejected() {
        let mut scenes = Scenes::new();
        let mut ctx = SceneContext::new(&mut scenes, false);
        let mut plot = Plot::new(PlotId(0), GraphId(0), DataSeries::default(), &frame()).unwrap();

        let mut limits = AxisRanges::graph_default();
        limits.y = AxisRange::new(5.0, 5.0).unwrap();
        assert!(plot.set_limits(&limits, &mut ctx).is_err());
        assert_eq!(plot.uniform().max[1], 500.0);
    }
}
