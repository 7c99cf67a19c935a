//! Turning a [`DataDocument`] into plots on the graphs of a [`GraphSpace`].

use teaplot_core::alloc::HashMap;
use teaplot_core::config::{PercentRange, ViewerConfig};
use teaplot_core::profiling::profile_function;
use teaplot_render::Color;

use crate::error::{GraphError, GraphResult};
use crate::graph::GraphId;
use crate::range::{self, Axis, ZoomPercentages};
use crate::series::{DataSeries, Sample, validate_samples};
use crate::source::DataDocument;
use crate::space::GraphSpace;

/// Flow colours, assigned in first-seen order.
pub const PALETTE: [u32; 10] = [
    0xf44336, 0x3f51b5, 0x4caf50, 0xff9800, 0x2196f3, 0x009688, 0xffeb3b, 0x00bcd4, 0xcddc39,
    0x607d8b,
];

/// Colour of the `index`-th distinct flow. Wraps after the palette ends.
pub fn palette_colour(index: usize) -> Color {
    Color::from_hex(PALETTE[index % PALETTE.len()])
}

/// Flow names and their colours, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Legend {
    entries: Vec<(String, Color)>,
}

impl Legend {
    /// Colour of `flow`, assigning the next palette entry if it is new.
    fn colour_for(&mut self, flow: &str) -> Color {
        if let Some(colour) = self.get(flow) {
            return colour;
        }
        let colour = palette_colour(self.entries.len());
        self.entries.push((flow.to_string(), colour));
        colour
    }

    pub fn get(&self, flow: &str) -> Option<Color> {
        self.entries
            .iter()
            .find(|(name, _)| name == flow)
            .map(|(_, colour)| *colour)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.entries.iter().map(|(name, colour)| (name.as_str(), *colour))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Viewer settings that shape how a document is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ApplyOptions {
    /// Start of the time window, in data units. `0` means the beginning.
    pub start_time: f64,
    /// End of the time window. `0` means the end.
    pub end_time: f64,
    /// Zoom of every axis. The x window is replaced by the time window.
    pub zoom: ZoomPercentages,
}

impl From<&ViewerConfig> for ApplyOptions {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            start_time: config.start_time,
            end_time: config.end_time,
            zoom: config.zoom,
        }
    }
}

/// Largest non-negative value per component.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Highest {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Highest {
    fn merge(&mut self, other: Highest) {
        self.x = self.x.max(other.x);
        self.y = self.y.max(other.y);
        self.z = self.z.max(other.z);
    }
}

pub fn highest(samples: &[Sample]) -> Highest {
    let mut high = Highest::default();
    for sample in samples {
        let component = |i: usize| sample.get(i).copied().unwrap_or(0.0);
        if component(0) > high.x {
            high.x = component(0);
        }
        if component(1) > high.y {
            high.y = component(1);
        }
        if sample.len() == 3 && component(2) > high.z {
            high.z = component(2);
        }
    }
    high
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// The x zoom window selected by a start and end time.
///
/// Times only apply when they describe a window inside the data
/// (`start < end`, or only a start) with `end` before `highest_time`.
pub fn time_window_percentages(start: f64, end: f64, highest_time: f64) -> PercentRange {
    let full = PercentRange::default();
    let applies = (start < end || (start > 0.0 && end == 0.0)) && end < highest_time;
    if !applies || highest_time <= 0.0 {
        return full;
    }

    let mut window = full;
    if start > 0.0 {
        window.min = round_to_tenth(start / highest_time * 100.0);
    }
    if end > 0.0 {
        window.max = round_to_tenth(end / highest_time * 100.0);
    }

    if window.min >= window.max || window.max > 100.0 {
        tracing::warn!(
            "Time window {}..{} collapses against {}, showing everything",
            start,
            end,
            highest_time
        );
        return full;
    }
    window
}

fn scale(limit: f32, label_max: f32) -> f64 {
    if label_max > 0.0 {
        (limit / label_max) as f64
    } else {
        1.0
    }
}

struct Entry<'a> {
    graph: GraphId,
    samples: &'a [Sample],
    metric: &'a str,
    flow: &'a str,
    x_metric: &'a str,
    z_metric: &'a str,
}

/// Replace every plot with the contents of `document`.
///
/// Axis label ranges are sized to the largest values seen (x shared
/// across graphs), each entry becomes a plot coloured by its flow, and the
/// configured time window and zoom are applied. Returns the legend.
///
/// The whole document is checked before anything changes, so a rejected
/// document leaves every graph as it was.
pub fn apply_graph_response(
    space: &mut GraphSpace,
    document: &DataDocument,
    options: &ApplyOptions,
) -> GraphResult<Legend> {
    profile_function!();

    if !document.is_success() {
        tracing::error!("API Error: {}", document.result);
        return Err(GraphError::DataSource(document.result.clone()));
    }

    let ids = space.graph_ids();
    let entries = document
        .data
        .iter()
        .map(|data| {
            let mapping = document.mapping_for(data)?;
            let graph = *ids
                .get(mapping.graph)
                .ok_or(GraphError::UnknownGraphIndex(mapping.graph))?;
            validate_samples(data.samples())?;
            Ok(Entry {
                graph,
                samples: data.samples(),
                metric: &mapping.metric,
                flow: &mapping.flow,
                x_metric: &mapping.xaxis.metric,
                z_metric: &mapping.zaxis.metric,
            })
        })
        .collect::<GraphResult<Vec<_>>>()?;

    let mut highest_values: HashMap<GraphId, Highest> = HashMap::new();
    let mut highest_x = 0.0f64;
    for entry in &entries {
        let high = highest(entry.samples);
        highest_x = highest_x.max(high.x);
        highest_values.entry(entry.graph).or_default().merge(high);
    }

    let zoom = ZoomPercentages {
        x: time_window_percentages(options.start_time, options.end_time, highest_x),
        ..options.zoom
    };
    for axis in Axis::ALL {
        range::validate_percent(axis, range::percent(axis, &zoom))?;
    }

    let mut label_ranges = Vec::with_capacity(highest_values.len());
    for graph in space.graphs() {
        let Some(high) = highest_values.get(&graph.id()) else {
            continue;
        };
        let current = graph.axis_label_range();
        label_ranges.push((
            graph.id(),
            [
                current.x.with_max(highest_x as f32)?,
                current.y.with_max(high.y as f32)?,
                current.z.with_max(high.z as f32)?,
            ],
        ));
    }

    let (graphs, mut ctx) = space.graphs_and_scenes_mut();
    for graph in graphs.iter_mut() {
        graph.delete_plots(&mut ctx);
    }

    for (id, ranges) in &label_ranges {
        let Some(graph) = graphs.iter_mut().find(|graph| graph.id() == *id) else {
            continue;
        };
        for (axis, label) in Axis::ALL.into_iter().zip(ranges) {
            graph.set_axis_label_range(axis, *label, &mut ctx);
        }
        graph.init(&mut ctx);
    }

    let mut legend = Legend::default();
    for entry in &entries {
        let Some(graph) = graphs.iter_mut().find(|graph| graph.id() == entry.graph) else {
            continue;
        };

        let limits = *graph.limits();
        let labels = *graph.axis_label_range();
        let z_scale = match highest_values.get(&entry.graph) {
            Some(high) if high.z != 0.0 => scale(limits.z.max(), labels.z.max()),
            _ => 1.0,
        };

        let series = DataSeries::new(entry.samples.to_vec())
            .with_colour(legend.colour_for(entry.flow))
            .with_scales(
                scale(limits.x.max(), labels.x.max()),
                scale(limits.y.max(), labels.y.max()),
                z_scale,
            );
        graph.add_plot(series, &mut ctx)?;

        graph.set_axis_label(Axis::X, entry.x_metric, &mut ctx);
        graph.set_axis_label(Axis::Y, entry.metric, &mut ctx);
        graph.set_axis_label(Axis::Z, entry.z_metric, &mut ctx);
        if graph.name().is_empty() {
            graph.set_name(entry.metric, &mut ctx);
        }
    }

    for graph in graphs.iter_mut() {
        graph.zoom(&zoom, &mut ctx)?;
        graph.zoom_labels(&zoom, &mut ctx)?;
    }

    tracing::info!(
        "Plotted {} series across {} graphs, {} flows",
        entries.len(),
        highest_values.len(),
        legend.len()
    );
    Ok(legend)
}
