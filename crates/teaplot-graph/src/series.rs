use teaplot_render::Color;

use crate::error::{GraphError, GraphResult};

/// One raw sample: `[x, y]` or `[x, y, z]`.
pub type Sample = Vec<f64>;

/// Check that every sample has 2 or 3 finite components.
pub fn validate_samples(samples: &[Sample]) -> GraphResult<()> {
    for (index, sample) in samples.iter().enumerate() {
        if sample.len() != 2 && sample.len() != 3 {
            return Err(GraphError::InvalidSeries {
                index,
                reason: format!("expected 2 or 3 components, got {}", sample.len()),
            });
        }
        if sample.iter().any(|value| !value.is_finite()) {
            return Err(GraphError::InvalidSeries {
                index,
                reason: "non-finite component".to_string(),
            });
        }
    }
    Ok(())
}

/// Raw samples plus the per-axis scale and styling applied when a
/// [`Plot`](crate::Plot) turns them into geometry.
///
/// The samples are drained by the plot that consumes the series.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSeries {
    samples: Vec<Sample>,
    pub colour: Color,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    pub thickness: f32,
    /// Connect consecutive samples. Carried for data documents, not drawn.
    pub lines: bool,
    pub constrain_axis: bool,
}

impl DataSeries {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    pub fn with_colour(mut self, colour: Color) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_scales(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x_scale = x;
        self.y_scale = y;
        self.z_scale = z;
        self
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn validate(&self) -> GraphResult<()> {
        validate_samples(&self.samples)
    }

    /// Move the raw samples out, leaving the series empty.
    pub(crate) fn take_samples(&mut self) -> Vec<Sample> {
        std::mem::take(&mut self.samples)
    }
}

impl Default for DataSeries {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            colour: Color::BLACK,
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            thickness: 1.0,
            lines: false,
            constrain_axis: true,
        }
    }
}
