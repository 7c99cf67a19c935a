//! Axis identifiers and validated axis ranges.

use std::fmt;
use std::str::FromStr;

use teaplot_core::config::{PercentRange, ZoomConfig};

use crate::error::{GraphError, GraphResult};

/// Zoom percentages for each axis. Same shape as the config file's `zoom`.
pub type ZoomPercentages = ZoomConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Axis {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(GraphError::UnknownAxis(other.to_string())),
        }
    }
}

/// A `min..=max` interval on one axis. `max >= min` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    min: f32,
    max: f32,
}

impl AxisRange {
    pub const ZERO: AxisRange = AxisRange { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> GraphResult<Self> {
        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(GraphError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// `0..=max` for a non-negative `max`.
    pub(crate) const fn up_to(max: f32) -> Self {
        Self { min: 0.0, max }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.span() == 0.0
    }

    pub fn with_max(self, max: f32) -> GraphResult<Self> {
        Self::new(self.min, max)
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// The sub-range covering `percent.min..percent.max` of this range.
    ///
    /// With `percent = 0..100` the result equals `self`.
    pub fn zoomed(&self, axis: Axis, percent: PercentRange) -> GraphResult<Self> {
        validate_percent(axis, percent)?;
        if self.is_degenerate() {
            return Err(GraphError::DegenerateRange { axis });
        }

        let span = self.span() as f64;
        let min = self.min as f64 + percent.min / 100.0 * span;
        let max = self.min as f64 + percent.max / 100.0 * span;
        Self::new(min as f32, max as f32)
    }
}

pub(crate) fn validate_percent(axis: Axis, percent: PercentRange) -> GraphResult<()> {
    let PercentRange { min, max } = percent;
    let in_bounds = (0.0..=100.0).contains(&min) && (0.0..=100.0).contains(&max);
    if !in_bounds || min >= max {
        return Err(GraphError::InvalidZoom { axis, min, max });
    }
    Ok(())
}

/// One [`AxisRange`] per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRanges {
    pub x: AxisRange,
    pub y: AxisRange,
    pub z: AxisRange,
}

impl AxisRanges {
    pub const ZERO: AxisRanges = AxisRanges {
        x: AxisRange::ZERO,
        y: AxisRange::ZERO,
        z: AxisRange::ZERO,
    };

    pub const fn new(x: AxisRange, y: AxisRange, z: AxisRange) -> Self {
        Self { x, y, z }
    }

    /// Default graph limits: x `0..1000`, y and z `0..500`.
    pub const fn graph_default() -> Self {
        Self {
            x: AxisRange::up_to(1000.0),
            y: AxisRange::up_to(500.0),
            z: AxisRange::up_to(500.0),
        }
    }

    pub fn get(&self, axis: Axis) -> AxisRange {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn set(&mut self, axis: Axis, range: AxisRange) {
        match axis {
            Axis::X => self.x = range,
            Axis::Y => self.y = range,
            Axis::Z => self.z = range,
        }
    }

    pub fn mins(&self) -> [f32; 3] {
        [self.x.min, self.y.min, self.z.min]
    }

    pub fn maxs(&self) -> [f32; 3] {
        [self.x.max, self.y.max, self.z.max]
    }

    pub fn spans(&self) -> [f32; 3] {
        [self.x.span(), self.y.span(), self.z.span()]
    }

    /// First axis with a zero span, if any.
    pub fn degenerate_axis(&self) -> Option<Axis> {
        Axis::ALL.into_iter().find(|axis| self.get(*axis).is_degenerate())
    }

    /// Zoom every axis, failing without partial results if any axis fails.
    pub fn zoomed(&self, percentages: &ZoomPercentages) -> GraphResult<Self> {
        Ok(Self {
            x: self.x.zoomed(Axis::X, percentages.x)?,
            y: self.y.zoomed(Axis::Y, percentages.y)?,
            z: self.z.zoomed(Axis::Z, percentages.z)?,
        })
    }
}

impl Default for AxisRanges {
    fn default() -> Self {
        Self::graph_default()
    }
}

pub(crate) fn percent(axis: Axis, percentages: &ZoomPercentages) -> PercentRange {
    match axis {
        Axis::X => percentages.x,
        Axis::Y => percentages.y,
        Axis::Z => percentages.z,
    }
}
