use std::path::PathBuf;

use crate::graph::GraphId;
use crate::range::Axis;

/// Errors raised while configuring graphs or applying data to them.
#[derive(Debug)]
pub enum GraphError {
    /// An axis range with `max < min` or a non-finite bound.
    InvalidRange { min: f32, max: f32 },
    /// An axis range of zero span where a divisor is needed.
    DegenerateRange { axis: Axis },
    /// Zoom percentages outside `0..=100` or with `min >= max`.
    InvalidZoom { axis: Axis, min: f64, max: f64 },
    /// A sample without 2 or 3 finite components.
    InvalidSeries { index: usize, reason: String },
    /// An axis name other than `x`, `y` or `z`.
    UnknownAxis(String),
    UnknownGraph(GraphId),
    /// A flow mapping names a graph position past the end of the list.
    UnknownGraphIndex(usize),
    /// A data entry refers to a mapping index that does not exist.
    UnknownMapping(usize),
    /// The data source reported a failure.
    DataSource(String),
    /// A data document could not be decoded.
    Parse { path: Option<PathBuf>, message: String },
    Io { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for GraphError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GraphError::InvalidRange { min, max } => {
                write!(f, "Invalid axis range {}..{}", min, max)
            }
            GraphError::DegenerateRange { axis } => {
                write!(f, "Axis {} has a zero-width range", axis)
            }
            GraphError::InvalidZoom { axis, min, max } => {
                write!(f, "Invalid zoom on axis {}: {}%..{}%", axis, min, max)
            }
            GraphError::InvalidSeries { index, reason } => {
                write!(f, "Invalid sample {}: {}", index, reason)
            }
            GraphError::UnknownAxis(name) => write!(f, "Invalid axis: {}", name),
            GraphError::UnknownGraph(id) => write!(f, "Unknown {}", id),
            GraphError::UnknownGraphIndex(index) => write!(f, "No graph at position {}", index),
            GraphError::UnknownMapping(index) => write!(f, "No flow mapping at index {}", index),
            GraphError::DataSource(message) => write!(f, "API Error: {}", message),
            GraphError::Parse {
                path: Some(path),
                message,
            } => write!(f, "Failed to parse {}: {}", path.display(), message),
            GraphError::Parse { path: None, message } => {
                write!(f, "Failed to parse data document: {}", message)
            }
            GraphError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type GraphResult<T> = Result<T, GraphError>;
