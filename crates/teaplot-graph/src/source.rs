//! Graph data documents.
//!
//! A document is the JSON answer of the experiment data service, saved to
//! disk, together with the metric-to-graph mappings that produced it:
//!
//! ```json
//! {
//!   "result": "Success",
//!   "data": [{ "map": 0, "plot": [[[0.0, 12.5], [0.1, 14.0]]] }],
//!   "mapping": [{ "metric": "cwnd", "flow": "172.16.10.2_5000", "graph": 0,
//!                 "xaxis": { "metric": "TIME" }, "zaxis": { "metric": "NOTHING" } }]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::labels::NO_LABEL;
use crate::series::Sample;

/// `result` value of a successful document.
pub const RESULT_SUCCESS: &str = "Success";
pub const TIME_METRIC: &str = "TIME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataDocument {
    pub result: String,
    #[serde(default)]
    pub data: Vec<MapData>,
    #[serde(default)]
    pub mapping: Vec<FlowMapping>,
}

/// Samples for one mapping entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    /// Index into [`DataDocument::mapping`].
    pub map: usize,
    /// Sample arrays; only the first one is plotted.
    #[serde(default)]
    pub plot: Vec<Vec<Sample>>,
}

impl MapData {
    pub fn samples(&self) -> &[Sample] {
        self.plot.first().map(Vec::as_slice).unwrap_or_default()
    }
}

/// Which metric of which flow is drawn on which graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMapping {
    pub metric: String,
    pub flow: String,
    #[serde(default)]
    pub graph: usize,
    #[serde(default)]
    pub dataset: String,
    #[serde(default = "AxisSource::time")]
    pub xaxis: AxisSource,
    #[serde(default = "AxisSource::nothing")]
    pub zaxis: AxisSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSource {
    pub metric: String,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub dataset: String,
}

impl AxisSource {
    fn with_metric(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            flow: String::new(),
            dataset: String::new(),
        }
    }

    pub fn time() -> Self {
        Self::with_metric(TIME_METRIC)
    }

    pub fn nothing() -> Self {
        Self::with_metric(NO_LABEL)
    }
}

impl DataDocument {
    pub fn from_json_str(content: &str) -> GraphResult<Self> {
        serde_json::from_str(content).map_err(|e| GraphError::Parse {
            path: None,
            message: e.to_string(),
        })
    }

    pub fn load(path: impl AsRef<Path>) -> GraphResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let document: Self = serde_json::from_str(&content).map_err(|e| GraphError::Parse {
            path: Some(path.to_path_buf()),
            message: e.to_string(),
        })?;
        tracing::info!(
            "Loaded {} data entries and {} mappings from {}",
            document.data.len(),
            document.mapping.len(),
            path.display()
        );
        Ok(document)
    }

    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }

    /// The mapping an entry refers to.
    pub fn mapping_for(&self, entry: &MapData) -> GraphResult<&FlowMapping> {
        self.mapping
            .get(entry.map)
            .ok_or(GraphError::UnknownMapping(entry.map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "result": "Success",
        "data": [
            { "map": 0, "plot": [[[0.0, 1.0], [1.5, 4.0]]] },
            { "map": 1, "plot": [] }
        ],
        "mapping": [
            { "metric": "cwnd", "flow": "a", "graph": 0,
              "xaxis": { "metric": "TIME" }, "zaxis": { "metric": "NOTHING" } },
            { "metric": "rtt", "flow": "b" }
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let document = DataDocument::from_json_str(DOCUMENT).unwrap();
        assert!(document.is_success());
        assert_eq!(document.data[0].samples().len(), 2);
        assert!(document.data[1].samples().is_empty());

        let rtt = document.mapping_for(&document.data[1]).unwrap();
        assert_eq!(rtt.graph, 0);
        assert_eq!(rtt.xaxis.metric, "TIME");
        assert_eq!(rtt.zaxis.metric, "NOTHING");
    }

    #[test]
    fn test_unknown_mapping() {
        let document = DataDocument::from_json_str(DOCUMENT).unwrap();
        let stray = MapData { map: 7, plot: Vec::new() };
        assert!(matches!(document.mapping_for(&stray), Err(GraphError::UnknownMapping(7))));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            DataDocument::from_json_str("{ not json"),
            Err(GraphError::Parse { path: None, .. })
        ));
        assert!(matches!(
            DataDocument::load("/nonexistent/teaplot/data.json"),
            Err(GraphError::Io { .. })
        ));
    }

    #[test]
    fn test_failed_result() {
        let document = DataDocument::from_json_str(r#"{ "result": "No such experiment" }"#).unwrap();
        assert!(!document.is_success());
        assert!(document.data.is_empty());
    }
}
