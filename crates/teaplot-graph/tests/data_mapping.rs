use std::io::Write;

use teaplot_core::config::{ControlsConfig, PercentRange};
use teaplot_core::geometry::LogicalSize;
use teaplot_graph::mapping::palette_colour;
use teaplot_graph::{ApplyOptions, Axis, AxisRange, DataDocument, GraphError, GraphSpace, apply_graph_response};

const DOCUMENT: &str = r#"{
    "result": "Success",
    "data": [
        { "map": 0, "plot": [[[0, 10], [50, 20], [100, 40]]] },
        { "map": 1, "plot": [[[0, 5], [200, 80]]] },
        { "map": 2, "plot": [[[0, 1, 3], [150, 2, 6]]] }
    ],
    "mapping": [
        { "metric": "cwnd", "flow": "A", "graph": 0,
          "xaxis": { "metric": "TIME" }, "zaxis": { "metric": "NOTHING" } },
        { "metric": "cwnd", "flow": "B", "graph": 0,
          "xaxis": { "metric": "TIME" }, "zaxis": { "metric": "NOTHING" } },
        { "metric": "rtt", "flow": "A", "graph": 1,
          "xaxis": { "metric": "TIME" }, "zaxis": { "metric": "seq" } }
    ]
}"#;

fn space() -> GraphSpace {
    let mut space = GraphSpace::new(LogicalSize::new(1280, 800), ControlsConfig::default());
    space.resize_graph_count(2);
    space
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_label_ranges_and_scales() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    let first = &space.graphs()[0];
    assert_eq!(first.axis_label_range().x, AxisRange::new(0.0, 200.0).unwrap());
    assert_eq!(first.axis_label_range().y, AxisRange::new(0.0, 80.0).unwrap());
    assert_eq!(first.axis_label_range().z, AxisRange::ZERO);
    assert_eq!(first.plots().len(), 2);

    let series = first.plots()[0].series();
    assert!(approx(series.x_scale, 5.0));
    assert!(approx(series.y_scale, 6.25));
    assert!(approx(series.z_scale, 1.0));

    let second = &space.graphs()[1];
    assert_eq!(second.axis_label_range().x.max(), 200.0);
    let series = second.plots()[0].series();
    assert!(approx(series.y_scale, 250.0));
    assert!((series.z_scale - 500.0 / 6.0).abs() < 1e-3);
}

#[test]
fn test_names_labels_and_legend() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    let legend = apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    let names: Vec<&str> = legend.iter().map(|(flow, _)| flow).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(legend.get("B"), Some(palette_colour(1)));

    let first = &space.graphs()[0];
    assert_eq!(first.name(), "cwnd");
    assert_eq!(first.axis_label(Axis::X), Some("TIME"));
    assert_eq!(first.axis_label(Axis::Y), Some("cwnd"));
    assert_eq!(first.axis_label(Axis::Z), None);
    assert_eq!(first.plots()[1].uniform().color, palette_colour(1).to_array());

    let second = &space.graphs()[1];
    assert_eq!(second.name(), "rtt");
    assert_eq!(second.axis_label(Axis::Z), Some("seq"));
    assert_eq!(second.plots()[0].uniform().color, palette_colour(0).to_array());
}

#[test]
fn test_time_window_zooms_every_graph() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    let options = ApplyOptions {
        start_time: 50.0,
        end_time: 150.0,
        ..Default::default()
    };
    apply_graph_response(&mut space, &document, &options).unwrap();

    for graph in space.graphs() {
        assert_eq!(graph.zoom_limits().x, AxisRange::new(250.0, 750.0).unwrap());
        assert_eq!(graph.label_limits().x, AxisRange::new(50.0, 150.0).unwrap());
        assert_eq!(graph.zoom_limits().y, graph.limits().y);
    }
    let uniform = space.graphs()[0].plots()[0].uniform();
    assert_eq!(uniform.min[0], 250.0);
    assert_eq!(uniform.max[0], 750.0);
}

#[test]
fn test_configured_zoom_is_kept_on_other_axes() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    let mut options = ApplyOptions::default();
    options.zoom.y = PercentRange { min: 0.0, max: 50.0 };
    apply_graph_response(&mut space, &document, &options).unwrap();

    assert_eq!(space.graphs()[0].zoom_limits().y.max(), 250.0);
    assert_eq!(space.graphs()[0].zoom_limits().x, space.graphs()[0].limits().x);
}

#[test]
fn test_reloading_replaces_plots() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    assert_eq!(space.graphs()[0].plots().len(), 2);
    assert_eq!(space.graphs()[1].plots().len(), 1);
}

#[test]
fn test_failed_document_keeps_view() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    let failed = DataDocument::from_json_str(r#"{ "result": "Experiment not found" }"#).unwrap();
    let error = apply_graph_response(&mut space, &failed, &ApplyOptions::default()).unwrap_err();
    assert!(matches!(&error, GraphError::DataSource(message) if message == "Experiment not found"));
    assert_eq!(error.to_string(), "API Error: Experiment not found");
    assert_eq!(space.graphs()[0].plots().len(), 2);
}

#[test]
fn test_bad_sample_keeps_view() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();
    let nodes: Vec<_> = space.graphs()[0].plots().iter().map(|plot| plot.node()).collect();

    let bad = DOCUMENT.replace("[[[0, 5], [200, 80]]]", "[[[0, 5], [7]]]");
    let bad = DataDocument::from_json_str(&bad).unwrap();
    assert!(matches!(
        apply_graph_response(&mut space, &bad, &ApplyOptions::default()),
        Err(GraphError::InvalidSeries { index: 1, .. })
    ));

    let first = &space.graphs()[0];
    assert_eq!(first.plots().len(), 2);
    assert_eq!(first.axis_label_range().y, AxisRange::new(0.0, 80.0).unwrap());
    for node in nodes {
        assert!(space.scenes().main.contains(node.unwrap()));
    }
}

#[test]
fn test_bad_zoom_keeps_view() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    let mut options = ApplyOptions::default();
    options.zoom.z = PercentRange { min: 80.0, max: 20.0 };
    assert!(matches!(
        apply_graph_response(&mut space, &document, &options),
        Err(GraphError::InvalidZoom { axis: Axis::Z, .. })
    ));
    assert_eq!(space.graphs()[0].plots().len(), 2);
    assert_eq!(space.graphs()[1].plots().len(), 1);
}

#[test]
fn test_graph_frame_built_before_plots() {
    let mut space = space();
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();
    apply_graph_response(&mut space, &document, &ApplyOptions::default()).unwrap();

    let first = &space.graphs()[0];
    let main = &space.scenes().main;
    let revision = |node: Option<teaplot_graph::NodeId>| main.get(node.unwrap()).unwrap().revision();
    let axes = revision(first.axes_node());
    assert_eq!(revision(first.grid_node()), axes + 1);
    for plot in first.plots() {
        assert!(revision(plot.node()) > axes);
    }
}

#[test]
fn test_mapping_to_missing_graph() {
    let mut space = GraphSpace::new(LogicalSize::new(1280, 800), ControlsConfig::default());
    space.resize_graph_count(1);
    let document = DataDocument::from_json_str(DOCUMENT).unwrap();

    assert!(matches!(
        apply_graph_response(&mut space, &document, &ApplyOptions::default()),
        Err(GraphError::UnknownGraphIndex(1))
    ));
    assert!(space.graphs()[0].plots().is_empty());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flows.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(DOCUMENT.as_bytes()).unwrap();

    let document = DataDocument::load(&path).unwrap();
    assert_eq!(document.data.len(), 3);
    assert_eq!(document.mapping[2].zaxis.metric, "seq");

    std::fs::write(&path, "{ \"result\": ").unwrap();
    assert!(matches!(
        DataDocument::load(&path),
        Err(GraphError::Parse { path: Some(_), .. })
    ));
}
