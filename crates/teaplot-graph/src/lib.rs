//! Graph model of the teaplot viewer.
//!
//! A [`GraphSpace`] owns the scenes, the cameras and a stack of [`Graph`]s.
//! Each graph draws its axes, grid and labels into the scenes and owns the
//! [`Plot`]s built from [`DataSeries`]. Plots keep their samples in data
//! units; the graph's zoom limits are handed to the GPU as uniforms, so
//! zooming and the reveal sweep never rebuild geometry.
//!
//! ```ignore
//! use teaplot_graph::*;
//!
//! let mut space = GraphSpace::new(LogicalSize::new(1280, 800), ControlsConfig::default());
//! space.resize_graph_count(2);
//!
//! let document = DataDocument::load("flows.json")?;
//! let legend = apply_graph_response(&mut space, &document, &ApplyOptions::default())?;
//!
//! let mut playback = PlaybackController::new(4000.0);
//! playback.start(&mut space, now_ms);
//! // once per frame:
//! space.step_animations(now_ms);
//! ```

pub mod animation;
pub mod axes;
pub mod error;
pub mod graph;
pub mod labels;
pub mod mapping;
pub mod normalize;
pub mod playback;
pub mod plot;
pub mod range;
pub mod scene;
pub mod series;
pub mod source;
pub mod space;
pub mod traits;

pub use animation::{AnimationState, RevealAnimation, StartOutcome, StepOutcome};
pub use axes::{AxisColours, Sections};
pub use error::{GraphError, GraphResult};
pub use graph::{Graph, GraphId};
pub use mapping::{ApplyOptions, Legend, apply_graph_response};
pub use normalize::{is_point_visible, normalize, normalize_point};
pub use playback::PlaybackController;
pub use plot::{Plot, PlotFrame, PlotId};
pub use range::{Axis, AxisRange, AxisRanges, ZoomPercentages};
pub use scene::{Node, NodeId, NodeKind, Scene, SceneContext, Scenes};
pub use series::{DataSeries, Sample, validate_samples};
pub use source::{AxisSource, DataDocument, FlowMapping, MapData};
pub use space::{CameraControls, GraphSpace};
pub use traits::{Animatable, Drawable, Scalable};
