pub mod config;
pub mod display;
pub mod geometry;
pub mod id;
pub mod model;
pub mod viewport;
pub mod zoom_input;

pub use config::CanvasConfig;
pub use display::{DisplayList, EdgeLabel, EdgeShape, NodeShape, PreviewEdge, Selection, edge_label_text};
pub use geometry::{Arrowhead, EdgeCurve, EdgeGeometry, GeometryEngine};
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use viewport::{ViewportState, ViewportTransform, WheelDirection};
pub use zoom_input::{ZoomInputError, parse_zoom_percent};

// Re-export petgraph types so algorithm runners don't need a direct dependency
pub use petgraph::stable_graph::{NodeIndex, StableDiGraph};
