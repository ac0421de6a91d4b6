//! Directed graph storage shared by the graph-shaped process models
pub(crate) mod graph_model;

#[doc(inline)]
pub use graph_model::GraphModel;

pub use petgraph::stable_graph::{EdgeIndex, NodeIndex};
pub use petgraph::Direction;
