//! Case-centric process models
pub mod activity_diagram;
pub mod causal_net;
pub mod petri_net;
pub mod process_tree;
