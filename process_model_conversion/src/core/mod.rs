//! Core data structures: graph storage and process models

pub mod graph;

pub mod process_models;

pub use process_models::case_centric::activity_diagram::ActivityDiagram;
pub use process_models::case_centric::causal_net::CausalNet;
pub use process_models::case_centric::petri_net::PetriNet;
pub use process_models::case_centric::process_tree::ProcessTree;
