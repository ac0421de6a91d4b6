#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

pub mod core;

pub mod analysis;

pub mod conversion;

#[doc(inline)]
pub use crate::core::{ActivityDiagram, CausalNet, PetriNet, ProcessTree};

#[doc(inline)]
pub use conversion::{
    activity_diagram_to_net, causal_net_to_activity_diagram, group_into_subprocesses,
    net_to_activity_diagram, process_tree_to_activity_diagram, Conversion, ConversionError,
    ConversionWarning,
};
