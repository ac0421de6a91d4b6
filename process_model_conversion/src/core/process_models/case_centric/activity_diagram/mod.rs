//! Block-and-gateway activity diagrams (BPMN-like control flow)
pub(crate) mod activity_diagram_struct;
pub use activity_diagram_struct::*;
