//! Petri net
pub(crate) mod petri_net_struct;
pub use petri_net_struct::*;
pub mod macros;
