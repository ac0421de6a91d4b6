//! Causal nets (C-nets)
pub(crate) mod causal_net_struct;
pub use causal_net_struct::*;
