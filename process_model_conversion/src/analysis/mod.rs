//! Graph analysis
//!
//! Dominator and post-dominator sets and single-entry-single-exit (SESE) region discovery on
//! [`GraphModel`](crate::core::graph::GraphModel)s.

/// Dominator and post-dominator sets
pub mod dominators;
/// Single-entry-single-exit regions
pub mod sese;

#[doc(inline)]
pub use dominators::{compute_dominators, DominanceForest, DominatorMap};
#[doc(inline)]
pub use sese::{collect_region, discover_sese_borders};
