//! Conversions between process model notations
//!
//! Every entry point returns a [`Conversion`] (target model, mapping from source to target
//! elements and the [`ConversionWarning`]s collected on the way) or a [`ConversionError`].
//! Conversions are synchronous and keep no state between calls.

use std::collections::HashMap;
use std::hash::Hash;

use log::warn;

use crate::core::graph::NodeIndex;

/// Conversion parameters
pub mod config;
/// Errors and warnings
pub mod error;

/// Translation of causal nets into activity diagrams
pub mod causal_net_to_diagram;
/// Replacement of causal net nodes with overlapping input bindings
pub mod binding_splitter;
/// Translation of activity diagrams into Petri nets
pub mod diagram_to_net;
/// Free-choice check and normalization of Petri nets
pub mod free_choice;
/// Translation of free-choice Petri nets into activity diagrams
pub mod net_to_diagram;
/// Translation of process trees into activity diagrams
pub mod process_tree_to_diagram;
/// Structural reduction of activity diagrams
pub mod simplify;
/// Grouping of SESE regions into nested subprocesses
pub mod subprocesses;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use binding_splitter::{split_overlapping_bindings, BindingSplit};
#[doc(inline)]
pub use causal_net_to_diagram::causal_net_to_activity_diagram;
#[doc(inline)]
pub use config::{
    CausalNetToDiagramConfig, DiagramToNetConfig, NetToDiagramConfig, ProcessTreeToDiagramConfig,
    SubprocessConfig,
};
#[doc(inline)]
pub use diagram_to_net::activity_diagram_to_net;
#[doc(inline)]
pub use error::{ConversionError, ConversionWarning};
#[doc(inline)]
pub use free_choice::{is_free_choice, non_free_choice_places, normalize};
#[doc(inline)]
pub use net_to_diagram::net_to_activity_diagram;
#[doc(inline)]
pub use process_tree_to_diagram::process_tree_to_activity_diagram;
#[doc(inline)]
pub use simplify::{simplify, SimplificationReport};
#[doc(inline)]
pub use subprocesses::group_into_subprocesses;

///
/// Result of a successful conversion
///
/// `S` identifies source elements, `T` target elements. Non-empty `warnings` mean the
/// conversion is lossy or approximate.
///
#[derive(Debug, Clone)]
pub struct Conversion<M, S, T> {
    /// Converted model
    pub model: M,
    /// Source element to target element
    pub mapping: HashMap<S, T>,
    /// Recoverable issues encountered
    pub warnings: Vec<ConversionWarning>,
}

impl<M, S, T> Conversion<M, S, T> {
    /// Checks if the conversion did not raise any warnings
    pub fn is_lossless(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// State of a single conversion call
#[derive(Debug)]
pub(crate) struct ConversionContext<S, T> {
    mapping: HashMap<S, T>,
    warnings: Vec<ConversionWarning>,
}

impl<S: Eq + Hash, T> ConversionContext<S, T> {
    pub(crate) fn new() -> Self {
        Self {
            mapping: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn map(&mut self, source: S, target: T) {
        self.mapping.insert(source, target);
    }

    pub(crate) fn warn(&mut self, warning: ConversionWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub(crate) fn finish<M>(self, model: M) -> Conversion<M, S, T> {
        Conversion {
            model,
            mapping: self.mapping,
            warnings: self.warnings,
        }
    }
}

impl<S: Eq + Hash> ConversionContext<S, NodeIndex> {
    /// Drop mapping entries whose target node no longer exists in `graph`
    pub(crate) fn retain_existing<N, E>(&mut self, graph: &crate::core::graph::GraphModel<N, E>) {
        self.mapping.retain(|_, target| graph.contains_node(*target));
    }
}
