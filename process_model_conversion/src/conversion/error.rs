use uuid::Uuid;

use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::causal_net::CausalNodeID;
use crate::core::process_models::case_centric::petri_net::{PlaceID, TransitionID};

/// Fatal error of a conversion; the (partial) target model must be discarded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// No start node (source place, start event or start activity) found
    MissingStartNode,
    /// No end node (sink place, end event or end activity) found
    MissingEndNode,
    /// More than one top-level start event (number found)
    MultipleStartNodes(usize),
    /// More than one top-level end event (number found)
    MultipleEndNodes(usize),
    /// The net is not free-choice (offending places)
    NotFreeChoice(Vec<PlaceID>),
    /// Subprocess to expand does not have exactly one incoming and one outgoing flow
    NonUnaryFan {
        /// Subprocess node
        node: NodeIndex,
        /// Number of incoming flows
        incoming: usize,
        /// Number of outgoing flows
        outgoing: usize,
    },
    /// Process tree operator with an invalid number of children
    InvalidOperatorArity {
        /// ID of the operator node
        operator: Uuid,
        /// Number of children found
        children: usize,
    },
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::MissingStartNode => write!(f, "No start node found"),
            ConversionError::MissingEndNode => write!(f, "No end node found"),
            ConversionError::MultipleStartNodes(n) => {
                write!(f, "Expected a single start event, found {}", n)
            }
            ConversionError::MultipleEndNodes(n) => {
                write!(f, "Expected a single end event, found {}", n)
            }
            ConversionError::NotFreeChoice(places) => write!(
                f,
                "Net is not free-choice ({} offending places)",
                places.len()
            ),
            ConversionError::NonUnaryFan {
                node,
                incoming,
                outgoing,
            } => write!(
                f,
                "Subprocess {:?} has {} incoming and {} outgoing flows (expected 1 and 1)",
                node, incoming, outgoing
            ),
            ConversionError::InvalidOperatorArity { operator, children } => write!(
                f,
                "Operator {} has an invalid number of children ({})",
                operator, children
            ),
        }
    }
}

impl std::error::Error for ConversionError {}

/// Recoverable issue of a conversion; the result is lossy or approximate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionWarning {
    /// Inclusive gateway encoded by enumerating the subsets of its branches
    InclusiveGatewayApproximated {
        /// Gateway node
        gateway: NodeIndex,
        /// Number of subset transitions created
        subsets: usize,
    },
    /// Compensation trigger of an event was ignored
    CompensationTriggerIgnored(NodeIndex),
    /// Subprocess translated as one atomic transition
    OpaqueSubprocess(NodeIndex),
    /// Event-based gateway translated as an exclusive gateway
    EventBasedGatewayAsExclusive(NodeIndex),
    /// Event trigger without a translation
    UnrecognizedEventTrigger {
        /// Event node
        node: NodeIndex,
        /// Name of the trigger
        trigger: String,
    },
    /// Node kind not supported by the target notation (skipped)
    UnsupportedNode(NodeIndex),
    /// Reset arc without a counterpart in the target notation
    ResetArcDropped {
        /// Place of the arc
        place: PlaceID,
        /// Transition of the arc
        transition: TransitionID,
    },
    /// Inhibitor arc without a counterpart in the target notation
    InhibitorArcDropped {
        /// Place of the arc
        place: PlaceID,
        /// Transition of the arc
        transition: TransitionID,
    },
    /// Net was made free-choice by splitting arcs
    FreeChoiceRepaired {
        /// Number of split arcs
        split_arcs: usize,
    },
    /// Transition with an empty preset or postset, wired to the start/end event
    UnconnectedTransition(TransitionID),
    /// C-net node with overlapping input bindings replaced by replicas
    BindingsSplit {
        /// Removed node
        node: CausalNodeID,
        /// Number of replicas created
        replicas: usize,
    },
    /// Dependency declared only by the output bindings of `from` or only by the input
    /// bindings of `to`
    InconsistentDependency {
        /// Source of the dependency
        from: CausalNodeID,
        /// Target of the dependency
        to: CausalNodeID,
    },
}

impl std::fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionWarning::InclusiveGatewayApproximated { gateway, subsets } => write!(
                f,
                "Inclusive gateway {:?} approximated by {} subset transitions",
                gateway, subsets
            ),
            ConversionWarning::CompensationTriggerIgnored(node) => {
                write!(f, "Compensation trigger of {:?} ignored", node)
            }
            ConversionWarning::OpaqueSubprocess(node) => {
                write!(f, "Subprocess {:?} translated as a single transition", node)
            }
            ConversionWarning::EventBasedGatewayAsExclusive(node) => write!(
                f,
                "Event-based gateway {:?} translated as exclusive gateway",
                node
            ),
            ConversionWarning::UnrecognizedEventTrigger { node, trigger } => {
                write!(f, "Unrecognized trigger '{}' of event {:?}", trigger, node)
            }
            ConversionWarning::UnsupportedNode(node) => {
                write!(f, "Unsupported node {:?} skipped", node)
            }
            ConversionWarning::ResetArcDropped { place, transition } => write!(
                f,
                "Reset arc {} -> {} dropped",
                place.get_uuid(),
                transition.get_uuid()
            ),
            ConversionWarning::InhibitorArcDropped { place, transition } => write!(
                f,
                "Inhibitor arc {} -> {} dropped",
                place.get_uuid(),
                transition.get_uuid()
            ),
            ConversionWarning::FreeChoiceRepaired { split_arcs } => {
                write!(f, "Net made free-choice by splitting {} arcs", split_arcs)
            }
            ConversionWarning::UnconnectedTransition(t) => write!(
                f,
                "Transition {} has an empty preset or postset",
                t.get_uuid()
            ),
            ConversionWarning::BindingsSplit { node, replicas } => write!(
                f,
                "Node {} with overlapping input bindings split into {} replicas",
                node.get_uuid(),
                replicas
            ),
            ConversionWarning::InconsistentDependency { from, to } => write!(
                f,
                "Dependency {} -> {} is declared on one side only",
                from.get_uuid(),
                to.get_uuid()
            ),
        }
    }
}
