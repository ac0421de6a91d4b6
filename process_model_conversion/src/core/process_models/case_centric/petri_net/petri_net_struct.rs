use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::graph::{GraphModel, NodeIndex};
use crate::core::process_models::case_centric::activity_diagram::{Flow, GraphNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Hash, Eq, PartialOrd, Ord)]
/// Place in a Petri net
pub struct Place {
    id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Hash, Eq, PartialOrd, Ord)]
/// Transition in a Petri net
pub struct Transition {
    /// Transition label (None if this transition is _invisible_)
    pub label: Option<String>,
    id: Uuid,
}

impl Transition {
    /// Checks if this transition is invisible (has no label)
    pub fn is_invisible(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(tag = "type", content = "nodes")]
/// Arc type in a Petri net
pub enum ArcType {
    /// From Place to Transition
    PlaceTransition(Uuid, Uuid),
    /// From Transition to Place
    TransitionPlace(Uuid, Uuid),
    /// Reset arc from Place to Transition (firing empties the place)
    Reset(Uuid, Uuid),
    /// Inhibitor arc from Place to Transition (transition only enabled if the place is empty)
    Inhibitor(Uuid, Uuid),
}

impl ArcType {
    /// Create new from place to transition
    pub fn place_to_transition(from: PlaceID, to: TransitionID) -> ArcType {
        ArcType::PlaceTransition(from.0, to.0)
    }
    /// Create new from transition to place
    pub fn transition_to_place(from: TransitionID, to: PlaceID) -> ArcType {
        ArcType::TransitionPlace(from.0, to.0)
    }
    /// Create new reset arc
    pub fn reset(place: PlaceID, transition: TransitionID) -> ArcType {
        ArcType::Reset(place.0, transition.0)
    }
    /// Create new inhibitor arc
    pub fn inhibitor(place: PlaceID, transition: TransitionID) -> ArcType {
        ArcType::Inhibitor(place.0, transition.0)
    }
    /// Source and target of the arc
    pub fn endpoints(&self) -> (Uuid, Uuid) {
        match *self {
            ArcType::PlaceTransition(from, to)
            | ArcType::TransitionPlace(from, to)
            | ArcType::Reset(from, to)
            | ArcType::Inhibitor(from, to) => (from, to),
        }
    }
    /// Checks if a given node ID is start or end of this arc
    pub fn contains(&self, id: &Uuid) -> bool {
        let (from, to) = self.endpoints();
        &from == id || &to == id
    }
    /// Checks if this is a reset or inhibitor arc
    pub fn is_special(&self) -> bool {
        matches!(self, ArcType::Reset(_, _) | ArcType::Inhibitor(_, _))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
/// Arc in a Petri net
///
/// Connecting a transition and a place (or the other way around)
pub struct Arc {
    /// Source and target of Arc
    pub from_to: ArcType,
    /// Weight (i.e., how many tokens this arc moves)
    pub weight: u32,
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Place ID
pub struct PlaceID(pub Uuid);
impl PlaceID {
    /// Get UUID
    pub fn get_uuid(self) -> Uuid {
        self.0
    }
}
impl From<&Place> for PlaceID {
    fn from(value: &Place) -> Self {
        PlaceID(value.id)
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Transition ID
pub struct TransitionID(pub Uuid);

impl From<&Transition> for TransitionID {
    fn from(value: &Transition) -> Self {
        TransitionID(value.id)
    }
}
impl TransitionID {
    /// Get UUID
    pub fn get_uuid(self) -> Uuid {
        self.0
    }
}

/// Marking of a Petri net: Assigning [`PlaceID`]s to a number of tokens
pub type Marking = HashMap<PlaceID, u64>;

#[derive(Debug, Deserialize, Serialize, Clone)]
///
/// A Petri net of [`Place`]s and [`Transition`]s
///
/// Bipartite graph of [`Place`]s and [`Transition`]s with [`Arc`]s connecting them, as well as initial and final [`Marking`]s
pub struct PetriNet {
    /// Places
    pub places: HashMap<Uuid, Place>,
    /// Transitions
    pub transitions: HashMap<Uuid, Transition>,
    /// Arcs
    pub arcs: Vec<Arc>,
    /// Initial marking
    pub initial_marking: Option<Marking>,
    /// Final markings (any of them are accepted as a final marking)
    pub final_markings: Option<Vec<Marking>>,
}

impl Default for PetriNet {
    fn default() -> Self {
        Self::new()
    }
}
impl PetriNet {
    /// Create new [`PetriNet`] with no places or transitions
    pub fn new() -> Self {
        Self {
            places: HashMap::new(),
            transitions: HashMap::new(),
            arcs: Vec::new(),
            initial_marking: None,
            final_markings: None,
        }
    }
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
    /// Add a place (with an optional passed UUID)
    ///
    /// If no ID is passed, a new UUID will be generated
    pub fn add_place(&mut self, place_id: Option<Uuid>) -> PlaceID {
        let place_id = place_id.unwrap_or_else(Uuid::new_v4);
        let place = Place { id: place_id };
        self.places.insert(place_id, place);
        PlaceID(place_id)
    }

    /// Add a transition with an label (and with an optional passed UUID)
    ///
    /// If no ID is passed, a new UUID will be generated
    pub fn add_transition(
        &mut self,
        label: Option<String>,
        transition_id: Option<Uuid>,
    ) -> TransitionID {
        let transition_id = transition_id.unwrap_or_else(Uuid::new_v4);
        let transition = Transition {
            id: transition_id,
            label,
        };
        self.transitions.insert(transition_id, transition);
        TransitionID(transition_id)
    }
    /// Add an arc
    ///
    /// Adding an arc that already exists only increases its weight.
    pub fn add_arc(&mut self, from_to: ArcType, weight: Option<u32>) {
        let weight = weight.unwrap_or(1);
        match self.arcs.iter_mut().find(|a| a.from_to == from_to) {
            Some(arc) => arc.weight += weight,
            None => self.arcs.push(Arc { from_to, weight }),
        }
    }

    /// Remove an arc, returning it if it was present
    pub fn remove_arc(&mut self, from_to: &ArcType) -> Option<Arc> {
        let pos = self.arcs.iter().position(|a| &a.from_to == from_to)?;
        Some(self.arcs.remove(pos))
    }

    /// Mark a place in the initial marking with one token
    pub fn mark_initially(&mut self, p: PlaceID) {
        *self
            .initial_marking
            .get_or_insert_with(Marking::new)
            .entry(p)
            .or_insert(0) += 1;
    }

    /// Add a final marking
    pub fn add_final_marking(&mut self, marking: Marking) {
        self.final_markings.get_or_insert_with(Vec::new).push(marking);
    }

    /// Place IDs in ascending order
    pub fn place_ids(&self) -> Vec<PlaceID> {
        let mut ids: Vec<PlaceID> = self.places.keys().map(|id| PlaceID(*id)).collect();
        ids.sort();
        ids
    }

    /// Transition IDs in ascending order
    pub fn transition_ids(&self) -> Vec<TransitionID> {
        let mut ids: Vec<TransitionID> =
            self.transitions.keys().map(|id| TransitionID(*id)).collect();
        ids.sort();
        ids
    }

    /// Get the preset of a [`PetriNet`] place (ordinary arcs only)
    pub fn preset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if to == p.0 => Some(TransitionID(from)),
                _ => None,
            })
            .collect()
    }

    /// Get the preset of [`PetriNet`] transition (ordinary arcs only)
    pub fn preset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if to == t.0 => Some(PlaceID(from)),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] place (ordinary arcs only, i.e. without reset and inhibitor arcs)
    pub fn postset_of_place(&self, p: PlaceID) -> Vec<TransitionID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::PlaceTransition(from, to) if from == p.0 => Some(TransitionID(to)),
                _ => None,
            })
            .collect()
    }

    /// Get postset of [`PetriNet`] transition
    pub fn postset_of_transition(&self, t: TransitionID) -> Vec<PlaceID> {
        self.arcs
            .iter()
            .filter_map(|x: &Arc| match x.from_to {
                ArcType::TransitionPlace(from, to) if from == t.0 => Some(PlaceID(to)),
                _ => None,
            })
            .collect()
    }

    /// Reset and inhibitor arcs of the net
    pub fn special_arcs(&self) -> Vec<Arc> {
        self.arcs
            .iter()
            .filter(|a| a.from_to.is_special())
            .cloned()
            .collect()
    }

    /// Check if place is in initial marking
    pub fn is_in_initial_marking(&self, p: &PlaceID) -> bool {
        self.initial_marking
            .as_ref()
            .is_some_and(|m| m.get(p).is_some_and(|tokens| *tokens > 0))
    }

    /// Number of transitions with a label
    pub fn visible_transition_count(&self) -> usize {
        self.transitions
            .values()
            .filter(|t| !t.is_invisible())
            .count()
    }

    /// View the net as a [`GraphModel`]
    ///
    /// Places become [`NodeKind::Place`] nodes, transitions [`NodeKind::Activity`] nodes
    /// (invisible ones with an empty label). Only ordinary arcs become flows.
    /// Also returns the mapping from net node IDs to graph handles.
    pub fn to_graph_model(&self) -> (GraphModel<GraphNode, Flow>, HashMap<Uuid, NodeIndex>) {
        let mut graph = GraphModel::new();
        let mut mapping = HashMap::new();
        for p in self.place_ids() {
            mapping.insert(p.0, graph.add_node(GraphNode::new("", NodeKind::Place)));
        }
        for t in self.transition_ids() {
            let label = self.transitions[&t.0].label.clone().unwrap_or_default();
            mapping.insert(t.0, graph.add_node(GraphNode::new(label, NodeKind::Activity)));
        }
        for arc in &self.arcs {
            if arc.from_to.is_special() {
                continue;
            }
            let (from, to) = arc.from_to.endpoints();
            if let (Some(&f), Some(&t)) = (mapping.get(&from), mapping.get(&to)) {
                graph.add_edge(f, t, Flow::default());
            }
        }
        (graph, mapping)
    }
}
