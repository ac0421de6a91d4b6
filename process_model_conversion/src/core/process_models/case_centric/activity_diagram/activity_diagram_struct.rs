use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::HashMap;

use crate::core::graph::{GraphModel, NodeIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Routing semantics of a gateway
pub enum GatewayKind {
    /// Exclusive choice / merge (XOR)
    Exclusive,
    /// Parallel split / synchronization (AND)
    Parallel,
    /// Inclusive choice / synchronization (OR)
    Inclusive,
    /// Deferred choice decided by the first event to occur
    EventBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Position of an event in the control flow
pub enum EventKind {
    /// Start event (no incoming flows)
    Start,
    /// End event (no outgoing flows)
    End,
    /// Intermediate event
    Intermediate,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
/// Trigger (event definition) attached to an event
pub enum EventTrigger {
    /// Plain event without a trigger
    #[default]
    None,
    /// Message event
    Message,
    /// Timer event
    Timer,
    /// Signal event
    Signal,
    /// Error event
    Error,
    /// Compensation event
    Compensation,
    /// Any other trigger, identified by its name
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
/// Variant tag of a [`GraphNode`]
pub enum NodeKind {
    /// Place (only used when viewing a Petri net as a graph)
    Place,
    /// Activity (task); silent if its label is empty
    Activity,
    /// Gateway
    Gateway(GatewayKind),
    /// Event
    Event {
        /// Start, end or intermediate
        kind: EventKind,
        /// Attached trigger
        trigger: EventTrigger,
    },
    /// Subprocess container; its children are recorded in the containment index of the
    /// [`ActivityDiagram`]
    SubProcess,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Node of an [`ActivityDiagram`]
pub struct GraphNode {
    /// Label (empty for routing-only elements)
    pub label: String,
    /// Variant tag
    pub kind: NodeKind,
}

impl GraphNode {
    /// Create a node
    pub fn new<S: Into<String>>(label: S, kind: NodeKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    /// Checks if this node is an activity without a label
    pub fn is_silent_activity(&self) -> bool {
        self.kind == NodeKind::Activity && self.label.is_empty()
    }

    /// Checks if this node is an activity
    pub fn is_activity(&self) -> bool {
        self.kind == NodeKind::Activity
    }

    /// Gateway kind, if this node is a gateway
    pub fn gateway_kind(&self) -> Option<GatewayKind> {
        match self.kind {
            NodeKind::Gateway(kind) => Some(kind),
            _ => None,
        }
    }

    /// Event kind, if this node is an event
    pub fn event_kind(&self) -> Option<EventKind> {
        match self.kind {
            NodeKind::Event { kind, .. } => Some(kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Sequence flow between two nodes
pub struct Flow {
    /// Optional label, doubling as a guard expression
    pub label: Option<String>,
}

impl Flow {
    /// Flow carrying a label
    pub fn labelled<S: Into<String>>(label: S) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
///
/// Block-and-gateway activity diagram
///
/// All nodes (including the contents of subprocesses) live in one [`GraphModel`] arena.
/// Containment of nodes in [`NodeKind::SubProcess`] containers is kept in a separate
/// child-to-parent index. Flows only ever connect nodes with the same parent.
pub struct ActivityDiagram {
    /// Nodes and flows
    pub graph: GraphModel<GraphNode, Flow>,
    /// Containment index: child node to its enclosing subprocess
    #[serde_as(as = "Vec<(_, _)>")]
    parents: HashMap<NodeIndex, NodeIndex>,
}

impl ActivityDiagram {
    /// Create new empty [`ActivityDiagram`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add an arbitrary node at the top level
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        self.graph.add_node(node)
    }

    /// Add an activity (an empty label makes it silent)
    pub fn add_activity<S: Into<String>>(&mut self, label: S) -> NodeIndex {
        self.add_node(GraphNode::new(label, NodeKind::Activity))
    }

    /// Add a silent activity
    pub fn add_silent_activity(&mut self) -> NodeIndex {
        self.add_activity("")
    }

    /// Add a gateway
    pub fn add_gateway(&mut self, kind: GatewayKind) -> NodeIndex {
        self.add_node(GraphNode::new("", NodeKind::Gateway(kind)))
    }

    /// Add an event without trigger
    pub fn add_event(&mut self, kind: EventKind) -> NodeIndex {
        self.add_event_with_trigger("", kind, EventTrigger::None)
    }

    /// Add a (possibly labelled) event with a trigger
    pub fn add_event_with_trigger<S: Into<String>>(
        &mut self,
        label: S,
        kind: EventKind,
        trigger: EventTrigger,
    ) -> NodeIndex {
        self.add_node(GraphNode::new(label, NodeKind::Event { kind, trigger }))
    }

    /// Add a subprocess container, optionally nested into `parent`
    pub fn add_subprocess<S: Into<String>>(
        &mut self,
        label: S,
        parent: Option<NodeIndex>,
    ) -> NodeIndex {
        let id = self.add_node(GraphNode::new(label, NodeKind::SubProcess));
        self.set_parent(id, parent);
        id
    }

    /// Add an unlabelled flow (no-op if the flow already exists)
    pub fn add_flow(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.add_edge(from, to, Flow::default());
    }

    /// Add a labelled flow (no-op if the flow already exists)
    pub fn add_labelled_flow<S: Into<String>>(&mut self, from: NodeIndex, to: NodeIndex, label: S) {
        self.graph.add_edge(from, to, Flow::labelled(label));
    }

    /// Get a node
    pub fn node(&self, id: NodeIndex) -> Option<&GraphNode> {
        self.graph.node(id)
    }

    /// Checks if the node exists
    pub fn contains(&self, id: NodeIndex) -> bool {
        self.graph.contains_node(id)
    }

    /// Remove a node with its flows
    ///
    /// Children of a removed subprocess move up to the subprocess's own parent.
    pub fn remove_node(&mut self, id: NodeIndex) -> Option<GraphNode> {
        let parent = self.parents.remove(&id);
        for child in self.children_of(Some(id)) {
            self.set_parent(child, parent);
        }
        self.graph.remove_node(id)
    }

    /// Enclosing subprocess of a node (`None` for top-level nodes)
    pub fn parent_of(&self, id: NodeIndex) -> Option<NodeIndex> {
        self.parents.get(&id).copied()
    }

    /// Set (or clear) the enclosing subprocess of a node
    pub fn set_parent(&mut self, id: NodeIndex, parent: Option<NodeIndex>) {
        match parent {
            Some(p) => {
                self.parents.insert(id, p);
            }
            None => {
                self.parents.remove(&id);
            }
        }
    }

    /// Direct children of a subprocess (or the top-level nodes for `None`), in ascending order
    pub fn children_of(&self, parent: Option<NodeIndex>) -> Vec<NodeIndex> {
        self.graph
            .node_ids()
            .into_iter()
            .filter(|n| self.parent_of(*n) == parent)
            .collect()
    }

    /// Checks if `node` lies (transitively) inside `ancestor`
    pub fn is_inside(&self, node: NodeIndex, ancestor: NodeIndex) -> bool {
        let mut curr = self.parent_of(node);
        while let Some(p) = curr {
            if p == ancestor {
                return true;
            }
            curr = self.parent_of(p);
        }
        false
    }

    /// All nodes with the given event kind directly inside `parent`
    pub fn events_in(&self, parent: Option<NodeIndex>, kind: EventKind) -> Vec<NodeIndex> {
        self.children_of(parent)
            .into_iter()
            .filter(|n| self.node(*n).and_then(GraphNode::event_kind) == Some(kind))
            .collect()
    }

    /// Top-level start events
    pub fn start_events(&self) -> Vec<NodeIndex> {
        self.events_in(None, EventKind::Start)
    }

    /// Top-level end events
    pub fn end_events(&self) -> Vec<NodeIndex> {
        self.events_in(None, EventKind::End)
    }

    /// All activities (at any nesting depth)
    pub fn activities(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .filter(|(_, n)| n.is_activity())
            .map(|(id, _)| id)
            .collect()
    }

    /// All gateways (at any nesting depth)
    pub fn gateways(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .filter(|(_, n)| n.gateway_kind().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// All subprocess containers
    pub fn subprocesses(&self) -> Vec<NodeIndex> {
        self.graph
            .nodes()
            .filter(|(_, n)| n.kind == NodeKind::SubProcess)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_diagram() {
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let g = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("Register");
        let b = d.add_silent_activity();
        let e = d.add_event(EventKind::End);
        d.add_flow(s, g);
        d.add_labelled_flow(g, a, "amount > 10");
        d.add_flow(g, b);
        d.add_flow(a, e);
        d.add_flow(b, e);
        d.add_flow(b, e);

        assert_eq!(d.graph.edge_count(), 6);
        assert_eq!(d.start_events(), vec![s]);
        assert_eq!(d.end_events(), vec![e]);
        assert_eq!(d.activities().len(), 2);
        assert!(d.node(b).unwrap().is_silent_activity());
        assert!(!d.node(a).unwrap().is_silent_activity());
        assert_eq!(
            d.graph.edge(g, a).and_then(|f| f.label.clone()),
            Some("amount > 10".to_string())
        );
    }

    #[test]
    fn containment_index() {
        let mut d = ActivityDiagram::new();
        let outer = d.add_subprocess("outer", None);
        let inner = d.add_subprocess("inner", Some(outer));
        let a = d.add_activity("a");
        d.set_parent(a, Some(inner));

        assert!(d.is_inside(a, outer));
        assert!(d.is_inside(a, inner));
        assert!(!d.is_inside(outer, inner));
        assert_eq!(d.children_of(Some(outer)), vec![inner]);
        assert_eq!(d.children_of(None), vec![outer]);

        d.remove_node(inner);
        assert_eq!(d.parent_of(a), Some(outer));
        assert_eq!(d.subprocesses(), vec![outer]);
    }

    #[test]
    fn json_round_trip() {
        let mut d = ActivityDiagram::new();
        let sp = d.add_subprocess("sp", None);
        let a = d.add_activity("a");
        d.set_parent(a, Some(sp));
        let json = d.to_json().unwrap();
        let d2: ActivityDiagram = serde_json::from_str(&json).unwrap();
        assert_eq!(d2.parent_of(a), Some(sp));
        assert_eq!(d2.node(a).map(|n| n.label.as_str()), Some("a"));
    }
}
