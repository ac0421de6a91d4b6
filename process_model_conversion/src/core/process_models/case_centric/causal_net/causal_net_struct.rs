use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialOrd, Ord)]
/// Causal net node ID
pub struct CausalNodeID(pub Uuid);

impl CausalNodeID {
    /// Get UUID
    pub fn get_uuid(self) -> Uuid {
        self.0
    }
}

/// A set of nodes that must jointly participate (AND semantics)
pub type Binding = BTreeSet<CausalNodeID>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
///
/// Activity in a [`CausalNet`]
///
/// Bindings of the same side are mutually exclusive alternatives (XOR semantics).
pub struct CausalNode {
    id: Uuid,
    /// Activity label (None if this node is _silent_)
    pub label: Option<String>,
    /// Alternative sets of predecessors
    pub input_bindings: BTreeSet<Binding>,
    /// Alternative sets of successors
    pub output_bindings: BTreeSet<Binding>,
}

impl CausalNode {
    /// ID of this node
    pub fn id(&self) -> CausalNodeID {
        CausalNodeID(self.id)
    }

    /// All nodes appearing in any input binding
    pub fn predecessors(&self) -> BTreeSet<CausalNodeID> {
        self.input_bindings.iter().flatten().copied().collect()
    }

    /// All nodes appearing in any output binding
    pub fn successors(&self) -> BTreeSet<CausalNodeID> {
        self.output_bindings.iter().flatten().copied().collect()
    }

    /// Checks if two distinct input bindings share a member
    pub fn has_overlapping_input_bindings(&self) -> bool {
        let bindings: Vec<&Binding> = self.input_bindings.iter().collect();
        bindings.iter().enumerate().any(|(i, b1)| {
            bindings[i + 1..]
                .iter()
                .any(|b2| !b1.is_disjoint(b2))
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
///
/// Causal net (C-net) of [`CausalNode`]s
///
/// Nodes live in an arena keyed by their ID; bindings refer to sibling nodes by ID.
pub struct CausalNet {
    /// Nodes
    pub nodes: HashMap<Uuid, CausalNode>,
    /// Unique start activity
    pub start: Option<CausalNodeID>,
    /// Unique end activity
    pub end: Option<CausalNodeID>,
}

impl CausalNet {
    /// Create new [`CausalNet`] with no nodes
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add a node (with an optional passed UUID)
    ///
    /// If no ID is passed, a new UUID will be generated
    pub fn add_node(&mut self, label: Option<String>, node_id: Option<Uuid>) -> CausalNodeID {
        let id = node_id.unwrap_or_else(Uuid::new_v4);
        self.nodes.insert(
            id,
            CausalNode {
                id,
                label,
                input_bindings: BTreeSet::new(),
                output_bindings: BTreeSet::new(),
            },
        );
        CausalNodeID(id)
    }

    /// Get a node
    pub fn node(&self, id: CausalNodeID) -> Option<&CausalNode> {
        self.nodes.get(&id.0)
    }

    /// Get a node mutably
    pub fn node_mut(&mut self, id: CausalNodeID) -> Option<&mut CausalNode> {
        self.nodes.get_mut(&id.0)
    }

    /// Add an input binding to `node`
    ///
    /// Returns `false` if the binding is empty, the node does not exist or the binding was
    /// already present.
    pub fn add_input_binding<I: IntoIterator<Item = CausalNodeID>>(
        &mut self,
        node: CausalNodeID,
        binding: I,
    ) -> bool {
        let binding: Binding = binding.into_iter().collect();
        match self.nodes.get_mut(&node.0) {
            Some(n) if !binding.is_empty() => n.input_bindings.insert(binding),
            _ => false,
        }
    }

    /// Add an output binding to `node`
    ///
    /// Returns `false` if the binding is empty, the node does not exist or the binding was
    /// already present.
    pub fn add_output_binding<I: IntoIterator<Item = CausalNodeID>>(
        &mut self,
        node: CausalNodeID,
        binding: I,
    ) -> bool {
        let binding: Binding = binding.into_iter().collect();
        match self.nodes.get_mut(&node.0) {
            Some(n) if !binding.is_empty() => n.output_bindings.insert(binding),
            _ => false,
        }
    }

    /// Remove a node together with all references to it
    ///
    /// Bindings that become empty are dropped.
    pub fn remove_node(&mut self, id: CausalNodeID) -> Option<CausalNode> {
        let removed = self.nodes.remove(&id.0)?;
        for node in self.nodes.values_mut() {
            node.input_bindings = strip(&node.input_bindings, id);
            node.output_bindings = strip(&node.output_bindings, id);
        }
        if self.start == Some(id) {
            self.start = None;
        }
        if self.end == Some(id) {
            self.end = None;
        }
        Some(removed)
    }

    /// Node IDs in ascending order
    pub fn node_ids(&self) -> Vec<CausalNodeID> {
        let mut ids: Vec<CausalNodeID> = self.nodes.keys().map(|id| CausalNodeID(*id)).collect();
        ids.sort();
        ids
    }

    /// First node (in ID order) with overlapping input bindings, if any
    pub fn find_overlapping_node(&self) -> Option<CausalNodeID> {
        self.node_ids().into_iter().find(|id| {
            Some(*id) != self.start
                && self
                    .node(*id)
                    .is_some_and(CausalNode::has_overlapping_input_bindings)
        })
    }

    /// All dependencies `(from, to)` declared by output bindings
    pub fn output_dependencies(&self) -> BTreeSet<(CausalNodeID, CausalNodeID)> {
        self.nodes
            .values()
            .flat_map(|n| n.successors().into_iter().map(move |s| (n.id(), s)))
            .collect()
    }

    /// All dependencies `(from, to)` declared by input bindings
    pub fn input_dependencies(&self) -> BTreeSet<(CausalNodeID, CausalNodeID)> {
        self.nodes
            .values()
            .flat_map(|n| n.predecessors().into_iter().map(move |p| (p, n.id())))
            .collect()
    }
}

fn strip(bindings: &BTreeSet<Binding>, id: CausalNodeID) -> BTreeSet<Binding> {
    bindings
        .iter()
        .map(|b| b.iter().copied().filter(|n| *n != id).collect::<Binding>())
        .filter(|b| !b.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_and_overlap() {
        let mut net = CausalNet::new();
        let x = net.add_node(Some("x".into()), None);
        let y = net.add_node(Some("y".into()), None);
        let n = net.add_node(Some("n".into()), None);

        assert!(net.add_input_binding(n, [x]));
        assert!(!net.add_input_binding(n, [x]));
        assert!(!net.add_input_binding(n, []));
        assert!(!net.node(n).unwrap().has_overlapping_input_bindings());

        assert!(net.add_input_binding(n, [x, y]));
        assert!(net.node(n).unwrap().has_overlapping_input_bindings());
        assert_eq!(net.find_overlapping_node(), Some(n));
        assert_eq!(net.node(n).unwrap().predecessors(), [x, y].into_iter().collect());
    }

    #[test]
    fn remove_node_strips_references() {
        let mut net = CausalNet::new();
        let x = net.add_node(Some("x".into()), None);
        let y = net.add_node(Some("y".into()), None);
        let n = net.add_node(Some("n".into()), None);
        net.add_output_binding(x, [n, y]);
        net.add_output_binding(y, [n]);
        net.add_input_binding(n, [x]);
        net.end = Some(n);

        net.remove_node(n);
        assert_eq!(net.end, None);
        assert_eq!(net.node(x).unwrap().output_bindings.len(), 1);
        assert!(net.node(y).unwrap().output_bindings.is_empty());
        assert_eq!(
            net.output_dependencies(),
            [(x, y)].into_iter().collect()
        );
        assert!(net.input_dependencies().is_empty());
    }

    #[test]
    fn json_round_trip() {
        let mut net = CausalNet::new();
        let a = net.add_node(Some("a".into()), None);
        let b = net.add_node(None, None);
        net.add_output_binding(a, [b]);
        net.add_input_binding(b, [a]);
        net.start = Some(a);
        net.end = Some(b);
        let json = net.to_json().unwrap();
        let back: CausalNet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.start, Some(a));
        assert_eq!(back.node(b), net.node(b));
    }
}
