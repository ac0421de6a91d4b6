use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::{Dfs, EdgeRef, IntoEdgeReferences, Reversed};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
///
/// Directed graph with stable node handles
///
/// Nodes carry a payload `N`, edges a payload `E`. Removing a node or edge never invalidates
/// the handles of the remaining ones. At most one edge exists per ordered `(from, to)` pair.
pub struct GraphModel<N, E> {
    graph: StableDiGraph<N, E>,
}

impl<N, E> Default for GraphModel<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> GraphModel<N, E> {
    /// Create new [`GraphModel`] with no nodes or edges
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
        }
    }

    /// Add a node and return its handle
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        self.graph.add_node(node)
    }

    /// Remove a node (and all incident edges), returning its payload
    pub fn remove_node(&mut self, node: NodeIndex) -> Option<N> {
        self.graph.remove_node(node)
    }

    /// Get the payload of a node
    pub fn node(&self, node: NodeIndex) -> Option<&N> {
        self.graph.node_weight(node)
    }

    /// Checks if the node handle refers to a node of this graph
    pub fn contains_node(&self, node: NodeIndex) -> bool {
        self.graph.contains_node(node)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All node handles in ascending order
    pub fn node_ids(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().collect()
    }

    /// All nodes together with their handles
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &N)> + '_ {
        self.graph
            .node_indices()
            .filter_map(|n| self.graph.node_weight(n).map(|w| (n, w)))
    }

    /// All edges as `(from, to, payload)`
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &E)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Add an edge from `from` to `to`
    ///
    /// If such an edge already exists, the existing edge is kept (and its payload left
    /// untouched) and its handle is returned.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: E) -> EdgeIndex {
        match self.graph.find_edge(from, to) {
            Some(existing) => existing,
            None => self.graph.add_edge(from, to, edge),
        }
    }

    /// Checks if an edge from `from` to `to` exists
    pub fn contains_edge(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.graph.find_edge(from, to).is_some()
    }

    /// Get the payload of the edge from `from` to `to`
    pub fn edge(&self, from: NodeIndex, to: NodeIndex) -> Option<&E> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.edge_weight(e))
    }

    /// Remove the edge from `from` to `to`, returning its payload
    pub fn remove_edge(&mut self, from: NodeIndex, to: NodeIndex) -> Option<E> {
        self.graph
            .find_edge(from, to)
            .and_then(|e| self.graph.remove_edge(e))
    }

    /// Move the edge `from -> to` so that it connects `new_from -> new_to`, keeping its payload
    ///
    /// Returns `false` (and leaves the graph untouched) if the edge does not exist or the
    /// target edge is already present.
    pub fn redirect_edge(
        &mut self,
        (from, to): (NodeIndex, NodeIndex),
        (new_from, new_to): (NodeIndex, NodeIndex),
    ) -> bool {
        if self.contains_edge(new_from, new_to) {
            return false;
        }
        match self.remove_edge(from, to) {
            Some(payload) => {
                self.graph.add_edge(new_from, new_to, payload);
                true
            }
            None => false,
        }
    }

    /// Direct successors of a node (sorted, without duplicates)
    pub fn successors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, Direction::Outgoing)
    }

    /// Direct predecessors of a node (sorted, without duplicates)
    pub fn predecessors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.neighbors(node, Direction::Incoming)
    }

    /// Direct neighbors in the given [`Direction`] (sorted, without duplicates)
    pub fn neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut result: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        result.sort();
        result.dedup();
        result
    }

    /// Number of incoming edges
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .edges_directed(node, Direction::Incoming)
            .count()
    }

    /// Number of outgoing edges
    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.graph
            .edges_directed(node, Direction::Outgoing)
            .count()
    }

    /// All nodes reachable from `root` (including `root`), following edges backwards if
    /// `reversed`
    pub fn reachable_from(&self, root: NodeIndex, reversed: bool) -> HashSet<NodeIndex> {
        let mut result = HashSet::new();
        if !self.contains_node(root) {
            return result;
        }
        if reversed {
            let rev = Reversed(&self.graph);
            let mut dfs = Dfs::new(rev, root);
            while let Some(n) = dfs.next(rev) {
                result.insert(n);
            }
        } else {
            let mut dfs = Dfs::new(&self.graph, root);
            while let Some(n) = dfs.next(&self.graph) {
                result.insert(n);
            }
        }
        result
    }
}
