use std::collections::{HashMap, HashSet};

use crate::core::graph::{GraphModel, NodeIndex};

/// Dominator (or post-dominator) sets: each node maps to the set of nodes dominating it
pub type DominatorMap = HashMap<NodeIndex, HashSet<NodeIndex>>;

///
/// Compute the dominator sets of all nodes reachable from `root`
///
/// With `reversed = true`, edges are followed backwards, i.e., the result are the
/// post-dominator sets with respect to `root` as the designated end node.
///
/// Iterative fixpoint: all sets start as the full reachable universe (the root's as `{root}`)
/// and shrink to `dom(n) = {n} ∪ ⋂ dom(p)` over the immediate predecessors `p`.
///
pub fn compute_dominators<N, E>(
    graph: &GraphModel<N, E>,
    root: NodeIndex,
    reversed: bool,
) -> DominatorMap {
    let universe = graph.reachable_from(root, reversed);
    let mut order: Vec<NodeIndex> = universe.iter().copied().collect();
    order.sort();

    let mut dom: DominatorMap = order
        .iter()
        .map(|n| {
            if *n == root {
                (*n, HashSet::from([root]))
            } else {
                (*n, universe.clone())
            }
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for n in order.iter().filter(|n| **n != root) {
            let preds = if reversed {
                graph.successors(*n)
            } else {
                graph.predecessors(*n)
            };
            let mut new_set: Option<HashSet<NodeIndex>> = None;
            for p in preds.iter().filter(|p| universe.contains(p)) {
                let Some(dom_p) = dom.get(p) else { continue };
                new_set = Some(match new_set {
                    None => dom_p.clone(),
                    Some(acc) => acc.intersection(dom_p).copied().collect(),
                });
            }
            let mut new_set = new_set.unwrap_or_default();
            new_set.insert(*n);
            if dom.get(n) != Some(&new_set) {
                dom.insert(*n, new_set);
                changed = true;
            }
        }
    }
    dom
}

///
/// Inverse view of a [`DominatorMap`]: for every node `d`, the nodes dominated by `d`
///
/// Not an immediate-dominator tree; nodes are only related through subset tests.
///
#[derive(Debug, Clone, Default)]
pub struct DominanceForest {
    dominated: HashMap<NodeIndex, HashSet<NodeIndex>>,
}

impl DominanceForest {
    /// Build the forest from dominator sets
    pub fn new(dominators: &DominatorMap) -> Self {
        let mut dominated: HashMap<NodeIndex, HashSet<NodeIndex>> = HashMap::new();
        for (n, doms) in dominators {
            for d in doms {
                dominated.entry(*d).or_default().insert(*n);
            }
        }
        Self { dominated }
    }

    /// All nodes dominated by `d` (including `d` itself); empty if `d` is unknown
    pub fn dominated_by(&self, d: NodeIndex) -> HashSet<NodeIndex> {
        self.dominated.get(&d).cloned().unwrap_or_default()
    }

    /// Checks if `d` dominates `n`
    pub fn dominates(&self, d: NodeIndex, n: NodeIndex) -> bool {
        self.dominated.get(&d).is_some_and(|s| s.contains(&n))
    }
}
