use std::collections::{HashMap, HashSet};

use log::debug;

use super::dominators::{compute_dominators, DominanceForest};
use crate::core::graph::{GraphModel, NodeIndex};

///
/// Discover single-entry-single-exit (SESE) borders of a graph
///
/// Returns a map from entry nodes `d` to their exit node `p`. A pair qualifies if
///
/// * the nodes dominated by `d` (cut at `p`) are exactly the nodes post-dominated by `p`
///   (cut at `d`),
/// * exactly one edge enters the region (into `d`) and exactly one leaves it (out of `p`), and
/// * the region contains a branch or a cycle (at least as many internal edges as members).
///
/// `root` and `sink` never act as borders of inner regions; the whole-graph pair
/// `root -> sink` is always contained. If several exits qualify for one entry, the one
/// enclosing the smallest region is kept.
///
pub fn discover_sese_borders<N, E>(
    graph: &GraphModel<N, E>,
    root: NodeIndex,
    sink: NodeIndex,
) -> HashMap<NodeIndex, NodeIndex> {
    let dominators = DominanceForest::new(&compute_dominators(graph, root, false));
    let post_dominators = DominanceForest::new(&compute_dominators(graph, sink, true));

    let mut candidates: Vec<NodeIndex> = graph
        .node_ids()
        .into_iter()
        .filter(|n| *n != root && *n != sink)
        .filter(|n| dominators.dominates(root, *n) && post_dominators.dominates(sink, *n))
        .collect();
    candidates.sort();

    let mut borders = HashMap::new();
    borders.insert(root, sink);

    for d in &candidates {
        let dominated_by_d = dominators.dominated_by(*d);
        let post_dominated_by_d = post_dominators.dominated_by(*d);
        let mut best: Option<(NodeIndex, usize)> = None;
        for p in candidates.iter().filter(|p| *p != d) {
            if !dominated_by_d.contains(p) || !post_dominators.dominates(*p, *d) {
                continue;
            }
            let mut cut_p = dominators.dominated_by(*p);
            cut_p.remove(p);
            let left: HashSet<NodeIndex> = dominated_by_d.difference(&cut_p).copied().collect();

            let mut cut_d = post_dominated_by_d.clone();
            cut_d.remove(d);
            let right: HashSet<NodeIndex> = post_dominators
                .dominated_by(*p)
                .difference(&cut_d)
                .copied()
                .collect();

            if left != right
                || !has_single_entry_and_exit(graph, &left, *d, *p)
                || !is_non_trivial(graph, &left)
            {
                continue;
            }
            if best.map_or(true, |(_, size)| left.len() < size) {
                best = Some((*p, left.len()));
            }
        }
        if let Some((p, size)) = best {
            debug!("SESE region {d:?} -> {p:?} with {size} members");
            borders.insert(*d, p);
        }
    }
    borders
}

///
/// Collect the region between `d` and `p`: all nodes reachable from `d` without passing
/// beyond `p` (both borders included)
///
pub fn collect_region<N, E>(
    graph: &GraphModel<N, E>,
    d: NodeIndex,
    p: NodeIndex,
) -> HashSet<NodeIndex> {
    let mut region = HashSet::new();
    let mut stack = vec![d];
    while let Some(n) = stack.pop() {
        if !region.insert(n) || n == p {
            continue;
        }
        stack.extend(graph.successors(n));
    }
    region
}

fn has_single_entry_and_exit<N, E>(
    graph: &GraphModel<N, E>,
    region: &HashSet<NodeIndex>,
    d: NodeIndex,
    p: NodeIndex,
) -> bool {
    let mut entering = 0;
    let mut leaving = 0;
    for (from, to, _) in graph.edges() {
        match (region.contains(&from), region.contains(&to)) {
            (false, true) if to == d => entering += 1,
            (true, false) if from == p => leaving += 1,
            (false, true) | (true, false) => return false,
            _ => {}
        }
    }
    entering == 1 && leaving == 1
}

fn is_non_trivial<N, E>(graph: &GraphModel<N, E>, region: &HashSet<NodeIndex>) -> bool {
    let internal_edges = graph
        .edges()
        .filter(|(from, to, _)| region.contains(from) && region.contains(to))
        .count();
    internal_edges >= region.len()
}
