use log::debug;

use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, Flow, GatewayKind, GraphNode,
};

/// Outcome of [`simplify`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimplificationReport {
    /// Nodes removed from the diagram
    pub removed_nodes: Vec<NodeIndex>,
    /// Silent activities left in place because they do not have exactly one incoming and one
    /// outgoing flow
    pub ambiguous_silent_activities: Vec<NodeIndex>,
}

///
/// Structurally reduce an [`ActivityDiagram`] (in place) until no rule applies
///
/// * Silent activities with one incoming and one outgoing flow are spliced out.
/// * Adjacent exclusive (or parallel) gateways of the same kind are merged if the upstream
///   gateway has a single outgoing or the downstream gateway a single incoming flow.
/// * Gateways with one incoming and one outgoing flow are spliced out.
/// * A parallel split with a single incoming flow from a non-silent activity is absorbed into
///   that activity's outgoing flows; an exclusive join with a single outgoing flow into a
///   non-silent activity is absorbed into that activity's incoming flows.
///
/// Rewrites that would create a duplicate flow or a self-loop are skipped.
/// Applying [`simplify`] to its own result changes nothing.
///
pub fn simplify(diagram: &mut ActivityDiagram) -> SimplificationReport {
    let mut report = SimplificationReport::default();
    let mut changed = true;
    while changed {
        changed = false;
        for n in diagram.graph.node_ids() {
            if !diagram.contains(n) {
                continue;
            }
            let removed = splice_silent_activity(diagram, n)
                .or_else(|| merge_gateways(diagram, n))
                .or_else(|| splice_gateway(diagram, n))
                .or_else(|| absorb_gateway(diagram, n));
            if let Some(removed) = removed {
                report.removed_nodes.push(removed);
                changed = true;
            }
        }
    }
    report.ambiguous_silent_activities = diagram
        .activities()
        .into_iter()
        .filter(|n| {
            diagram.node(*n).is_some_and(GraphNode::is_silent_activity)
                && (diagram.graph.in_degree(*n) != 1 || diagram.graph.out_degree(*n) != 1)
        })
        .collect();
    report
}

/// Replace `pred -> n -> succ` by `pred -> succ`, returning the removed node
fn splice(diagram: &mut ActivityDiagram, n: NodeIndex) -> Option<NodeIndex> {
    if diagram.graph.in_degree(n) != 1 || diagram.graph.out_degree(n) != 1 {
        return None;
    }
    let pred = *diagram.graph.predecessors(n).first()?;
    let succ = *diagram.graph.successors(n).first()?;
    if pred == n || succ == n || pred == succ || diagram.graph.contains_edge(pred, succ) {
        return None;
    }
    let incoming = diagram.graph.edge(pred, n).cloned().unwrap_or_default();
    let outgoing = diagram.graph.edge(n, succ).cloned().unwrap_or_default();
    let flow = Flow {
        label: incoming.label.or(outgoing.label),
    };
    diagram.remove_node(n);
    diagram.graph.add_edge(pred, succ, flow);
    Some(n)
}

fn splice_silent_activity(diagram: &mut ActivityDiagram, n: NodeIndex) -> Option<NodeIndex> {
    if !diagram.node(n)?.is_silent_activity() {
        return None;
    }
    let removed = splice(diagram, n)?;
    debug!("Removed silent activity {:?}", n);
    Some(removed)
}

fn splice_gateway(diagram: &mut ActivityDiagram, n: NodeIndex) -> Option<NodeIndex> {
    diagram.node(n)?.gateway_kind()?;
    let removed = splice(diagram, n)?;
    debug!("Removed pass-through gateway {:?}", n);
    Some(removed)
}

/// Merge a same-kind successor gateway into `g1`, returning the removed gateway
fn merge_gateways(diagram: &mut ActivityDiagram, g1: NodeIndex) -> Option<NodeIndex> {
    let kind = diagram.node(g1)?.gateway_kind()?;
    if !matches!(kind, GatewayKind::Exclusive | GatewayKind::Parallel) {
        return None;
    }
    let g2 = diagram.graph.successors(g1).into_iter().find(|g2| {
        *g2 != g1
            && diagram.node(*g2).and_then(GraphNode::gateway_kind) == Some(kind)
            && (diagram.graph.out_degree(g1) == 1 || diagram.graph.in_degree(*g2) == 1)
            && can_merge(diagram, g1, *g2)
    })?;

    diagram.graph.remove_edge(g1, g2);
    for pred in diagram.graph.predecessors(g2) {
        diagram.graph.redirect_edge((pred, g2), (pred, g1));
    }
    for succ in diagram.graph.successors(g2) {
        diagram.graph.redirect_edge((g2, succ), (g1, succ));
    }
    diagram.remove_node(g2);
    debug!("Merged gateway {:?} into {:?}", g2, g1);
    Some(g2)
}

fn can_merge(diagram: &ActivityDiagram, g1: NodeIndex, g2: NodeIndex) -> bool {
    let preds_ok = diagram
        .graph
        .predecessors(g2)
        .iter()
        .filter(|pred| **pred != g1)
        .all(|pred| *pred != g2 && !diagram.graph.contains_edge(*pred, g1));
    let succs_ok = diagram
        .graph
        .successors(g2)
        .iter()
        .all(|succ| *succ != g1 && *succ != g2 && !diagram.graph.contains_edge(g1, *succ));
    preds_ok && succs_ok
}

fn is_visible_activity(diagram: &ActivityDiagram, n: NodeIndex) -> bool {
    diagram
        .node(n)
        .is_some_and(|node| node.is_activity() && !node.is_silent_activity())
}

/// Absorb a parallel split after (or an exclusive join before) a non-silent activity
fn absorb_gateway(diagram: &mut ActivityDiagram, g: NodeIndex) -> Option<NodeIndex> {
    let kind = diagram.node(g)?.gateway_kind()?;
    match kind {
        GatewayKind::Parallel if diagram.graph.in_degree(g) == 1 => {
            let activity = *diagram.graph.predecessors(g).first()?;
            if !is_visible_activity(diagram, activity) {
                return None;
            }
            let succs = diagram.graph.successors(g);
            if succs
                .iter()
                .any(|s| *s == activity || *s == g || diagram.graph.contains_edge(activity, *s))
            {
                return None;
            }
            diagram.graph.remove_edge(activity, g);
            for s in succs {
                diagram.graph.redirect_edge((g, s), (activity, s));
            }
        }
        GatewayKind::Exclusive if diagram.graph.out_degree(g) == 1 => {
            let activity = *diagram.graph.successors(g).first()?;
            if !is_visible_activity(diagram, activity) {
                return None;
            }
            let preds = diagram.graph.predecessors(g);
            if preds
                .iter()
                .any(|p| *p == activity || *p == g || diagram.graph.contains_edge(*p, activity))
            {
                return None;
            }
            diagram.graph.remove_edge(g, activity);
            for p in preds {
                diagram.graph.redirect_edge((p, g), (p, activity));
            }
        }
        _ => return None,
    }
    diagram.remove_node(g);
    debug!("Absorbed gateway {:?} into adjacent activity", g);
    Some(g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process_models::case_centric::activity_diagram::EventKind;

    fn edges(d: &ActivityDiagram) -> Vec<(NodeIndex, NodeIndex)> {
        let mut e: Vec<_> = d.graph.edges().map(|(f, t, _)| (f, t)).collect();
        e.sort();
        e
    }

    #[test]
    fn splices_silent_activities_and_pass_through_gateways() {
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let tau = d.add_silent_activity();
        let g = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("a");
        let e = d.add_event(EventKind::End);
        d.add_flow(s, tau);
        d.add_labelled_flow(tau, g, "guard");
        d.add_flow(g, a);
        d.add_flow(a, e);

        let report = simplify(&mut d);
        assert_eq!(report.removed_nodes.len(), 2);
        assert!(report.ambiguous_silent_activities.is_empty());
        assert_eq!(edges(&d), vec![(s, a), (a, e)]);
        assert_eq!(
            d.graph.edge(s, a).and_then(|f| f.label.clone()),
            Some("guard".to_string())
        );
    }

    #[test]
    fn skip_branch_is_kept() {
        // s -> x -> {a, tau} -> j -> e: splicing tau would duplicate x -> j
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let x = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("a");
        let tau = d.add_silent_activity();
        let j = d.add_gateway(GatewayKind::Exclusive);
        let e = d.add_event(EventKind::End);
        for (f, t) in [(s, x), (x, a), (x, tau), (a, j), (tau, j), (j, e)] {
            d.add_flow(f, t);
        }
        d.add_flow(x, j);

        let report = simplify(&mut d);
        assert!(d.contains(tau));
        assert!(report.removed_nodes.is_empty());
        assert!(report.ambiguous_silent_activities.is_empty());
    }

    #[test]
    fn merges_same_kind_gateways() {
        // s -> and1 -> {a, and2 -> {b, c}} -> ... (and2 has fan-in 1)
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let and1 = d.add_gateway(GatewayKind::Parallel);
        let and2 = d.add_gateway(GatewayKind::Parallel);
        let a = d.add_activity("a");
        let b = d.add_activity("b");
        let c = d.add_activity("c");
        let join = d.add_gateway(GatewayKind::Parallel);
        let e = d.add_event(EventKind::End);
        for (f, t) in [
            (s, and1),
            (and1, a),
            (and1, and2),
            (and2, b),
            (and2, c),
            (a, join),
            (b, join),
            (c, join),
            (join, e),
        ] {
            d.add_flow(f, t);
        }

        simplify(&mut d);
        assert!(!d.contains(and2));
        assert_eq!(d.graph.successors(and1), vec![a, b, c]);
        assert!(d.contains(join));
    }

    #[test]
    fn absorbs_gateways_next_to_activities() {
        // s -> x -> a -> and -> {b, c}, b -> e1, c -> e2 with x an XOR-join fed by s and b
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let x = d.add_gateway(GatewayKind::Exclusive);
        let a = d.add_activity("a");
        let and = d.add_gateway(GatewayKind::Parallel);
        let b = d.add_activity("b");
        let c = d.add_activity("c");
        let e = d.add_event(EventKind::End);
        for (f, t) in [(s, x), (b, x), (x, a), (a, and), (and, b), (and, c), (c, e)] {
            d.add_flow(f, t);
        }

        simplify(&mut d);
        assert!(!d.contains(x));
        assert!(!d.contains(and));
        assert_eq!(d.graph.predecessors(a), vec![s, b]);
        assert_eq!(d.graph.successors(a), vec![b, c]);
    }

    #[test]
    fn idempotent() {
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let g1 = d.add_gateway(GatewayKind::Exclusive);
        let t1 = d.add_silent_activity();
        let t2 = d.add_silent_activity();
        let a = d.add_activity("a");
        let g2 = d.add_gateway(GatewayKind::Exclusive);
        let g3 = d.add_gateway(GatewayKind::Exclusive);
        let e = d.add_event(EventKind::End);
        for (f, t) in [
            (s, g1),
            (g1, t1),
            (g1, a),
            (t1, g2),
            (a, g2),
            (g2, g3),
            (g3, t2),
            (t2, e),
        ] {
            d.add_flow(f, t);
        }
        simplify(&mut d);
        let nodes_once = d.graph.node_ids();
        let edges_once = edges(&d);

        let report = simplify(&mut d);
        assert!(report.removed_nodes.is_empty());
        assert_eq!(d.graph.node_ids(), nodes_once);
        assert_eq!(edges(&d), edges_once);
    }
}
