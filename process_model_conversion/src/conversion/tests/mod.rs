use std::collections::HashSet;

use crate::analysis::{compute_dominators, discover_sese_borders};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, GatewayKind,
};
use crate::core::process_models::case_centric::causal_net::CausalNet;
use crate::core::process_models::case_centric::process_tree::{Node, OperatorType, ProcessTree};
use crate::petri_net;

use super::*;


/// Node ids and flows, for comparing two diagrams structurally
fn structure(d: &ActivityDiagram) -> (Vec<NodeIndex>, Vec<(NodeIndex, NodeIndex)>) {
    let mut edges: Vec<_> = d.graph.edges().map(|(f, t, _)| (f, t)).collect();
    edges.sort();
    (d.graph.node_ids(), edges)
}

fn leaf(label: &str) -> Node {
    Node::new_leaf(Some(label.to_string()))
}

#[test]
fn dominator_sets_of_translated_loop() {
    // ->(a, *(b, c), d)
    let tree = ProcessTree::new(
        Node::new_operator(OperatorType::Sequence)
            .with_child(leaf("a"))
            .with_child(
                Node::new_operator(OperatorType::Loop)
                    .with_child(leaf("b"))
                    .with_child(leaf("c")),
            )
            .with_child(leaf("d")),
    );
    let diagram = process_tree_to_activity_diagram(&tree, &ProcessTreeToDiagramConfig::default())
        .unwrap()
        .model;
    let start = diagram.start_events()[0];
    let end = diagram.end_events()[0];

    for (root, reversed) in [(start, false), (end, true)] {
        let dom = compute_dominators(&diagram.graph, root, reversed);
        assert_eq!(dom.len(), diagram.graph.node_count());
        assert_eq!(dom[&root], HashSet::from([root]));
        for (n, dominators) in &dom {
            assert!(dominators.contains(&root));
            assert!(dominators.contains(n));
        }
    }
}

#[test]
fn sequential_chain_has_only_whole_graph_border() {
    let mut net = petri_net!((; "a"), ("a"; "b"), ("b"; "c"), ("c"; "d"), ("d";));
    let diagram = net_to_activity_diagram(&mut net, &NetToDiagramConfig::default())
        .unwrap()
        .model;
    let start = diagram.start_events()[0];
    let end = diagram.end_events()[0];
    let borders = discover_sese_borders(&diagram.graph, start, end);
    assert_eq!(borders.len(), 1);
    assert_eq!(borders[&start], end);
}

#[test]
fn split_node_has_one_replica_per_input_binding() {
    let mut net = CausalNet::new();
    let [s, x, y, n, e] = ["s", "x", "y", "n", "e"].map(|l| net.add_node(Some(l.into()), None));
    net.start = Some(s);
    net.end = Some(e);
    net.add_output_binding(s, [x, y]);
    net.add_input_binding(x, [s]);
    net.add_input_binding(y, [s]);
    net.add_output_binding(x, [n]);
    net.add_output_binding(y, [n]);
    net.add_input_binding(n, [x]);
    net.add_input_binding(n, [x, y]);
    net.add_output_binding(n, [e]);
    net.add_input_binding(e, [n]);

    let splits = split_overlapping_bindings(&mut net);
    assert!(net.node(n).is_none());
    let replicas = &splits[0].replicas;
    assert_eq!(replicas.len(), 2);
    assert!(replicas
        .iter()
        .all(|r| net.node(*r).unwrap().input_bindings.len() == 1));
    let terminal = net.node(splits[0].terminal).unwrap();
    assert_eq!(terminal.input_bindings.len(), 2);
    assert_eq!(terminal.predecessors(), replicas.iter().copied().collect());
}

#[test]
fn simplify_is_idempotent_on_translated_nets() {
    let mut net = petri_net!(
        (; "a"),
        ("a"; "b", "c"),
        ("b"; "d"),
        ("c"; "e"),
        ("c"; "f"),
        ("e"; "g"),
        ("f"; "g"),
        ("d", "g";)
    );
    let config = NetToDiagramConfig {
        simplify: false,
        ..Default::default()
    };
    let mut diagram = net_to_activity_diagram(&mut net, &config).unwrap().model;
    let untouched = structure(&diagram);

    let first = simplify(&mut diagram);
    assert!(!first.removed_nodes.is_empty());
    let once = structure(&diagram);
    assert_ne!(once, untouched);

    let second = simplify(&mut diagram);
    assert!(second.removed_nodes.is_empty());
    assert_eq!(structure(&diagram), once);
}

#[test]
fn inclusive_split_yields_one_transition_per_subset() {
    let mut d = ActivityDiagram::new();
    let s = d.add_event(EventKind::Start);
    let or = d.add_gateway(GatewayKind::Inclusive);
    let a = d.add_activity("a");
    let b = d.add_activity("b");
    let e = d.add_event(EventKind::End);
    for (f, t) in [(s, or), (or, a), (or, b), (a, e), (b, e)] {
        d.add_flow(f, t);
    }
    let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
    let invisible = result
        .model
        .transitions
        .values()
        .filter(|t| t.is_invisible())
        .count();
    assert_eq!(invisible, 3);
    assert_eq!(
        result.warnings,
        vec![ConversionWarning::InclusiveGatewayApproximated {
            gateway: or,
            subsets: 3
        }]
    );
}

#[test]
fn net_graph_view_dominators() {
    let net = petri_net!((; "a"), ("a"; "b", "c"), ("b", "c"; "d"), ("d";));
    let (graph, mapping) = net.to_graph_model();
    let source = net.place_ids().into_iter().find(|p| net.is_in_initial_marking(p)).unwrap();
    let d = net
        .transition_ids()
        .into_iter()
        .find(|t| net.transitions[&t.get_uuid()].label.as_deref() == Some("d"))
        .unwrap();
    let dom = compute_dominators(&graph, mapping[&source.get_uuid()], false);
    let a = net
        .transition_ids()
        .into_iter()
        .find(|t| net.transitions[&t.get_uuid()].label.as_deref() == Some("a"))
        .unwrap();
    // source place, a, the choice place, the merge place and d itself
    let dom_d = &dom[&mapping[&d.get_uuid()]];
    assert!(dom_d.contains(&mapping[&a.get_uuid()]));
    assert_eq!(dom_d.len(), 5);
}
