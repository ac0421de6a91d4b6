use log::info;
use uuid::Uuid;

use super::simplify::simplify;
use super::{
    Conversion, ConversionContext, ConversionError, ProcessTreeToDiagramConfig,
};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, GatewayKind,
};
use crate::core::process_models::case_centric::process_tree::{
    LeafLabel, Node, OperatorType, ProcessTree,
};

///
/// Translate a [`ProcessTree`] into an [`ActivityDiagram`]
///
/// Leaves become activities (tau leaves silent ones). Exclusive choice and concurrency become
/// matching split/join gateway pairs, sequences chain their children, and loops become an
/// exclusive join before the do-part and an exclusive split after it (back through the redo
/// part, out through the optional exit part).
///
pub fn process_tree_to_activity_diagram(
    tree: &ProcessTree,
    config: &ProcessTreeToDiagramConfig,
) -> Result<Conversion<ActivityDiagram, Uuid, NodeIndex>, ConversionError> {
    info!("Translating process tree with {} leaves", tree.find_all_leaves().len());
    if let Some(op) = tree.find_invalid_operator() {
        return Err(ConversionError::InvalidOperatorArity {
            operator: op.uuid,
            children: op.children.len(),
        });
    }

    let mut ctx: ConversionContext<Uuid, NodeIndex> = ConversionContext::new();
    let mut diagram = ActivityDiagram::new();
    let start = diagram.add_event(EventKind::Start);
    let end = diagram.add_event(EventKind::End);

    // Pending subtrees, each to be placed between two existing nodes
    let mut tasks: Vec<(&Node, NodeIndex, NodeIndex)> = vec![(&tree.root, start, end)];
    while let Some((node, from, to)) = tasks.pop() {
        match node {
            Node::Leaf(leaf) => {
                let label = match &leaf.activity_label {
                    LeafLabel::Activity(label) => label.as_str(),
                    LeafLabel::Tau => "",
                };
                let activity = diagram.add_activity(label);
                diagram.add_flow(from, activity);
                diagram.add_flow(activity, to);
                ctx.map(leaf.uuid, activity);
            }
            Node::Operator(op) => match op.operator_type {
                OperatorType::Sequence => {
                    let mut prev = from;
                    for (i, child) in op.children.iter().enumerate() {
                        let next = if i + 1 == op.children.len() {
                            to
                        } else {
                            diagram.add_silent_activity()
                        };
                        tasks.push((child, prev, next));
                        prev = next;
                    }
                }
                OperatorType::ExclusiveChoice | OperatorType::Concurrency => {
                    let kind = if op.operator_type == OperatorType::ExclusiveChoice {
                        GatewayKind::Exclusive
                    } else {
                        GatewayKind::Parallel
                    };
                    let split = diagram.add_gateway(kind);
                    let join = diagram.add_gateway(kind);
                    diagram.add_flow(from, split);
                    diagram.add_flow(join, to);
                    for child in &op.children {
                        tasks.push((child, split, join));
                    }
                    ctx.map(op.uuid, split);
                }
                OperatorType::Loop => {
                    let join = diagram.add_gateway(GatewayKind::Exclusive);
                    let split = diagram.add_gateway(GatewayKind::Exclusive);
                    diagram.add_flow(from, join);
                    match op.children.as_slice() {
                        [body, redo] => {
                            tasks.push((body, join, split));
                            tasks.push((redo, split, join));
                            diagram.add_flow(split, to);
                        }
                        [body, redo, exit] => {
                            tasks.push((body, join, split));
                            tasks.push((redo, split, join));
                            tasks.push((exit, split, to));
                        }
                        _ => {}
                    }
                    ctx.map(op.uuid, join);
                }
            },
        }
    }

    if config.simplify {
        simplify(&mut diagram);
        ctx.retain_existing(&diagram.graph);
    }
    Ok(ctx.finish(diagram))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process_models::case_centric::activity_diagram::GraphNode;

    fn leaf(label: &str) -> Node {
        Node::new_leaf(Some(label.to_string()))
    }

    fn labels(d: &ActivityDiagram) -> Vec<String> {
        let mut l: Vec<String> = d
            .activities()
            .into_iter()
            .filter_map(|a| d.node(a).map(|n| n.label.clone()))
            .collect();
        l.sort();
        l
    }

    #[test]
    fn sequence_of_choice_and_concurrency() {
        // ->( X(a, b), +(c, d), e )
        let tree = ProcessTree::new(
            Node::new_operator(OperatorType::Sequence)
                .with_child(
                    Node::new_operator(OperatorType::ExclusiveChoice)
                        .with_child(leaf("a"))
                        .with_child(leaf("b")),
                )
                .with_child(
                    Node::new_operator(OperatorType::Concurrency)
                        .with_child(leaf("c"))
                        .with_child(leaf("d")),
                )
                .with_child(leaf("e")),
        );
        let result =
            process_tree_to_activity_diagram(&tree, &ProcessTreeToDiagramConfig::default())
                .unwrap();
        let d = &result.model;
        assert_eq!(labels(d), vec!["a", "b", "c", "d", "e"]);
        // all silent joints are spliced out
        assert!(d
            .activities()
            .iter()
            .all(|a| !d.node(*a).unwrap().is_silent_activity()));
        assert_eq!(d.start_events().len(), 1);
        assert_eq!(d.end_events().len(), 1);
        assert_eq!(result.mapping.len(), 5 + 2);
    }

    #[test]
    fn loop_with_tau_redo() {
        // *(a, tau)
        let tree = ProcessTree::new(
            Node::new_operator(OperatorType::Loop)
                .with_child(leaf("a"))
                .with_child(Node::new_leaf(None)),
        );
        let config = ProcessTreeToDiagramConfig { simplify: false };
        let result = process_tree_to_activity_diagram(&tree, &config).unwrap();
        let d = &result.model;
        let a = d
            .activities()
            .into_iter()
            .find(|n| d.node(*n).unwrap().label == "a")
            .unwrap();
        let join = d.graph.predecessors(a)[0];
        let split = d.graph.successors(a)[0];
        assert_eq!(
            d.node(join).and_then(GraphNode::gateway_kind),
            Some(GatewayKind::Exclusive)
        );
        assert_eq!(d.graph.out_degree(split), 2);
        assert_eq!(d.graph.in_degree(join), 2);
        // split -> end event
        assert!(d.graph.successors(split).contains(&d.end_events()[0]));
    }

    #[test]
    fn loop_leaves_through_exit_child() {
        // *(a, b, c)
        let tree = ProcessTree::new(
            Node::new_operator(OperatorType::Loop)
                .with_child(leaf("a"))
                .with_child(leaf("b"))
                .with_child(leaf("c")),
        );
        let config = ProcessTreeToDiagramConfig { simplify: false };
        let d = process_tree_to_activity_diagram(&tree, &config).unwrap().model;
        let by_label = |l: &str| {
            d.activities()
                .into_iter()
                .find(|n| d.node(*n).unwrap().label == l)
                .unwrap()
        };
        let (a, b, c) = (by_label("a"), by_label("b"), by_label("c"));
        let join = d.graph.predecessors(a)[0];
        let split = d.graph.successors(a)[0];
        let end = d.end_events()[0];
        let out = d.graph.successors(split);
        assert_eq!(out.len(), 2);
        assert!(out.contains(&b) && out.contains(&c));
        assert_eq!(d.graph.successors(b), vec![join]);
        assert_eq!(d.graph.successors(c), vec![end]);
        // the end event is only reached through the exit child
        assert_eq!(d.graph.predecessors(end), vec![c]);
    }

    #[test]
    fn invalid_arity() {
        let op = Node::new_operator(OperatorType::Loop).with_child(leaf("a"));
        let id = *op.get_uuid();
        let tree = ProcessTree::new(Node::new_operator(OperatorType::Sequence).with_child(op));
        assert_eq!(
            process_tree_to_activity_diagram(&tree, &ProcessTreeToDiagramConfig::default())
                .unwrap_err(),
            ConversionError::InvalidOperatorArity {
                operator: id,
                children: 1
            }
        );
    }
}
