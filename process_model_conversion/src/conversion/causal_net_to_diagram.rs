use std::collections::{BTreeMap, HashMap};

use log::info;

use super::binding_splitter::split_overlapping_bindings;
use super::net_to_diagram::connect_unique;
use super::simplify::simplify;
use super::{
    CausalNetToDiagramConfig, Conversion, ConversionContext, ConversionError, ConversionWarning,
};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, GatewayKind,
};
use crate::core::process_models::case_centric::causal_net::{CausalNet, CausalNodeID};

///
/// Translate a [`CausalNet`] into an [`ActivityDiagram`]
///
/// Nodes with overlapping input bindings are split first (see
/// [`split_overlapping_bindings`]); this modifies the passed net.
///
/// Every node becomes an activity. Several output bindings of a node become an exclusive split,
/// a binding with several members a parallel split (input bindings symmetrically become joins).
/// A dependency that occurs in several output bindings of its source is merged by an exclusive
/// join before it reaches the target.
///
pub fn causal_net_to_activity_diagram(
    net: &mut CausalNet,
    config: &CausalNetToDiagramConfig,
) -> Result<Conversion<ActivityDiagram, CausalNodeID, NodeIndex>, ConversionError> {
    info!("Translating causal net with {} nodes", net.nodes.len());
    let start_node = net
        .start
        .filter(|s| net.node(*s).is_some())
        .ok_or(ConversionError::MissingStartNode)?;
    let end_node = net
        .end
        .filter(|e| net.node(*e).is_some())
        .ok_or(ConversionError::MissingEndNode)?;

    let mut ctx: ConversionContext<CausalNodeID, NodeIndex> = ConversionContext::new();
    for split in split_overlapping_bindings(net) {
        ctx.warn(ConversionWarning::BindingsSplit {
            node: split.original,
            replicas: split.replicas.len(),
        });
    }
    // The end node may have been replaced by a splitting terminal
    let end_node = net.end.unwrap_or(end_node);

    let output_dependencies = net.output_dependencies();
    let input_dependencies = net.input_dependencies();
    for (from, to) in output_dependencies.symmetric_difference(&input_dependencies) {
        ctx.warn(ConversionWarning::InconsistentDependency {
            from: *from,
            to: *to,
        });
    }

    let mut diagram = ActivityDiagram::new();
    let start = diagram.add_event(EventKind::Start);
    let end = diagram.add_event(EventKind::End);

    let ids = net.node_ids();
    let activities: HashMap<CausalNodeID, NodeIndex> = ids
        .iter()
        .filter_map(|id| net.node(*id))
        .map(|n| {
            let label = n.label.clone().unwrap_or_default();
            (n.id(), diagram.add_activity(label))
        })
        .collect();
    for (id, activity) in &activities {
        ctx.map(*id, *activity);
    }

    // Nodes from which a dependency leaves its source / at which it enters its target
    let mut out_ports: BTreeMap<(CausalNodeID, CausalNodeID), Vec<NodeIndex>> = BTreeMap::new();
    let mut in_ports: BTreeMap<(CausalNodeID, CausalNodeID), Vec<NodeIndex>> = BTreeMap::new();
    for id in &ids {
        let (Some(node), Some(activity)) = (net.node(*id), activities.get(id).copied()) else {
            continue;
        };

        let origin = if node.output_bindings.len() > 1 {
            let split = diagram.add_gateway(GatewayKind::Exclusive);
            diagram.add_flow(activity, split);
            split
        } else {
            activity
        };
        for binding in &node.output_bindings {
            let port = if binding.len() > 1 {
                let fork = diagram.add_gateway(GatewayKind::Parallel);
                diagram.add_flow(origin, fork);
                fork
            } else {
                origin
            };
            for succ in binding {
                out_ports.entry((*id, *succ)).or_default().push(port);
            }
        }

        let target = if node.input_bindings.len() > 1 {
            let merge = diagram.add_gateway(GatewayKind::Exclusive);
            diagram.add_flow(merge, activity);
            merge
        } else {
            activity
        };
        for binding in &node.input_bindings {
            let port = if binding.len() > 1 {
                let sync = diagram.add_gateway(GatewayKind::Parallel);
                diagram.add_flow(sync, target);
                sync
            } else {
                target
            };
            for pred in binding {
                in_ports.entry((*pred, *id)).or_default().push(port);
            }
        }
    }

    for ((from, to), sources) in &out_ports {
        let Some(targets) = in_ports.get(&(*from, *to)) else {
            continue;
        };
        let source = match sources.as_slice() {
            [single] => *single,
            _ => {
                let merge = diagram.add_gateway(GatewayKind::Exclusive);
                for s in sources {
                    connect_unique(&mut diagram, *s, merge);
                }
                merge
            }
        };
        match targets.as_slice() {
            [single] => connect_unique(&mut diagram, source, *single),
            _ => {
                let choice = diagram.add_gateway(GatewayKind::Exclusive);
                connect_unique(&mut diagram, source, choice);
                for t in targets {
                    connect_unique(&mut diagram, choice, *t);
                }
            }
        }
    }

    if let Some(first) = activities.get(&start_node) {
        diagram.add_flow(start, *first);
    }
    if let Some(last) = activities.get(&end_node) {
        connect_unique(&mut diagram, *last, end);
    }

    if config.simplify {
        simplify(&mut diagram);
        ctx.retain_existing(&diagram.graph);
    }
    Ok(ctx.finish(diagram))
}
