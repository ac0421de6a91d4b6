use std::collections::{HashSet, VecDeque};

use log::{debug, info};

use super::{Conversion, ConversionContext, ConversionError, SubprocessConfig};
use crate::analysis::sese::{collect_region, discover_sese_borders};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, GraphNode,
};

/// SESE region awaiting a container
#[derive(Debug)]
struct Region {
    entry: NodeIndex,
    exit: NodeIndex,
    members: HashSet<NodeIndex>,
}

/// Region already turned into a container
#[derive(Debug)]
struct Claimed {
    container: NodeIndex,
    members: HashSet<NodeIndex>,
}

///
/// Regroup the top-level control flow of an [`ActivityDiagram`] into nested subprocesses
/// (in place)
///
/// Every non-trivial single-entry-single-exit region (see
/// [`discover_sese_borders`]) between the unique start and end event becomes a
/// [`SubProcess`](crate::core::process_models::case_centric::activity_diagram::NodeKind::SubProcess)
/// container. Flows into the region's entry and out of its exit are rerouted to the container;
/// inside, a start event precedes the entry and an end event follows the exit. Regions are
/// claimed from the outside in, so nested regions become nested containers. A region only
/// partially overlapping an already claimed one is left alone.
///
/// The returned mapping sends each region entry to its container.
///
pub fn group_into_subprocesses(
    diagram: &mut ActivityDiagram,
    config: &SubprocessConfig,
) -> Result<Conversion<(), NodeIndex, NodeIndex>, ConversionError> {
    let start = match diagram.start_events().as_slice() {
        [] => return Err(ConversionError::MissingStartNode),
        [single] => *single,
        more => return Err(ConversionError::MultipleStartNodes(more.len())),
    };
    let end = match diagram.end_events().as_slice() {
        [] => return Err(ConversionError::MissingEndNode),
        [single] => *single,
        more => return Err(ConversionError::MultipleEndNodes(more.len())),
    };
    info!(
        "Grouping activity diagram with {} nodes into subprocesses",
        diagram.graph.node_count()
    );

    let mut borders = discover_sese_borders(&diagram.graph, start, end);
    borders.remove(&start);
    let mut regions: Vec<Region> = borders
        .into_iter()
        .map(|(entry, exit)| Region {
            entry,
            exit,
            members: collect_region(&diagram.graph, entry, exit),
        })
        .collect();
    regions.sort_by(|a, b| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then(a.entry.cmp(&b.entry))
    });

    let mut ctx: ConversionContext<NodeIndex, NodeIndex> = ConversionContext::new();
    let mut claimed: Vec<Claimed> = Vec::new();
    let mut queue: VecDeque<Region> = regions.into();
    while let Some(region) = queue.pop_front() {
        let enclosed = queue.iter().any(|other| {
            other.members.len() > region.members.len() && region.members.is_subset(&other.members)
        });
        if enclosed {
            queue.push_back(region);
            continue;
        }
        let overlapping = claimed.iter().any(|c| {
            !c.members.is_disjoint(&region.members) && !region.members.is_subset(&c.members)
        });
        if overlapping {
            debug!(
                "Dropped region {:?} -> {:?} overlapping a claimed region",
                region.entry, region.exit
            );
            continue;
        }

        let parent = claimed
            .iter()
            .filter(|c| region.members.is_subset(&c.members))
            .min_by_key(|c| c.members.len())
            .map(|c| c.container);
        let label = format!("{} {}", config.label_prefix, claimed.len() + 1);
        let container = claim(diagram, &region, label, parent);
        debug!(
            "Claimed region {:?} -> {:?} with {} members as {:?}",
            region.entry,
            region.exit,
            region.members.len(),
            container
        );
        ctx.map(region.entry, container);
        claimed.push(Claimed {
            container,
            members: region.members,
        });
    }
    Ok(ctx.finish(()))
}

/// Move the region's members into a new container and reroute the boundary flows
fn claim(
    diagram: &mut ActivityDiagram,
    region: &Region,
    label: String,
    parent: Option<NodeIndex>,
) -> NodeIndex {
    let container = diagram.add_subprocess(label, parent);
    for member in &region.members {
        diagram.set_parent(*member, Some(container));
    }

    for pred in diagram.graph.predecessors(region.entry) {
        if !region.members.contains(&pred) {
            diagram
                .graph
                .redirect_edge((pred, region.entry), (pred, container));
        }
    }
    for succ in diagram.graph.successors(region.exit) {
        if !region.members.contains(&succ) {
            diagram
                .graph
                .redirect_edge((region.exit, succ), (container, succ));
        }
    }

    let event_kind = |d: &ActivityDiagram, n: NodeIndex| d.node(n).and_then(GraphNode::event_kind);
    if event_kind(diagram, region.entry) != Some(EventKind::Start) {
        let inner_start = diagram.add_event(EventKind::Start);
        diagram.set_parent(inner_start, Some(container));
        diagram.add_flow(inner_start, region.entry);
    }
    if event_kind(diagram, region.exit) != Some(EventKind::End) {
        let inner_end = diagram.add_event(EventKind::End);
        diagram.set_parent(inner_end, Some(container));
        diagram.add_flow(region.exit, inner_end);
    }
    container
}
