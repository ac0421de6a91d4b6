use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, info};
use uuid::Uuid;

use super::free_choice::{non_free_choice_places, normalize};
use super::simplify::simplify;
use super::{
    Conversion, ConversionContext, ConversionError, ConversionWarning, NetToDiagramConfig,
};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, GatewayKind,
};
use crate::core::process_models::case_centric::petri_net::{
    ArcType, PetriNet, PlaceID, TransitionID,
};

///
/// Translate a free-choice [`PetriNet`] into an [`ActivityDiagram`]
///
/// Transitions become activities (invisible ones silent activities). Places sharing their
/// output transitions form one class: a class of several places synchronizes through a
/// parallel join, a class with several output transitions chooses through an exclusive split.
/// Places with several incoming contributions merge through an exclusive join, transitions
/// with several output places fork through a parallel split.
///
/// With [`NetToDiagramConfig::normalize_free_choice`], the net is first made free-choice
/// (see [`normalize`]); this modifies the passed net. Otherwise, nets that are not
/// free-choice are rejected.
///
/// The mapping relates transitions to their activities (and places with an exclusive join to
/// that gateway).
///
pub fn net_to_activity_diagram(
    net: &mut PetriNet,
    config: &NetToDiagramConfig,
) -> Result<Conversion<ActivityDiagram, Uuid, NodeIndex>, ConversionError> {
    info!(
        "Translating Petri net with {} places and {} transitions",
        net.places.len(),
        net.transitions.len()
    );
    if source_places(net).is_empty() {
        return Err(ConversionError::MissingStartNode);
    }
    if sink_places(net).is_empty() {
        return Err(ConversionError::MissingEndNode);
    }
    if !config.normalize_free_choice {
        let violating = non_free_choice_places(net);
        if !violating.is_empty() {
            return Err(ConversionError::NotFreeChoice(violating.into_iter().collect()));
        }
    }

    let mut ctx: ConversionContext<Uuid, NodeIndex> = ConversionContext::new();
    for arc in net.special_arcs() {
        match arc.from_to {
            ArcType::Reset(place, transition) => ctx.warn(ConversionWarning::ResetArcDropped {
                place: PlaceID(place),
                transition: TransitionID(transition),
            }),
            ArcType::Inhibitor(place, transition) => {
                ctx.warn(ConversionWarning::InhibitorArcDropped {
                    place: PlaceID(place),
                    transition: TransitionID(transition),
                })
            }
            _ => {}
        }
    }
    if config.normalize_free_choice {
        let split_arcs = normalize(net);
        if split_arcs > 0 {
            ctx.warn(ConversionWarning::FreeChoiceRepaired { split_arcs });
        }
    }

    let mut diagram = ActivityDiagram::new();
    let start = diagram.add_event(EventKind::Start);
    let end = diagram.add_event(EventKind::End);

    let transitions = net.transition_ids();
    let activities: HashMap<TransitionID, NodeIndex> = transitions
        .iter()
        .map(|t| {
            let label = net.transitions[&t.0].label.clone().unwrap_or_default();
            (*t, diagram.add_activity(label))
        })
        .collect();
    for (t, activity) in &activities {
        ctx.map(t.0, *activity);
    }

    // Where the tokens produced by a transition leave it
    let mut outlets: HashMap<TransitionID, NodeIndex> = HashMap::new();
    for t in &transitions {
        let activity = activities[t];
        let postset = net.postset_of_transition(*t);
        let preset = net.preset_of_transition(*t);
        if preset.is_empty() || postset.is_empty() {
            ctx.warn(ConversionWarning::UnconnectedTransition(*t));
        }
        if postset.is_empty() {
            connect_unique(&mut diagram, activity, end);
        }
        let outlet = if postset.len() > 1 {
            let split = diagram.add_gateway(GatewayKind::Parallel);
            diagram.add_flow(activity, split);
            split
        } else {
            activity
        };
        outlets.insert(*t, outlet);
    }

    // Start event fans out to source places and to transitions without input places
    let sources = source_places(net);
    let unfed: Vec<TransitionID> = transitions
        .iter()
        .filter(|t| net.preset_of_transition(**t).is_empty())
        .copied()
        .collect();
    let start_outlet = if sources.len() + unfed.len() > 1 {
        let split = diagram.add_gateway(GatewayKind::Parallel);
        diagram.add_flow(start, split);
        split
    } else {
        start
    };
    for t in &unfed {
        connect_unique(&mut diagram, start_outlet, activities[t]);
    }

    // Entry node of each place: the node its token flows into
    let mut entries: HashMap<PlaceID, NodeIndex> = HashMap::new();
    for class in place_classes(net) {
        let postset: BTreeSet<TransitionID> = class
            .iter()
            .flat_map(|p| net.postset_of_place(*p))
            .collect();
        let choice = if postset.len() > 1 {
            let split = diagram.add_gateway(GatewayKind::Exclusive);
            for t in &postset {
                connect_unique(&mut diagram, split, activities[t]);
            }
            split
        } else {
            match postset.first() {
                Some(t) => activities[t],
                None => continue,
            }
        };
        let entry = if class.len() > 1 {
            let join = diagram.add_gateway(GatewayKind::Parallel);
            diagram.add_flow(join, choice);
            join
        } else {
            choice
        };
        debug!(
            "Place class of {} places with {} output transitions",
            class.len(),
            postset.len()
        );
        for p in class {
            entries.insert(p, entry);
        }
    }

    for p in net.place_ids() {
        let entry = entries.get(&p).copied().unwrap_or(end);
        let mut contributors: Vec<NodeIndex> = net
            .preset_of_place(p)
            .iter()
            .filter_map(|t| outlets.get(t).copied())
            .collect();
        if sources.contains(&p) {
            contributors.push(start_outlet);
        }
        if contributors.len() > 1 {
            let join = diagram.add_gateway(GatewayKind::Exclusive);
            for c in contributors {
                connect_unique(&mut diagram, c, join);
            }
            connect_unique(&mut diagram, join, entry);
            ctx.map(p.0, join);
        } else if let Some(c) = contributors.first() {
            connect_unique(&mut diagram, *c, entry);
        }
    }

    if config.simplify {
        let report = simplify(&mut diagram);
        debug!(
            "Simplification removed {} nodes",
            report.removed_nodes.len()
        );
        ctx.retain_existing(&diagram.graph);
    }
    Ok(ctx.finish(diagram))
}

/// Places without incoming arcs or marked in the initial marking
fn source_places(net: &PetriNet) -> BTreeSet<PlaceID> {
    net.place_ids()
        .into_iter()
        .filter(|p| net.preset_of_place(*p).is_empty() || net.is_in_initial_marking(p))
        .collect()
}

/// Places without outgoing (ordinary) arcs
fn sink_places(net: &PetriNet) -> BTreeSet<PlaceID> {
    net.place_ids()
        .into_iter()
        .filter(|p| net.postset_of_place(*p).is_empty())
        .collect()
}

/// Group places with non-empty postsets whose postsets are subsets or supersets of each other
fn place_classes(net: &PetriNet) -> Vec<Vec<PlaceID>> {
    let places: Vec<(PlaceID, BTreeSet<TransitionID>)> = net
        .place_ids()
        .into_iter()
        .map(|p| (p, net.postset_of_place(p).into_iter().collect()))
        .filter(|(_, post): &(PlaceID, BTreeSet<TransitionID>)| !post.is_empty())
        .collect();

    let mut parent: Vec<usize> = (0..places.len()).collect();
    fn find(parent: &mut [usize], i: usize) -> usize {
        let mut root = i;
        while parent[root] != root {
            root = parent[root];
        }
        parent[i] = root;
        root
    }
    for i in 0..places.len() {
        for j in i + 1..places.len() {
            let (a, b) = (&places[i].1, &places[j].1);
            if a.is_subset(b) || b.is_subset(a) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                parent[ri.max(rj)] = ri.min(rj);
            }
        }
    }

    let mut classes: BTreeMap<usize, Vec<PlaceID>> = BTreeMap::new();
    for (i, (p, _)) in places.iter().enumerate() {
        let root = find(&mut parent, i);
        classes.entry(root).or_default().push(*p);
    }
    classes.into_values().collect()
}

/// Add `from -> to`; if that flow already exists, route through a fresh silent activity
pub(crate) fn connect_unique(diagram: &mut ActivityDiagram, from: NodeIndex, to: NodeIndex) {
    if diagram.graph.contains_edge(from, to) {
        let tau = diagram.add_silent_activity();
        diagram.add_flow(from, tau);
        diagram.add_flow(tau, to);
    } else {
        diagram.add_flow(from, to);
    }
}
