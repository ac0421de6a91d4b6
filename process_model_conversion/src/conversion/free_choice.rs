use std::collections::{BTreeSet, HashSet};

use log::debug;

use crate::core::process_models::case_centric::petri_net::{ArcType, PetriNet, PlaceID};

///
/// Places violating the free-choice property
///
/// For every ordered pair of transitions, the input place sets are compared. Places in a
/// non-empty intersection of two differing input place sets are returned.
///
pub fn non_free_choice_places(net: &PetriNet) -> BTreeSet<PlaceID> {
    let presets: Vec<HashSet<PlaceID>> = net
        .transition_ids()
        .into_iter()
        .map(|t| net.preset_of_transition(t).into_iter().collect())
        .collect();
    let mut marked = BTreeSet::new();
    for (i, pre1) in presets.iter().enumerate() {
        for pre2 in presets.iter().skip(i + 1) {
            if pre1 == pre2 {
                continue;
            }
            marked.extend(pre1.intersection(pre2).copied());
        }
    }
    marked
}

/// Checks if any two places sharing an output transition share all their output transitions
pub fn is_free_choice(net: &PetriNet) -> bool {
    non_free_choice_places(net).is_empty()
}

///
/// Make a [`PetriNet`] free-choice (in place)
///
/// Every outgoing arc `p -> t` of a violating place `p` is replaced by a fresh invisible
/// transition and a fresh place in series (`p -> τ -> q -> t`), until no place violates the
/// property. Reset and inhibitor arcs are left untouched.
///
/// Returns the number of split arcs (0 if the net already was free-choice).
///
pub fn normalize(net: &mut PetriNet) -> usize {
    let special_arcs = net.special_arcs();
    net.arcs.retain(|a| !a.from_to.is_special());

    let mut split_arcs = 0;
    loop {
        let marked = non_free_choice_places(net);
        if marked.is_empty() {
            break;
        }
        for p in marked {
            for t in net.postset_of_place(p) {
                let Some(arc) = net.remove_arc(&ArcType::place_to_transition(p, t)) else {
                    continue;
                };
                let tau = net.add_transition(None, None);
                let q = net.add_place(None);
                net.add_arc(ArcType::place_to_transition(p, tau), None);
                net.add_arc(ArcType::transition_to_place(tau, q), None);
                net.add_arc(ArcType::place_to_transition(q, t), Some(arc.weight));
                split_arcs += 1;
            }
            debug!("Split outgoing arcs of place {}", p.get_uuid());
        }
    }

    net.arcs.extend(special_arcs);
    split_arcs
}
