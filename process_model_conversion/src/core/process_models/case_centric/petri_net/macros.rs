//! Convenient Macros for creating Petri nets
///
/// Creates a [`PetriNet`](crate::PetriNet).
///
/// Every parenthesized group describes one place as `(input transitions ; output transitions)`.
/// Transitions are identified by their label and created on first use.
/// Places without input transitions are marked with one token in the initial marking;
/// places without output transitions form the (single) final marking.
///
/// # Examples
///
/// ```rust
/// use process_model_conversion::{petri_net, PetriNet};
/// let petri_net: PetriNet = petri_net!((; "a"), ("a"; "b", "c"), ("b", "c";));
/// assert_eq!(petri_net.places.len(), 3);
/// assert_eq!(petri_net.transitions.len(), 3);
/// ```

#[macro_export]
macro_rules! petri_net {
    ( $( ($($x:expr),* ; $($y:expr),* ) ),* ) => {{
        #[allow(unused_imports)]
        use std::collections::HashMap;
        #[allow(unused_imports)]
        use $crate::core::process_models::case_centric::petri_net::{
            ArcType,
            Marking,
            PetriNet,
            TransitionID,
        };

        let mut result = PetriNet::new();
        #[allow(unused_mut)]
        let mut transition_id_dict: HashMap<String, TransitionID> = HashMap::new();
        #[allow(unused_mut)]
        let mut final_marking = Marking::new();

        $(
            let place_id = result.add_place(None);
            let inputs: &[&str] = &[$(stringify!($x)),*];
            let outputs: &[&str] = &[$(stringify!($y)),*];

            $(
                let t_in = *transition_id_dict
                    .entry($x.to_string())
                    .or_insert_with_key(|label| result.add_transition(Some(label.clone()), None));
                result.add_arc(ArcType::transition_to_place(t_in, place_id), None);
            )*
            $(
                let t_out = *transition_id_dict
                    .entry($y.to_string())
                    .or_insert_with_key(|label| result.add_transition(Some(label.clone()), None));
                result.add_arc(ArcType::place_to_transition(place_id, t_out), None);
            )*

            if inputs.is_empty() {
                result.mark_initially(place_id);
            }
            if outputs.is_empty() {
                final_marking.insert(place_id, 1);
            }
        )*

        if !final_marking.is_empty() {
            result.add_final_marking(final_marking);
        }
        result
    }}
}

#[cfg(test)]
mod tests {
    use crate::core::process_models::case_centric::petri_net::PetriNet;

    #[test]
    fn macro_builds_marked_net() {
        let net: PetriNet = petri_net!((; "a"), ("a"; "b"), ("b";));
        assert_eq!(net.places.len(), 3);
        assert_eq!(net.transitions.len(), 2);
        assert_eq!(net.arcs.len(), 4);
        assert_eq!(net.initial_marking.as_ref().map(|m| m.len()), Some(1));
        assert_eq!(net.final_markings.as_ref().map(|m| m.len()), Some(1));
    }
}
