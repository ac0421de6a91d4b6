use std::collections::BTreeSet;

use log::debug;

use crate::core::process_models::case_centric::causal_net::{Binding, CausalNet, CausalNodeID};

/// Replacement of one node with overlapping input bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSplit {
    /// Removed node
    pub original: CausalNodeID,
    /// One replica per former input binding (in binding order)
    pub replicas: Vec<CausalNodeID>,
    /// Silent node joining all replicas, taking over the original's output bindings
    pub terminal: CausalNodeID,
}

///
/// Replace all nodes with overlapping input bindings (in place)
///
/// A node whose input bindings share members is replaced by one replica per input binding
/// (same label, exactly that binding as its only input binding). All replicas feed one silent
/// terminal node with the singleton input bindings `{r1}, ..., {rk}`, which takes over the
/// output bindings of the original node. Predecessors now choose between the replicas whose
/// binding contains them; successors wait for the terminal. The start node is never split.
///
pub fn split_overlapping_bindings(net: &mut CausalNet) -> Vec<BindingSplit> {
    let mut splits = Vec::new();
    while let Some(original) = net.find_overlapping_node() {
        let Some(node) = net.node(original).cloned() else {
            break;
        };
        let terminal = net.add_node(None, None);
        let input_bindings: Vec<Binding> = node.input_bindings.iter().cloned().collect();
        let replicas: Vec<CausalNodeID> = input_bindings
            .iter()
            .map(|binding| {
                let replica = net.add_node(node.label.clone(), None);
                net.add_input_binding(replica, binding.iter().copied());
                net.add_output_binding(replica, [terminal]);
                net.add_input_binding(terminal, [replica]);
                replica
            })
            .collect();
        for binding in &node.output_bindings {
            net.add_output_binding(terminal, binding.iter().copied());
        }

        for id in net.node_ids() {
            if id == original {
                continue;
            }
            // References to the original from the terminal stem from self-loops
            let origin = if id == terminal { original } else { id };
            let chosen: Vec<CausalNodeID> = replicas
                .iter()
                .zip(&input_bindings)
                .filter(|(_, binding)| binding.contains(&origin))
                .map(|(r, _)| *r)
                .collect();
            let Some(n) = net.node_mut(id) else { continue };
            n.input_bindings = n
                .input_bindings
                .iter()
                .flat_map(|b| replace_in_binding(b, original, &[terminal]))
                .collect();
            n.output_bindings = n
                .output_bindings
                .iter()
                .flat_map(|b| replace_in_binding(b, original, &chosen))
                .collect();
        }

        if net.end == Some(original) {
            net.end = Some(terminal);
        }
        net.nodes.remove(&original.get_uuid());
        debug!(
            "Split node {} into {} replicas",
            original.get_uuid(),
            replicas.len()
        );
        splits.push(BindingSplit {
            original,
            replicas,
            terminal,
        });
    }
    splits
}

/// Replace `original` in `binding` by each of `alternatives` (dropping it if there are none)
fn replace_in_binding(
    binding: &Binding,
    original: CausalNodeID,
    alternatives: &[CausalNodeID],
) -> Vec<Binding> {
    if !binding.contains(&original) {
        return vec![binding.clone()];
    }
    let rest: Binding = binding
        .iter()
        .copied()
        .filter(|n| *n != original)
        .collect();
    if alternatives.is_empty() {
        return if rest.is_empty() { vec![] } else { vec![rest] };
    }
    alternatives
        .iter()
        .map(|alt| {
            let mut b: BTreeSet<CausalNodeID> = rest.clone();
            b.insert(*alt);
            b
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_bindings_are_split() {
        // x -> n, y -> n with input bindings {x} and {x, y}; n -> z
        let mut net = CausalNet::new();
        let s = net.add_node(Some("s".into()), None);
        let x = net.add_node(Some("x".into()), None);
        let y = net.add_node(Some("y".into()), None);
        let n = net.add_node(Some("n".into()), None);
        let z = net.add_node(Some("z".into()), None);
        net.start = Some(s);
        net.end = Some(z);
        net.add_output_binding(s, [x, y]);
        net.add_input_binding(x, [s]);
        net.add_input_binding(y, [s]);
        net.add_output_binding(x, [n]);
        net.add_output_binding(y, [n]);
        net.add_input_binding(n, [x]);
        net.add_input_binding(n, [x, y]);
        net.add_output_binding(n, [z]);
        net.add_input_binding(z, [n]);

        let splits = split_overlapping_bindings(&mut net);
        assert_eq!(splits.len(), 1);
        let split = &splits[0];
        assert_eq!(split.original, n);
        assert!(net.node(n).is_none());
        assert_eq!(split.replicas.len(), 2);
        for r in &split.replicas {
            let replica = net.node(*r).unwrap();
            assert_eq!(replica.label.as_deref(), Some("n"));
            assert_eq!(replica.input_bindings.len(), 1);
            assert_eq!(
                replica.output_bindings,
                BTreeSet::from([BTreeSet::from([split.terminal])])
            );
        }
        let terminal = net.node(split.terminal).unwrap();
        assert_eq!(terminal.label, None);
        assert_eq!(terminal.input_bindings.len(), 2);
        assert_eq!(net.node(z).unwrap().predecessors(), BTreeSet::from([split.terminal]));
        // x may now fire either replica, y only the one of {x, y}
        assert_eq!(net.node(x).unwrap().output_bindings.len(), 2);
        assert_eq!(net.node(y).unwrap().output_bindings.len(), 1);
        assert!(net.find_overlapping_node().is_none());
        assert_eq!(net.output_dependencies(), net.input_dependencies());
    }

    #[test]
    fn end_node_is_replaced_by_terminal() {
        let mut net = CausalNet::new();
        let a = net.add_node(Some("a".into()), None);
        let b = net.add_node(Some("b".into()), None);
        let end = net.add_node(Some("end".into()), None);
        net.start = Some(a);
        net.end = Some(end);
        net.add_output_binding(a, [b, end]);
        net.add_output_binding(a, [end]);
        net.add_output_binding(b, [end]);
        net.add_input_binding(b, [a]);
        net.add_input_binding(end, [a]);
        net.add_input_binding(end, [a, b]);

        let splits = split_overlapping_bindings(&mut net);
        assert_eq!(net.end, Some(splits[0].terminal));
        assert!(net.node(splits[0].terminal).unwrap().output_bindings.is_empty());
    }
}
