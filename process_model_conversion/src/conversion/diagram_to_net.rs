use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, info};
use uuid::Uuid;

use super::{
    Conversion, ConversionContext, ConversionError, ConversionWarning, DiagramToNetConfig,
};
use crate::core::graph::NodeIndex;
use crate::core::process_models::case_centric::activity_diagram::{
    ActivityDiagram, EventKind, EventTrigger, GatewayKind, NodeKind,
};
use crate::core::process_models::case_centric::petri_net::{
    ArcType, Marking, PetriNet, PlaceID, TransitionID,
};

///
/// Translate an [`ActivityDiagram`] into a [`PetriNet`]
///
/// Flows become places; all flows entering the same activity, event or (opaque) subprocess
/// share one input place. Gateways become invisible transitions:
///
/// * exclusive (and event-based) gateways: one shared place and one transition per flow,
/// * parallel gateways: one transition connected to all flows,
/// * inclusive gateways: one transition per non-empty subset of the flows on the branching
///   side (an approximation, always reported as a warning).
///
/// Top-level start events mark the initial places, each top-level end event contributes one
/// final marking. Subprocesses are atomic transitions unless
/// [`DiagramToNetConfig::expand_subprocesses`] is set.
///
pub fn activity_diagram_to_net(
    diagram: &ActivityDiagram,
    config: &DiagramToNetConfig,
) -> Result<Conversion<PetriNet, NodeIndex, Uuid>, ConversionError> {
    info!(
        "Translating activity diagram with {} nodes and {} flows",
        diagram.graph.node_count(),
        diagram.graph.edge_count()
    );
    let starts = diagram.start_events();
    let ends = diagram.end_events();
    if starts.is_empty() {
        return Err(ConversionError::MissingStartNode);
    }
    if ends.is_empty() {
        return Err(ConversionError::MissingEndNode);
    }

    let nodes: Vec<NodeIndex> = diagram
        .graph
        .node_ids()
        .into_iter()
        .filter(|n| config.expand_subprocesses || diagram.parent_of(*n).is_none())
        .collect();
    if config.expand_subprocesses {
        for sp in diagram.subprocesses() {
            let (incoming, outgoing) = (diagram.graph.in_degree(sp), diagram.graph.out_degree(sp));
            if incoming != 1 || outgoing != 1 {
                return Err(ConversionError::NonUnaryFan {
                    node: sp,
                    incoming,
                    outgoing,
                });
            }
        }
    }

    let mut builder = NetBuilder {
        diagram,
        net: PetriNet::new(),
        ctx: ConversionContext::new(),
        input_places: HashMap::new(),
        flow_places: HashMap::new(),
        expand_subprocesses: config.expand_subprocesses,
    };
    for n in nodes {
        builder.translate_node(n);
    }

    // Initial marking
    if let [start] = starts.as_slice() {
        for place in builder.outgoing_places(*start) {
            builder.net.mark_initially(place);
        }
    } else {
        let shared = builder.net.add_place(None);
        builder.net.mark_initially(shared);
        for start in &starts {
            let t = builder.net.add_transition(None, None);
            builder
                .net
                .add_arc(ArcType::place_to_transition(shared, t), None);
            for place in builder.outgoing_places(*start) {
                builder
                    .net
                    .add_arc(ArcType::transition_to_place(t, place), None);
            }
            builder.ctx.map(*start, t.get_uuid());
        }
    }
    // Final markings
    for end in &ends {
        let place = builder.input_place(*end);
        builder.net.add_final_marking(Marking::from([(place, 1)]));
    }

    let NetBuilder { net, ctx, .. } = builder;
    Ok(ctx.finish(net))
}

struct NetBuilder<'a> {
    diagram: &'a ActivityDiagram,
    net: PetriNet,
    ctx: ConversionContext<NodeIndex, Uuid>,
    /// Shared input place of nodes consuming from a single place
    input_places: HashMap<NodeIndex, PlaceID>,
    /// Places of flows into gateways
    flow_places: HashMap<(NodeIndex, NodeIndex), PlaceID>,
    expand_subprocesses: bool,
}

impl NetBuilder<'_> {
    /// Nodes whose incoming flows all end in one shared place
    fn shares_input_place(&self, n: NodeIndex) -> bool {
        match self.diagram.node(n).map(|node| &node.kind) {
            Some(NodeKind::Activity) | Some(NodeKind::Event { .. }) => true,
            Some(NodeKind::SubProcess) => true,
            _ => false,
        }
    }

    fn input_place(&mut self, n: NodeIndex) -> PlaceID {
        if let Some(p) = self.input_places.get(&n) {
            return *p;
        }
        let p = self.net.add_place(None);
        self.input_places.insert(n, p);
        p
    }

    /// Place representing the flow `from -> to`
    fn flow_place(&mut self, from: NodeIndex, to: NodeIndex) -> PlaceID {
        if self.shares_input_place(to) {
            return self.input_place(to);
        }
        if let Some(p) = self.flow_places.get(&(from, to)) {
            return *p;
        }
        let p = self.net.add_place(None);
        self.flow_places.insert((from, to), p);
        p
    }

    fn incoming_places(&mut self, n: NodeIndex) -> Vec<PlaceID> {
        self.diagram
            .graph
            .predecessors(n)
            .into_iter()
            .map(|pred| self.flow_place(pred, n))
            .collect()
    }

    fn outgoing_places(&mut self, n: NodeIndex) -> Vec<PlaceID> {
        self.diagram
            .graph
            .successors(n)
            .into_iter()
            .map(|succ| self.flow_place(n, succ))
            .collect()
    }

    fn add_transition(
        &mut self,
        label: Option<String>,
        inputs: &[PlaceID],
        outputs: &[PlaceID],
    ) -> TransitionID {
        let t = self.net.add_transition(label, None);
        for p in inputs {
            self.net.add_arc(ArcType::place_to_transition(*p, t), None);
        }
        for p in outputs {
            self.net.add_arc(ArcType::transition_to_place(t, *p), None);
        }
        t
    }

    fn translate_node(&mut self, n: NodeIndex) {
        let diagram = self.diagram;
        let Some(node) = diagram.node(n) else {
            return;
        };
        let label = (!node.label.is_empty()).then(|| node.label.clone());
        match &node.kind {
            NodeKind::Activity => {
                let t = self.translate_task(n, label);
                self.ctx.map(n, t.get_uuid());
            }
            NodeKind::Event { kind, trigger } => {
                match trigger {
                    EventTrigger::Compensation => {
                        self.ctx.warn(ConversionWarning::CompensationTriggerIgnored(n))
                    }
                    EventTrigger::Other(name) => {
                        self.ctx.warn(ConversionWarning::UnrecognizedEventTrigger {
                            node: n,
                            trigger: name.clone(),
                        })
                    }
                    _ => {}
                }
                match kind {
                    EventKind::Intermediate => {
                        let t = self.translate_task(n, label);
                        self.ctx.map(n, t.get_uuid());
                    }
                    EventKind::End => {
                        let p = self.input_place(n);
                        self.ctx.map(n, p.get_uuid());
                    }
                    EventKind::Start => {}
                }
            }
            NodeKind::Gateway(kind) => self.translate_gateway(n, *kind),
            NodeKind::SubProcess if self.expand_subprocesses => self.expand_subprocess(n),
            NodeKind::SubProcess => {
                self.ctx.warn(ConversionWarning::OpaqueSubprocess(n));
                let t = self.translate_task(n, label);
                self.ctx.map(n, t.get_uuid());
            }
            NodeKind::Place => self.ctx.warn(ConversionWarning::UnsupportedNode(n)),
        }
    }

    /// Transition consuming from the shared input place and producing on all outgoing flows
    fn translate_task(&mut self, n: NodeIndex, label: Option<String>) -> TransitionID {
        let inputs = if self.diagram.graph.in_degree(n) > 0 {
            vec![self.input_place(n)]
        } else {
            Vec::new()
        };
        let outputs = self.outgoing_places(n);
        self.add_transition(label, &inputs, &outputs)
    }

    fn translate_gateway(&mut self, n: NodeIndex, kind: GatewayKind) {
        let inputs = self.incoming_places(n);
        let outputs = self.outgoing_places(n);
        match kind {
            GatewayKind::Exclusive | GatewayKind::EventBased => {
                if kind == GatewayKind::EventBased {
                    self.ctx
                        .warn(ConversionWarning::EventBasedGatewayAsExclusive(n));
                }
                let shared = self.net.add_place(None);
                for p in &inputs {
                    self.add_transition(None, &[*p], &[shared]);
                }
                for p in &outputs {
                    self.add_transition(None, &[shared], &[*p]);
                }
                self.ctx.map(n, shared.get_uuid());
            }
            GatewayKind::Parallel => {
                let t = self.add_transition(None, &inputs, &outputs);
                self.ctx.map(n, t.get_uuid());
            }
            GatewayKind::Inclusive => {
                let subsets = if inputs.len() > 1 && outputs.len() > 1 {
                    let intermediate = self.net.add_place(None);
                    self.add_subset_transitions(&inputs, &[intermediate], true)
                        + self.add_subset_transitions(&[intermediate], &outputs, false)
                } else if inputs.len() > 1 {
                    self.add_subset_transitions(&inputs, &outputs, true)
                } else {
                    self.add_subset_transitions(&inputs, &outputs, false)
                };
                debug!("Inclusive gateway {:?} encoded by {} transitions", n, subsets);
                self.ctx.warn(ConversionWarning::InclusiveGatewayApproximated {
                    gateway: n,
                    subsets,
                });
            }
        }
    }

    /// One invisible transition per non-empty subset of the branching side
    fn add_subset_transitions(
        &mut self,
        inputs: &[PlaceID],
        outputs: &[PlaceID],
        join: bool,
    ) -> usize {
        let branches = if join { inputs } else { outputs };
        let subsets: Vec<Vec<PlaceID>> = branches
            .iter()
            .copied()
            .powerset()
            .filter(|s| !s.is_empty())
            .collect();
        for subset in &subsets {
            if join {
                self.add_transition(None, subset, outputs);
            } else {
                self.add_transition(None, inputs, subset);
            }
        }
        subsets.len()
    }

    /// Inline a subprocess between an entry and exit transitions
    fn expand_subprocess(&mut self, sp: NodeIndex) {
        let input = self.input_place(sp);
        let inner_starts = self.diagram.events_in(Some(sp), EventKind::Start);
        let mut entry_outputs = Vec::new();
        for start in &inner_starts {
            entry_outputs.extend(self.outgoing_places(*start));
        }
        let entry = self.add_transition(None, &[input], &entry_outputs);
        self.ctx.map(sp, entry.get_uuid());

        let outputs = self.outgoing_places(sp);
        for end in self.diagram.events_in(Some(sp), EventKind::End) {
            let end_place = self.input_place(end);
            self.add_transition(None, &[end_place], &outputs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::process_models::case_centric::activity_diagram::GraphNode;

    fn invisible_transitions(net: &PetriNet) -> usize {
        net.transitions.values().filter(|t| t.is_invisible()).count()
    }

    #[test]
    fn sequence_with_choice() {
        // start -> a -> xor -> {b, c} -> end
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let a = d.add_activity("a");
        let x = d.add_gateway(GatewayKind::Exclusive);
        let b = d.add_activity("b");
        let c = d.add_activity("c");
        let e = d.add_event(EventKind::End);
        for (f, t) in [(s, a), (a, x), (x, b), (x, c), (b, e), (c, e)] {
            d.add_flow(f, t);
        }
        let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        let net = &result.model;
        assert!(result.is_lossless());
        assert_eq!(net.visible_transition_count(), 3);
        // one merge transition into the shared place, two split transitions out of it
        assert_eq!(invisible_transitions(net), 3);
        assert_eq!(net.initial_marking.as_ref().map(|m| m.len()), Some(1));
        assert_eq!(net.final_markings.as_ref().map(|m| m.len()), Some(1));

        let a_t = TransitionID(result.mapping[&a]);
        let a_pre = net.preset_of_transition(a_t);
        assert_eq!(a_pre.len(), 1);
        assert!(net.is_in_initial_marking(&a_pre[0]));
    }

    #[test]
    fn parallel_and_inclusive_gateways() {
        // start -> and -> {a, b} -> and -> or -> {c, d} -> end
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let split = d.add_gateway(GatewayKind::Parallel);
        let a = d.add_activity("a");
        let b = d.add_activity("b");
        let join = d.add_gateway(GatewayKind::Parallel);
        let or = d.add_gateway(GatewayKind::Inclusive);
        let c = d.add_activity("c");
        let dd = d.add_activity("d");
        let e = d.add_event(EventKind::End);
        for (f, t) in [
            (s, split),
            (split, a),
            (split, b),
            (a, join),
            (b, join),
            (join, or),
            (or, c),
            (or, dd),
            (c, e),
            (dd, e),
        ] {
            d.add_flow(f, t);
        }
        let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        assert_eq!(invisible_transitions(&result.model), 2 + 3);
        assert_eq!(
            result.warnings,
            vec![ConversionWarning::InclusiveGatewayApproximated {
                gateway: or,
                subsets: 3
            }]
        );
        let and_t = TransitionID(result.mapping[&split]);
        assert_eq!(result.model.postset_of_transition(and_t).len(), 2);
    }

    #[test]
    fn several_start_events_share_a_marked_place() {
        let mut d = ActivityDiagram::new();
        let s1 = d.add_event(EventKind::Start);
        let s2 = d.add_event(EventKind::Start);
        let a = d.add_activity("a");
        let e = d.add_event(EventKind::End);
        d.add_flow(s1, a);
        d.add_flow(s2, a);
        d.add_flow(a, e);
        let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        let net = &result.model;
        assert_eq!(net.initial_marking.as_ref().map(|m| m.len()), Some(1));
        assert_eq!(invisible_transitions(net), 2);
        assert!(result.mapping.contains_key(&s1) && result.mapping.contains_key(&s2));
    }

    #[test]
    fn warnings_and_errors() {
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let comp = d.add_event_with_trigger(
            "undo",
            EventKind::Intermediate,
            EventTrigger::Compensation,
        );
        let eb = d.add_gateway(GatewayKind::EventBased);
        let sp = d.add_subprocess("sub", None);
        let place = d.add_node(GraphNode::new("", NodeKind::Place));
        let e = d.add_event(EventKind::End);
        for (f, t) in [(s, comp), (comp, eb), (eb, sp), (eb, place), (sp, e)] {
            d.add_flow(f, t);
        }
        let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        for expected in [
            ConversionWarning::CompensationTriggerIgnored(comp),
            ConversionWarning::EventBasedGatewayAsExclusive(eb),
            ConversionWarning::OpaqueSubprocess(sp),
            ConversionWarning::UnsupportedNode(place),
        ] {
            assert!(result.warnings.contains(&expected));
        }

        let no_end = {
            let mut d = ActivityDiagram::new();
            let s = d.add_event(EventKind::Start);
            let a = d.add_activity("a");
            d.add_flow(s, a);
            d
        };
        assert_eq!(
            activity_diagram_to_net(&no_end, &DiagramToNetConfig::default()).unwrap_err(),
            ConversionError::MissingEndNode
        );
    }

    #[test]
    fn unknown_event_trigger_is_reported() {
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let wait = d.add_event_with_trigger("wait", EventKind::Intermediate, EventTrigger::Timer);
        let raise = d.add_event_with_trigger(
            "raise",
            EventKind::Intermediate,
            EventTrigger::Other("escalation".into()),
        );
        let e = d.add_event(EventKind::End);
        for (f, t) in [(s, wait), (wait, raise), (raise, e)] {
            d.add_flow(f, t);
        }
        let result = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        assert_eq!(
            result.warnings,
            vec![ConversionWarning::UnrecognizedEventTrigger {
                node: raise,
                trigger: "escalation".into()
            }]
        );
        // intermediate events still become (labelled) transitions
        assert_eq!(result.model.visible_transition_count(), 2);
        assert!(result.mapping.contains_key(&raise));
    }

    #[test]
    fn expanded_subprocess() {
        // start -> sp[start' -> a -> end'] -> end
        let mut d = ActivityDiagram::new();
        let s = d.add_event(EventKind::Start);
        let sp = d.add_subprocess("sp", None);
        let e = d.add_event(EventKind::End);
        d.add_flow(s, sp);
        d.add_flow(sp, e);
        let inner_s = d.add_event(EventKind::Start);
        let a = d.add_activity("a");
        let inner_e = d.add_event(EventKind::End);
        for n in [inner_s, a, inner_e] {
            d.set_parent(n, Some(sp));
        }
        d.add_flow(inner_s, a);
        d.add_flow(a, inner_e);

        let opaque = activity_diagram_to_net(&d, &DiagramToNetConfig::default()).unwrap();
        assert_eq!(opaque.model.visible_transition_count(), 1);
        assert_eq!(opaque.model.transitions.len(), 1);

        let config = DiagramToNetConfig {
            expand_subprocesses: true,
        };
        let expanded = activity_diagram_to_net(&d, &config).unwrap();
        let net = &expanded.model;
        assert!(expanded.is_lossless());
        assert_eq!(net.visible_transition_count(), 1);
        assert_eq!(invisible_transitions(net), 2);
        // the inner end event is no final marking
        assert_eq!(net.final_markings.as_ref().map(|m| m.len()), Some(1));

        d.add_flow(s, e);
        let extra = d.add_activity("x");
        d.add_flow(extra, sp);
        assert_eq!(
            activity_diagram_to_net(&d, &config).unwrap_err(),
            ConversionError::NonUnaryFan {
                node: sp,
                incoming: 2,
                outgoing: 1
            }
        );
    }
}
