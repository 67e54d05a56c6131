//! FIFO push-relabel engine (Goldberg-Tarjan)
//!
//! The engine maintains a preflow instead of a flow: nodes may hold
//! excess, tracked together with a monotonically non-decreasing label per
//! node and a FIFO queue of active nodes (positive excess, neither source
//! nor target) guarded by a membership flag. The first step saturates
//! every arc out of the source; each later step dequeues one node and
//! either pushes its excess along every admissible arc
//! (`label[u] == label[v] + 1` with positive residual capacity) or lifts
//! its label to `1 + min(label[v])` over residual arcs. A node still
//! holding excess re-enters the queue at the back, preserving the FIFO
//! discipline that bounds relabels at O(n^2) and pushes at O(n^2 m).
//!
//! When the queue empties all excess has drained to the source or the
//! target and the preflow is a maximum flow.

use std::collections::VecDeque;

use log::{debug, trace};

use crate::data_structures::flow_network::{Flow, FlowNetwork};

use super::traits::{
    check_endpoint, check_network, ArcId, EngineError, MaxFlowEngine, NodeId, StepOutcome,
    StepTrace,
};

#[derive(Debug)]
pub struct PushRelabelEngine {
    node_count: usize,
    source: NodeId,
    target: NodeId,
    excess: Vec<Flow>,
    labels: Vec<usize>,
    /// Active nodes in FIFO order; `queued` prevents duplicate entries.
    queue: VecDeque<NodeId>,
    queued: Vec<bool>,
    initialized: bool,
    finished: bool,
}

impl PushRelabelEngine {
    pub fn new(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Self, EngineError> {
        check_endpoint(network, source)?;
        check_endpoint(network, target)?;
        let n = network.node_count();
        Ok(Self {
            node_count: n,
            source,
            target,
            excess: vec![0; n],
            labels: vec![0; n],
            queue: VecDeque::new(),
            queued: vec![false; n],
            initialized: false,
            finished: false,
        })
    }

    /// Current per-node excess, for external inspection.
    pub fn excess(&self) -> &[Flow] {
        &self.excess
    }

    /// Current per-node labels, for external inspection.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    fn enqueue_if_active(&mut self, node: NodeId) {
        if node != self.source
            && node != self.target
            && self.excess[node.0] > 0
            && !self.queued[node.0]
        {
            self.queued[node.0] = true;
            self.queue.push_back(node);
        }
    }

    /// Saturate every forward arc out of the source and activate the
    /// receiving neighbors.
    fn preflow(&mut self, network: &mut FlowNetwork) -> StepTrace {
        self.labels[self.source.0] = self.node_count;
        let mut saturated = Vec::new();

        let arcs: Vec<ArcId> = network.arcs_from(self.source).to_vec();
        for arc_id in arcs {
            let arc = network.arc(arc_id);
            if arc.is_reverse() || arc.capacity() == 0 {
                continue;
            }
            let delta = arc.capacity();
            let neighbor = arc.end();
            network.adjust_flow(arc_id, delta);
            self.excess[neighbor.0] += delta;
            saturated.push(arc_id);
            self.enqueue_if_active(neighbor);
        }

        debug!(
            "Goldberg-Tarjan: preflow saturated {} arcs, {} active nodes",
            saturated.len(),
            self.queue.len()
        );
        StepTrace::Preflow {
            saturated,
            excess: self.excess.clone(),
            labels: self.labels.clone(),
        }
    }

    /// Push along every admissible arc out of `u` until its excess is
    /// exhausted or no admissible arc remains.
    fn push(&mut self, network: &mut FlowNetwork, u: NodeId) -> Vec<ArcId> {
        let mut pushed = Vec::new();
        let arcs: Vec<ArcId> = network.arcs_from(u).to_vec();

        for arc_id in arcs {
            if self.excess[u.0] == 0 {
                break;
            }
            let v = network.arc(arc_id).end();
            let residual = network.residual_capacity(arc_id);
            if residual > 0 && self.labels[u.0] == self.labels[v.0] + 1 {
                let amount = residual.min(self.excess[u.0]);
                network.adjust_flow(arc_id, amount);
                self.excess[u.0] -= amount;
                self.excess[v.0] += amount;
                pushed.push(arc_id);
                trace!("push {} along {:?} -> {:?}", amount, u, v);
                self.enqueue_if_active(v);
            }
        }
        pushed
    }

    /// Lift `u` to one above its lowest residual neighbor; strictly
    /// increases the label, which is what bounds the whole run.
    fn relabel(&mut self, network: &FlowNetwork, u: NodeId) -> usize {
        let floor = network
            .arcs_from(u)
            .iter()
            .filter(|&&arc| network.residual_capacity(arc) > 0)
            .map(|&arc| self.labels[network.arc(arc).end().0])
            .min()
            .unwrap_or_else(|| {
                // A node with excess always has a residual arc back along
                // whichever arc delivered the excess.
                panic!("relabel of {:?} found no residual arc", u)
            });
        let lifted = floor + 1;
        assert!(
            lifted > self.labels[u.0],
            "relabel must strictly increase the label of {:?}",
            u
        );
        self.labels[u.0] = lifted;
        trace!("relabel {:?} to {}", u, lifted);
        lifted
    }

    fn has_admissible_arc(&self, network: &FlowNetwork, u: NodeId) -> bool {
        network.arcs_from(u).iter().any(|&arc| {
            network.residual_capacity(arc) > 0
                && self.labels[u.0] == self.labels[network.arc(arc).end().0] + 1
        })
    }
}

impl MaxFlowEngine for PushRelabelEngine {
    fn name(&self) -> &'static str {
        "Goldberg-Tarjan"
    }

    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepOutcome, EngineError> {
        check_network(self.node_count, network)?;
        if self.finished {
            return Ok(StepOutcome::Done);
        }
        if self.source == self.target {
            self.finished = true;
            return Ok(StepOutcome::Done);
        }

        if !self.initialized {
            self.initialized = true;
            return Ok(StepOutcome::Progress(self.preflow(network)));
        }

        let u = match self.queue.pop_front() {
            Some(u) => u,
            None => {
                self.finished = true;
                debug!("Goldberg-Tarjan: queue empty, preflow is maximal");
                return Ok(StepOutcome::Done);
            }
        };
        self.queued[u.0] = false;
        debug_assert!(self.excess[u.0] > 0, "dequeued node without excess");

        let trace = if self.has_admissible_arc(network, u) {
            let pushed = self.push(network, u);
            StepTrace::Push {
                pushed,
                excess: self.excess.clone(),
                labels: self.labels.clone(),
            }
        } else {
            let label = self.relabel(network, u);
            StepTrace::Relabel { node: u, label }
        };

        // FIFO discipline: leftover excess re-enters at the back.
        self.enqueue_if_active(u);

        Ok(StepOutcome::Progress(trace))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut PushRelabelEngine, net: &mut FlowNetwork) -> usize {
        let mut steps = 0;
        while !engine.step(net).unwrap().is_done() {
            steps += 1;
            assert!(steps < 100_000, "engine failed to terminate");
        }
        steps
    }

    fn cross_network() -> FlowNetwork {
        FlowNetwork::from_arcs(
            4,
            &[(0, 1, 3), (0, 2, 2), (1, 3, 2), (2, 3, 3), (2, 1, 1)],
        )
        .unwrap()
    }

    #[test]
    fn preflow_saturates_source_arcs() {
        let mut net = cross_network();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(3)).unwrap();

        match engine.step(&mut net).unwrap() {
            StepOutcome::Progress(StepTrace::Preflow {
                saturated,
                excess,
                labels,
            }) => {
                assert_eq!(saturated.len(), 2);
                assert_eq!(labels[0], 4);
                assert_eq!(excess[1], 3);
                assert_eq!(excess[2], 2);
            }
            other => panic!("expected preflow, got {:?}", other),
        }
        assert_eq!(net.arc(ArcId(0)).flow(), 3);
        assert_eq!(net.arc(ArcId(2)).flow(), 2);
    }

    #[test]
    fn terminates_with_the_maximum_flow() {
        let mut net = cross_network();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        run(&mut engine, &mut net);
        assert_eq!(net.flow_value(NodeId(0)), 4);
        // All excess has drained to source or target.
        for node in 1..3 {
            assert_eq!(engine.excess()[node], 0);
        }
    }

    #[test]
    fn labels_never_decrease() {
        let mut net = cross_network();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        let mut floor = vec![0usize; net.node_count()];
        loop {
            let outcome = engine.step(&mut net).unwrap();
            for (node, &label) in engine.labels().iter().enumerate() {
                assert!(label >= floor[node], "label of node {} decreased", node);
                floor[node] = label;
            }
            if outcome.is_done() {
                break;
            }
        }
    }

    #[test]
    fn relabel_steps_report_the_lifted_node() {
        let mut net = cross_network();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        let mut saw_relabel = false;
        loop {
            match engine.step(&mut net).unwrap() {
                StepOutcome::Progress(StepTrace::Relabel { node, label }) => {
                    saw_relabel = true;
                    assert_eq!(engine.labels()[node.0], label);
                }
                StepOutcome::Done => break,
                _ => {}
            }
        }
        // Draining the over-saturated source arcs back requires lifting.
        assert!(saw_relabel);
    }

    #[test]
    fn excess_returns_to_source_when_target_is_unreachable() {
        let mut net = FlowNetwork::from_arcs(4, &[(0, 1, 5), (2, 3, 5)]).unwrap();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        run(&mut engine, &mut net);
        assert_eq!(net.flow_value(NodeId(0)), 0);
        assert_eq!(engine.excess()[1], 0);
    }

    #[test]
    fn source_equal_target_is_a_degenerate_run() {
        let mut net = cross_network();
        let mut engine = PushRelabelEngine::new(&net, NodeId(2), NodeId(2)).unwrap();
        assert_eq!(engine.step(&mut net).unwrap(), StepOutcome::Done);
        assert_eq!(net.flow_value(NodeId(2)), 0);
    }

    #[test]
    fn matches_augmenting_engines_on_a_larger_instance() {
        let mut net = FlowNetwork::from_arcs(
            6,
            &[
                (0, 1, 10),
                (0, 2, 10),
                (1, 3, 4),
                (1, 4, 8),
                (2, 4, 9),
                (3, 5, 10),
                (4, 3, 6),
                (4, 5, 10),
            ],
        )
        .unwrap();
        let mut engine = PushRelabelEngine::new(&net, NodeId(0), NodeId(5)).unwrap();
        run(&mut engine, &mut net);
        assert_eq!(net.flow_value(NodeId(0)), 19);
    }
}
