//! Blocking-flow engine (Dinic)
//!
//! One step is one full phase: layer the residual graph breadth-first
//! from the source, then repeatedly extract source-to-target paths along
//! admissible arcs (`level[v] == level[u] + 1` with positive residual
//! capacity) until no such path remains in the level graph. The phase
//! search keeps one cursor per node into its arc list; a cursor advances
//! only when the arc under it is inadmissible or already fully explored
//! and never rewinds within a phase, the current-arc optimization that
//! keeps each phase's blocking-flow work amortized O(arcs) after
//! layering. The search is iterative with an explicit arc stack, so
//! large node counts never hit recursion depth limits.
//!
//! The engine terminates when the layering no longer reaches the target.

use log::{debug, trace};

use crate::data_structures::flow_network::FlowNetwork;

use super::search;
use super::traits::{
    check_endpoint, check_network, ArcId, EngineError, MaxFlowEngine, NodeId, StepOutcome,
    StepTrace,
};

/// Resumable Dinic engine; all phase state is rebuilt per step, so the
/// only persistent field beyond the endpoints is the termination flag.
#[derive(Debug)]
pub struct BlockingFlowEngine {
    node_count: usize,
    source: NodeId,
    target: NodeId,
    finished: bool,
}

impl BlockingFlowEngine {
    pub fn new(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Self, EngineError> {
        check_endpoint(network, source)?;
        check_endpoint(network, target)?;
        Ok(Self {
            node_count: network.node_count(),
            source,
            target,
            finished: false,
        })
    }

    /// Extracts a blocking flow in the current level graph, returning the
    /// arcs that carried flow in first-push order.
    fn blocking_flow(
        &self,
        network: &mut FlowNetwork,
        levels: &[Option<usize>],
    ) -> Vec<ArcId> {
        let mut cursors = vec![0usize; self.node_count];
        let mut carried = vec![false; network.arc_count()];
        let mut pushed = Vec::new();
        // Arc stack of the partial admissible path from the source.
        let mut path: Vec<ArcId> = Vec::new();
        let mut u = self.source;

        loop {
            if u == self.target {
                let bottleneck = path
                    .iter()
                    .map(|&arc| network.residual_capacity(arc))
                    .min()
                    .expect("path to target is non-empty");
                for &arc in &path {
                    network.adjust_flow(arc, bottleneck);
                    if !carried[arc.0] {
                        carried[arc.0] = true;
                        pushed.push(arc);
                    }
                }
                trace!("phase path of {} arcs pushed {}", path.len(), bottleneck);
                // Resume from the tail of the first drained arc; its
                // cursor advances on the rescan, the others keep their
                // remaining residual.
                let drained = path
                    .iter()
                    .position(|&arc| network.residual_capacity(arc) == 0)
                    .expect("bottleneck arc is drained");
                u = network.arc(path[drained]).start();
                path.truncate(drained);
                continue;
            }

            let level_u = levels[u.0].expect("path nodes are layered");
            let mut advanced = false;
            while cursors[u.0] < network.degree(u) {
                let arc = network.arcs_from(u)[cursors[u.0]];
                let v = network.arc(arc).end();
                let admissible = network.residual_capacity(arc) > 0
                    && levels[v.0] == Some(level_u + 1);
                if admissible {
                    path.push(arc);
                    u = v;
                    advanced = true;
                    break;
                }
                cursors[u.0] += 1;
            }

            if !advanced {
                if u == self.source {
                    break;
                }
                // Dead end: retreat and mark the entering arc explored.
                let arc = path.pop().expect("non-source dead end has a parent arc");
                u = network.arc(arc).start();
                cursors[u.0] += 1;
            }
        }

        pushed
    }
}

impl MaxFlowEngine for BlockingFlowEngine {
    fn name(&self) -> &'static str {
        "Dinic"
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

        let layering = search::breadth_first(network, self.source, self.target);
        if !layering.reached {
            self.finished = true;
            debug!("Dinic: target unlayered, terminating");
            return Ok(StepOutcome::Done);
        }

        let levels = layering.levels;
        let pushed = self.blocking_flow(network, &levels);
        debug!(
            "Dinic: phase to level {:?} pushed flow on {} arcs",
            levels[self.target.0],
            pushed.len()
        );
        Ok(StepOutcome::Progress(StepTrace::Phase { pushed, levels }))
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut BlockingFlowEngine, net: &mut FlowNetwork) -> usize {
        let mut phases = 0;
        while !engine.step(net).unwrap().is_done() {
            phases += 1;
            assert!(phases < 1_000, "engine failed to terminate");
        }
        phases
    }

    #[test]
    fn cross_network_needs_a_single_phase() {
        // Both augmenting paths have length 2, so one level graph holds
        // the whole maximum flow.
        let mut net = FlowNetwork::from_arcs(
            4,
            &[(0, 1, 3), (0, 2, 2), (1, 3, 2), (2, 3, 3), (2, 1, 1)],
        )
        .unwrap();
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(3)).unwrap();

        match engine.step(&mut net).unwrap() {
            StepOutcome::Progress(StepTrace::Phase { pushed, levels }) => {
                assert_eq!(levels[0], Some(0));
                assert_eq!(levels[3], Some(2));
                assert_eq!(pushed.len(), 4);
            }
            other => panic!("expected a phase, got {:?}", other),
        }
        assert_eq!(engine.step(&mut net).unwrap(), StepOutcome::Done);
        assert_eq!(net.flow_value(NodeId(0)), 4);
    }

    #[test]
    fn phases_use_strictly_longer_paths() {
        // Value 5 needs the length-3 detour 0 -> 1 -> 2 -> 3, which only
        // appears in the second phase.
        let mut net = FlowNetwork::from_arcs(
            4,
            &[(0, 1, 3), (0, 2, 2), (1, 3, 2), (2, 3, 3), (1, 2, 1)],
        )
        .unwrap();
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        let phases = run(&mut engine, &mut net);
        assert_eq!(phases, 2);
        assert_eq!(net.flow_value(NodeId(0)), 5);
    }

    #[test]
    fn layered_branching_instance() {
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
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(5)).unwrap();
        run(&mut engine, &mut net);
        assert_eq!(net.flow_value(NodeId(0)), 19);
    }

    #[test]
    fn disconnected_target_is_done_on_first_step() {
        let mut net = FlowNetwork::from_arcs(4, &[(0, 1, 5), (2, 3, 5)]).unwrap();
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(3)).unwrap();
        assert_eq!(engine.step(&mut net).unwrap(), StepOutcome::Done);
        assert!(engine.is_finished());
        assert_eq!(net.flow_value(NodeId(0)), 0);
    }

    #[test]
    fn source_equal_target_is_a_degenerate_run() {
        let mut net = FlowNetwork::from_arcs(2, &[(0, 1, 1)]).unwrap();
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(0)).unwrap();
        assert_eq!(engine.step(&mut net).unwrap(), StepOutcome::Done);
    }

    #[test]
    fn capacity_bound_holds_after_every_phase() {
        let mut net = FlowNetwork::from_arcs(
            6,
            &[
                (0, 1, 7),
                (0, 2, 3),
                (1, 2, 2),
                (1, 3, 4),
                (2, 4, 5),
                (3, 5, 6),
                (4, 3, 2),
                (4, 5, 4),
            ],
        )
        .unwrap();
        let mut engine = BlockingFlowEngine::new(&net, NodeId(0), NodeId(5)).unwrap();
        loop {
            let outcome = engine.step(&mut net).unwrap();
            for (_, record) in net.forward_arcs() {
                assert!(record.flow >= 0 && record.flow <= record.capacity);
            }
            if outcome.is_done() {
                break;
            }
        }
    }
}
