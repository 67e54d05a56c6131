//! Augmenting-path engines
//!
//! One engine drives the three classical augmenting-path algorithms,
//! differing only in the traversal policy used to find the next path:
//! Ford-Fulkerson (depth-first), Edmonds-Karp (breadth-first) and
//! capacity scaling (threshold breadth-first with a halving `Delta`).
//! Each [`step`](super::traits::MaxFlowEngine::step) performs exactly one
//! augmentation (search, bottleneck along the parent arcs, adjust every
//! arc on the path) or definitively terminates: by the max-flow/min-cut
//! theorem, absence of an augmenting path certifies a maximum flow.
//!
//! Capacity scaling halves `Delta` and retries inside a single logical
//! step; the retries are an algorithmic parameter adjustment, not a
//! pacing tick, and are never exposed to the caller.

use log::debug;

use crate::data_structures::flow_network::{Flow, FlowNetwork};

use super::search::{self, SearchResult};
use super::traits::{
    check_endpoint, check_network, EngineError, MaxFlowEngine, NodeId, StepOutcome, StepTrace,
};

/// Traversal policy selecting which augmenting path the next step takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SearchPolicy {
    DepthFirst,
    BreadthFirst,
    /// Threshold breadth-first with the current scaling parameter.
    Scaling { delta: Flow },
}

/// Resumable augmenting-path engine; see the module docs.
#[derive(Debug)]
pub struct AugmentingPathEngine {
    name: &'static str,
    node_count: usize,
    source: NodeId,
    target: NodeId,
    policy: SearchPolicy,
    finished: bool,
}

impl AugmentingPathEngine {
    /// Plain Ford-Fulkerson: depth-first search, first path found.
    pub fn ford_fulkerson(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Self, EngineError> {
        Self::with_policy(network, source, target, "Ford-Fulkerson", SearchPolicy::DepthFirst)
    }

    /// Edmonds-Karp: breadth-first search, fewest-arcs path.
    pub fn edmonds_karp(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Self, EngineError> {
        Self::with_policy(network, source, target, "Edmonds-Karp", SearchPolicy::BreadthFirst)
    }

    /// Capacity scaling: threshold breadth-first with `Delta` initialized
    /// to the largest power of two not exceeding the maximum arc capacity.
    pub fn capacity_scaling(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Self, EngineError> {
        let delta = initial_delta(network.max_capacity());
        Self::with_policy(
            network,
            source,
            target,
            "Capacity Scaling",
            SearchPolicy::Scaling { delta },
        )
    }

    fn with_policy(
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
        name: &'static str,
        policy: SearchPolicy,
    ) -> Result<Self, EngineError> {
        check_endpoint(network, source)?;
        check_endpoint(network, target)?;
        Ok(Self {
            name,
            node_count: network.node_count(),
            source,
            target,
            policy,
            finished: false,
        })
    }

    fn search(&self, network: &FlowNetwork) -> SearchResult {
        match self.policy {
            SearchPolicy::DepthFirst => search::depth_first(network, self.source, self.target),
            SearchPolicy::BreadthFirst => search::breadth_first(network, self.source, self.target),
            SearchPolicy::Scaling { delta } => {
                search::threshold_breadth_first(network, self.source, self.target, delta)
            }
        }
    }
}

impl MaxFlowEngine for AugmentingPathEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepOutcome, EngineError> {
        check_network(self.node_count, network)?;
        if self.finished {
            return Ok(StepOutcome::Done);
        }
        if self.source == self.target {
            // Degenerate run: zero flow, done on the first step.
            self.finished = true;
            return Ok(StepOutcome::Done);
        }

        loop {
            let result = self.search(network);
            if result.reached {
                let path = result.path_to(network, self.source, self.target);
                let bottleneck = path
                    .iter()
                    .map(|&arc| network.residual_capacity(arc))
                    .min()
                    .expect("augmenting path is non-empty");
                for &arc in &path {
                    network.adjust_flow(arc, bottleneck);
                }
                debug!(
                    "{}: augmented {} arcs by {}",
                    self.name,
                    path.len(),
                    bottleneck
                );
                return Ok(StepOutcome::Progress(StepTrace::Augmentation {
                    path,
                    bottleneck,
                }));
            }

            // No path at the current threshold: halve Delta and retry
            // within this same logical step, or terminate for good.
            if let SearchPolicy::Scaling { ref mut delta } = self.policy {
                if *delta > 1 {
                    *delta /= 2;
                    debug!("{}: no path, halving delta to {}", self.name, *delta);
                    continue;
                }
            }
            self.finished = true;
            return Ok(StepOutcome::Done);
        }
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Largest power of two `<= max_capacity`, and at least 1.
fn initial_delta(max_capacity: Flow) -> Flow {
    if max_capacity <= 1 {
        1
    } else {
        1 << (63 - max_capacity.leading_zeros())
    }
}
