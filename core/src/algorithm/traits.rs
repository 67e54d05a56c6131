//! Engine contract for stepwise maximum-flow execution
//!
//! Every algorithm in FLUXUM runs as a sequence of discrete, externally
//! paced steps: a driver constructs a [`FlowNetwork`], selects one engine,
//! and invokes [`MaxFlowEngine::step`] until it reports [`StepOutcome::Done`].
//! Each step mutates the network in place, leaves every invariant intact,
//! and returns a trace of what changed for observation. Engines are
//! explicit resumable state objects, not suspended coroutines: all
//! iteration state (search frontier, per-node cursors, active queue)
//! lives in persistent fields, so a step resumes from plain data rather
//! than from a suspended call frame.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data_structures::flow_network::{Flow, FlowNetwork};

use super::augmenting::AugmentingPathEngine;
use super::blocking_flow::BlockingFlowEngine;
use super::push_relabel::PushRelabelEngine;

/// Node identifier, `0 <= id < n`; prevents mixing with other indices.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Stable index of an arc in the network's flat pool.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArcId(pub usize);

impl ArcId {
    #[inline]
    pub fn as_usize(self) -> usize {
        self.0
    }
}

/// Errors raised when wiring an engine to a network.
///
/// Degenerate runs (source equal to target, target unreachable) are *not*
/// errors: the engine terminates on its first step reporting zero flow,
/// exactly like any other exhausted search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("endpoint {node:?} out of range for network of {node_count} nodes")]
    EndpointOutOfRange { node: NodeId, node_count: usize },

    #[error("engine built for {expected} nodes stepped with a network of {actual}")]
    NetworkMismatch { expected: usize, actual: usize },
}

/// What a single step changed, by algorithm family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepTrace {
    /// One augmenting path applied (Ford-Fulkerson, Edmonds-Karp,
    /// capacity scaling): the ordered source-to-target arc list and the
    /// bottleneck pushed along it.
    Augmentation { path: Vec<ArcId>, bottleneck: Flow },

    /// One Dinic phase: every arc that carried flow this phase, in first
    /// push order, plus the level array of the phase's layering
    /// (`None` marks nodes the layering never reached).
    Phase {
        pushed: Vec<ArcId>,
        levels: Vec<Option<usize>>,
    },

    /// Push-relabel preflow initialization: the saturated source arcs and
    /// the resulting excess/label state.
    Preflow {
        saturated: Vec<ArcId>,
        excess: Vec<Flow>,
        labels: Vec<usize>,
    },

    /// Push-relabel push step: arcs pushed out of the dequeued node and
    /// the updated excess/label state.
    Push {
        pushed: Vec<ArcId>,
        excess: Vec<Flow>,
        labels: Vec<usize>,
    },

    /// Push-relabel relabel step: the lifted node and its new label.
    Relabel { node: NodeId, label: usize },
}

/// Outcome of one externally paced step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// The step mutated the network; the trace describes the change.
    Progress(StepTrace),

    /// The algorithm has terminated; the network carries a maximum flow.
    /// Further steps keep returning `Done` without touching the network.
    Done,
}

impl StepOutcome {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }
}

/// Uniform stepping contract shared by all five engines.
///
/// Engines hold no hidden work between calls and take no locks; the only
/// suspension points are the boundaries between `step` invocations. Only
/// one engine may mutate a given network at a time; use
/// [`FlowNetwork::clone_zeroed`] to run several engines over the same
/// instance.
pub trait MaxFlowEngine {
    /// Engine name for reporting.
    fn name(&self) -> &'static str;

    /// Performs exactly one unit of work (one augmentation, one phase, or
    /// one push/relabel operation) against `network`.
    fn step(&mut self, network: &mut FlowNetwork) -> Result<StepOutcome, EngineError>;

    /// True once the engine has reported [`StepOutcome::Done`].
    fn is_finished(&self) -> bool;
}

/// Closed set of engine variants, selected by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmKind {
    /// Generic augmenting path with DFS, O(m F).
    FordFulkerson,
    /// BFS-restricted augmenting path, O(n m^2).
    EdmondsKarp,
    /// Threshold-restricted augmenting path, O(n m log C).
    CapacityScaling,
    /// Blocking flow over level graphs, O(m n^2).
    Dinic,
    /// FIFO push-relabel, O(n^3).
    PushRelabel,
}

impl AlgorithmKind {
    /// Every variant, in presentation order.
    pub const ALL: [AlgorithmKind; 5] = [
        AlgorithmKind::FordFulkerson,
        AlgorithmKind::EdmondsKarp,
        AlgorithmKind::CapacityScaling,
        AlgorithmKind::Dinic,
        AlgorithmKind::PushRelabel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AlgorithmKind::FordFulkerson => "Ford-Fulkerson",
            AlgorithmKind::EdmondsKarp => "Edmonds-Karp",
            AlgorithmKind::CapacityScaling => "Capacity Scaling",
            AlgorithmKind::Dinic => "Dinic",
            AlgorithmKind::PushRelabel => "Goldberg-Tarjan",
        }
    }

    /// Builds the selected engine against `network`, validating the
    /// endpoints synchronously.
    pub fn build(
        self,
        network: &FlowNetwork,
        source: NodeId,
        target: NodeId,
    ) -> Result<Box<dyn MaxFlowEngine>, EngineError> {
        Ok(match self {
            AlgorithmKind::FordFulkerson => {
                Box::new(AugmentingPathEngine::ford_fulkerson(network, source, target)?)
            }
            AlgorithmKind::EdmondsKarp => {
                Box::new(AugmentingPathEngine::edmonds_karp(network, source, target)?)
            }
            AlgorithmKind::CapacityScaling => {
                Box::new(AugmentingPathEngine::capacity_scaling(network, source, target)?)
            }
            AlgorithmKind::Dinic => Box::new(BlockingFlowEngine::new(network, source, target)?),
            AlgorithmKind::PushRelabel => {
                Box::new(PushRelabelEngine::new(network, source, target)?)
            }
        })
    }
}

pub(crate) fn check_endpoint(network: &FlowNetwork, node: NodeId) -> Result<(), EngineError> {
    if node.0 >= network.node_count() {
        Err(EngineError::EndpointOutOfRange {
            node,
            node_count: network.node_count(),
        })
    } else {
        Ok(())
    }
}

pub(crate) fn check_network(expected: usize, network: &FlowNetwork) -> Result<(), EngineError> {
    if network.node_count() != expected {
        Err(EngineError::NetworkMismatch {
            expected,
            actual: network.node_count(),
        })
    } else {
        Ok(())
    }
}
