//! Correctness validation for maximum-flow runs
//!
//! After an engine finishes, the network holds a candidate flow. This
//! module checks the three properties that together certify maximality:
//!
//! * capacity: `0 <= flow <= capacity` on every forward arc,
//! * conservation: net flow is zero at every node except source and
//!   target, whose net flows are opposite,
//! * saturated cut: the set of nodes reachable from the source in the
//!   residual graph excludes the target, so by max-flow/min-cut the flow
//!   value is maximal.
//!
//! [`run_to_completion`] drives an engine to `Done` with a step cap, and
//! [`cross_algorithm_agreement`] runs every [`AlgorithmKind`] on zeroed
//! copies of one network and compares the resulting flow values.

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::search;
use crate::algorithm::traits::{
    AlgorithmKind, EngineError, MaxFlowEngine, NodeId, StepOutcome, StepTrace,
};
use crate::data_structures::flow_network::{Flow, FlowNetwork};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("engine failed during validation run: {0}")]
    Engine(#[from] EngineError),

    #[error("engine did not finish within {max_steps} steps")]
    StepLimitExceeded { max_steps: usize },

    #[error("node {node:?} violates conservation with net flow {net}")]
    ConservationViolated { node: NodeId, net: Flow },

    #[error("flow value {found} disagrees with {kind:?} baseline {expected}")]
    FlowValueMismatch {
        kind: AlgorithmKind,
        expected: Flow,
        found: Flow,
    },

    #[error("target remains residually reachable, flow is not maximal")]
    TargetStillReachable,
}

/// Summary of a validated run, serializable for external tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub algorithm: AlgorithmKind,
    pub flow_value: Flow,
    pub steps: usize,
    pub augmentations: usize,
}

/// Drives `engine` until it reports `Done`, returning the step count.
///
/// The cap guards validation against a non-terminating engine; production
/// drivers pace steps themselves and do not need one.
pub fn run_to_completion(
    engine: &mut dyn MaxFlowEngine,
    network: &mut FlowNetwork,
    max_steps: usize,
) -> Result<usize, ValidationError> {
    for steps in 0..max_steps {
        if engine.step(network)?.is_done() {
            return Ok(steps);
        }
    }
    Err(ValidationError::StepLimitExceeded { max_steps })
}

/// Checks conservation at every node: zero net flow everywhere except the
/// endpoints, whose net flows cancel.
pub fn check_conservation(
    network: &FlowNetwork,
    source: NodeId,
    target: NodeId,
) -> Result<(), ValidationError> {
    let mut net = vec![0 as Flow; network.node_count()];
    for (_, arc) in network.forward_arcs() {
        net[arc.start.0] -= arc.flow;
        net[arc.end.0] += arc.flow;
    }
    for (index, &balance) in net.iter().enumerate() {
        let node = NodeId(index);
        if node == source || node == target {
            continue;
        }
        if balance != 0 {
            return Err(ValidationError::ConservationViolated { node, net: balance });
        }
    }
    if source != target && net[source.0] != -net[target.0] {
        return Err(ValidationError::ConservationViolated {
            node: source,
            net: net[source.0],
        });
    }
    Ok(())
}

/// Checks the saturated-cut certificate: no residual path may remain from
/// `source` to `target` once an engine reports `Done`.
pub fn check_saturated_cut(
    network: &FlowNetwork,
    source: NodeId,
    target: NodeId,
) -> Result<(), ValidationError> {
    if source == target {
        return Ok(());
    }
    if search::breadth_first(network, source, target).reached {
        return Err(ValidationError::TargetStillReachable);
    }
    Ok(())
}

/// Runs `kind` to completion on `network` and certifies the result.
///
/// The capacity bound is enforced by [`FlowNetwork::adjust_flow`] itself,
/// so only conservation and the cut certificate need checking here.
pub fn validate(
    kind: AlgorithmKind,
    network: &mut FlowNetwork,
    source: NodeId,
    target: NodeId,
) -> Result<ValidationReport, ValidationError> {
    let mut engine = kind.build(network, source, target)?;
    let mut steps = 0;
    let mut augmentations = 0;
    loop {
        match engine.step(network)? {
            StepOutcome::Done => break,
            StepOutcome::Progress(trace) => {
                steps += 1;
                if matches!(trace, StepTrace::Augmentation { .. }) {
                    augmentations += 1;
                }
                // Termination cap scaled to the FIFO push-relabel bound.
                let cap = network.node_count().pow(3).max(1024) * 4;
                if steps > cap {
                    return Err(ValidationError::StepLimitExceeded { max_steps: cap });
                }
            }
        }
    }

    check_conservation(network, source, target)?;
    check_saturated_cut(network, source, target)?;

    let flow_value = network.flow_value(source);
    debug!(
        "validated {} run: value {}, {} steps",
        kind.name(),
        flow_value,
        steps
    );
    Ok(ValidationReport {
        algorithm: kind,
        flow_value,
        steps,
        augmentations,
    })
}

/// Runs every algorithm on zero-flow copies of `network` and checks that
/// all of them certify the same flow value. Returns one report per
/// algorithm, in [`AlgorithmKind::ALL`] order.
pub fn cross_algorithm_agreement(
    network: &FlowNetwork,
    source: NodeId,
    target: NodeId,
) -> Result<Vec<ValidationReport>, ValidationError> {
    let mut reports = Vec::with_capacity(AlgorithmKind::ALL.len());
    let mut baseline: Option<(AlgorithmKind, Flow)> = None;
    for kind in AlgorithmKind::ALL {
        let mut copy = network.clone_zeroed();
        let report = validate(kind, &mut copy, source, target)?;
        match baseline {
            None => baseline = Some((kind, report.flow_value)),
            Some((baseline_kind, expected)) => {
                if report.flow_value != expected {
                    return Err(ValidationError::FlowValueMismatch {
                        kind: baseline_kind,
                        expected,
                        found: report.flow_value,
                    });
                }
            }
        }
        reports.push(report);
    }
    Ok(reports)
}
