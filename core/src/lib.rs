//! FLUXUM computational core - stepwise maximum-flow engines
//!
//! This crate implements a directed, integer-capacitated flow network with
//! residual shadow arcs and five maximum-flow algorithms, each exposed as a
//! resumable engine whose execution is paced externally one discrete step
//! at a time. A driver builds a [`FlowNetwork`], selects an
//! [`AlgorithmKind`], and repeatedly calls [`MaxFlowEngine::step`],
//! observing the trace each step returns until the engine reports done.
//!
//! The available engines are Ford-Fulkerson (depth-first augmenting
//! paths), Edmonds-Karp (breadth-first), capacity scaling, Dinic blocking
//! flow, and FIFO push-relabel. All engines mutate the shared network in
//! place and maintain the same invariants, so finished runs can be checked
//! against each other with the [`validation`] module.

pub mod algorithm;
pub mod data_structures;
pub mod validation;

pub use crate::algorithm::augmenting::AugmentingPathEngine;
pub use crate::algorithm::blocking_flow::BlockingFlowEngine;
pub use crate::algorithm::push_relabel::PushRelabelEngine;
pub use crate::algorithm::traits::{
    AlgorithmKind, ArcId, EngineError, MaxFlowEngine, NodeId, StepOutcome, StepTrace,
};
pub use crate::data_structures::flow_network::{ArcRecord, Flow, FlowNetwork, NetworkError};
pub use crate::validation::correctness::{ValidationError, ValidationReport};
