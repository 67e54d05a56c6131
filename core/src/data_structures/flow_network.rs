//! Capacitated flow network with residual shadow arcs
//!
//! This module implements the directed, integer-capacitated network shared
//! by every maximum-flow engine. Each forward arc is created together with
//! a reverse shadow arc of capacity zero; the two are linked by stable
//! indices into a flat arc pool for their entire lifetime, so residual
//! bookkeeping never chases live pointers and flow cancellation along the
//! reverse direction is a single paired update.
//!
//! # Invariants
//! - `0 <= flow <= capacity` on every forward arc, before and after every
//!   engine step.
//! - Every forward arc has exactly one paired reverse arc and vice versa;
//!   per-node adjacency lists hold both directions in insertion order,
//!   which defines the tie-break order for all searches.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::traits::{ArcId, NodeId};

/// Integer flow/capacity value shared by all engines.
pub type Flow = i64;

/// Errors rejected synchronously at construction or reconfiguration time.
///
/// Internal invariant violations (flow leaving `[0, capacity]` during a
/// step) are deliberately *not* represented here: they indicate a defect
/// in an engine, are never expected under correct inputs, and abort the
/// process instead of being clamped or surfaced as recoverable errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    #[error("node {node:?} out of range for network of {node_count} nodes")]
    NodeOutOfRange { node: NodeId, node_count: usize },

    #[error("arc capacity must be non-negative, got {capacity}")]
    NegativeCapacity { capacity: Flow },

    #[error("self-loop arcs are not allowed (node {node:?})")]
    SelfLoop { node: NodeId },

    #[error("capacity {capacity} below current flow {flow}; reset before shrinking")]
    CapacityBelowFlow { capacity: Flow, flow: Flow },

    #[error("capacity edits apply to forward arcs only")]
    ReverseArcEdit,
}

/// A single directed arc in the pool, forward or reverse shadow.
///
/// Flow is stored on forward arcs only; the shadow keeps `flow == 0`
/// forever and derives its residual capacity from its partner.
#[derive(Debug, Clone)]
pub struct FlowArc {
    start: NodeId,
    end: NodeId,
    capacity: Flow,
    flow: Flow,
    paired: ArcId,
    reverse: bool,
}

impl FlowArc {
    #[inline]
    pub fn start(&self) -> NodeId {
        self.start
    }

    #[inline]
    pub fn end(&self) -> NodeId {
        self.end
    }

    #[inline]
    pub fn capacity(&self) -> Flow {
        self.capacity
    }

    #[inline]
    pub fn flow(&self) -> Flow {
        self.flow
    }

    /// True for the zero-capacity shadow of a forward arc.
    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    /// Index of the mutually linked partner arc.
    #[inline]
    pub fn paired(&self) -> ArcId {
        self.paired
    }
}

/// Snapshot of one forward arc for post-termination introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArcRecord {
    pub start: NodeId,
    pub end: NodeId,
    pub capacity: Flow,
    pub flow: Flow,
}

/// Directed, capacitated network over nodes `0..n`.
///
/// Nodes carry no algorithmic state (positions and labels belong to
/// external collaborators); the network owns the arc pool and the
/// per-node adjacency lists referencing it.
#[derive(Debug)]
pub struct FlowNetwork {
    node_count: usize,
    arcs: Vec<FlowArc>,
    adjacency: Vec<Vec<ArcId>>,
}

impl FlowNetwork {
    /// Creates an empty network with `node_count` nodes and no arcs.
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            arcs: Vec::new(),
            adjacency: vec![Vec::new(); node_count],
        }
    }

    /// Builds a network from an ordered topology description.
    ///
    /// Every `(u, v, capacity)` triple is validated synchronously; the
    /// network is not created if any triple is rejected.
    pub fn from_arcs(
        node_count: usize,
        arcs: &[(usize, usize, Flow)],
    ) -> Result<Self, NetworkError> {
        let mut network = Self::new(node_count);
        for &(u, v, capacity) in arcs {
            network.add_arc(NodeId(u), NodeId(v), capacity)?;
        }
        Ok(network)
    }

    /// Adds a forward arc `u -> v` and its reverse shadow `v -> u`.
    ///
    /// Returns the id of the forward arc; the shadow occupies the next
    /// pool slot. Rejects negative capacities, out-of-range endpoints and
    /// self-loops.
    pub fn add_arc(&mut self, u: NodeId, v: NodeId, capacity: Flow) -> Result<ArcId, NetworkError> {
        self.check_node(u)?;
        self.check_node(v)?;
        if capacity < 0 {
            return Err(NetworkError::NegativeCapacity { capacity });
        }
        if u == v {
            return Err(NetworkError::SelfLoop { node: u });
        }

        let forward = ArcId(self.arcs.len());
        let shadow = ArcId(self.arcs.len() + 1);

        self.arcs.push(FlowArc {
            start: u,
            end: v,
            capacity,
            flow: 0,
            paired: shadow,
            reverse: false,
        });
        self.arcs.push(FlowArc {
            start: v,
            end: u,
            capacity: 0,
            flow: 0,
            paired: forward,
            reverse: true,
        });

        self.adjacency[u.0].push(forward);
        self.adjacency[v.0].push(shadow);
        Ok(forward)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Total pool size, forward and shadow arcs together.
    #[inline]
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// Arcs incident from `node`, both directions, in insertion order.
    #[inline]
    pub fn arcs_from(&self, node: NodeId) -> &[ArcId] {
        &self.adjacency[node.0]
    }

    #[inline]
    pub fn arc(&self, id: ArcId) -> &FlowArc {
        &self.arcs[id.0]
    }

    #[inline]
    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency[node.0].len()
    }

    /// True if a forward arc `u -> v` exists.
    pub fn has_arc(&self, u: NodeId, v: NodeId) -> bool {
        self.adjacency[u.0]
            .iter()
            .any(|&id| !self.arcs[id.0].reverse && self.arcs[id.0].end == v)
    }

    /// Remaining capacity available to push more flow along `id`.
    ///
    /// Forward arcs report `capacity - flow`; shadows report the flow of
    /// their forward partner, the amount available for cancellation.
    #[inline]
    pub fn residual_capacity(&self, id: ArcId) -> Flow {
        let arc = &self.arcs[id.0];
        if arc.reverse {
            self.arcs[arc.paired.0].flow
        } else {
            arc.capacity - arc.flow
        }
    }

    /// Adjusts the flow carried by `id` by `delta`.
    ///
    /// Adjusting a shadow by `delta` cancels that much flow on its
    /// forward partner. The caller must keep the forward flow inside
    /// `[0, capacity]`; a violating delta is an internal-consistency
    /// defect and aborts rather than being clamped, since a clamped value
    /// would invalidate correctness guarantees for every engine sharing
    /// the network.
    pub fn adjust_flow(&mut self, id: ArcId, delta: Flow) {
        let (target, delta) = {
            let arc = &self.arcs[id.0];
            if arc.reverse {
                (arc.paired, -delta)
            } else {
                (id, delta)
            }
        };
        let arc = &mut self.arcs[target.0];
        let updated = arc.flow + delta;
        assert!(
            updated >= 0 && updated <= arc.capacity,
            "flow adjustment out of bounds on arc {:?} -> {:?}: flow {} + delta {} outside [0, {}]",
            arc.start,
            arc.end,
            arc.flow,
            delta,
            arc.capacity,
        );
        arc.flow = updated;
    }

    /// Zeroes every arc's flow in place; topology and capacities are
    /// preserved, allowing a rerun under a different engine.
    pub fn reset(&mut self) {
        for arc in &mut self.arcs {
            arc.flow = 0;
        }
    }

    /// Independent copy with identical topology and capacities and zero
    /// flow, for running several engines over "the same" instance without
    /// interference.
    pub fn clone_zeroed(&self) -> Self {
        let mut arcs = self.arcs.clone();
        for arc in &mut arcs {
            arc.flow = 0;
        }
        Self {
            node_count: self.node_count,
            arcs,
            adjacency: self.adjacency.clone(),
        }
    }

    /// Replaces the capacity of a forward arc between runs.
    ///
    /// Shrinking below the current flow is rejected; reset first.
    pub fn set_capacity(&mut self, id: ArcId, capacity: Flow) -> Result<(), NetworkError> {
        if capacity < 0 {
            return Err(NetworkError::NegativeCapacity { capacity });
        }
        let arc = &mut self.arcs[id.0];
        if arc.reverse {
            return Err(NetworkError::ReverseArcEdit);
        }
        if capacity < arc.flow {
            return Err(NetworkError::CapacityBelowFlow {
                capacity,
                flow: arc.flow,
            });
        }
        arc.capacity = capacity;
        Ok(())
    }

    /// Largest forward-arc capacity, zero for an arcless network.
    pub fn max_capacity(&self) -> Flow {
        self.arcs
            .iter()
            .filter(|arc| !arc.reverse)
            .map(|arc| arc.capacity)
            .max()
            .unwrap_or(0)
    }

    /// All forward arcs with ids, in creation order.
    pub fn forward_arcs(&self) -> impl Iterator<Item = (ArcId, ArcRecord)> + '_ {
        self.arcs
            .iter()
            .enumerate()
            .filter(|(_, arc)| !arc.reverse)
            .map(|(i, arc)| {
                (
                    ArcId(i),
                    ArcRecord {
                        start: arc.start,
                        end: arc.end,
                        capacity: arc.capacity,
                        flow: arc.flow,
                    },
                )
            })
    }

    /// Net flow out of `node`: forward-arc flow minus cancelled reverse
    /// flow over the node's incident arcs. Evaluated at the source after
    /// termination this is the total flow value.
    pub fn flow_value(&self, node: NodeId) -> Flow {
        self.adjacency[node.0]
            .iter()
            .map(|&id| {
                let arc = &self.arcs[id.0];
                if arc.reverse {
                    -self.arcs[arc.paired.0].flow
                } else {
                    arc.flow
                }
            })
            .sum()
    }

    fn check_node(&self, node: NodeId) -> Result<(), NetworkError> {
        if node.0 >= self.node_count {
            Err(NetworkError::NodeOutOfRange {
                node,
                node_count: self.node_count,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> FlowNetwork {
        FlowNetwork::from_arcs(4, &[(0, 1, 3), (0, 2, 2), (1, 3, 2), (2, 3, 3)]).unwrap()
    }

    #[test]
    fn arc_creation_pairs_forward_and_shadow() {
        let net = diamond();
        assert_eq!(net.arc_count(), 8);

        let forward = net.arc(ArcId(0));
        let shadow = net.arc(ArcId(1));
        assert_eq!(forward.start(), NodeId(0));
        assert_eq!(forward.end(), NodeId(1));
        assert!(!forward.is_reverse());
        assert!(shadow.is_reverse());
        assert_eq!(shadow.capacity(), 0);
        assert_eq!(forward.paired(), ArcId(1));
        assert_eq!(shadow.paired(), ArcId(0));
    }

    #[test]
    fn adjacency_holds_both_directions_in_insertion_order() {
        let net = diamond();
        assert_eq!(net.arcs_from(NodeId(0)), &[ArcId(0), ArcId(2)]);
        // node 1: shadow of 0->1, then forward 1->3
        assert_eq!(net.arcs_from(NodeId(1)), &[ArcId(1), ArcId(4)]);
        assert_eq!(net.degree(NodeId(3)), 2);
    }

    #[test]
    fn construction_rejects_bad_triples() {
        assert_eq!(
            FlowNetwork::from_arcs(2, &[(0, 1, -1)]).err(),
            Some(NetworkError::NegativeCapacity { capacity: -1 })
        );
        assert_eq!(
            FlowNetwork::from_arcs(2, &[(0, 2, 1)]).err(),
            Some(NetworkError::NodeOutOfRange {
                node: NodeId(2),
                node_count: 2
            })
        );
        assert_eq!(
            FlowNetwork::from_arcs(2, &[(1, 1, 1)]).err(),
            Some(NetworkError::SelfLoop { node: NodeId(1) })
        );
    }

    #[test]
    fn residual_capacity_tracks_flow_and_cancellation() {
        let mut net = diamond();
        let arc = ArcId(0);
        let shadow = net.arc(arc).paired();

        assert_eq!(net.residual_capacity(arc), 3);
        assert_eq!(net.residual_capacity(shadow), 0);

        net.adjust_flow(arc, 2);
        assert_eq!(net.arc(arc).flow(), 2);
        assert_eq!(net.residual_capacity(arc), 1);
        assert_eq!(net.residual_capacity(shadow), 2);

        // Cancelling along the shadow reduces the forward flow.
        net.adjust_flow(shadow, 1);
        assert_eq!(net.arc(arc).flow(), 1);
        assert_eq!(net.residual_capacity(arc), 2);
        assert_eq!(net.residual_capacity(shadow), 1);
    }

    #[test]
    #[should_panic(expected = "flow adjustment out of bounds")]
    fn overflowing_adjustment_aborts() {
        let mut net = diamond();
        net.adjust_flow(ArcId(0), 4);
    }

    #[test]
    fn reset_zeroes_flow_and_keeps_capacities() {
        let mut net = diamond();
        net.adjust_flow(ArcId(0), 3);
        net.adjust_flow(ArcId(4), 2);
        net.reset();
        for (_, record) in net.forward_arcs() {
            assert_eq!(record.flow, 0);
        }
        assert_eq!(net.arc(ArcId(0)).capacity(), 3);
    }

    #[test]
    fn clone_zeroed_is_independent() {
        let mut net = diamond();
        net.adjust_flow(ArcId(0), 2);
        let copy = net.clone_zeroed();

        assert_eq!(copy.node_count(), net.node_count());
        assert_eq!(copy.arc_count(), net.arc_count());
        assert!(copy.forward_arcs().all(|(_, r)| r.flow == 0));
        // The original keeps its flow.
        assert_eq!(net.arc(ArcId(0)).flow(), 2);
    }

    #[test]
    fn set_capacity_guards_invariants() {
        let mut net = diamond();
        net.adjust_flow(ArcId(0), 2);

        assert_eq!(
            net.set_capacity(ArcId(0), 1),
            Err(NetworkError::CapacityBelowFlow {
                capacity: 1,
                flow: 2
            })
        );
        assert_eq!(net.set_capacity(ArcId(1), 5), Err(NetworkError::ReverseArcEdit));
        assert!(net.set_capacity(ArcId(0), 7).is_ok());
        assert_eq!(net.arc(ArcId(0)).capacity(), 7);
        assert_eq!(net.max_capacity(), 7);
    }

    #[test]
    fn flow_value_is_net_outflow() {
        let mut net = diamond();
        net.adjust_flow(ArcId(0), 2); // 0 -> 1
        net.adjust_flow(ArcId(2), 1); // 0 -> 2
        net.adjust_flow(ArcId(4), 2); // 1 -> 3
        net.adjust_flow(ArcId(6), 1); // 2 -> 3
        assert_eq!(net.flow_value(NodeId(0)), 3);
        assert_eq!(net.flow_value(NodeId(1)), 0);
        assert_eq!(net.flow_value(NodeId(3)), -3);
    }

    #[test]
    fn has_arc_sees_forward_arcs_only() {
        let net = diamond();
        assert!(net.has_arc(NodeId(0), NodeId(1)));
        assert!(!net.has_arc(NodeId(1), NodeId(0)));
        assert!(!net.has_arc(NodeId(0), NodeId(3)));
    }
}
