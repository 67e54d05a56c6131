//! Residual-graph traversals
//!
//! Three traversal policies over the residual graph, each serving exactly
//! one traversal request: depth-first (LIFO expansion, first discovered
//! path, no shortest-path guarantee), breadth-first (FIFO expansion,
//! fewest-arcs path plus a level array byproduct), and threshold
//! breadth-first (breadth-first restricted to arcs with residual capacity
//! of at least `Delta`). All of them record one parent arc per node, set
//! once at discovery, and stop the moment the target is reached. An
//! unreached target is a first-class outcome, not an error.
//!
//! Adjacency insertion order is the tie-break order for every policy, so
//! traversals are fully deterministic for a given network state.

use std::collections::VecDeque;

use log::trace;

use crate::data_structures::flow_network::{Flow, FlowNetwork};

use super::traits::{ArcId, NodeId};

/// Parent-arc tree produced by one traversal request.
///
/// `parent[v]` is the arc along which `v` was first discovered (`None`
/// for the source and for undiscovered nodes). `levels[v]` is the
/// arc-count distance from the source for breadth-first policies and is
/// empty for depth-first.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub parent: Vec<Option<ArcId>>,
    pub levels: Vec<Option<usize>>,
    pub reached: bool,
}

impl SearchResult {
    /// Walks the parent arcs from `target` back to `source` and returns
    /// the path in source-to-target order. Empty when the target was not
    /// reached or equals the source.
    pub fn path_to(&self, network: &FlowNetwork, source: NodeId, target: NodeId) -> Vec<ArcId> {
        let mut path = Vec::new();
        if !self.reached {
            return path;
        }
        let mut current = target;
        while current != source {
            let arc = self.parent[current.0].expect("parent chain broken below target");
            path.push(arc);
            current = network.arc(arc).start();
        }
        path.reverse();
        path
    }
}

/// Depth-first traversal of arcs with positive residual capacity.
///
/// Expands the frontier LIFO, so the returned path is the first one
/// discovered, not the shortest; this is the plain Ford-Fulkerson search,
/// bounded by O(arcs x max-flow-value) augmentations overall.
pub fn depth_first(network: &FlowNetwork, source: NodeId, target: NodeId) -> SearchResult {
    let n = network.node_count();
    let mut parent = vec![None; n];
    let mut visited = vec![false; n];
    let mut stack = vec![source];
    visited[source.0] = true;

    while let Some(u) = stack.pop() {
        for &arc_id in network.arcs_from(u) {
            let v = network.arc(arc_id).end();
            if !visited[v.0] && network.residual_capacity(arc_id) > 0 {
                visited[v.0] = true;
                parent[v.0] = Some(arc_id);
                if v == target {
                    trace!("depth-first reached target {:?}", target);
                    return SearchResult {
                        parent,
                        levels: Vec::new(),
                        reached: true,
                    };
                }
                stack.push(v);
            }
        }
    }

    SearchResult {
        parent,
        levels: Vec::new(),
        reached: false,
    }
}

/// Breadth-first traversal of arcs with positive residual capacity;
/// returns the fewest-arcs parent tree and the level array from source.
pub fn breadth_first(network: &FlowNetwork, source: NodeId, target: NodeId) -> SearchResult {
    threshold_breadth_first(network, source, target, 1)
}

/// Breadth-first traversal restricted to arcs with residual capacity of
/// at least `delta`; `delta == 1` is the plain breadth-first policy.
pub fn threshold_breadth_first(
    network: &FlowNetwork,
    source: NodeId,
    target: NodeId,
    delta: Flow,
) -> SearchResult {
    let n = network.node_count();
    let mut parent = vec![None; n];
    let mut levels = vec![None; n];
    let mut queue = VecDeque::new();

    levels[source.0] = Some(0);
    queue.push_back(source);

    while let Some(u) = queue.pop_front() {
        let next_level = levels[u.0].expect("queued node has a level") + 1;
        for &arc_id in network.arcs_from(u) {
            let v = network.arc(arc_id).end();
            if levels[v.0].is_none() && network.residual_capacity(arc_id) >= delta {
                levels[v.0] = Some(next_level);
                parent[v.0] = Some(arc_id);
                if v == target {
                    trace!(
                        "breadth-first reached target {:?} at level {} (delta {})",
                        target,
                        next_level,
                        delta
                    );
                    return SearchResult {
                        parent,
                        levels,
                        reached: true,
                    };
                }
                queue.push_back(v);
            }
        }
    }

    SearchResult {
        parent,
        levels,
        reached: false,
    }
}
