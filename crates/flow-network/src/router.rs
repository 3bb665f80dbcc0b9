//! Routing trait, default Dijkstra implementation, and random route helpers.
//!
//! # Pluggability
//!
//! The mobility layer routes through the [`Router`] trait, so applications
//! can swap in A* or a congestion-aware model without touching the vehicle
//! simulator.  The default [`DijkstraRouter`] minimises total edge length and
//! never traverses a blocked edge.
//!
//! # Cost units
//!
//! Costs are integer **millimetres** (u64) internally, which gives a total
//! order for the heap and deterministic tie-breaking.  `Route` reports the
//! total in metres.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use flow_core::{EdgeId, NodeId, SimRng};

use crate::network::NetworkGraph;
use crate::{NetworkError, NetworkResult};

/// Endpoint pairs tried by [`random_route`] and [`random_route_from`] before
/// giving up.
pub const MAX_ROUTE_ATTEMPTS: usize = 30;

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered list of edges where each edge starts at the previous edge's
/// end node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub edges:    Vec<EdgeId>,
    pub length_m: f64,
}

impl Route {
    /// `true` if source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

pub trait Router: Send + Sync {
    /// Compute a route from `from` to `to` over unblocked edges.
    ///
    /// `from == to` yields an empty route; an unreachable destination yields
    /// [`NetworkError::NoRoute`].
    fn route(&self, graph: &NetworkGraph, from: NodeId, to: NodeId) -> NetworkResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Standard Dijkstra's algorithm over the CSR adjacency, weighted by edge
/// length.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &NetworkGraph, from: NodeId, to: NodeId) -> NetworkResult<Route> {
        dijkstra(graph, from, to)
    }
}

#[inline]
fn edge_cost_mm(weight_m: f64) -> u64 {
    (weight_m * 1000.0).round().max(1.0) as u64
}

fn dijkstra(graph: &NetworkGraph, from: NodeId, to: NodeId) -> NetworkResult<Route> {
    let n = graph.node_count();
    if from.index() >= n {
        return Err(NetworkError::NodeNotFound(from));
    }
    if to.index() >= n {
        return Err(NetworkError::NodeNotFound(to));
    }
    if from == to {
        return Ok(Route::default());
    }

    let mut dist      = vec![u64::MAX; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];
    dist[from.index()] = 0;

    // Min-heap: (cost, node).  NodeId as secondary key keeps pops deterministic.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, to));
        }
        if cost > dist[node.index()] {
            continue;
        }

        for adj in graph.out_edges(node) {
            if !graph.is_usable(adj.edge) {
                continue;
            }
            let new_cost = cost.saturating_add(edge_cost_mm(adj.weight_m));
            if new_cost < dist[adj.to.index()] {
                dist[adj.to.index()] = new_cost;
                prev_edge[adj.to.index()] = adj.edge;
                heap.push(Reverse((new_cost, adj.to)));
            }
        }
    }

    Err(NetworkError::NoRoute { from, to })
}

fn reconstruct(graph: &NetworkGraph, prev_edge: &[EdgeId], to: NodeId) -> Route {
    let mut edges = Vec::new();
    let mut length_m = 0.0;
    let mut cur = to;
    while let Some(edge) = graph.edge(prev_edge[cur.index()]) {
        edges.push(edge.id);
        length_m += edge.length_m;
        cur = edge.from;
    }
    edges.reverse();
    Route { edges, length_m }
}

// ── Convenience wrappers ──────────────────────────────────────────────────────

/// Edges of the shortest unblocked path, or an empty list when `from == to`
/// or no path exists.
pub fn shortest_path(graph: &NetworkGraph, from: NodeId, to: NodeId) -> Vec<EdgeId> {
    DijkstraRouter.route(graph, from, to).map(|r| r.edges).unwrap_or_default()
}

/// A non-empty route between two random distinct nodes, or an empty list
/// after [`MAX_ROUTE_ATTEMPTS`] failed draws.
pub fn random_route<R: Router + ?Sized>(router: &R, graph: &NetworkGraph, rng: &mut SimRng) -> Vec<EdgeId> {
    let n = graph.node_count();
    if n < 2 {
        return Vec::new();
    }
    for _ in 0..MAX_ROUTE_ATTEMPTS {
        let (Some(a), Some(b)) = (rng.index(n), rng.index(n)) else { break };
        if a == b {
            continue;
        }
        if let Ok(route) = router.route(graph, NodeId(a as u32), NodeId(b as u32)) {
            if !route.edges.is_empty() {
                return route.edges;
            }
        }
    }
    Vec::new()
}

/// A non-empty route from `origin` to a random other node, or an empty list
/// after [`MAX_ROUTE_ATTEMPTS`] failed draws.
pub fn random_route_from<R: Router + ?Sized>(
    router: &R,
    graph: &NetworkGraph,
    origin: NodeId,
    rng: &mut SimRng,
) -> Vec<EdgeId> {
    let n = graph.node_count();
    if n < 2 || origin.index() >= n || graph.out_degree(origin) == 0 {
        return Vec::new();
    }
    for _ in 0..MAX_ROUTE_ATTEMPTS {
        let Some(b) = rng.index(n) else { break };
        let dest = NodeId(b as u32);
        if dest == origin {
            continue;
        }
        if let Ok(route) = router.route(graph, origin, dest) {
            if !route.edges.is_empty() {
                return route.edges;
            }
        }
    }
    Vec::new()
}

/// Decorative walk of at most `steps` edges.
///
/// Starts on a random edge; from each edge's end node it picks a random
/// connection and continues on the edge leading there, falling back to the
/// first outgoing edge of the picked node (a proximity alias of the
/// junction).  Stops early at a dead end.  Blocked edges are not avoided.
pub fn random_walk(graph: &NetworkGraph, steps: usize, rng: &mut SimRng) -> Vec<EdgeId> {
    let mut walk = Vec::with_capacity(steps);
    let Some(start) = rng.index(graph.edge_count()) else { return walk };
    let mut current = EdgeId(start as u32);

    for _ in 0..steps {
        walk.push(current);
        let Some(edge) = graph.edge(current) else { break };
        let end = edge.to;
        let Some(node) = graph.node(end) else { break };
        let Some(&pick) = rng.choose(&node.connections) else { break };

        let next = graph
            .out_edges(end)
            .iter()
            .find(|a| a.to == pick)
            .or_else(|| graph.out_edges(pick).first());
        match next {
            Some(adj) => current = adj.edge,
            None => break,
        }
    }
    walk
}
