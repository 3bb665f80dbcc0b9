//! Road network representation and builder.
//!
//! # Construction
//!
//! [`NetworkBuilder`] turns road features into a directed graph in three
//! passes:
//!
//! 1. **Nodes and edges.**  Each line-string feature with at least two points
//!    becomes one directed edge from its first to its last coordinate.  The
//!    endpoints are interned as nodes keyed by their exact coordinate text, so
//!    features sharing an endpoint share a node.
//! 2. **Proximity connections.**  Every unordered pair of distinct nodes
//!    closer than [`CONNECTION_THRESHOLD_M`] is linked in both directions.
//! 3. **Edge connections.**  Each edge's start node gains a connection to its
//!    end node.
//!
//! Node connection lists are duplicate-free and keep insertion order; the
//! decorative random walk depends on that order.
//!
//! # Data layout
//!
//! Edges keep their insertion order, so an `EdgeId` is a stable index into
//! the edge collection.  Outgoing adjacency is stored separately in
//! **Compressed Sparse Row (CSR)** form:
//!
//! ```text
//! out_adj[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! Within a node the entries are ordered by `EdgeId`, which keeps Dijkstra
//! tie-breaking deterministic.

use log::{debug, info};
use rustc_hash::FxHashMap;

use flow_core::geo::{path_length, project_onto_segment};
use flow_core::{Coordinate, EdgeId, NodeId};

use crate::feature::{RoadAttributes, RoadFeature};
use crate::spatial::{EdgeHit, SpatialIndex};
use crate::{NetworkError, NetworkResult};

/// Nodes closer than this are joined by proximity connections, metres.
pub const CONNECTION_THRESHOLD_M: f64 = 5.0;

// ── Node ──────────────────────────────────────────────────────────────────────

/// A junction or road endpoint.
#[derive(Clone, Debug)]
pub struct Node {
    /// Canonical coordinate key (`"lon,lat"`).
    pub key:         String,
    pub pos:         Coordinate,
    /// Adjacent nodes in insertion order, without duplicates.
    pub connections: Vec<NodeId>,
}

impl Node {
    fn connect(&mut self, other: NodeId) {
        if !self.connections.contains(&other) {
            self.connections.push(other);
        }
    }
}

// ── Edge ──────────────────────────────────────────────────────────────────────

/// A directed road segment built from one line-string feature.
#[derive(Clone, Debug)]
pub struct Edge {
    pub id:         EdgeId,
    pub from:       NodeId,
    pub to:         NodeId,
    /// Polyline length in metres, floored at 1.
    pub length_m:   f64,
    pub attributes: RoadAttributes,
    geometry:       Vec<Coordinate>,
    /// Distance along the polyline at each vertex; `cumulative_m[0] == 0`.
    cumulative_m:   Vec<f64>,
    blocked:        bool,
}

impl Edge {
    fn new(id: EdgeId, from: NodeId, to: NodeId, geometry: Vec<Coordinate>, attributes: RoadAttributes) -> Self {
        let mut cumulative_m = Vec::with_capacity(geometry.len());
        let mut acc = 0.0;
        cumulative_m.push(acc);
        for w in geometry.windows(2) {
            acc += w[0].distance_m(w[1]);
            cumulative_m.push(acc);
        }
        Self {
            id,
            from,
            to,
            length_m: path_length(&geometry),
            attributes,
            geometry,
            cumulative_m,
            blocked: false,
        }
    }

    /// The polyline, at least two points.
    #[inline]
    pub fn geometry(&self) -> &[Coordinate] {
        &self.geometry
    }

    #[inline]
    pub fn start(&self) -> Coordinate {
        self.geometry[0]
    }

    #[inline]
    pub fn end(&self) -> Coordinate {
        self.geometry[self.geometry.len() - 1]
    }

    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    #[inline]
    pub fn speed_limit_kmh(&self) -> f64 {
        self.attributes.speed_kmh
    }

    #[inline]
    pub fn speed_limit_mps(&self) -> f64 {
        self.attributes.speed_limit_mps()
    }

    /// Unfloored polyline length, metres.
    #[inline]
    fn raw_length_m(&self) -> f64 {
        self.cumulative_m[self.cumulative_m.len() - 1]
    }

    /// Position at `progress` (clamped to `[0, 1]`) along the polyline,
    /// interpolated linearly within the containing sub-segment.
    pub fn point_at(&self, progress: f64) -> Coordinate {
        let total = self.raw_length_m();
        if !(total > 0.0) {
            return self.start();
        }
        let target = progress.clamp(0.0, 1.0) * total;
        let last_segment = self.geometry.len() - 2;
        let i = self
            .cumulative_m
            .partition_point(|&c| c <= target)
            .saturating_sub(1)
            .min(last_segment);

        let seg_len = self.cumulative_m[i + 1] - self.cumulative_m[i];
        let t = if seg_len > 0.0 { (target - self.cumulative_m[i]) / seg_len } else { 0.0 };
        self.geometry[i].lerp(self.geometry[i + 1], t.clamp(0.0, 1.0))
    }

    pub(crate) fn hit_on_segment(&self, segment: usize, query: Coordinate) -> Option<EdgeHit> {
        let a = *self.geometry.get(segment)?;
        let b = *self.geometry.get(segment + 1)?;
        let proj = project_onto_segment(a, b, query);
        let seg_len = self.cumulative_m[segment + 1] - self.cumulative_m[segment];
        let offset_m = self.cumulative_m[segment] + proj.t * seg_len;
        let total = self.raw_length_m();
        Some(EdgeHit {
            edge:       self.id,
            segment,
            point:      proj.point,
            distance_m: proj.distance_m,
            offset_m,
            progress:   if total > 0.0 { offset_m / total } else { 0.0 },
        })
    }
}

// ── NetworkGraph ──────────────────────────────────────────────────────────────

/// One outgoing adjacency entry.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Adjacent {
    pub edge:     EdgeId,
    pub to:       NodeId,
    /// Edge length in metres; the routing weight.
    pub weight_m: f64,
}

/// Directed road graph plus spatial indexes.
///
/// Built once per dataset by [`NetworkBuilder`]; afterwards only the
/// per-edge blocked flags change.
pub struct NetworkGraph {
    nodes:          Vec<Node>,
    node_index:     FxHashMap<String, NodeId>,
    edges:          Vec<Edge>,
    node_out_start: Vec<u32>,
    out_adj:        Vec<Adjacent>,
    spatial:        SpatialIndex,
}

impl NetworkGraph {
    /// A graph with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            nodes:          Vec::new(),
            node_index:     FxHashMap::default(),
            edges:          Vec::new(),
            node_out_start: vec![0],
            out_adj:        Vec::new(),
            spatial:        SpatialIndex::empty(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` when there are no edges to drive on.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index())
    }

    /// Node whose canonical key equals `key`.
    pub fn node_by_key(&self, key: &str) -> Option<NodeId> {
        self.node_index.get(key).copied()
    }

    /// Node located exactly at `pos`.
    pub fn node_at(&self, pos: Coordinate) -> Option<NodeId> {
        self.node_by_key(&pos.key())
    }

    /// Outgoing adjacency of `node`, ordered by `EdgeId`.  Empty for unknown
    /// nodes.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> &[Adjacent] {
        let i = node.index();
        if i + 1 >= self.node_out_start.len() {
            return &[];
        }
        let start = self.node_out_start[i] as usize;
        let end   = self.node_out_start[i + 1] as usize;
        &self.out_adj[start..end]
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        self.out_edges(node).len()
    }

    /// `true` when the edge exists and is not blocked.
    #[inline]
    pub fn is_usable(&self, edge: EdgeId) -> bool {
        self.edge(edge).is_some_and(|e| !e.blocked)
    }

    // ── Blocking ──────────────────────────────────────────────────────────

    /// Set or clear the blocked flag on `edge`.
    pub fn set_blocked(&mut self, edge: EdgeId, blocked: bool) -> NetworkResult<()> {
        let e = self.edges.get_mut(edge.index()).ok_or(NetworkError::EdgeNotFound(edge))?;
        e.blocked = blocked;
        Ok(())
    }

    /// Clear every blocked flag.  Returns how many edges were unblocked.
    pub fn clear_blocked(&mut self) -> usize {
        let mut cleared = 0;
        for e in self.edges.iter_mut().filter(|e| e.blocked) {
            e.blocked = false;
            cleared += 1;
        }
        cleared
    }

    pub fn blocked_count(&self) -> usize {
        self.edges.iter().filter(|e| e.blocked).count()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Closest edge to `query` within `max_distance_m`, if any.
    pub fn nearest_edge(&self, query: Coordinate, max_distance_m: f64) -> Option<EdgeHit> {
        self.spatial.nearest_edge(&self.edges, query, max_distance_m)
    }

    /// Closest node to `query`.  `None` only for an empty graph.
    pub fn nearest_node(&self, query: Coordinate) -> Option<NodeId> {
        self.spatial.nearest_node(query)
    }
}

impl Default for NetworkGraph {
    fn default() -> Self {
        Self::empty()
    }
}

// ── NetworkBuilder ────────────────────────────────────────────────────────────

/// Construct a [`NetworkGraph`] from road features, then call
/// [`build`](Self::build).
///
/// # Example
///
/// ```
/// use flow_core::Coordinate;
/// use flow_network::{NetworkBuilder, RoadAttributes, RoadFeature};
///
/// let a = Coordinate::new(10.000, 47.000);
/// let b = Coordinate::new(10.001, 47.000);
/// let mut builder = NetworkBuilder::new();
/// builder.add_feature(&RoadFeature::line(vec![a, b], RoadAttributes::default()));
/// let graph = builder.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 1);
/// ```
pub struct NetworkBuilder {
    nodes:      Vec<Node>,
    node_index: FxHashMap<String, NodeId>,
    edges:      Vec<Edge>,
    skipped:    usize,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            nodes:      Vec::new(),
            node_index: FxHashMap::default(),
            edges:      Vec::new(),
            skipped:    0,
        }
    }

    /// Intern `pos` as a node, returning the existing id for a known key.
    fn intern(&mut self, pos: Coordinate) -> NodeId {
        let key = pos.key();
        if let Some(&id) = self.node_index.get(&key) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.node_index.insert(key.clone(), id);
        self.nodes.push(Node { key, pos, connections: Vec::new() });
        id
    }

    /// Pass 1 for one feature.  Returns the new edge, or `None` when the
    /// feature is not a line string with at least two points.
    pub fn add_feature(&mut self, feature: &RoadFeature) -> Option<EdgeId> {
        let Some(coords) = feature.polyline() else {
            self.skipped += 1;
            return None;
        };
        let from = self.intern(coords[0]);
        let to   = self.intern(coords[coords.len() - 1]);
        let id   = EdgeId(self.edges.len() as u32);
        self.edges.push(Edge::new(id, from, to, coords.to_vec(), feature.attributes.clone()));
        Some(id)
    }

    pub fn add_features<'a>(&mut self, features: impl IntoIterator<Item = &'a RoadFeature>) -> &mut Self {
        for f in features {
            self.add_feature(f);
        }
        self
    }

    /// Run the connection passes, assemble the CSR adjacency, and bulk-load
    /// the spatial indexes.
    pub fn build(self) -> NetworkGraph {
        let NetworkBuilder { mut nodes, node_index, edges, skipped } = self;
        if skipped > 0 {
            debug!("network builder skipped {skipped} non-line features");
        }

        let spatial = SpatialIndex::build(&nodes, &edges);

        // Pass 2: proximity connections, visiting pairs (i, j) with i < j in
        // ascending order so connection lists match a naive nested loop.
        let mut proximity_links = 0usize;
        for i in 0..nodes.len() {
            let pos_i = nodes[i].pos;
            let mut near: Vec<NodeId> = spatial
                .nodes_near(pos_i, CONNECTION_THRESHOLD_M)
                .into_iter()
                .filter(|j| j.index() > i)
                .collect();
            near.sort_unstable();
            for j in near {
                if pos_i.distance_m(nodes[j.index()].pos) < CONNECTION_THRESHOLD_M {
                    nodes[i].connect(j);
                    nodes[j.index()].connect(NodeId(i as u32));
                    proximity_links += 1;
                }
            }
        }

        // Pass 3: edge connections.
        for e in &edges {
            nodes[e.from.index()].connect(e.to);
        }

        // CSR adjacency, stable by EdgeId within each source node.
        let n = nodes.len();
        let mut node_out_start = vec![0u32; n + 1];
        for e in &edges {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 0..n {
            node_out_start[i + 1] += node_out_start[i];
        }
        let mut cursor: Vec<u32> = node_out_start[..n].to_vec();
        let mut out_adj = vec![Adjacent { edge: EdgeId::INVALID, to: NodeId::INVALID, weight_m: 0.0 }; edges.len()];
        for e in &edges {
            let slot = &mut cursor[e.from.index()];
            out_adj[*slot as usize] = Adjacent { edge: e.id, to: e.to, weight_m: e.length_m };
            *slot += 1;
        }

        info!(
            "road network built: {} nodes, {} edges, {} proximity links",
            n,
            edges.len(),
            proximity_links
        );

        NetworkGraph { nodes, node_index, edges, node_out_start, out_adj, spatial }
    }
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a graph from `features` in one call.
pub fn build_network(features: &[RoadFeature]) -> NetworkGraph {
    let mut builder = NetworkBuilder::new();
    builder.add_features(features);
    builder.build()
}
