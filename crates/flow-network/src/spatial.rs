//! R-tree indexes over network nodes and edge sub-segments.
//!
//! # Plane
//!
//! Both trees store points in a scaled longitude/latitude plane:
//! `x = lon · s`, `y = lat`, where `s` is the *smallest* `cos(lat)` over all
//! indexed vertices.  With that choice a planar distance never exceeds the
//! true ground distance, so a radius or nearest-first search in the plane can
//! stop as soon as the planar bound passes the best exact (haversine) answer
//! without missing anything.
//!
//! Node entries answer the builder's proximity pass and nearest-node lookups.
//! Segment entries (one per consecutive vertex pair of every edge) answer
//! nearest-edge lookups used for barrier placement and street inspection.

use rstar::primitives::{GeomWithData, Line};
use rstar::{PointDistance, RTree};

use flow_core::geo::METRES_PER_DEG_LAT;
use flow_core::{Coordinate, EdgeId, NodeId};

use crate::network::{Edge, Node};

type NodeEntry    = GeomWithData<[f64; 2], NodeId>;
type SegmentEntry = GeomWithData<Line<[f64; 2]>, (EdgeId, usize)>;

/// Slack added to planar search bounds to absorb the difference between the
/// equirectangular plane and haversine distances.
const SEARCH_SLACK_M: f64 = 0.5;

/// Distances closer than this are treated as equal when breaking ties.
const TIE_EPS_M: f64 = 1e-6;

// ── EdgeHit ───────────────────────────────────────────────────────────────────

/// Result of a nearest-edge query.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeHit {
    pub edge:       EdgeId,
    /// Index of the sub-segment (`geometry[segment]..geometry[segment+1]`).
    pub segment:    usize,
    /// Closest point on the edge to the query.
    pub point:      Coordinate,
    /// Ground distance from the query to `point`, metres.
    pub distance_m: f64,
    /// Distance along the edge geometry from its start to `point`, metres.
    pub offset_m:   f64,
    /// `offset_m` as a fraction of the edge's geometric length.
    pub progress:   f64,
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

pub(crate) struct SpatialIndex {
    lon_scale: f64,
    nodes:     RTree<NodeEntry>,
    segments:  RTree<SegmentEntry>,
}

impl SpatialIndex {
    pub(crate) fn empty() -> Self {
        Self { lon_scale: 1.0, nodes: RTree::new(), segments: RTree::new() }
    }

    /// Bulk-load both trees.
    pub(crate) fn build(nodes: &[Node], edges: &[Edge]) -> Self {
        let lon_scale = edges
            .iter()
            .flat_map(|e| e.geometry().iter())
            .chain(nodes.iter().map(|n| &n.pos))
            .map(|c| c.lat.to_radians().cos().abs())
            .fold(f64::INFINITY, f64::min);
        let lon_scale = if lon_scale.is_finite() { lon_scale.max(1e-6) } else { 1.0 };

        let project = |c: Coordinate| [c.lon * lon_scale, c.lat];

        let node_entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| GeomWithData::new(project(n.pos), NodeId(i as u32)))
            .collect();

        let segment_entries: Vec<SegmentEntry> = edges
            .iter()
            .flat_map(|e| {
                e.geometry().windows(2).enumerate().map(move |(seg, w)| {
                    GeomWithData::new(Line::new(project(w[0]), project(w[1])), (e.id, seg))
                })
            })
            .collect();

        Self {
            lon_scale,
            nodes:    RTree::bulk_load(node_entries),
            segments: RTree::bulk_load(segment_entries),
        }
    }

    #[inline]
    fn project(&self, c: Coordinate) -> [f64; 2] {
        [c.lon * self.lon_scale, c.lat]
    }

    /// Candidate nodes that may lie within `radius_m` of `center`.
    ///
    /// A superset of the exact answer; callers re-check with haversine.
    pub(crate) fn nodes_near(&self, center: Coordinate, radius_m: f64) -> Vec<NodeId> {
        let r_deg = (radius_m + SEARCH_SLACK_M) / METRES_PER_DEG_LAT;
        self.nodes
            .locate_within_distance(self.project(center), r_deg * r_deg)
            .map(|e| e.data)
            .collect()
    }

    pub(crate) fn nearest_node(&self, query: Coordinate) -> Option<NodeId> {
        self.nodes.nearest_neighbor(&self.project(query)).map(|e| e.data)
    }

    /// Closest edge to `query` within `max_distance_m`.
    ///
    /// Equidistant edges (e.g. the two directions of a two-way street) resolve
    /// to the lowest `EdgeId`.
    pub(crate) fn nearest_edge(
        &self,
        edges: &[Edge],
        query: Coordinate,
        max_distance_m: f64,
    ) -> Option<EdgeHit> {
        let q = self.project(query);
        let mut best: Option<EdgeHit> = None;

        for entry in self.segments.nearest_neighbor_iter(&q) {
            let planar_m = entry.geom().distance_2(&q).sqrt() * METRES_PER_DEG_LAT;
            let bound = best.map_or(max_distance_m, |b| b.distance_m);
            if planar_m > bound + SEARCH_SLACK_M {
                break;
            }

            let (edge_id, segment) = entry.data;
            let Some(edge) = edges.get(edge_id.index()) else { continue };
            let Some(hit) = edge.hit_on_segment(segment, query) else { continue };
            if hit.distance_m > max_distance_m {
                continue;
            }

            let better = match best {
                None => true,
                Some(b) => {
                    hit.distance_m < b.distance_m - TIE_EPS_M
                        || ((hit.distance_m - b.distance_m).abs() <= TIE_EPS_M && hit.edge < b.edge)
                }
            };
            if better {
                best = Some(hit);
            }
        }
        best
    }
}
