//! Local vehicle density.
//!
//! The count is quadratic in the number of vehicles, with a cheap
//! bounding-box rejection before each haversine distance.  At the fleet sizes
//! the engine targets (≤ ~1000 vehicles) that is well under a millisecond.

use flow_core::Coordinate;

/// For each position, the number of *other* positions strictly closer than
/// `radius_m`.
pub fn densities(positions: &[Coordinate], radius_m: f64) -> Vec<u32> {
    let mut counts = vec![0u32; positions.len()];
    if !(radius_m > 0.0) {
        return counts;
    }

    for (i, &a) in positions.iter().enumerate() {
        let (half_lon, half_lat) = a.bbox_half_extent_deg(radius_m);
        for (j, &b) in positions.iter().enumerate().skip(i + 1) {
            if b.within_bbox(a, half_lon, half_lat) && a.distance_m(b) < radius_m {
                counts[i] += 1;
                counts[j] += 1;
            }
        }
    }
    counts
}
