//! Synthetic street grid used when no GeoJSON file is given.

use flow_core::Coordinate;
use flow_core::geo::METRES_PER_DEG_LAT;
use flow_network::{NetworkGraph, RoadAttributes, RoadClass, RoadFeature, build_network};

/// Grid origin (south-west corner), roughly central Zurich.
const ORIGIN: Coordinate = Coordinate { lon: 8.5417, lat: 47.3769 };

/// Offset `ORIGIN` by (`east_m`, `north_m`).
pub fn offset(east_m: f64, north_m: f64) -> Coordinate {
    let k = ORIGIN.lat.to_radians().cos();
    Coordinate::new(
        ORIGIN.lon + east_m / (METRES_PER_DEG_LAT * k),
        ORIGIN.lat + north_m / METRES_PER_DEG_LAT,
    )
}

/// `size`×`size` blocks of `block_m` metres, every street two-way.
///
/// The outer ring is a 50 km/h secondary road; inner streets are 30 km/h
/// residential.
pub fn grid_city(size: usize, block_m: f64) -> NetworkGraph {
    let mut features = Vec::new();
    let street = |a: (usize, usize), b: (usize, usize), outer: bool, name: String| {
        let (class, speed_kmh) = if outer {
            (RoadClass::Secondary, 50.0)
        } else {
            (RoadClass::Residential, 30.0)
        };
        let attributes = RoadAttributes {
            speed_kmh,
            name: Some(if outer { "Ring Road".to_owned() } else { name }),
            ..RoadAttributes::with_class(class)
        };
        let p = |(i, j): (usize, usize)| offset(i as f64 * block_m, j as f64 * block_m);
        RoadFeature::line(vec![p(a), p(b)], attributes)
    };

    for i in 0..=size {
        for j in 0..=size {
            if i < size {
                let outer = j == 0 || j == size;
                features.push(street((i, j), (i + 1, j), outer, format!("Avenue {j}")));
                features.push(street((i + 1, j), (i, j), outer, format!("Avenue {j}")));
            }
            if j < size {
                let outer = i == 0 || i == size;
                features.push(street((i, j), (i, j + 1), outer, format!("Street {i}")));
                features.push(street((i, j + 1), (i, j), outer, format!("Street {i}")));
            }
        }
    }
    build_network(&features)
}
