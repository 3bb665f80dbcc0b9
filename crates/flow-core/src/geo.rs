//! Geographic coordinate type and distance utilities.
//!
//! `Coordinate` stores `(lon, lat)` in degrees as `f64`.  Double precision
//! matters here: node keys are built from the raw coordinate values, so two
//! endpoints only merge when they are bit-for-bit identical.

use std::fmt;

/// Mean Earth radius in metres (the same constant web map libraries use).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Lower bound for any path length, so downstream divisions never see zero.
pub const MIN_PATH_LENGTH_M: f64 = 1.0;

/// Metres per degree of latitude on the mean-radius sphere.
pub const METRES_PER_DEG_LAT: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A WGS-84 geographic coordinate, longitude first (GeoJSON order).
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Symmetric by construction: the coordinate differences are taken as
    /// absolute values, so `a.distance_m(b)` and `b.distance_m(a)` evaluate
    /// the exact same floating-point expression.
    pub fn distance_m(self, other: Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).abs().to_radians();
        let d_lon = (other.lon - self.lon).abs().to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Lossless canonical key: the raw values joined by a comma.
    ///
    /// `f64`'s `Display` prints the shortest string that round-trips, so equal
    /// keys imply bit-identical coordinates (modulo `-0.0`).
    pub fn key(self) -> String {
        format!("{},{}", self.lon, self.lat)
    }

    /// Linear interpolation in degree space; `t` is not clamped.
    #[inline]
    pub fn lerp(self, other: Coordinate, t: f64) -> Coordinate {
        Coordinate {
            lon: self.lon + (other.lon - self.lon) * t,
            lat: self.lat + (other.lat - self.lat) * t,
        }
    }

    /// Approximate bounding-box check, much cheaper than `distance_m` for
    /// quick rejection before proximity tests.
    #[inline]
    pub fn within_bbox(self, center: Coordinate, half_lon: f64, half_lat: f64) -> bool {
        (self.lon - center.lon).abs() <= half_lon && (self.lat - center.lat).abs() <= half_lat
    }

    /// Half-extents `(lon, lat)` in degrees of a box that contains every
    /// point within `metres` of `self`.  Slightly generous near the poles.
    pub fn bbox_half_extent_deg(self, metres: f64) -> (f64, f64) {
        let half_lat = metres / METRES_PER_DEG_LAT;
        let cos_lat = self.lat.to_radians().cos().abs().max(1e-6);
        (half_lat / cos_lat, half_lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Coordinate { lon, lat }
    }
}

/// Great-circle distance between `a` and `b` in metres.
#[inline]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    a.distance_m(b)
}

/// Sum of consecutive distances along `coords`, floored at
/// [`MIN_PATH_LENGTH_M`].  Empty and single-point inputs yield the floor.
pub fn path_length(coords: &[Coordinate]) -> f64 {
    raw_path_length(coords).max(MIN_PATH_LENGTH_M)
}

/// Sum of consecutive distances along `coords` without the floor.
pub fn raw_path_length(coords: &[Coordinate]) -> f64 {
    coords.windows(2).map(|w| w[0].distance_m(w[1])).sum()
}

// ── Segment projection ────────────────────────────────────────────────────────

/// The closest point on a segment to some query coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// The projected point on the segment.
    pub point: Coordinate,
    /// Fractional position of `point` along the segment, in `[0, 1]`.
    pub t: f64,
    /// Great-circle distance from the query to `point`, in metres.
    pub distance_m: f64,
}

/// Perpendicular projection of `p` onto segment `a`–`b`.
///
/// Works in a local equirectangular plane (longitude scaled by the cosine of
/// the mean latitude), which is accurate to well under a metre at street
/// scale.  Degenerate segments project onto `a`.
pub fn project_onto_segment(a: Coordinate, b: Coordinate, p: Coordinate) -> Projection {
    let k = ((a.lat + b.lat) * 0.5).to_radians().cos();
    let dx = (b.lon - a.lon) * k;
    let dy = b.lat - a.lat;
    let len2 = dx * dx + dy * dy;

    let t = if len2 > 0.0 {
        let px = (p.lon - a.lon) * k;
        let py = p.lat - a.lat;
        ((px * dx + py * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let point = a.lerp(b, t);
    Projection { point, t, distance_m: point.distance_m(p) }
}
