//! Input records for the network builder.
//!
//! A [`RoadFeature`] is one geographic feature from a road dataset: a geometry
//! plus the handful of road attributes the engine cares about.  Loaders (the
//! GeoJSON adapter, test fixtures, synthetic generators) produce these; the
//! [`NetworkBuilder`](crate::NetworkBuilder) consumes them.

use flow_core::{Coordinate, VehicleClass};

/// Speed limit assumed when a feature carries none, km/h.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

// ── RoadClass ─────────────────────────────────────────────────────────────────

/// Functional road class.
///
/// Parsed from strings such as `"highway.primary"` (SUMO edge types) or a bare
/// `"primary"` (OSM `highway=*` values).  Anything unrecognised maps to
/// [`RoadClass::Other`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoadClass {
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    #[default]
    Other,
}

impl RoadClass {
    pub fn parse(s: &str) -> RoadClass {
        let s = s.trim();
        let base = s.strip_prefix("highway.").unwrap_or(s);
        // `primary_link` and friends share the class of their parent road.
        let base = base.strip_suffix("_link").unwrap_or(base);
        match base.to_ascii_lowercase().as_str() {
            "primary" | "trunk" | "motorway" => RoadClass::Primary,
            "secondary"                      => RoadClass::Secondary,
            "tertiary"                       => RoadClass::Tertiary,
            "residential" | "living_street"  => RoadClass::Residential,
            "service"                        => RoadClass::Service,
            _                                => RoadClass::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Primary     => "primary",
            RoadClass::Secondary   => "secondary",
            RoadClass::Tertiary    => "tertiary",
            RoadClass::Residential => "residential",
            RoadClass::Service     => "service",
            RoadClass::Other       => "other",
        }
    }

    /// Base-map colour for the road layer, as a `#rrggbb` string.
    pub fn color(self) -> &'static str {
        match self {
            RoadClass::Primary     => "#ff4444",
            RoadClass::Secondary   => "#44ff44",
            RoadClass::Tertiary    => "#4444ff",
            RoadClass::Residential => "#ffaa44",
            RoadClass::Service     => "#44ffff",
            RoadClass::Other       => "#aaaaaa",
        }
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── RoadAttributes ────────────────────────────────────────────────────────────

/// Descriptive attributes carried from a feature onto its edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadAttributes {
    pub class:        RoadClass,
    /// Posted speed limit, km/h.
    pub speed_kmh:    f64,
    pub name:         Option<String>,
    pub lane_width_m: Option<f64>,
    pub priority:     Option<i32>,
    /// Vehicle classes admitted on the road.  Empty means unrestricted.
    pub allowed:      Vec<VehicleClass>,
}

impl Default for RoadAttributes {
    fn default() -> Self {
        Self {
            class:        RoadClass::Other,
            speed_kmh:    DEFAULT_SPEED_KMH,
            name:         None,
            lane_width_m: None,
            priority:     None,
            allowed:      Vec::new(),
        }
    }
}

impl RoadAttributes {
    pub fn with_class(class: RoadClass) -> Self {
        Self { class, ..Self::default() }
    }

    #[inline]
    pub fn speed_limit_mps(&self) -> f64 {
        self.speed_kmh / 3.6
    }

    pub fn allows(&self, class: &VehicleClass) -> bool {
        self.allowed.is_empty() || self.allowed.contains(class)
    }

    /// Display name, falling back to `"Unnamed road"`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed road")
    }
}

// ── RoadFeature ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeatureGeometry {
    LineString(Vec<Coordinate>),
    Point(Coordinate),
    /// Any other geometry kind, identified by name.  Ignored by the builder.
    Other(String),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoadFeature {
    pub geometry:   FeatureGeometry,
    pub attributes: RoadAttributes,
}

impl RoadFeature {
    /// A polyline feature.
    pub fn line(coords: impl Into<Vec<Coordinate>>, attributes: RoadAttributes) -> Self {
        Self { geometry: FeatureGeometry::LineString(coords.into()), attributes }
    }

    /// The polyline, if this is a line string with at least two points.
    pub fn polyline(&self) -> Option<&[Coordinate]> {
        match &self.geometry {
            FeatureGeometry::LineString(coords) if coords.len() >= 2 => Some(coords),
            _ => None,
        }
    }
}
