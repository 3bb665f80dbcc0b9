//! Vehicle classes that a road may admit.
//!
//! Names follow the SUMO vehicle-class vocabulary used by the network
//! exports this engine consumes (`passenger`, `bus`, `truck`, …).  Unknown
//! names are kept verbatim in [`VehicleClass::Other`].

/// A class of road user listed in a road's allowed-vehicle attribute.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleClass {
    Passenger,
    Bus,
    Truck,
    Delivery,
    Bicycle,
    Pedestrian,
    Emergency,
    Other(String),
}

impl VehicleClass {
    /// Parse a single class name (case-insensitive).
    pub fn parse(name: &str) -> VehicleClass {
        match name.trim().to_ascii_lowercase().as_str() {
            "passenger" | "car" | "private" | "taxi"  => VehicleClass::Passenger,
            "bus" | "coach"                           => VehicleClass::Bus,
            "truck" | "trailer"                       => VehicleClass::Truck,
            "delivery"                                => VehicleClass::Delivery,
            "bicycle" | "bike"                        => VehicleClass::Bicycle,
            "pedestrian"                              => VehicleClass::Pedestrian,
            "emergency" | "authority"                 => VehicleClass::Emergency,
            other                                     => VehicleClass::Other(other.to_string()),
        }
    }

    /// Parse a whitespace- or comma-separated list, skipping empty tokens.
    pub fn parse_list(list: &str) -> Vec<VehicleClass> {
        list.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .map(VehicleClass::parse)
            .collect()
    }

    /// Human-readable label, useful for panels and CSV columns.
    pub fn as_str(&self) -> &str {
        match self {
            VehicleClass::Passenger  => "passenger",
            VehicleClass::Bus        => "bus",
            VehicleClass::Truck      => "truck",
            VehicleClass::Delivery   => "delivery",
            VehicleClass::Bicycle    => "bicycle",
            VehicleClass::Pedestrian => "pedestrian",
            VehicleClass::Emergency  => "emergency",
            VehicleClass::Other(s)   => s,
        }
    }

    /// `true` for motorised classes that the simulator's vehicles represent.
    #[inline]
    pub fn is_motorised(&self) -> bool {
        !matches!(self, VehicleClass::Bicycle | VehicleClass::Pedestrian)
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
