//! Fixed mappings from density and speed limit to visual intensities.

/// Traffic-jam severity derived from local density.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JamLevel {
    #[default]
    FreeFlow,
    Light,
    Moderate,
    Heavy,
}

impl JamLevel {
    /// `>5` heavy, `>2` moderate, `>0` light, else free flow.
    pub fn from_density(density: u32) -> JamLevel {
        match density {
            d if d > 5 => JamLevel::Heavy,
            d if d > 2 => JamLevel::Moderate,
            d if d > 0 => JamLevel::Light,
            _          => JamLevel::FreeFlow,
        }
    }

    /// Heat-map weight in `[0, 1]`.
    pub fn intensity(self) -> f64 {
        match self {
            JamLevel::FreeFlow => 0.1,
            JamLevel::Light    => 0.4,
            JamLevel::Moderate => 0.7,
            JamLevel::Heavy    => 1.0,
        }
    }

    /// Marker colour as `#rrggbb`.
    pub fn color(self) -> &'static str {
        match self {
            JamLevel::FreeFlow => "#00cc44",
            JamLevel::Light    => "#ffff00",
            JamLevel::Moderate => "#ff9900",
            JamLevel::Heavy    => "#ff0000",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JamLevel::FreeFlow => "free_flow",
            JamLevel::Light    => "light",
            JamLevel::Moderate => "moderate",
            JamLevel::Heavy    => "heavy",
        }
    }
}

impl std::fmt::Display for JamLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CO2 proxy: `min(1, 0.2 + 0.15 · density)`.
#[inline]
pub fn co2_intensity(density: u32) -> f64 {
    (0.2 + 0.15 * density as f64).min(1.0)
}

/// Noise proxy from the speed limit of the vehicle's edge, km/h.
#[inline]
pub fn noise_intensity(speed_limit_kmh: f64) -> f64 {
    match speed_limit_kmh {
        s if s >= 80.0 => 1.0,
        s if s >= 50.0 => 0.7,
        s if s >= 30.0 => 0.4,
        _              => 0.2,
    }
}
