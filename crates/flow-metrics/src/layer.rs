//! Visualisation layers and heat-map points.

use flow_core::Coordinate;

/// A visualisation layer the renderer can switch between.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layer {
    /// Plain vehicle markers.
    Traffic,
    Jam,
    Co2,
    Noise,
}

impl Layer {
    pub const ALL: [Layer; 4] = [Layer::Traffic, Layer::Jam, Layer::Co2, Layer::Noise];

    /// Layers rendered as heat maps.
    pub const HEAT: [Layer; 3] = [Layer::Jam, Layer::Co2, Layer::Noise];

    pub fn label(self) -> &'static str {
        match self {
            Layer::Traffic => "Traffic",
            Layer::Jam     => "Traffic jam",
            Layer::Co2     => "CO₂",
            Layer::Noise   => "Noise [dB]",
        }
    }

    /// Colour stops `(weight, #rgb)` for heat layers; empty for `Traffic`.
    pub fn gradient(self) -> &'static [(f64, &'static str)] {
        match self {
            Layer::Traffic => &[],
            Layer::Jam     => &[(0.4, "#00f"), (0.7, "#ff0"), (1.0, "#f00")],
            Layer::Co2     => &[(0.4, "#0f0"), (0.7, "#ff0"), (1.0, "#f00")],
            Layer::Noise   => &[(0.4, "#0ff"), (0.7, "#ff0"), (1.0, "#f0f")],
        }
    }
}

/// One weighted point for a heat-map renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeatSample {
    pub pos:       Coordinate,
    /// Weight in `[0, 1]`.
    pub intensity: f64,
}
