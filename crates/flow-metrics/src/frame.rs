//! The per-tick metrics pass.

use flow_core::Coordinate;

use crate::density::densities;
use crate::layer::{HeatSample, Layer};
use crate::levels::{JamLevel, co2_intensity, noise_intensity};

/// Default proximity radius for density, metres.
pub const DEFAULT_PROXIMITY_RADIUS_M: f64 = 50.0;

/// Input: one vehicle's position and the speed limit of its edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleSample {
    pub pos:             Coordinate,
    pub speed_limit_kmh: f64,
}

/// Output: derived values for one vehicle, in input order.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleMetrics {
    pub density: u32,
    pub jam:     JamLevel,
    pub co2:     f64,
    pub noise:   f64,
}

impl VehicleMetrics {
    /// Intensity shown for this vehicle on `layer`.
    pub fn intensity(&self, layer: Layer) -> f64 {
        match layer {
            Layer::Traffic => 1.0,
            Layer::Jam     => self.jam.intensity(),
            Layer::Co2     => self.co2,
            Layer::Noise   => self.noise,
        }
    }
}

/// Aggregate view of one metrics pass.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSummary {
    pub vehicle_count: usize,
    pub mean_density:  f64,
    pub heavy_jams:    usize,
    pub mean_co2:      f64,
    pub mean_noise:    f64,
}

/// Everything derived from one vehicle snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsFrame {
    pub vehicles: Vec<VehicleMetrics>,
    pub jam:      Vec<HeatSample>,
    pub co2:      Vec<HeatSample>,
    pub noise:    Vec<HeatSample>,
    pub summary:  MetricsSummary,
}

impl MetricsFrame {
    /// Heat samples for `layer`; empty for [`Layer::Traffic`].
    pub fn heat(&self, layer: Layer) -> &[HeatSample] {
        match layer {
            Layer::Traffic => &[],
            Layer::Jam     => &self.jam,
            Layer::Co2     => &self.co2,
            Layer::Noise   => &self.noise,
        }
    }
}

/// Derives density, jam, CO2 and noise values from vehicle samples.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MetricsDeriver {
    pub radius_m: f64,
}

impl Default for MetricsDeriver {
    fn default() -> Self {
        Self { radius_m: DEFAULT_PROXIMITY_RADIUS_M }
    }
}

impl MetricsDeriver {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn derive(&self, samples: &[VehicleSample]) -> MetricsFrame {
        let positions: Vec<Coordinate> = samples.iter().map(|s| s.pos).collect();
        let counts = densities(&positions, self.radius_m);

        let n = samples.len();
        let mut frame = MetricsFrame {
            vehicles: Vec::with_capacity(n),
            jam:      Vec::with_capacity(n),
            co2:      Vec::with_capacity(n),
            noise:    Vec::with_capacity(n),
            summary:  MetricsSummary { vehicle_count: n, ..MetricsSummary::default() },
        };

        for (sample, &density) in samples.iter().zip(&counts) {
            let m = VehicleMetrics {
                density,
                jam:   JamLevel::from_density(density),
                co2:   co2_intensity(density),
                noise: noise_intensity(sample.speed_limit_kmh),
            };
            frame.jam.push(HeatSample { pos: sample.pos, intensity: m.jam.intensity() });
            frame.co2.push(HeatSample { pos: sample.pos, intensity: m.co2 });
            frame.noise.push(HeatSample { pos: sample.pos, intensity: m.noise });

            frame.summary.mean_density += density as f64;
            frame.summary.mean_co2     += m.co2;
            frame.summary.mean_noise   += m.noise;
            if m.jam == JamLevel::Heavy {
                frame.summary.heavy_jams += 1;
            }
            frame.vehicles.push(m);
        }

        if n > 0 {
            let n = n as f64;
            frame.summary.mean_density /= n;
            frame.summary.mean_co2     /= n;
            frame.summary.mean_noise   /= n;
        }
        frame
    }
}
