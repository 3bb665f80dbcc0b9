//! Simulation configuration and clock.
//!
//! # Design
//!
//! The engine is driven by an external animation clock that calls "advance by
//! Δt" once per frame.  `SimClock` counts those frames and accumulates the
//! simulated seconds actually applied (after the per-step clamp and the
//! global speed multiplier are taken into account by the caller).

use std::fmt;

use crate::{FlowError, FlowResult};

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Frame counter plus elapsed simulated time.
///
/// `SimClock` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Number of ticks applied so far.
    pub frame: u64,
    /// Sum of all applied Δt values, in seconds.
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one applied tick of `dt_secs`.
    #[inline]
    pub fn advance(&mut self, dt_secs: f64) {
        self.frame += 1;
        self.elapsed_secs += dt_secs;
    }

    /// Break elapsed time into (hours, minutes, seconds).
    pub fn elapsed_hms(&self) -> (u64, u32, u32) {
        let total = self.elapsed_secs.max(0.0) as u64;
        let hours   = total / 3_600;
        let minutes = ((total % 3_600) / 60) as u32;
        let seconds = (total % 60) as u32;
        (hours, minutes, seconds)
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.elapsed_hms();
        write!(f, "frame {} ({:02}:{:02}:{:02})", self.frame, h, m, s)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Typically deserialized from a JSON/TOML file by the application crate or
/// built from UI controls, then passed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Number of vehicles to spawn.  Fewer may exist if routes are scarce.
    pub vehicle_count: usize,

    /// Global speed multiplier applied to every vehicle.  Must be > 0.
    pub speed_multiplier: f64,

    /// `false` pauses the simulation: ticks become no-ops.
    pub playing: bool,

    /// Master RNG seed.  `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Lower bound of the uniform per-vehicle speed band, m/s.
    pub min_speed_mps: f64,

    /// Upper bound of the uniform per-vehicle speed band, m/s.
    pub max_speed_mps: f64,

    /// Largest Δt applied in one tick; longer frame gaps are clamped.
    pub max_step_secs: f64,

    /// Per-tick probability of sampling a trail point while driving.
    /// 0 disables sampling (edge transitions still record trail points).
    pub trail_sample_prob: f64,

    /// Maximum distance from a barrier click to the edge it blocks, metres.
    pub barrier_snap_m: f64,

    /// Radius used for the per-vehicle density count, metres.
    pub proximity_radius_m: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicle_count:      100,
            speed_multiplier:   1.0,
            playing:            true,
            seed:               None,
            min_speed_mps:      10.0,
            max_speed_mps:      20.0,
            max_step_secs:      0.1,
            trail_sample_prob:  0.1,
            barrier_snap_m:     25.0,
            proximity_radius_m: 50.0,
        }
    }
}

impl SimConfig {
    /// Check every field for a usable value.
    pub fn validate(&self) -> FlowResult<()> {
        if !(self.speed_multiplier.is_finite() && self.speed_multiplier > 0.0) {
            return Err(FlowError::Config(format!(
                "speed multiplier must be positive, got {}",
                self.speed_multiplier
            )));
        }
        if !(self.min_speed_mps > 0.0
            && self.max_speed_mps.is_finite()
            && self.min_speed_mps <= self.max_speed_mps)
        {
            return Err(FlowError::Config(format!(
                "speed band {}..{} m/s is empty, non-positive or unbounded",
                self.min_speed_mps, self.max_speed_mps
            )));
        }
        if !(self.max_step_secs.is_finite() && self.max_step_secs > 0.0) {
            return Err(FlowError::Config("max_step_secs must be positive and finite".into()));
        }
        if !(0.0..=1.0).contains(&self.trail_sample_prob) {
            return Err(FlowError::Config(format!(
                "trail_sample_prob must lie in [0, 1], got {}",
                self.trail_sample_prob
            )));
        }
        if !(self.barrier_snap_m >= 0.0 && self.proximity_radius_m >= 0.0) {
            return Err(FlowError::Config("distances must be non-negative".into()));
        }
        Ok(())
    }

    /// Clamp a raw frame gap to the largest step the integrator accepts.
    #[inline]
    pub fn clamp_step(&self, dt_secs: f64) -> f64 {
        dt_secs.clamp(0.0, self.max_step_secs)
    }
}
