//! Simulation observer trait for progress reporting and data collection.

use flow_core::SimClock;

use crate::barrier::Barrier;
use crate::snapshot::Snapshot;

/// Callbacks invoked by [`Sim::run_for`][crate::Sim::run_for] and
/// [`Sim::step_observed`][crate::Sim::step_observed].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, snapshot: &Snapshot) {
///         if snapshot.frame % self.interval == 0 {
///             println!("frame {}: {} vehicles", snapshot.frame, snapshot.vehicles.len());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called after every applied step with that step's snapshot.
    fn on_tick_end(&mut self, _snapshot: &Snapshot) {}

    /// Called before the next observed step whenever barriers were placed,
    /// removed, or cleared since the last notification.
    fn on_barrier_change(&mut self, _barriers: &[Barrier]) {}

    /// Called once when `run_for` finishes.
    fn on_sim_end(&mut self, _clock: &SimClock) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
