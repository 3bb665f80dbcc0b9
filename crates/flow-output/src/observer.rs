//! `SnapshotOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use flow_core::SimClock;
use flow_sim::{SimObserver, Snapshot};
use log::warn;

use crate::row::{TickSummaryRow, VehicleSnapshotRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes a summary row every frame and vehicle rows
/// every `interval` frames.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `run_for` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SnapshotOutputObserver<W: OutputWriter> {
    writer:     W,
    interval:   u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SnapshotOutputObserver<W> {
    /// `interval` of 0 is treated as 1 (every frame).
    pub fn new(writer: W, interval: u64) -> Self {
        Self {
            writer,
            interval:   interval.max(1),
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!("output writer failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SnapshotOutputObserver<W> {
    fn on_tick_end(&mut self, snapshot: &Snapshot) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(snapshot));
        self.store_err(result);

        if snapshot.frame % self.interval != 0 || snapshot.vehicles.is_empty() {
            return;
        }
        let rows: Vec<VehicleSnapshotRow> = snapshot
            .vehicles
            .iter()
            .map(|v| VehicleSnapshotRow::from_vehicle(snapshot, v))
            .collect();
        let result = self.writer.write_snapshots(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _clock: &SimClock) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
