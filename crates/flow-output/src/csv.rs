//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `vehicle_snapshots.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::debug;

use crate::writer::OutputWriter;
use crate::{OutputResult, TickSummaryRow, VehicleSnapshotRow};

pub const SNAPSHOT_FILE: &str = "vehicle_snapshots.csv";
pub const SUMMARY_FILE:  &str = "tick_summaries.csv";

const SNAPSHOT_HEADER: [&str; 14] = [
    "vehicle_id", "frame", "elapsed_secs", "lon", "lat", "edge", "progress",
    "speed_mps", "odometer_m", "state", "density", "jam", "co2", "noise",
];

const SUMMARY_HEADER: [&str; 8] = [
    "frame", "elapsed_secs", "vehicle_count", "mean_density", "heavy_jams",
    "mean_co2", "mean_noise", "blocked_edges",
];

/// Writes simulation output to two CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the two CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        debug!("writing CSV output to {}", dir.display());

        let mut snapshots = Writer::from_path(dir.join(SNAPSHOT_FILE))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join(SUMMARY_FILE))?;
        summaries.write_record(SUMMARY_HEADER)?;

        Ok(Self {
            snapshots,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[VehicleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.vehicle_id.to_string(),
                row.frame.to_string(),
                row.elapsed_secs.to_string(),
                row.lon.to_string(),
                row.lat.to_string(),
                row.edge.to_string(),
                row.progress.to_string(),
                row.speed_mps.to_string(),
                row.odometer_m.to_string(),
                row.state.as_str().to_owned(),
                row.density.to_string(),
                row.jam.as_str().to_owned(),
                row.co2.to_string(),
                row.noise.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.frame.to_string(),
            row.elapsed_secs.to_string(),
            row.vehicle_count.to_string(),
            row.mean_density.to_string(),
            row.heavy_jams.to_string(),
            row.mean_co2.to_string(),
            row.mean_noise.to_string(),
            row.blocked_edges.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
